//! The visit state machine: request, classify, follow redirects.
//!
//! One `visit` is one logical page view. Redirects re-enter the loop
//! with a new target; every other status class is terminal.

use log::debug;

use gemnav_types::error::{GemError, Result};

use crate::config::ClientConfig;
use crate::gemtext;
use crate::response::{ResponseHeader, StatusClass};
use crate::search::{self, SearchOutcome};
use crate::state::LinkStore;
use crate::style::{Style, Styler};
use crate::transport::Fetch;
use crate::url::GemUrl;

/// Terminal outcome of one visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisitOutcome {
    /// A gemtext page, rendered; its links were persisted.
    Page { text: String, link_count: usize },
    /// The capsule wants input: show the prompt, re-invoke with
    /// `<template>?<answer>`.
    Input { prompt: String, template: String },
    /// A non-gemtext `text/*` body, passed through verbatim.
    Raw { text: String },
}

/// Drives the protocol against a [`Fetch`], recording link state in a
/// [`LinkStore`]. Both are seams: production wires TLS and a file,
/// tests wire scripts and memory.
pub struct Engine<'a> {
    fetch: &'a mut dyn Fetch,
    store: &'a mut dyn LinkStore,
    config: &'a ClientConfig,
    styler: Styler,
}

impl<'a> Engine<'a> {
    pub fn new(
        fetch: &'a mut dyn Fetch,
        store: &'a mut dyn LinkStore,
        config: &'a ClientConfig,
        styler: Styler,
    ) -> Self {
        Self {
            fetch,
            store,
            config,
            styler,
        }
    }

    /// Visit a URL or bare host, following up to
    /// `config.max_redirects` redirect hops.
    pub fn visit(&mut self, target: &str) -> Result<VisitOutcome> {
        let mut target = normalize(target);

        // One initial request plus max_redirects redirect hops.
        for _ in 0..=self.config.max_redirects {
            let url = GemUrl::parse(&target)?;
            let response = self.fetch.fetch(&url)?;
            let header = ResponseHeader::parse(&response.header)?;
            debug!("{url} -> {} {}", header.status, header.meta);

            match header.class() {
                StatusClass::Input => {
                    return Ok(VisitOutcome::Input {
                        prompt: header.meta,
                        template: url.to_string(),
                    });
                },
                StatusClass::Success => return self.success(&url, &header, &response.body),
                StatusClass::Redirect => {
                    target = url.resolve(&header.meta);
                    debug!("redirect -> {target}");
                },
                StatusClass::TempFail | StatusClass::PermFail | StatusClass::CertRequired => {
                    return Err(GemError::CapsuleFailure {
                        status: header.status,
                        meta: header.meta,
                    });
                },
                StatusClass::Unknown => {
                    return Err(GemError::UnexpectedStatus {
                        status: header.status,
                        meta: header.meta,
                    });
                },
            }
        }

        Err(GemError::TooManyRedirects(self.config.max_redirects))
    }

    /// Follow link `n` from the state persisted by the previous
    /// invocation.
    pub fn follow(&mut self, n: usize) -> Result<VisitOutcome> {
        let state = self.store.load()?;
        let url = state.resolve(n)?.to_string();
        debug!("link {n} -> {url}");
        self.visit(&url)
    }

    /// Query every configured search engine, merging links under one
    /// numbering.
    pub fn search(&mut self, query: &str) -> Result<SearchOutcome> {
        search::search(
            &mut *self.fetch,
            &mut *self.store,
            self.config,
            &self.styler,
            query,
        )
    }

    fn success(
        &mut self,
        url: &GemUrl,
        header: &ResponseHeader,
        body: &[u8],
    ) -> Result<VisitOutcome> {
        if header.is_gemtext() {
            let body = String::from_utf8_lossy(body);
            let footer = self.styler.paint(Style::Dim, &format!("-- {url}"));
            let page = gemtext::render(&body, url, 0, &footer, &self.styler);
            self.store.save(&url.to_string(), &page.links)?;
            return Ok(VisitOutcome::Page {
                link_count: page.links.len(),
                text: page.text,
            });
        }

        let media_type = header.media_type();
        if media_type.starts_with("text/") {
            return Ok(VisitOutcome::Raw {
                text: String::from_utf8_lossy(body).into_owned(),
            });
        }

        Err(GemError::UnsupportedContentType(media_type))
    }
}

/// Prepend the scheme when the target looks like a bare host/path.
/// Anything already carrying a scheme delimiter is left alone, so a
/// cross-protocol target fails URL parsing with a clear message
/// instead of being mangled.
fn normalize(target: &str) -> String {
    if target.contains("://") {
        target.to_string()
    } else {
        format!("gemini://{target}")
    }
}
