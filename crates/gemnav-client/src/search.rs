//! Multi-engine search with one continuous link numbering.
//!
//! Engines are queried strictly sequentially, in declaration order.
//! A failing engine is reported and skipped; the search only fails
//! outright when every engine yields nothing.

use log::warn;

use gemnav_types::error::{GemError, Result};

use crate::config::{ClientConfig, SearchEngine};
use crate::gemtext::{self, RenderedPage};
use crate::response::{ResponseHeader, StatusClass};
use crate::state::{LinkStore, SEARCH_CONTEXT_PREFIX};
use crate::style::{Style, Styler};
use crate::transport::Fetch;
use crate::url::{GemUrl, encode_query};

/// Aggregated search output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    pub text: String,
    pub link_count: usize,
}

/// What one engine contributed.
enum EngineResult {
    Page(RenderedPage),
    Rejected(String),
}

/// Query every configured engine, merge the link lists under one
/// numbering space, persist the combined state under the search
/// sentinel context.
pub fn search(
    fetch: &mut dyn Fetch,
    store: &mut dyn LinkStore,
    config: &ClientConfig,
    styler: &Styler,
    query: &str,
) -> Result<SearchOutcome> {
    let mut sections: Vec<String> = Vec::new();
    let mut links: Vec<String> = Vec::new();

    for engine in &config.engines {
        let header = styler.paint(Style::Bold, &format!("== {} ==", engine.name));
        match query_engine(fetch, engine, query, links.len(), styler) {
            Ok(EngineResult::Page(page)) => {
                links.extend(page.links);
                sections.push(format!("{header}\n{}", page.text));
            },
            Ok(EngineResult::Rejected(meta)) => {
                sections.push(format!("{header}\nquery rejected: {meta}"));
            },
            Err(e) => {
                warn!("search engine {} failed: {e}", engine.name);
                sections.push(format!("{header}\nunavailable: {e}"));
            },
        }
    }

    if links.is_empty() {
        return Err(GemError::NoResults(query.to_string()));
    }

    store.save(&format!("{SEARCH_CONTEXT_PREFIX}{query}"), &links)?;

    Ok(SearchOutcome {
        text: sections.join("\n\n"),
        link_count: links.len(),
    })
}

/// Run one engine's query, rendering its results with the running
/// cross-engine link offset.
fn query_engine(
    fetch: &mut dyn Fetch,
    engine: &SearchEngine,
    query: &str,
    link_offset: usize,
    styler: &Styler,
) -> Result<EngineResult> {
    let mut url = GemUrl::parse(&format!("{}?{}", engine.query_endpoint, encode_query(query)))?;

    let mut response = fetch.fetch(&url)?;
    let mut header = ResponseHeader::parse(&response.header)?;

    // Search endpoints commonly redirect exactly once (scheme or
    // trailing-slash normalization); allow that single extra hop,
    // outside the general redirect loop.
    if header.class() == StatusClass::Redirect {
        url = GemUrl::parse(&url.resolve(&header.meta))?;
        response = fetch.fetch(&url)?;
        header = ResponseHeader::parse(&response.header)?;
    }

    match header.class() {
        StatusClass::Success if header.is_gemtext() => {
            let body = String::from_utf8_lossy(&response.body);
            Ok(EngineResult::Page(gemtext::render(
                &body,
                &url,
                link_offset,
                "",
                styler,
            )))
        },
        StatusClass::Success => Err(GemError::UnsupportedContentType(header.media_type())),
        StatusClass::Input => Ok(EngineResult::Rejected(header.meta)),
        StatusClass::Redirect => Err(GemError::TooManyRedirects(1)),
        _ => Err(GemError::CapsuleFailure {
            status: header.status,
            meta: header.meta,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::MemoryLinkStore;
    use crate::test_utils::{ScriptedFetch, response};

    fn two_engine_config() -> ClientConfig {
        ClientConfig {
            max_redirects: 5,
            state_file: "/nonexistent".into(),
            engines: vec![
                SearchEngine {
                    name: "alpha".to_string(),
                    query_endpoint: "gemini://alpha.example/search".to_string(),
                },
                SearchEngine {
                    name: "beta".to_string(),
                    query_endpoint: "gemini://beta.example/find".to_string(),
                },
            ],
        }
    }

    fn run_search(
        script: Vec<gemnav_types::error::Result<crate::transport::Response>>,
        query: &str,
    ) -> (Result<SearchOutcome>, Vec<String>, MemoryLinkStore) {
        let mut fetch = ScriptedFetch::new(script);
        let mut store = MemoryLinkStore::new();
        let config = two_engine_config();
        let outcome = search(&mut fetch, &mut store, &config, &Styler::new(false), query);
        (outcome, fetch.requests, store)
    }

    #[test]
    fn numbering_is_continuous_across_engines() {
        let script = vec![
            Ok(response("20 text/gemini", "=> /a A\n=> /b B\n")),
            Ok(response("20 text/gemini", "=> /c C\n")),
        ];
        let (outcome, _, store) = run_search(script, "rust");

        let outcome = outcome.unwrap();
        assert_eq!(outcome.link_count, 3);
        assert!(outcome.text.contains("[1] A"));
        assert!(outcome.text.contains("[2] B"));
        // Beta's single link continues the numbering; it is 3, not 1.
        assert!(outcome.text.contains("[3] C"));

        let state = store.load().unwrap();
        assert_eq!(
            state.links,
            vec![
                "gemini://alpha.example/a",
                "gemini://alpha.example/b",
                "gemini://beta.example/c",
            ]
        );
    }

    #[test]
    fn query_is_percent_encoded_per_engine() {
        let script = vec![
            Ok(response("20 text/gemini", "=> /a A\n")),
            Ok(response("20 text/gemini", "=> /b B\n")),
        ];
        let (_, requests, _) = run_search(script, "rust lang");
        assert_eq!(
            requests,
            vec![
                "gemini://alpha.example/search?rust%20lang",
                "gemini://beta.example/find?rust%20lang",
            ]
        );
    }

    #[test]
    fn combined_state_uses_search_sentinel_context() {
        let script = vec![
            Ok(response("20 text/gemini", "=> /a A\n")),
            Ok(response("20 text/gemini", "")),
        ];
        let (_, _, store) = run_search(script, "rust lang");
        let state = store.load().unwrap();
        assert_eq!(state.context, "gem:search:rust lang");
        assert!(state.is_search());
    }

    #[test]
    fn failed_engine_is_skipped_not_fatal() {
        let script = vec![
            Err(GemError::Network("timed out".to_string())),
            Ok(response("20 text/gemini", "=> /c C\n")),
        ];
        let (outcome, _, _) = run_search(script, "rust");

        let outcome = outcome.unwrap();
        assert_eq!(outcome.link_count, 1);
        assert!(outcome.text.contains("unavailable"));
        // Links restart nothing: the surviving engine's first link is 1.
        assert!(outcome.text.contains("[1] C"));
    }

    #[test]
    fn input_response_reports_rejection_and_continues() {
        let script = vec![
            Ok(response("10 Please use the form", "")),
            Ok(response("20 text/gemini", "=> /c C\n")),
        ];
        let (outcome, _, _) = run_search(script, "rust");

        let outcome = outcome.unwrap();
        assert!(outcome.text.contains("query rejected: Please use the form"));
        assert!(outcome.text.contains("[1] C"));
    }

    #[test]
    fn single_redirect_per_engine_is_followed() {
        let script = vec![
            Ok(response("31 gemini://alpha.example/search2?rust", "")),
            Ok(response("20 text/gemini", "=> /a A\n")),
            Ok(response("20 text/gemini", "=> /c C\n")),
        ];
        let (outcome, requests, _) = run_search(script, "rust");

        assert_eq!(outcome.unwrap().link_count, 2);
        assert_eq!(requests[1], "gemini://alpha.example/search2?rust");
    }

    #[test]
    fn second_redirect_skips_the_engine() {
        let script = vec![
            Ok(response("31 /hop1", "")),
            Ok(response("31 /hop2", "")),
            Ok(response("20 text/gemini", "=> /c C\n")),
        ];
        let (outcome, _, _) = run_search(script, "rust");

        let outcome = outcome.unwrap();
        assert_eq!(outcome.link_count, 1);
        assert!(outcome.text.contains("unavailable"));
    }

    #[test]
    fn no_links_anywhere_is_no_results() {
        let script = vec![
            Ok(response("20 text/gemini", "nothing here\n")),
            Ok(response("51 gone", "")),
        ];
        let (outcome, _, store) = run_search(script, "obscure");

        match outcome {
            Err(GemError::NoResults(q)) => assert_eq!(q, "obscure"),
            other => panic!("expected NoResults, got {other:?}"),
        }
        // Nothing was persisted.
        assert!(store.load().is_err());
    }

    #[test]
    fn failure_status_from_engine_is_reported() {
        let script = vec![
            Ok(response("44 overloaded", "")),
            Ok(response("20 text/gemini", "=> /c C\n")),
        ];
        let (outcome, _, _) = run_search(script, "rust");
        let outcome = outcome.unwrap();
        assert!(outcome.text.contains("capsule reported 44"));
        assert_eq!(outcome.link_count, 1);
    }

    #[test]
    fn engine_sections_appear_in_declaration_order() {
        let script = vec![
            Ok(response("20 text/gemini", "=> /a A\n")),
            Ok(response("20 text/gemini", "=> /c C\n")),
        ];
        let (outcome, _, _) = run_search(script, "rust");
        let text = outcome.unwrap().text;
        let alpha = text.find("== alpha ==").unwrap();
        let beta = text.find("== beta ==").unwrap();
        assert!(alpha < beta);
    }
}
