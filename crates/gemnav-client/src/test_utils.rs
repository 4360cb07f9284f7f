//! Shared test fixtures: scripted fetchers and canned streams.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use gemnav_types::backend::NetworkStream;
use gemnav_types::error::{GemError, Result};

use crate::transport::{Fetch, Response};
use crate::url::GemUrl;

/// A [`Fetch`] that replays canned responses in order and records the
/// URLs it was asked for.
pub(crate) struct ScriptedFetch {
    script: VecDeque<Result<Response>>,
    pub requests: Vec<String>,
}

impl ScriptedFetch {
    pub fn new(script: Vec<Result<Response>>) -> Self {
        Self {
            script: script.into(),
            requests: Vec::new(),
        }
    }
}

impl Fetch for ScriptedFetch {
    fn fetch(&mut self, url: &GemUrl) -> Result<Response> {
        self.requests.push(url.to_string());
        self.script
            .pop_front()
            .unwrap_or_else(|| Err(GemError::Network("script exhausted".to_string())))
    }
}

/// Build a canned [`Response`].
pub(crate) fn response(header: &str, body: &str) -> Response {
    Response {
        header: header.to_string(),
        body: body.as_bytes().to_vec(),
    }
}

/// Script state shared between a test and the streams it hands out:
/// one fixed response, plus everything the code under test wrote.
#[derive(Clone)]
pub(crate) struct SharedScript(Arc<Mutex<ScriptInner>>);

struct ScriptInner {
    response: Vec<u8>,
    pos: usize,
    written: Vec<u8>,
}

impl SharedScript {
    pub fn with_response(response: &[u8]) -> Self {
        Self(Arc::new(Mutex::new(ScriptInner {
            response: response.to_vec(),
            pos: 0,
            written: Vec::new(),
        })))
    }

    pub fn written(&self) -> Vec<u8> {
        self.0.lock().unwrap().written.clone()
    }
}

/// A [`NetworkStream`] that serves a [`SharedScript`].
pub(crate) struct CannedStream {
    script: SharedScript,
}

impl CannedStream {
    pub fn new(script: SharedScript) -> Self {
        Self { script }
    }
}

impl NetworkStream for CannedStream {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut inner = self.script.0.lock().unwrap();
        let n = buf.len().min(inner.response.len() - inner.pos);
        let pos = inner.pos;
        buf[..n].copy_from_slice(&inner.response[pos..pos + n]);
        inner.pos += n;
        Ok(n)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize> {
        self.script.0.lock().unwrap().written.extend_from_slice(data);
        Ok(data.len())
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
