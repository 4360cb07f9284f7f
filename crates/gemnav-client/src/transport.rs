//! The Gemini wire exchange: one request line out, one response in.
//!
//! The protocol has no length prefix and no chunking; the response
//! ends when the capsule closes the connection.

use std::io;

use gemnav_net::tls::TlsProvider;
use gemnav_types::backend::{NetworkBackend, NetworkStream};
use gemnav_types::error::{GemError, Result};

use crate::url::GemUrl;

/// Maximum accepted response size (8 MB).
const MAX_RESPONSE_SIZE: usize = 8 * 1024 * 1024;

/// A raw Gemini response: the header line and everything after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub header: String,
    pub body: Vec<u8>,
}

/// The fetch seam: one URL in, one raw response out.
///
/// The production implementation dials TCP + TLS; tests substitute a
/// scripted fetcher so engine logic runs without a network.
pub trait Fetch {
    fn fetch(&mut self, url: &GemUrl) -> Result<Response>;
}

/// Production [`Fetch`]: dial, send `<url>\r\n`, read to close.
pub struct GeminiTransport {
    backend: Box<dyn NetworkBackend>,
    tls: Box<dyn TlsProvider>,
}

impl GeminiTransport {
    pub fn new(backend: Box<dyn NetworkBackend>, tls: Box<dyn TlsProvider>) -> Self {
        Self { backend, tls }
    }
}

impl Fetch for GeminiTransport {
    fn fetch(&mut self, url: &GemUrl) -> Result<Response> {
        log::debug!("fetching {url}");
        let stream = self.backend.connect(&url.host, url.port)?;
        let mut stream = self.tls.connect_tls(stream, &url.host)?;

        write_all(stream.as_mut(), format!("{url}\r\n").as_bytes())?;
        let raw = read_to_close(stream.as_mut())?;
        let _ = stream.close();

        split_response(&raw)
    }
}

/// Write the full buffer, looping over short writes.
fn write_all(stream: &mut dyn NetworkStream, mut data: &[u8]) -> Result<()> {
    while !data.is_empty() {
        let n = stream.write(data)?;
        if n == 0 {
            return Err(GemError::Network(
                "connection closed while sending request".to_string(),
            ));
        }
        data = &data[n..];
    }
    Ok(())
}

/// Read until the capsule closes the connection.
fn read_to_close(stream: &mut dyn NetworkStream) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(8192);
    let mut chunk = [0u8; 8192];
    loop {
        match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                if buf.len() + n > MAX_RESPONSE_SIZE {
                    return Err(GemError::Protocol("response exceeds 8 MB limit".to_string()));
                }
                buf.extend_from_slice(&chunk[..n]);
            },
            Err(GemError::Io(e))
                if e.kind() == io::ErrorKind::WouldBlock
                    || e.kind() == io::ErrorKind::TimedOut =>
            {
                return Err(GemError::Network(format!("read timed out: {e}")));
            },
            Err(GemError::Io(e)) => return Err(GemError::Network(format!("read: {e}"))),
            Err(e) => return Err(e),
        }
    }
    Ok(buf)
}

/// Split a raw response at the first CRLF into header line and body.
fn split_response(raw: &[u8]) -> Result<Response> {
    let i = find_subsequence(raw, b"\r\n")
        .ok_or_else(|| GemError::Protocol("no CRLF in response".to_string()))?;
    let header = std::str::from_utf8(&raw[..i])
        .map_err(|_| GemError::Protocol("non-UTF-8 response header".to_string()))?
        .to_string();
    Ok(Response {
        header,
        body: raw[i + 2..].to_vec(),
    })
}

/// Find the position of a byte subsequence in a slice.
fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
