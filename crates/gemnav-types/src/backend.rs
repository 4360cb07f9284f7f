//! Transport traits.
//!
//! The protocol engine never touches sockets or TLS directly; it
//! works through these seams so tests can substitute scripted
//! streams (see the design notes on testability in DESIGN.md).

use crate::error::Result;

/// A bidirectional byte stream, plain or TLS-wrapped.
///
/// `read` returning `Ok(0)` means the peer closed the connection,
/// which is how Gemini signals end of response.
pub trait NetworkStream: Send {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;
    fn write(&mut self, data: &[u8]) -> Result<usize>;
    fn close(&mut self) -> Result<()>;
}

impl core::fmt::Debug for dyn NetworkStream {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("<NetworkStream>")
    }
}

/// Opens connections: `dial(host, port) -> byte stream`.
pub trait NetworkBackend {
    fn connect(&mut self, host: &str, port: u16) -> Result<Box<dyn NetworkStream>>;
}
