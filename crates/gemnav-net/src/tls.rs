//! TLS provider abstraction.
//!
//! The client dials through this trait so protocol logic never
//! depends on a concrete TLS library, and tests can pass streams
//! through untouched.

use gemnav_types::backend::NetworkStream;
use gemnav_types::error::Result;

/// Wraps a plain TCP stream in a TLS client session.
pub trait TlsProvider: Send + Sync {
    /// Perform the handshake and return the encrypted stream.
    ///
    /// `server_name` is sent as SNI. Whether the peer's certificate
    /// is validated is up to the implementation; the Gemini provider
    /// deliberately accepts anything (see [`crate::tls_rustls`]).
    fn connect_tls(
        &self,
        stream: Box<dyn NetworkStream>,
        server_name: &str,
    ) -> Result<Box<dyn NetworkStream>>;
}
