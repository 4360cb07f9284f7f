//! Networking for gemnav: a blocking TCP backend with explicit
//! connect/read timeouts, and the TLS seam the Gemini client dials
//! through.

pub mod tcp;
pub mod tls;
pub mod tls_rustls;

pub use tcp::{StdNetworkBackend, StdNetworkStream};
pub use tls::TlsProvider;
pub use tls_rustls::GeminiTlsProvider;
