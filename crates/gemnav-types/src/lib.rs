//! Foundation types for gemnav: the error taxonomy and the transport
//! traits the network and client crates share.

pub mod backend;
pub mod error;

pub use backend::{NetworkBackend, NetworkStream};
pub use error::{GemError, Result};
