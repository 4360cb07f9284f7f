//! Error types for gemnav.

use std::io;

/// Errors produced by the gemnav client.
#[derive(Debug, thiserror::Error)]
pub enum GemError {
    #[error("malformed URL: {0}")]
    MalformedUrl(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("too many redirects (gave up after {0} hops)")]
    TooManyRedirects(u8),

    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("unexpected status {status}: {meta}")]
    UnexpectedStatus { status: u8, meta: String },

    #[error("capsule reported {status}: {meta}")]
    CapsuleFailure { status: u8, meta: String },

    #[error("no saved link state; visit a page first")]
    NoSavedState,

    #[error("link {0} out of range (last page had {1} links)")]
    OutOfRange(usize, usize),

    #[error("no results for: {0}")]
    NoResults(String),

    #[error("command error: {0}")]
    Command(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, GemError>;
