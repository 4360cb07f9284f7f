//! Client configuration: limits, state-file location, search engines.
//!
//! Everything here is an explicit value handed to the engine rather
//! than a compiled-in constant, so tests can inject a temporary state
//! file and stub engines.

use std::path::PathBuf;

use serde::Deserialize;

use gemnav_types::error::{GemError, Result};

/// A search backend queried by `gem search`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchEngine {
    /// Display name for the per-engine section header.
    pub name: String,
    /// Endpoint the encoded query is appended to (no trailing `?`).
    pub query_endpoint: String,
}

/// Configuration for one invocation.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Redirect hops allowed before giving up.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: u8,

    /// Where the link state lives.
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,

    /// Search backends, queried in declaration order.
    #[serde(default = "default_engines", rename = "engine")]
    pub engines: Vec<SearchEngine>,
}

fn default_max_redirects() -> u8 {
    5
}

fn default_state_file() -> PathBuf {
    if let Ok(path) = std::env::var("GEMNAV_STATE_FILE") {
        return PathBuf::from(path);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".local/share/gemnav/links")
}

fn default_engines() -> Vec<SearchEngine> {
    vec![
        SearchEngine {
            name: "geminispace.info".to_string(),
            query_endpoint: "gemini://geminispace.info/search".to_string(),
        },
        SearchEngine {
            name: "tlgs.one".to_string(),
            query_endpoint: "gemini://tlgs.one/search".to_string(),
        },
        SearchEngine {
            name: "kennedy.gemi.dev".to_string(),
            query_endpoint: "gemini://kennedy.gemi.dev/search".to_string(),
        },
    ]
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            max_redirects: default_max_redirects(),
            state_file: default_state_file(),
            engines: default_engines(),
        }
    }
}

impl ClientConfig {
    /// Parse a config TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| GemError::Config(format!("config.toml: {e}")))
    }

    /// Load from `$GEMNAV_CONFIG`, else `~/.config/gemnav/config.toml`.
    /// A missing file yields the defaults; a malformed one is an error.
    pub fn load() -> Result<Self> {
        let path = match std::env::var("GEMNAV_CONFIG") {
            Ok(p) => PathBuf::from(p),
            Err(_) => match dirs::home_dir() {
                Some(home) => home.join(".config/gemnav/config.toml"),
                None => return Ok(Self::default()),
            },
        };

        match std::fs::read_to_string(&path) {
            Ok(text) => Self::from_toml(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }
}
