//! Gemini URL model: parse, serialize, resolve, query encoding.

use std::fmt;

use gemnav_types::error::{GemError, Result};

/// Default Gemini port.
pub const DEFAULT_PORT: u16 = 1965;

/// A parsed `gemini://` URL.
///
/// `path` always carries its leading `/` (a query string, when
/// present, rides along inside it). The authority splits on the
/// *last* colon, so IPv6 literal hosts are out of scope: a colon in
/// the host is read as a port separator. This simplification is kept
/// deliberately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GemUrl {
    pub host: String,
    pub port: u16,
    pub path: String,
}

impl GemUrl {
    /// Parse a `gemini://` URL string.
    pub fn parse(raw: &str) -> Result<Self> {
        let rest = raw
            .strip_prefix("gemini://")
            .ok_or_else(|| GemError::MalformedUrl(format!("not a gemini URL: {raw}")))?;

        let (authority, path) = match rest.find('/') {
            Some(i) => (&rest[..i], rest[i..].to_string()),
            None => (rest, "/".to_string()),
        };

        let (host, port) = match authority.rfind(':') {
            Some(i) => {
                let port = authority[i + 1..]
                    .parse::<u16>()
                    .map_err(|_| GemError::MalformedUrl(format!("bad port in: {raw}")))?;
                (&authority[..i], port)
            },
            None => (authority, DEFAULT_PORT),
        };

        if host.is_empty() {
            return Err(GemError::MalformedUrl(format!("empty host in: {raw}")));
        }

        Ok(Self {
            host: host.to_string(),
            port,
            path,
        })
    }

    /// Resolve a link found on this page to an absolute URL string.
    ///
    /// Links that already carry a scheme delimiter pass through
    /// verbatim (cross-protocol targets are annotated later, at
    /// render time). Absolute paths are rooted at this URL's
    /// authority; anything else resolves against the directory of
    /// this URL's path (text up to and including the last `/`).
    pub fn resolve(&self, link: &str) -> String {
        if link.contains("://") {
            return link.to_string();
        }

        let path = if link.starts_with('/') {
            link.to_string()
        } else {
            let dir = match self.path.rfind('/') {
                Some(i) => &self.path[..=i],
                None => "/",
            };
            format!("{dir}{link}")
        };

        Self {
            host: self.host.clone(),
            port: self.port,
            path,
        }
        .to_string()
    }
}

impl fmt::Display for GemUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.port == DEFAULT_PORT {
            write!(f, "gemini://{}{}", self.host, self.path)
        } else {
            write!(f, "gemini://{}:{}{}", self.host, self.port, self.path)
        }
    }
}

/// Percent-encode a query string.
///
/// Every byte outside `[A-Za-z0-9._~-]` becomes uppercase `%XX`.
pub fn encode_query(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for &b in s.as_bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'.' | b'_' | b'~' | b'-' => {
                out.push(b as char);
            },
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_url() {
        let url = GemUrl::parse("gemini://example.com").unwrap();
        assert_eq!(url.host, "example.com");
        assert_eq!(url.port, DEFAULT_PORT);
        assert_eq!(url.path, "/");
    }

    #[test]
    fn parse_with_path_and_port() {
        let url = GemUrl::parse("gemini://capsule.town:1966/users/~nia/log.gmi").unwrap();
        assert_eq!(url.host, "capsule.town");
        assert_eq!(url.port, 1966);
        assert_eq!(url.path, "/users/~nia/log.gmi");
    }

    #[test]
    fn parse_keeps_query_in_path() {
        let url = GemUrl::parse("gemini://gus.example/search?rust%20lang").unwrap();
        assert_eq!(url.path, "/search?rust%20lang");
    }

    #[test]
    fn parse_rejects_missing_scheme() {
        let err = GemUrl::parse("example.com/page").unwrap_err();
        assert!(matches!(err, GemError::MalformedUrl(_)));
        let err = GemUrl::parse("https://example.com/").unwrap_err();
        assert!(matches!(err, GemError::MalformedUrl(_)));
    }

    #[test]
    fn parse_rejects_empty_host() {
        let err = GemUrl::parse("gemini:///page").unwrap_err();
        assert!(matches!(err, GemError::MalformedUrl(_)));
        let err = GemUrl::parse("gemini://").unwrap_err();
        assert!(matches!(err, GemError::MalformedUrl(_)));
    }

    #[test]
    fn parse_rejects_bad_port() {
        let err = GemUrl::parse("gemini://example.com:pizza/").unwrap_err();
        assert!(matches!(err, GemError::MalformedUrl(_)));
    }

    #[test]
    fn display_omits_default_port() {
        let url = GemUrl::parse("gemini://example.com:1965/a").unwrap();
        assert_eq!(url.to_string(), "gemini://example.com/a");
        let url = GemUrl::parse("gemini://example.com:1966/a").unwrap();
        assert_eq!(url.to_string(), "gemini://example.com:1966/a");
    }

    #[test]
    fn resolve_passes_through_other_schemes() {
        let base = GemUrl::parse("gemini://h/a/b").unwrap();
        assert_eq!(base.resolve("https://example.org/x"), "https://example.org/x");
        assert_eq!(
            base.resolve("gemini://other.host/y"),
            "gemini://other.host/y"
        );
    }

    #[test]
    fn resolve_absolute_path_preserves_origin() {
        let base = GemUrl::parse("gemini://h/a/b").unwrap();
        assert_eq!(base.resolve("/x"), "gemini://h/x");

        let base = GemUrl::parse("gemini://h:1966/a/b").unwrap();
        assert_eq!(base.resolve("/x"), "gemini://h:1966/x");
    }

    #[test]
    fn resolve_relative_against_directory() {
        let base = GemUrl::parse("gemini://h/a/b").unwrap();
        assert_eq!(base.resolve("c"), "gemini://h/a/c");

        let base = GemUrl::parse("gemini://h/dir/page").unwrap();
        assert_eq!(base.resolve("other.gmi"), "gemini://h/dir/other.gmi");
    }

    #[test]
    fn resolve_relative_at_root() {
        let base = GemUrl::parse("gemini://h").unwrap();
        assert_eq!(base.resolve("c"), "gemini://h/c");
    }

    #[test]
    fn encode_query_basics() {
        assert_eq!(encode_query("a b"), "a%20b");
        assert_eq!(encode_query("rust-lang"), "rust-lang");
        assert_eq!(encode_query("a/b?c"), "a%2Fb%3Fc");
        assert_eq!(encode_query(""), "");
    }

    #[test]
    fn encode_query_multibyte() {
        // Each UTF-8 byte is encoded separately.
        assert_eq!(encode_query("é"), "%C3%A9");
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        fn arb_host() -> impl Strategy<Value = String> {
            "[a-z][a-z0-9-]{0,12}(\\.[a-z]{2,5}){0,2}"
        }

        fn arb_path() -> impl Strategy<Value = String> {
            "(/[a-zA-Z0-9._~-]{0,8}){0,4}".prop_map(|p| if p.is_empty() { "/".to_string() } else { p })
        }

        proptest! {
            #[test]
            fn parse_serialize_parse_is_identity(
                host in arb_host(),
                port in 1u16..u16::MAX,
                path in arb_path(),
            ) {
                let raw = format!("gemini://{host}:{port}{path}");
                let parsed = GemUrl::parse(&raw).unwrap();
                let reparsed = GemUrl::parse(&parsed.to_string()).unwrap();
                prop_assert_eq!(parsed, reparsed);
            }

            #[test]
            fn encoding_unreserved_is_fixed_point(s in "[A-Za-z0-9._~-]{0,40}") {
                let once = encode_query(&s);
                prop_assert_eq!(&once, &s);
                prop_assert_eq!(encode_query(&once), s);
            }

            #[test]
            fn encoded_output_is_ascii_unreserved_or_escape(s in ".{0,40}") {
                let encoded = encode_query(&s);
                for chunk in encoded.split('%').skip(1) {
                    // Two uppercase hex digits follow every escape.
                    prop_assert!(chunk.len() >= 2);
                    prop_assert!(chunk.as_bytes()[..2]
                        .iter()
                        .all(|b| b.is_ascii_digit() || (b'A'..=b'F').contains(b)));
                }
            }
        }
    }
}
