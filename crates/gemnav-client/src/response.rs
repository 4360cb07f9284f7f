//! Gemini response header model.

use gemnav_types::error::{GemError, Result};

/// One response's status line: a two-digit status plus free-form meta.
///
/// Transient; lives only for the duration of one exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHeader {
    pub status: u8,
    pub meta: String,
}

/// The six Gemini status classes (tens digit of the status).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// 1x: the capsule wants input appended as a query.
    Input,
    /// 2x: a body follows; meta is the MIME type.
    Success,
    /// 3x: meta is the redirect target.
    Redirect,
    /// 4x: temporary failure.
    TempFail,
    /// 5x: permanent failure.
    PermFail,
    /// 6x: client certificate required.
    CertRequired,
    /// Tens digit outside 1..=6.
    Unknown,
}

impl ResponseHeader {
    /// Parse a header line into status and meta.
    ///
    /// The line must be at least two bytes; the first two bytes are
    /// the decimal status, the remainder (trimmed) is the meta. A
    /// bare `"20"` with no trailing space is valid and yields an
    /// empty meta.
    pub fn parse(line: &str) -> Result<Self> {
        let bytes = line.as_bytes();
        if bytes.len() < 2 {
            return Err(GemError::Protocol(format!("header too short: {line:?}")));
        }
        if !bytes[0].is_ascii_digit() || !bytes[1].is_ascii_digit() {
            return Err(GemError::Protocol(format!("bad status in header: {line:?}")));
        }
        let status = (bytes[0] - b'0') * 10 + (bytes[1] - b'0');
        let meta = line.get(2..).unwrap_or("").trim().to_string();
        Ok(Self { status, meta })
    }

    /// The status class (tens digit).
    pub fn class(&self) -> StatusClass {
        match self.status / 10 {
            1 => StatusClass::Input,
            2 => StatusClass::Success,
            3 => StatusClass::Redirect,
            4 => StatusClass::TempFail,
            5 => StatusClass::PermFail,
            6 => StatusClass::CertRequired,
            _ => StatusClass::Unknown,
        }
    }

    /// The media type from a success meta: text before `;`, trimmed,
    /// lowercased. Empty when the capsule sent none.
    pub fn media_type(&self) -> String {
        self.meta
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase()
    }

    /// Whether a success body should be rendered as gemtext. An empty
    /// media type defaults to gemtext per the protocol.
    pub fn is_gemtext(&self) -> bool {
        let media_type = self.media_type();
        media_type.is_empty() || media_type == "text/gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_success_header() {
        let h = ResponseHeader::parse("20 text/gemini; charset=utf-8").unwrap();
        assert_eq!(h.status, 20);
        assert_eq!(h.meta, "text/gemini; charset=utf-8");
        assert_eq!(h.class(), StatusClass::Success);
    }

    #[test]
    fn parse_bare_status_without_meta() {
        let h = ResponseHeader::parse("20").unwrap();
        assert_eq!(h.status, 20);
        assert_eq!(h.meta, "");
        assert_eq!(h.class(), StatusClass::Success);
        assert!(h.is_gemtext());
    }

    #[test]
    fn parse_rejects_short_header() {
        assert!(ResponseHeader::parse("").is_err());
        assert!(ResponseHeader::parse("2").is_err());
    }

    #[test]
    fn parse_rejects_non_numeric_status() {
        assert!(ResponseHeader::parse("ok hello").is_err());
        assert!(ResponseHeader::parse("2x foo").is_err());
    }

    #[test]
    fn class_covers_all_six() {
        let class_of = |s: &str| ResponseHeader::parse(s).unwrap().class();
        assert_eq!(class_of("10 Enter query"), StatusClass::Input);
        assert_eq!(class_of("20 text/gemini"), StatusClass::Success);
        assert_eq!(class_of("31 gemini://new.example/"), StatusClass::Redirect);
        assert_eq!(class_of("44 slow down"), StatusClass::TempFail);
        assert_eq!(class_of("51 not found"), StatusClass::PermFail);
        assert_eq!(class_of("60 cert please"), StatusClass::CertRequired);
        assert_eq!(class_of("99 martian"), StatusClass::Unknown);
        assert_eq!(class_of("05 martian"), StatusClass::Unknown);
    }

    #[test]
    fn media_type_is_folded_and_trimmed() {
        let h = ResponseHeader::parse("20 TEXT/Gemini ;lang=en").unwrap();
        assert_eq!(h.media_type(), "text/gemini");
        assert!(h.is_gemtext());
    }

    #[test]
    fn non_gemtext_text_is_not_gemtext() {
        let h = ResponseHeader::parse("20 text/plain").unwrap();
        assert_eq!(h.media_type(), "text/plain");
        assert!(!h.is_gemtext());
    }

    #[test]
    fn meta_is_trimmed() {
        let h = ResponseHeader::parse("31   gemini://x/   ").unwrap();
        assert_eq!(h.meta, "gemini://x/");
    }
}
