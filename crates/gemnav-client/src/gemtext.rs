//! Gemtext rendering: styled terminal text plus an ordered link list.
//!
//! Covers the line types a reader needs (links, three heading levels,
//! bullets, quotes, preformatted blocks); gemtext has no inline
//! markup and none is invented here.

use crate::style::{Style, Styler};
use crate::url::GemUrl;

/// A rendered page: styled text plus the absolute link URLs in
/// display order. Link `i` is shown as number `offset + i + 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub text: String,
    pub links: Vec<String>,
}

/// Line types dispatched by prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinePrefix {
    Link,
    Heading3,
    Heading2,
    Heading1,
    Bullet,
    Quote,
}

/// The dispatch table, most specific prefix first. Checked in order,
/// first match wins, which keeps `### ` from being read as `# `.
const PREFIXES: &[(&str, LinePrefix)] = &[
    ("=> ", LinePrefix::Link),
    ("### ", LinePrefix::Heading3),
    ("## ", LinePrefix::Heading2),
    ("# ", LinePrefix::Heading1),
    ("* ", LinePrefix::Bullet),
    ("> ", LinePrefix::Quote),
];

fn classify(line: &str) -> Option<(LinePrefix, &str)> {
    PREFIXES
        .iter()
        .find_map(|&(prefix, kind)| line.strip_prefix(prefix).map(|rest| (kind, rest)))
}

/// Render a gemtext body against the page it was served from.
///
/// `link_offset` shifts the display numbers so multiple renders (the
/// search aggregator) share one numbering space. `footer` is appended
/// after trailing blank lines are stripped; pass `""` for none.
pub fn render(
    body: &str,
    page_url: &GemUrl,
    link_offset: usize,
    footer: &str,
    styler: &Styler,
) -> RenderedPage {
    let mut out = String::new();
    let mut links: Vec<String> = Vec::new();
    let mut preformatted = false;

    for raw_line in body.split('\n') {
        let line = raw_line.strip_suffix('\r').unwrap_or(raw_line);

        if let Some(alt) = line.strip_prefix("```") {
            preformatted = !preformatted;
            // Alt text is shown once, on the opening fence only.
            if preformatted {
                let alt = alt.trim();
                if !alt.is_empty() {
                    out.push_str(&styler.paint(Style::Dim, alt));
                    out.push('\n');
                }
            }
            continue;
        }

        if preformatted {
            // Verbatim: code and ASCII art must not be reinterpreted.
            out.push_str(&styler.paint(Style::Dim, line));
            out.push('\n');
            continue;
        }

        match classify(line) {
            Some((LinePrefix::Link, rest)) => {
                let (target, label) = split_link(rest);
                let url = page_url.resolve(target);
                links.push(url.clone());
                let number = link_offset + links.len();

                out.push_str(&styler.paint(Style::Cyan, &format!("[{number}]")));
                out.push(' ');
                out.push_str(label.unwrap_or(target));
                if let Some(scheme) = foreign_scheme(&url) {
                    out.push(' ');
                    out.push_str(&styler.paint(Style::Dim, &format!("({scheme})")));
                }
                out.push('\n');
            },
            Some((LinePrefix::Heading1, rest)) => {
                out.push_str(&styler.paint(Style::BoldUnderline, rest));
                out.push('\n');
            },
            Some((LinePrefix::Heading2, rest)) => {
                out.push_str(&styler.paint(Style::Bold, rest));
                out.push('\n');
            },
            Some((LinePrefix::Heading3, rest)) => {
                out.push_str("  ");
                out.push_str(&styler.paint(Style::Bold, rest));
                out.push('\n');
            },
            Some((LinePrefix::Bullet, rest)) => {
                out.push_str("  • ");
                out.push_str(rest);
                out.push('\n');
            },
            Some((LinePrefix::Quote, rest)) => {
                out.push_str(&styler.paint(Style::Italic, &format!("> {rest}")));
                out.push('\n');
            },
            None => {
                out.push_str(line);
                out.push('\n');
            },
        }
    }

    let mut text = collapse_blank_runs(&out);
    while text.ends_with('\n') {
        text.pop();
    }
    if !footer.is_empty() {
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(footer);
    }

    RenderedPage { text, links }
}

/// Split a link line's remainder on the first whitespace run into
/// target and optional label.
fn split_link(rest: &str) -> (&str, Option<&str>) {
    let rest = rest.trim_start();
    match rest.find(char::is_whitespace) {
        Some(i) => {
            let label = rest[i..].trim_start();
            (&rest[..i], (!label.is_empty()).then_some(label))
        },
        None => (rest, None),
    }
}

/// The scheme of a non-Gemini absolute URL, if that is what this is.
fn foreign_scheme(url: &str) -> Option<&str> {
    let scheme = &url[..url.find("://")?];
    (!scheme.eq_ignore_ascii_case("gemini")).then_some(scheme)
}

/// Collapse any run of more than two consecutive newlines to exactly
/// two. Cosmetic only; non-blank content is never dropped.
fn collapse_blank_runs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut newlines = 0;
    for ch in text.chars() {
        if ch == '\n' {
            newlines += 1;
            if newlines <= 2 {
                out.push('\n');
            }
        } else {
            newlines = 0;
            out.push(ch);
        }
    }
    out
}
