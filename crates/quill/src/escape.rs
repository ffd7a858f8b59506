//! Context-sensitive escaping of variable values.
//!
//! The session escapes every value fragment on the way in, so the renderer
//! only concatenates. [`StandardEscaper`] covers the built-in escape types;
//! engines can be given any other [`Escaper`].

use std::fmt::Write as _;

use crate::error::EscapeError;
use crate::part::EscapeType;

/// Escapes raw text for an output context.
pub trait Escaper: Send + Sync {
    /// Returns `raw` escaped for `kind`.
    ///
    /// `kind` is never [`EscapeType::Unspecified`] when called by a session.
    fn escape(&self, raw: &str, kind: EscapeType) -> Result<String, EscapeError>;
}

impl<F> Escaper for F
where
    F: Fn(&str, EscapeType) -> Result<String, EscapeError> + Send + Sync,
{
    fn escape(&self, raw: &str, kind: EscapeType) -> Result<String, EscapeError> {
        self(raw, kind)
    }
}

/// Escaper for `text`, `html` and `js`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardEscaper;

impl Escaper for StandardEscaper {
    fn escape(&self, raw: &str, kind: EscapeType) -> Result<String, EscapeError> {
        match kind {
            EscapeType::None => Ok(raw.to_string()),
            EscapeType::Html => Ok(escape_html(raw)),
            EscapeType::Js => Ok(escape_js(raw)),
            EscapeType::Unspecified => Err(EscapeError {
                kind,
                message: "no escape type chosen".to_string(),
            }),
        }
    }
}

/// Escapes the five HTML special characters.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escapes text for use inside a JavaScript string literal.
///
/// Angle brackets and ampersands are escaped as well, so the result is also
/// safe inside an inline `<script>` block.
pub fn escape_js(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '<' | '>' | '&' | '\u{2028}' | '\u{2029}' => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            _ => out.push(c),
        }
    }
    out
}
