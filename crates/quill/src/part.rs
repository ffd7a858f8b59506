//! The parts a template is made of.
//!
//! A parsed [`Template`] is an ordered list of [`Part`]s: literal text,
//! variables, and nested templates. Every part remembers the exact source text
//! it was parsed from, so a template can always be turned back into its
//! (ditch-stripped) source.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::template::Template;

/// Output context a variable value is escaped for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EscapeType {
    /// Not chosen; the caller's escape type applies.
    #[default]
    Unspecified,
    /// No escaping (`text`).
    #[serde(alias = "text")]
    None,
    /// HTML text and attribute escaping (`html`).
    Html,
    /// JavaScript string literal escaping (`js`).
    Js,
}

impl EscapeType {
    /// Token used for this escape type in template sources.
    pub fn token(self) -> Option<&'static str> {
        match self {
            EscapeType::Unspecified => None,
            EscapeType::None => Some("text"),
            EscapeType::Html => Some("html"),
            EscapeType::Js => Some("js"),
        }
    }

    /// Returns `true` unless this is [`EscapeType::Unspecified`].
    pub fn is_specified(self) -> bool {
        self != EscapeType::Unspecified
    }

    /// Picks `self` if specified, `fallback` otherwise.
    pub fn or(self, fallback: EscapeType) -> EscapeType {
        if self.is_specified() {
            self
        } else {
            fallback
        }
    }
}

impl FromStr for EscapeType {
    type Err = ();

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "text" => Ok(EscapeType::None),
            "html" => Ok(EscapeType::Html),
            "js" => Ok(EscapeType::Js),
            _ => Err(()),
        }
    }
}

impl fmt::Display for EscapeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token().unwrap_or("unspecified"))
    }
}

/// Literal text, emitted verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPart {
    text: String,
}

impl TextPart {
    pub(crate) fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// The literal text.
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// A named placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariablePart {
    name: String,
    escape: EscapeType,
    raw: String,
}

impl VariablePart {
    pub(crate) fn new(name: impl Into<String>, escape: EscapeType, raw: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            escape,
            raw: raw.into(),
        }
    }

    /// The variable name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Escape type written in the tag, or `Unspecified`.
    pub fn escape(&self) -> EscapeType {
        self.escape
    }

    /// The tag as written in the source.
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

/// Where a nested template came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NestedKind {
    /// Written between `begin` and `end` tags.
    Inline,
    /// Pulled in by an `include` tag.
    Included {
        /// The path as written in the tag.
        path: String,
    },
}

/// A named sub-template, rendered zero or more times.
#[derive(Debug, Clone)]
pub struct NestedTemplatePart {
    name: String,
    template: Arc<Template>,
    kind: NestedKind,
    open: String,
    close: String,
}

impl NestedTemplatePart {
    pub(crate) fn inline(
        name: impl Into<String>,
        template: Arc<Template>,
        open: impl Into<String>,
        close: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            template,
            kind: NestedKind::Inline,
            open: open.into(),
            close: close.into(),
        }
    }

    pub(crate) fn included(
        name: impl Into<String>,
        template: Arc<Template>,
        path: impl Into<String>,
        raw: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            template,
            kind: NestedKind::Included { path: path.into() },
            open: raw.into(),
            close: String::new(),
        }
    }

    /// The nested template name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The nested template.
    pub fn template(&self) -> &Arc<Template> {
        &self.template
    }

    /// Inline or included.
    pub fn kind(&self) -> &NestedKind {
        &self.kind
    }

    /// Returns `true` for `begin`/`end` templates.
    pub fn is_inline(&self) -> bool {
        self.kind == NestedKind::Inline
    }

    /// Source text of this part: the tags plus, for inline templates, the body.
    pub fn raw(&self) -> String {
        match self.kind {
            NestedKind::Inline => {
                let mut raw = self.open.clone();
                raw.push_str(&self.template.source());
                raw.push_str(&self.close);
                raw
            }
            NestedKind::Included { .. } => self.open.clone(),
        }
    }
}

/// One constituent of a template.
#[derive(Debug, Clone)]
pub enum Part {
    /// Literal text.
    Text(TextPart),
    /// A variable.
    Variable(VariablePart),
    /// A nested template.
    Nested(NestedTemplatePart),
}

impl Part {
    /// Name of a variable or nested template; `None` for text.
    pub fn name(&self) -> Option<&str> {
        match self {
            Part::Text(_) => None,
            Part::Variable(var) => Some(var.name()),
            Part::Nested(nested) => Some(nested.name()),
        }
    }

    /// Appends the source text of this part to `out`.
    pub fn write_source(&self, out: &mut String) {
        match self {
            Part::Text(text) => out.push_str(text.text()),
            Part::Variable(var) => out.push_str(var.raw()),
            Part::Nested(nested) => out.push_str(&nested.raw()),
        }
    }

    /// Returns the text part, if this is one.
    pub fn as_text(&self) -> Option<&TextPart> {
        match self {
            Part::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the variable part, if this is one.
    pub fn as_variable(&self) -> Option<&VariablePart> {
        match self {
            Part::Variable(var) => Some(var),
            _ => None,
        }
    }

    /// Returns the nested template part, if this is one.
    pub fn as_nested(&self) -> Option<&NestedTemplatePart> {
        match self {
            Part::Nested(nested) => Some(nested),
            _ => None,
        }
    }
}
