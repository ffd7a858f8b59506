//! Immutable parsed templates.
//!
//! A [`Template`] is created once by the parser and never changes afterwards.
//! It owns its parts and the lookup indices derived from them, and is shared
//! through `Arc` between the cache, parent templates and render sessions.

use std::collections::HashMap;
use std::fmt::{self, Write as _};
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::part::{NestedKind, NestedTemplatePart, Part};
use crate::resolver::SourceId;

static NEXT_ANONYMOUS: AtomicU64 = AtomicU64::new(1);

/// Identity of a template.
///
/// Templates parsed from a plain string are anonymous: each one is only equal
/// to itself. Templates loaded through a resolver are identified by their
/// [`SourceId`], which is also their cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TemplateId {
    /// Parsed from a string; the number is unique per process.
    Anonymous(u64),
    /// Loaded through a resolver.
    Source(SourceId),
}

impl TemplateId {
    pub(crate) fn next_anonymous() -> Self {
        TemplateId::Anonymous(NEXT_ANONYMOUS.fetch_add(1, Ordering::Relaxed))
    }

    /// Human-readable origin used in messages.
    pub fn origin(&self) -> String {
        match self {
            TemplateId::Anonymous(_) => "<string>".to_string(),
            TemplateId::Source(id) => id.to_string(),
        }
    }
}

/// A parsed template.
#[derive(Debug)]
pub struct Template {
    id: TemplateId,
    parts: Vec<Part>,
    var_index: HashMap<String, Vec<usize>>,
    nested_index: HashMap<String, usize>,
    names: Vec<String>,
}

impl Template {
    /// Builds a template from a finished part list.
    ///
    /// The parser guarantees that nested template names are unique and never
    /// shared with a variable at the same level.
    pub(crate) fn new(id: TemplateId, parts: Vec<Part>) -> Self {
        let mut var_index: HashMap<String, Vec<usize>> = HashMap::new();
        let mut nested_index = HashMap::new();
        let mut names = Vec::new();

        for (index, part) in parts.iter().enumerate() {
            match part {
                Part::Text(_) => {}
                Part::Variable(var) => {
                    let positions = var_index.entry(var.name().to_string()).or_default();
                    if positions.is_empty() {
                        names.push(var.name().to_string());
                    }
                    positions.push(index);
                }
                Part::Nested(nested) => {
                    let previous = nested_index.insert(nested.name().to_string(), index);
                    debug_assert!(previous.is_none(), "duplicate nested template name");
                    names.push(nested.name().to_string());
                }
            }
        }

        Self {
            id,
            parts,
            var_index,
            nested_index,
            names,
        }
    }

    /// The template identity.
    pub fn id(&self) -> &TemplateId {
        &self.id
    }

    /// Returns `true` if the template was parsed from a plain string.
    pub fn is_anonymous(&self) -> bool {
        matches!(self.id, TemplateId::Anonymous(_))
    }

    /// All parts, in source order.
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Part at a position.
    pub fn part(&self, index: usize) -> Option<&Part> {
        self.parts.get(index)
    }

    /// Variables and nested templates, in first-occurrence order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Returns `true` if the template has a variable of that name.
    pub fn has_variable(&self, name: &str) -> bool {
        self.var_index.contains_key(name)
    }

    /// Returns `true` if the template has a nested template of that name.
    pub fn has_nested(&self, name: &str) -> bool {
        self.nested_index.contains_key(name)
    }

    /// Part positions of a variable, first to last.
    pub fn variable_positions(&self, name: &str) -> Option<&[usize]> {
        self.var_index.get(name).map(Vec::as_slice)
    }

    /// Part position of a nested template.
    pub fn nested_position(&self, name: &str) -> Option<usize> {
        self.nested_index.get(name).copied()
    }

    /// The nested template part of that name.
    pub fn nested(&self, name: &str) -> Option<&NestedTemplatePart> {
        self.nested_position(name)
            .and_then(|index| self.parts[index].as_nested())
    }

    /// Variable names, in first-occurrence order.
    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.names
            .iter()
            .map(String::as_str)
            .filter(|name| self.var_index.contains_key(*name))
    }

    /// Nested template names, in source order.
    pub fn nested_names(&self) -> impl Iterator<Item = &str> {
        self.names
            .iter()
            .map(String::as_str)
            .filter(|name| self.nested_index.contains_key(*name))
    }

    /// Re-concatenates the source text of all parts.
    ///
    /// This is the source the template was parsed from, minus ditch blocks.
    pub fn source(&self) -> String {
        let mut out = String::new();
        for part in &self.parts {
            part.write_source(&mut out);
        }
        out
    }

    /// Indented outline of the part tree, one part per line.
    ///
    /// ```text
    /// text "<ul>"
    /// inline rows
    ///   text "<li>"
    ///   var title (html)
    ///   text "</li>"
    /// text "</ul>"
    /// ```
    pub fn dump(&self) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = self.dump_into(&mut out, 0);
        out
    }

    fn dump_into<W: fmt::Write + ?Sized>(&self, out: &mut W, depth: usize) -> fmt::Result {
        let indent = "  ".repeat(depth);
        for part in &self.parts {
            match part {
                Part::Text(text) => writeln!(out, "{}text {:?}", indent, text.text())?,
                Part::Variable(var) => match var.escape().token() {
                    Some(token) => writeln!(out, "{}var {} ({})", indent, var.name(), token)?,
                    None => writeln!(out, "{}var {}", indent, var.name())?,
                },
                Part::Nested(nested) => {
                    match nested.kind() {
                        NestedKind::Inline => writeln!(out, "{}inline {}", indent, nested.name())?,
                        NestedKind::Included { path } => {
                            writeln!(out, "{}included {} ({})", indent, nested.name(), path)?
                        }
                    }
                    nested.template().dump_into(out, depth + 1)?;
                }
            }
        }
        Ok(())
    }
}

impl PartialEq for Template {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Template {}

impl Hash for Template {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Shared handle to a template.
pub type TemplateRef = Arc<Template>;
