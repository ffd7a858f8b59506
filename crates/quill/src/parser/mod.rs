//! Template parser.
//!
//! Parsing runs in two stages. Ditch blocks are cut out of the source first,
//! keeping an offset map so errors still point into the source as written.
//! The remaining text is tokenized once and the token list is folded into
//! parts level by level: a `begin` tag claims the tokens up to the nearest
//! `end` tag of the same name and those are built into a child template.
//!
//! Included templates are located through the [`PathResolver`], parsed by a
//! child parser and shared through the [`TemplateCache`] when one is set.
//!
//! ```rust
//! use quill::{Parser, Syntax};
//!
//! let syntax = Syntax::standard();
//! let template = Parser::new(&syntax)
//!     .parse_str("<ul>~%%begin:rows%<li>~%html:title%</li>~%%end:rows%</ul>")
//!     .unwrap();
//!
//! assert_eq!(template.names(), ["rows"]);
//! assert!(template.nested("rows").unwrap().template().has_variable("title"));
//! ```

mod ditch;
mod scan;

use std::collections::HashSet;
use std::ops::Range;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::cache::TemplateCache;
use crate::error::{Error, ParseError, ParseErrorKind, ResolveError, Result};
use crate::part::{EscapeType, NestedTemplatePart, Part, TextPart, VariablePart};
use crate::resolver::{base_name, NoResolver, PathResolver, SourceId};
use crate::syntax::Syntax;
use crate::template::{Template, TemplateId};

use self::ditch::SourceMap;
use self::scan::{Token, TokenKind};

static NO_RESOLVER: NoResolver = NoResolver;

/// Parses template sources into [`Template`]s.
///
/// A parser is cheap to create and borrows everything it uses.
#[derive(Clone)]
pub struct Parser<'p> {
    syntax: &'p Syntax,
    resolver: &'p dyn PathResolver,
    cache: Option<&'p TemplateCache>,
    includes: Vec<SourceId>,
}

impl<'p> Parser<'p> {
    /// Creates a parser without a resolver; every include fails.
    pub fn new(syntax: &'p Syntax) -> Self {
        Self {
            syntax,
            resolver: &NO_RESOLVER,
            cache: None,
            includes: Vec::new(),
        }
    }

    /// Resolves includes through `resolver`.
    pub fn with_resolver(mut self, resolver: &'p dyn PathResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Shares included templates through `cache`.
    pub fn with_cache(mut self, cache: &'p TemplateCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Parses a string into an anonymous template.
    pub fn parse_str(&self, source: &str) -> Result<Template> {
        self.parse_as(TemplateId::next_anonymous(), source)
    }

    /// Parses `source` as the content of `id`.
    pub fn parse_source(&self, id: SourceId, source: &str) -> Result<Template> {
        self.parse_as(TemplateId::Source(id), source)
    }

    /// Locates `path` through the resolver and returns its template, from the
    /// cache when possible.
    pub fn load(&self, path: &str) -> Result<Arc<Template>> {
        let id = self
            .resolver
            .locate(path)?
            .ok_or_else(|| ResolveError::NotFound {
                path: path.to_string(),
            })?;
        self.load_id(id)
    }

    fn load_id(&self, id: SourceId) -> Result<Arc<Template>> {
        let parse = || -> Result<Template> {
            let bytes = self.resolver.read(&id)?;
            let source = String::from_utf8(bytes).map_err(|_| ResolveError::InvalidUtf8 {
                origin: id.to_string(),
            })?;
            let mut child = self.clone();
            child.includes.push(id.clone());
            child.parse_source(id.clone(), &source)
        };
        match self.cache {
            Some(cache) => cache.get_or_parse(&id, parse),
            None => parse().map(Arc::new),
        }
    }

    fn parse_as(&self, id: TemplateId, source: &str) -> Result<Template> {
        let origin = id.origin();
        debug!(%origin, len = source.len(), "parsing template");

        let (text, map) = ditch::strip(source, &self.syntax.config().ditch).map_err(|at| {
            let (line, column) = ditch::line_column(source, at);
            ParseError {
                kind: ParseErrorKind::DitchBlockNotTerminated,
                origin: origin.clone(),
                line,
                column,
            }
        })?;

        let tokens = scan::tokenize(&text, self.syntax);
        let unit = Unit {
            origin,
            original: source,
            text: &text,
            map,
        };
        let parts = self.build(&unit, &tokens, 0..text.len())?;
        let template = Template::new(id, parts);
        debug!(
            origin = %unit.origin,
            parts = template.parts().len(),
            names = template.names().len(),
            "parsed template"
        );
        Ok(template)
    }

    /// Builds the parts of one template level from `tokens`, which all lie
    /// inside `range`.
    fn build(&self, unit: &Unit<'_>, tokens: &[Token<'_>], range: Range<usize>) -> Result<Vec<Part>> {
        let mut parts = Vec::new();
        let mut names = NameSet::default();
        let mut cursor = range.start;
        let mut i = 0;

        while i < tokens.len() {
            let token = &tokens[i];
            if token.span.start > cursor {
                parts.push(Part::Text(TextPart::new(&unit.text[cursor..token.span.start])));
            }
            let raw = &unit.text[token.span.clone()];

            match token.kind {
                TokenKind::Variable(body) => {
                    let (escape, name) = match body.split_once(':') {
                        Some((esc, name)) => {
                            let escape = esc.parse::<EscapeType>().map_err(|_| {
                                unit.error(
                                    ParseErrorKind::BadEscapeType {
                                        token: esc.to_string(),
                                    },
                                    token.at,
                                )
                            })?;
                            (escape, name)
                        }
                        None => (EscapeType::Unspecified, body),
                    };
                    if name.is_empty() {
                        return Err(unit.error(ParseErrorKind::EmptyVariableName, token.at));
                    }
                    if !names.add_variable(name) {
                        return Err(unit.duplicate(name, token.at));
                    }
                    parts.push(Part::Variable(VariablePart::new(name, escape, raw)));
                    cursor = token.span.end;
                }
                TokenKind::Begin(name) => {
                    if name.is_empty() {
                        return Err(unit.error(ParseErrorKind::EmptyTemplateName, token.at));
                    }
                    let end = matching_end(&tokens[i + 1..], name)
                        .map(|offset| i + 1 + offset)
                        .ok_or_else(|| {
                            unit.error(
                                ParseErrorKind::TemplateNotTerminated {
                                    name: name.to_string(),
                                },
                                token.at,
                            )
                        })?;
                    if !names.add_nested(name) {
                        return Err(unit.duplicate(name, token.at));
                    }
                    let close = &tokens[end];
                    let body = token.span.end..close.span.start;
                    trace!(name, "inline template");
                    let child = self.build(unit, &tokens[i + 1..end], body)?;
                    let template = Arc::new(Template::new(TemplateId::next_anonymous(), child));
                    parts.push(Part::Nested(NestedTemplatePart::inline(
                        name,
                        template,
                        raw,
                        &unit.text[close.span.clone()],
                    )));
                    cursor = close.span.end;
                    i = end;
                }
                TokenKind::End(name) => {
                    return Err(unit.error(
                        ParseErrorKind::DanglingEndOfTemplate {
                            name: name.to_string(),
                        },
                        token.at,
                    ));
                }
                TokenKind::Include(arg) => {
                    let (name, path) = match arg.split_once(':') {
                        Some((name, path)) => (name, path),
                        None => (base_name(arg), arg),
                    };
                    if path.is_empty() {
                        return Err(unit.error(ParseErrorKind::EmptyIncludePath, token.at));
                    }
                    if name.is_empty() {
                        return Err(unit.error(ParseErrorKind::EmptyTemplateName, token.at));
                    }
                    if !names.add_nested(name) {
                        return Err(unit.duplicate(name, token.at));
                    }
                    let template = self.include(unit, path, token.at)?;
                    parts.push(Part::Nested(NestedTemplatePart::included(
                        name, template, path, raw,
                    )));
                    cursor = token.span.end;
                }
                TokenKind::UnknownTag(keyword) => {
                    return Err(unit.error(
                        ParseErrorKind::UnknownTag {
                            keyword: keyword.to_string(),
                        },
                        token.at,
                    ));
                }
                TokenKind::Stray => {
                    return Err(unit.error(ParseErrorKind::MalformedTag, token.at));
                }
            }
            i += 1;
        }

        if range.end > cursor {
            parts.push(Part::Text(TextPart::new(&unit.text[cursor..range.end])));
        }
        Ok(parts)
    }

    fn include(&self, unit: &Unit<'_>, path: &str, at: usize) -> Result<Arc<Template>> {
        let id = self.resolver.locate(path)?.ok_or_else(|| {
            unit.error(
                ParseErrorKind::InvalidIncludePath {
                    path: path.to_string(),
                },
                at,
            )
        })?;

        if self.includes.contains(&id) {
            let mut chain: Vec<String> = self.includes.iter().map(ToString::to_string).collect();
            chain.push(id.to_string());
            return Err(unit.error(ParseErrorKind::IncludeCycle { chain }, at));
        }

        trace!(path, %id, "including template");
        self.load_id(id)
    }
}

impl std::fmt::Debug for Parser<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser")
            .field("syntax", self.syntax)
            .field("cached", &self.cache.is_some())
            .field("includes", &self.includes)
            .finish()
    }
}

/// Parses `source` with the default syntax and no resolver.
pub fn parse(source: &str) -> Result<Template> {
    let syntax = Syntax::standard();
    Parser::new(&syntax).parse_str(source)
}

/// Index of the nearest `end` token named `name`.
fn matching_end(tokens: &[Token<'_>], name: &str) -> Option<usize> {
    tokens
        .iter()
        .position(|token| token.kind == TokenKind::End(name))
}

/// One source being parsed.
struct Unit<'s> {
    origin: String,
    original: &'s str,
    text: &'s str,
    map: SourceMap,
}

impl Unit<'_> {
    fn error(&self, kind: ParseErrorKind, at: usize) -> Error {
        let (line, column) = ditch::line_column(self.original, self.map.original_offset(at));
        ParseError {
            kind,
            origin: self.origin.clone(),
            line,
            column,
        }
        .into()
    }

    fn duplicate(&self, name: &str, at: usize) -> Error {
        self.error(
            ParseErrorKind::DuplicateName {
                name: name.to_string(),
            },
            at,
        )
    }
}

/// Names seen at one template level.
#[derive(Default)]
struct NameSet {
    variables: HashSet<String>,
    nested: HashSet<String>,
}

impl NameSet {
    /// A variable may repeat but not reuse a nested template's name.
    fn add_variable(&mut self, name: &str) -> bool {
        if self.nested.contains(name) {
            return false;
        }
        self.variables.insert(name.to_string());
        true
    }

    /// A nested template name must be new at this level.
    fn add_nested(&mut self, name: &str) -> bool {
        !self.variables.contains(name) && self.nested.insert(name.to_string())
    }
}
