//! Error types for parsing, resolving and rendering templates.
//!
//! [`Error`] is the crate-level error returned by the engine facade. It wraps
//! the narrower error types produced by each stage, so callers can either
//! match on the stage or just propagate with `?`.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use quill_access::AccessError;

use crate::part::EscapeType;

/// What went wrong while parsing a template source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// An odd number of ditch tokens: the last block never closes.
    #[error("ditch block is not terminated")]
    DitchBlockNotTerminated,

    /// A `begin` tag without a matching `end` tag of the same name.
    #[error("template '{name}' is not terminated")]
    TemplateNotTerminated { name: String },

    /// An `end` tag without an open `begin` tag of the same name.
    #[error("end of template '{name}' has no matching begin")]
    DanglingEndOfTemplate { name: String },

    /// The path resolver does not know the included path.
    #[error("include path '{path}' cannot be resolved")]
    InvalidIncludePath { path: String },

    /// An `include` tag without a path.
    #[error("include path is empty")]
    EmptyIncludePath,

    /// A template includes itself, directly or through other includes.
    #[error("include cycle: {}", chain.join(" -> "))]
    IncludeCycle { chain: Vec<String> },

    /// A variable names an escape type that does not exist.
    #[error("unknown escape type '{token}'")]
    BadEscapeType { token: String },

    /// A variable tag without a name.
    #[error("variable name is empty")]
    EmptyVariableName,

    /// A `begin`, `end` or `include` tag without a name.
    #[error("template name is empty")]
    EmptyTemplateName,

    /// The name is already taken by another variable or template at the same level.
    #[error("name '{name}' is already used at this level")]
    DuplicateName { name: String },

    /// A tag with a keyword other than `begin`, `end` or `include`.
    #[error("unknown tag keyword '{keyword}'")]
    UnknownTag { keyword: String },

    /// A tag opener that does not start a well-formed tag.
    #[error("malformed tag")]
    MalformedTag,
}

/// A parse failure with its position in the original source.
///
/// Line and column are 1-based and count characters, not bytes. They refer to
/// the source as written, before ditch blocks were removed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at {origin}:{line}:{column}")]
pub struct ParseError {
    /// What went wrong.
    pub kind: ParseErrorKind,
    /// Where the source came from (`<string>` for anonymous sources).
    pub origin: String,
    /// 1-based line.
    pub line: usize,
    /// 1-based column.
    pub column: usize,
}

/// Contract violations while filling or rendering a session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The template has no variable of that name.
    #[error("unknown variable '{name}'")]
    UnknownVariable { name: String },

    /// The variable was already given a value.
    #[error("variable '{name}' is already set")]
    AlreadySet { name: String },

    /// Neither the template nor the caller chose an escape type.
    #[error("variable '{name}' needs an escape type")]
    EscapeTypeRequired { name: String },

    /// The template has no nested template of that name.
    #[error("unknown nested template '{name}'")]
    UnknownTemplate { name: String },

    /// The nested template was already populated.
    #[error("nested template '{name}' is already populated")]
    AlreadyPopulated { name: String },

    /// The same template is bound twice at one level with different counts.
    #[error("nested template '{name}' shares its template with a binding of {expected} repetitions, got {actual}")]
    RepetitionMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// A scoped populate named something the nested template does not have.
    #[error("unknown name '{name}'")]
    UnknownName { name: String },

    /// Render was called before every name was resolved.
    #[error("session is incomplete: '{path}' is not resolved")]
    IncompleteSession { path: String },
}

/// Failures of a path resolver.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Reading the source failed.
    #[error("failed to read template '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// No source exists for the path.
    #[error("template '{path}' not found")]
    NotFound { path: String },

    /// The source is not valid UTF-8.
    #[error("template '{origin}' is not valid UTF-8")]
    InvalidUtf8 { origin: String },

    /// The identifier was not produced by this resolver or went away.
    #[error("template '{origin}' is not available")]
    NotAvailable { origin: String },
}

/// Failure of an escaper.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot escape for {kind}: {message}")]
pub struct EscapeError {
    /// Escape type that was requested.
    pub kind: EscapeType,
    /// What went wrong.
    pub message: String,
}

/// Invalid engine or syntax configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A token is empty or contains a line break.
    #[error("token '{name}' is invalid: {reason}")]
    InvalidToken { name: &'static str, reason: String },

    /// Two tokens that must differ are equal or would shadow each other.
    #[error("tokens '{first}' and '{second}' clash")]
    TokenClash {
        first: &'static str,
        second: &'static str,
    },

    /// The configuration file could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The configuration file could not be read.
    #[error("failed to read configuration '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The scanner pattern built from the tokens did not compile.
    #[error("invalid token pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Crate-level error.
#[derive(Debug, Error)]
pub enum Error {
    /// Template source is malformed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Session contract violation.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Path resolver failure.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Escaper failure.
    #[error(transparent)]
    Escape(#[from] EscapeError),

    /// Accessor failure.
    #[error(transparent)]
    Access(#[from] AccessError),

    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    /// Returns the parse error kind, if this is a parse error.
    pub fn parse_kind(&self) -> Option<&ParseErrorKind> {
        match self {
            Error::Parse(err) => Some(&err.kind),
            _ => None,
        }
    }

    /// Returns the session error, if this is one.
    pub fn session(&self) -> Option<&SessionError> {
        match self {
            Error::Session(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_display_has_position() {
        let err = ParseError {
            kind: ParseErrorKind::TemplateNotTerminated { name: "rows".into() },
            origin: "<string>".into(),
            line: 3,
            column: 7,
        };
        assert_eq!(
            err.to_string(),
            "template 'rows' is not terminated at <string>:3:7"
        );
    }

    #[test]
    fn include_cycle_display() {
        let kind = ParseErrorKind::IncludeCycle {
            chain: vec!["a.html".into(), "b.html".into(), "a.html".into()],
        };
        assert_eq!(kind.to_string(), "include cycle: a.html -> b.html -> a.html");
    }

    #[test]
    fn error_accessors() {
        let err: Error = SessionError::AlreadySet { name: "x".into() }.into();
        assert!(err.parse_kind().is_none());
        assert!(matches!(err.session(), Some(SessionError::AlreadySet { .. })));
        assert_eq!(err.to_string(), "variable 'x' is already set");
    }

    #[test]
    fn from_io_error_keeps_source() {
        let err = ResolveError::Io {
            path: PathBuf::from("missing.html"),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("missing.html"));
    }
}
