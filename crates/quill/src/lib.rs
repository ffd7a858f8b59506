//! # Quill - line-oriented text templating
//!
//! Quill parses templates made of literal text, named variables and nested
//! sub-templates into an immutable tree, lets the caller fill that tree in
//! one or more passes, and renders it with per-variable escaping.
//!
//! ## Template Syntax
//!
//! | Construct | Syntax |
//! |-----------|--------|
//! | Variable | `~%name%`, `~%html:name%`, `~%js:name%`, `~%text:name%` |
//! | Inline template | `~%%begin:rows% ... ~%%end:rows%` |
//! | Included template | `~%%include:partials/row.html%`, `~%%include:name:path%` |
//! | Hidden forms | `<!-- ~%name% -->`, `<!-- ~%%begin:rows% -->`, ... |
//! | Ditch block | `<!--%%--> removed before parsing <!--%%-->` |
//!
//! Hidden forms keep templates valid HTML while editing: the comment wrapper
//! belongs to the construct and never reaches the output. Ditch blocks hold
//! preview content that is dropped entirely.
//!
//! ## Core Concepts
//!
//! - [`Parser`] / [`parse`]: source text to [`Template`]
//! - [`Template`]: immutable part tree with name indices, shared via `Arc`
//! - [`TemplateCache`]: LRU of parsed templates keyed by [`SourceId`]
//! - [`RenderSession`]: binds values to one template and renders it once
//! - [`Engine`]: ties syntax, [`PathResolver`], [`Escaper`] and cache together
//!
//! ## Quick Start
//!
//! ```rust
//! use quill::{Engine, EscapeType};
//!
//! let engine = Engine::builder().build().unwrap();
//! let template = engine
//!     .parse_str("Hello ~%name%!~%%begin:items% [~%js:item%]~%%end:items%")
//!     .unwrap();
//!
//! let mut session = engine.session(&template);
//! session.set("name", "<world>").unwrap();
//! session.populate_serialized("items", &[
//!     serde_json::json!({"item": "it's"}),
//! ]).unwrap();
//!
//! assert!(session.is_complete());
//! assert_eq!(session.render().unwrap(), "Hello &lt;world&gt;! [it\\'s]");
//! ```
//!
//! Values are pulled from caller data through the accessor capability in
//! [`quill_access`], re-exported here as [`access`].

pub mod cache;
pub mod config;
pub mod engine;
mod error;
pub mod escape;
pub mod parser;
pub mod part;
pub mod prelude;
pub mod renderer;
pub mod resolver;
pub mod session;
pub mod syntax;
pub mod template;

pub use quill_access as access;

pub use cache::{CacheStats, TemplateCache};
pub use config::EngineConfig;
pub use engine::{Engine, EngineBuilder};
pub use error::{
    ConfigError, Error, EscapeError, ParseError, ParseErrorKind, ResolveError, Result,
    SessionError,
};
pub use escape::{Escaper, StandardEscaper};
pub use parser::{parse, Parser};
pub use part::{EscapeType, NestedKind, NestedTemplatePart, Part, TextPart, VariablePart};
pub use resolver::{NoResolver, PathResolver, SourceId, SourceRegistry};
pub use session::{RenderSession, RenderState, Scope};
pub use syntax::{Syntax, SyntaxConfig};
pub use template::{Template, TemplateId, TemplateRef};
