//! Common imports.
//!
//! ```rust
//! use quill::prelude::*;
//! ```

pub use crate::{
    parse, Engine, EscapeType, PathResolver, RenderSession, SourceRegistry, Template,
};
pub use quill_access::{Accessible, Accessor, FieldAccessor, JsonAccessor, Value};
