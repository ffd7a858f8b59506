//! Quill Access - the value accessor capability for the quill template engine.
//!
//! The engine fills templates from arbitrary caller data without knowing its
//! shape. Everything it needs is one capability:
//!
//! ```text
//! access(source, name) -> value | absent
//! ```
//!
//! This crate defines that capability as the [`Accessor`] trait together with
//! the [`Value`] it returns, plus ready-made accessors for plain functions,
//! [`Accessible`] types and JSON trees.
//!
//! # Quick Start
//!
//! ```rust
//! use quill_access::{Accessor, Number, Value};
//!
//! struct Product {
//!     name: String,
//!     price: u32,
//! }
//!
//! fn accessor<'a>(p: &'a Product, name: &str) -> Value<'a, Product> {
//!     match name {
//!         "name" => Value::text(&p.name),
//!         "price" => Value::Number(Number::U64(p.price as u64)),
//!         _ => Value::None,
//!     }
//! }
//!
//! let product = Product { name: "Lamp".into(), price: 30 };
//! assert_eq!(accessor.access(&product, "name").unwrap(), Value::text("Lamp"));
//! assert!(accessor.access(&product, "colour").unwrap().is_none());
//! ```
//!
//! # Value Shapes
//!
//! | Value | Fills a variable with | Fills a nested template with |
//! |-------|-----------------------|------------------------------|
//! | `Text`, `Number` | its text | - (shape error) |
//! | `Fragments` | the fragments, concatenated | - (shape error) |
//! | `Bool` | `true` / `false` | one repetition over the parent item, or none |
//! | `Items` | - (shape error) | one repetition per item |
//! | `Null` | the empty string | no repetitions |
//! | `None` | nothing, the name stays unresolved | nothing |

mod error;
mod json;
mod traits;
mod value;

pub use error::{AccessError, Result};
pub use json::JsonAccessor;
pub use traits::{Accessible, Accessor, FieldAccessor};
pub use value::{Number, Value};
