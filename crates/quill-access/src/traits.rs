//! The accessor capability and its typed helpers.
//!
//! An [`Accessor`] maps `(source item, name)` to a [`Value`]. The engine never
//! inspects caller data itself; it only asks an accessor. Three ways to get
//! one:
//!
//! - any `fn(&S, &str) -> Value<S>` function is an accessor,
//! - types implementing [`Accessible`] work with [`FieldAccessor`],
//! - JSON data works with [`JsonAccessor`](crate::JsonAccessor).

use crate::error::Result;
use crate::value::Value;

/// Maps a name to a value of a source item.
///
/// Implementations return [`Value::None`] for names the item does not carry.
/// Errors are reserved for real failures (a broken lookup, a value that
/// cannot be converted) and are propagated to the caller unchanged.
pub trait Accessor<S: ?Sized> {
    /// Returns the value of `name` in `source`.
    fn access<'a>(&self, source: &'a S, name: &str) -> Result<Value<'a, S>>;
}

impl<S: ?Sized, F> Accessor<S> for F
where
    F: for<'a> Fn(&'a S, &str) -> Value<'a, S>,
{
    fn access<'a>(&self, source: &'a S, name: &str) -> Result<Value<'a, S>> {
        Ok(self(source, name))
    }
}

/// Trait for types that expose their fields by name.
///
/// # Manual Implementation
///
/// ```
/// use quill_access::{Accessible, Value};
///
/// struct Link {
///     href: String,
///     title: String,
/// }
///
/// impl Accessible for Link {
///     fn field(&self, name: &str) -> Value<'_, Self> {
///         match name {
///             "href" => Value::text(&self.href),
///             "title" => Value::text(&self.title),
///             _ => Value::None,
///         }
///     }
/// }
/// ```
///
/// Nested templates repeat over items of the same type, so a tree of
/// different record types is usually modelled as one enum.
pub trait Accessible {
    /// Returns the value of a field, or [`Value::None`] if there is none.
    fn field(&self, name: &str) -> Value<'_, Self>;

    /// Returns a static accessor function for this type.
    fn accessor<'a>(item: &'a Self, name: &str) -> Value<'a, Self>
    where
        Self: Sized,
    {
        item.field(name)
    }
}

/// Accessor for any [`Accessible`] type.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldAccessor;

impl<S: Accessible + ?Sized> Accessor<S> for FieldAccessor {
    fn access<'a>(&self, source: &'a S, name: &str) -> Result<Value<'a, S>> {
        Ok(source.field(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Number;

    struct Item {
        name: String,
        count: i32,
        children: Vec<Item>,
    }

    impl Accessible for Item {
        fn field(&self, name: &str) -> Value<'_, Self> {
            match name {
                "name" => Value::text(&self.name),
                "count" => Value::Number(Number::from(self.count)),
                "children" => Value::Items(self.children.iter().collect()),
                _ => Value::None,
            }
        }
    }

    fn leaf(name: &str) -> Item {
        Item {
            name: name.to_string(),
            count: 0,
            children: Vec::new(),
        }
    }

    #[test]
    fn field_accessor_reads_fields() {
        let item = Item {
            name: "root".into(),
            count: 2,
            children: vec![leaf("a"), leaf("b")],
        };

        assert_eq!(FieldAccessor.access(&item, "name").unwrap(), Value::text("root"));
        assert_eq!(
            FieldAccessor.access(&item, "count").unwrap(),
            Value::Number(Number::I64(2))
        );
        let children = FieldAccessor.access(&item, "children").unwrap();
        assert_eq!(children.as_items().map(|c| c.len()), Some(2));
        assert!(FieldAccessor.access(&item, "missing").unwrap().is_none());
    }

    #[test]
    fn functions_are_accessors() {
        fn upper<'a>(s: &'a String, name: &str) -> Value<'a, String> {
            match name {
                "value" => Value::owned(s.to_uppercase()),
                _ => Value::None,
            }
        }

        let source = "hi".to_string();
        assert_eq!(upper.access(&source, "value").unwrap(), Value::text("HI"));
        assert!(upper.access(&source, "other").unwrap().is_none());
    }

    #[test]
    fn static_accessor_matches_field() {
        let item = leaf("x");
        assert_eq!(Item::accessor(&item, "name"), Value::text("x"));
    }
}
