//! Runtime values produced by accessors.
//!
//! The [`Value`] enum is what an accessor hands back for a single name. It is
//! borrowed from the source item wherever possible, so seeding a render
//! session from caller data does not copy strings until they are escaped.

use std::borrow::Cow;
use std::fmt;

/// Value of one name, borrowed from a source item of type `S`.
///
/// Scalars fill variables; [`Value::Items`] fills nested templates with one
/// repetition per item. [`Value::None`] means the name is absent from the
/// source, which leaves it unresolved, while [`Value::Null`] is present but
/// empty.
///
/// # Example
///
/// ```
/// use quill_access::{Number, Value};
///
/// struct Row {
///     label: String,
///     count: u32,
/// }
///
/// fn accessor<'a>(row: &'a Row, name: &str) -> Value<'a, Row> {
///     match name {
///         "label" => Value::text(&row.label),
///         "count" => Value::Number(Number::U64(row.count as u64)),
///         _ => Value::None,
///     }
/// }
/// ```
pub enum Value<'a, S: ?Sized> {
    /// Single text value.
    Text(Cow<'a, str>),
    /// Several text fragments, escaped one by one and then concatenated.
    Fragments(Vec<Cow<'a, str>>),
    /// Numeric value.
    Number(Number),
    /// Boolean value. Fills a nested template zero or one times.
    Bool(bool),
    /// Items to repeat a nested template over.
    Items(Vec<&'a S>),
    /// Present but empty.
    Null,
    /// Name not present in the source.
    None,
}

impl<'a, S: ?Sized> Value<'a, S> {
    /// Creates a borrowed text value.
    pub fn text(s: &'a str) -> Self {
        Value::Text(Cow::Borrowed(s))
    }

    /// Creates an owned text value.
    pub fn owned(s: impl Into<String>) -> Self {
        Value::Text(Cow::Owned(s.into()))
    }

    /// Returns `true` if the name was absent.
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Returns `true` if the value is present but null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns `true` for values that can fill a variable.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Value::Text(_) | Value::Fragments(_) | Value::Number(_) | Value::Bool(_) | Value::Null
        )
    }

    /// Extracts the text, if this is a single text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Extracts the items, if this is an item list.
    pub fn as_items(&self) -> Option<&[&'a S]> {
        match self {
            Value::Items(items) => Some(items),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Text(_) => "text",
            Value::Fragments(_) => "fragments",
            Value::Number(_) => "number",
            Value::Bool(_) => "bool",
            Value::Items(_) => "items",
            Value::Null => "null",
            Value::None => "absent",
        }
    }

    /// Converts a scalar into the text fragments that fill a variable.
    ///
    /// Null yields no fragments. Returns `None` for item lists and absent
    /// values.
    pub fn into_fragments(self) -> Option<Vec<Cow<'a, str>>> {
        match self {
            Value::Text(s) => Some(vec![s]),
            Value::Fragments(parts) => Some(parts),
            Value::Number(n) => Some(vec![Cow::Owned(n.to_string())]),
            Value::Bool(b) => Some(vec![Cow::Borrowed(if b { "true" } else { "false" })]),
            Value::Null => Some(Vec::new()),
            Value::Items(_) | Value::None => None,
        }
    }
}

// Items compare by identity and print as a count, so neither impl needs
// bounds on the source type.
impl<S: ?Sized> PartialEq for Value<'_, S> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Fragments(a), Value::Fragments(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Items(a), Value::Items(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| std::ptr::eq(*x, *y))
            }
            (Value::Null, Value::Null) | (Value::None, Value::None) => true,
            _ => false,
        }
    }
}

impl<S: ?Sized> fmt::Debug for Value<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.debug_tuple("Text").field(s).finish(),
            Value::Fragments(parts) => f.debug_tuple("Fragments").field(parts).finish(),
            Value::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Items(items) => write!(f, "Items({} items)", items.len()),
            Value::Null => f.write_str("Null"),
            Value::None => f.write_str("None"),
        }
    }
}

impl<'a, S: ?Sized> From<&'a str> for Value<'a, S> {
    fn from(s: &'a str) -> Self {
        Value::text(s)
    }
}

impl<S: ?Sized> From<String> for Value<'_, S> {
    fn from(s: String) -> Self {
        Value::Text(Cow::Owned(s))
    }
}

impl<S: ?Sized> From<bool> for Value<'_, S> {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<S: ?Sized, T: Into<Number>> From<Option<T>> for Value<'_, S> {
    fn from(n: Option<T>) -> Self {
        match n {
            Some(n) => Value::Number(n.into()),
            None => Value::Null,
        }
    }
}

/// Numeric value supporting the common numeric types.
///
/// Numbers render through their `Display` form: integers without a
/// fractional part, floats the way `f64` prints them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Signed 64-bit integer.
    I64(i64),
    /// Unsigned 64-bit integer.
    U64(u64),
    /// 64-bit floating point.
    F64(f64),
}

impl Number {
    /// Converts the number to f64.
    pub fn to_f64(self) -> f64 {
        match self {
            Number::I64(n) => n as f64,
            Number::U64(n) => n as f64,
            Number::F64(n) => n,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::I64(n) => write!(f, "{}", n),
            Number::U64(n) => write!(f, "{}", n),
            Number::F64(n) => write!(f, "{}", n),
        }
    }
}

macro_rules! number_from {
    ($variant:ident: $($t:ty),*) => {
        $(
            impl From<$t> for Number {
                fn from(n: $t) -> Self {
                    Number::$variant(n as _)
                }
            }
        )*
    };
}

number_from!(I64: i8, i16, i32, i64, isize);
number_from!(U64: u8, u16, u32, u64, usize);
number_from!(F64: f32, f64);

#[cfg(test)]
mod tests {
    use super::*;

    type V<'a> = Value<'a, ()>;

    fn fragments(value: V<'_>) -> Option<Vec<String>> {
        value
            .into_fragments()
            .map(|parts| parts.into_iter().map(Cow::into_owned).collect())
    }

    #[test]
    fn scalars_become_single_fragments() {
        assert_eq!(fragments(V::text("a")), Some(vec!["a".to_string()]));
        assert_eq!(
            fragments(V::Number(Number::I64(-3))),
            Some(vec!["-3".to_string()])
        );
        assert_eq!(fragments(V::Bool(true)), Some(vec!["true".to_string()]));
    }

    #[test]
    fn null_is_empty_and_absent_is_nothing() {
        assert_eq!(fragments(V::Null), Some(Vec::new()));
        assert_eq!(fragments(V::None), None);
        assert_eq!(fragments(V::Items(vec![&()])), None);
    }

    #[test]
    fn kind_names() {
        assert_eq!(V::Null.kind(), "null");
        assert_eq!(V::None.kind(), "absent");
        assert_eq!(V::Items(Vec::new()).kind(), "items");
        assert!(V::Null.is_scalar());
        assert!(!V::Items(Vec::new()).is_scalar());
    }

    #[test]
    fn number_display() {
        assert_eq!(Number::from(42u8).to_string(), "42");
        assert_eq!(Number::from(-7i32).to_string(), "-7");
        assert_eq!(Number::from(2.5f64).to_string(), "2.5");
        assert_eq!(Number::from(3usize).to_f64(), 3.0);
    }

    #[test]
    fn optional_numbers() {
        assert_eq!(V::from(Some(5u32)), V::Number(Number::U64(5)));
        assert_eq!(V::from(None::<u32>), V::Null);
    }
}
