//! Accessor over `serde_json::Value` trees.

use serde_json::Value as Json;

use crate::error::Result;
use crate::traits::Accessor;
use crate::value::{Number, Value};

/// Accessor for JSON data.
///
/// Names are looked up in objects; dotted names walk into nested objects and
/// array indices (`user.name`, `items.0.title`). Arrays become item lists,
/// a single object becomes a one-item list.
///
/// # Example
///
/// ```
/// use quill_access::{Accessor, JsonAccessor, Value};
/// use serde_json::json;
///
/// let data = json!({"user": {"name": "Ada"}, "tags": ["a", "b"]});
///
/// assert_eq!(JsonAccessor.access(&data, "user.name").unwrap(), Value::text("Ada"));
/// assert_eq!(JsonAccessor.access(&data, "tags").unwrap().as_items().unwrap().len(), 2);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonAccessor;

impl JsonAccessor {
    fn resolve_path<'a>(value: &'a Json, path: &str) -> Option<&'a Json> {
        let mut current = value;

        for part in path.split('.') {
            current = match current {
                Json::Object(map) => map.get(part)?,
                Json::Array(arr) => {
                    let index: usize = part.parse().ok()?;
                    arr.get(index)?
                }
                _ => return None,
            };
        }

        Some(current)
    }

    fn convert(value: &Json) -> Value<'_, Json> {
        match value {
            Json::String(s) => Value::text(s),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Number(Number::I64(i))
                } else if let Some(u) = n.as_u64() {
                    Value::Number(Number::U64(u))
                } else {
                    Value::Number(Number::F64(n.as_f64().unwrap_or(f64::NAN)))
                }
            }
            Json::Bool(b) => Value::Bool(*b),
            Json::Null => Value::Null,
            Json::Array(items) => Value::Items(items.iter().collect()),
            Json::Object(_) => Value::Items(vec![value]),
        }
    }
}

impl Accessor<Json> for JsonAccessor {
    fn access<'a>(&self, source: &'a Json, name: &str) -> Result<Value<'a, Json>> {
        Ok(match Self::resolve_path(source, name) {
            Some(value) => Self::convert(value),
            None => Value::None,
        })
    }
}
