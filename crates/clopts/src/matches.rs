use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::value::{FromValue, Value};

/// Key under which the trailing (non-option) arguments are stored.
pub const TRAILING_KEY: &str = "@";

/// Parsed option values and trailing arguments.
///
/// Every matched or defaulted option is stored under each of its names, so
/// `get("verbose")` and `get("v")` see the same value. The trailing arguments
/// are always present under [`TRAILING_KEY`], even for an empty argv.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Matches {
    values: IndexMap<String, Value>,
}

impl Matches {
    pub(crate) fn new(values: IndexMap<String, Value>) -> Self {
        Self { values }
    }

    /// Get the value stored under `name` as a `T`.
    pub fn get<T: FromValue>(&self, name: &str) -> Result<T> {
        self.get_optional(name)?
            .ok_or_else(|| Error::NoSuchKey(name.to_string()))
    }

    /// Like [`get`](Self::get), but a missing key is `Ok(None)`.
    ///
    /// A present value of the wrong type is still an error.
    pub fn get_optional<T: FromValue>(&self, name: &str) -> Result<Option<T>> {
        let Some(value) = self.values.get(name) else {
            return Ok(None);
        };
        T::from_value(value)
            .map(Some)
            .ok_or_else(|| Error::TypeMismatch {
                key: name.to_string(),
                expected: T::TYPE_NAME,
                found: value.type_name(),
            })
    }

    /// The arguments left after option scanning stopped.
    pub fn trailing(&self) -> Vec<&str> {
        match self.values.get(TRAILING_KEY) {
            Some(Value::List(items)) => items
                .iter()
                .filter_map(|item| match item {
                    Value::Str(s) => Some(s.as_str()),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// The raw value under `name`.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// All keys and values in insertion order, `@` first.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}
