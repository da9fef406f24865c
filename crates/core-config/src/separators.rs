//! Separator pair coercion.
//!
//! Accepted shapes for `component_separators` / `section_separators` and for
//! the pair form of a component's own `separator` option:
//! * `"s"`            -> `("s", "s")`
//! * `["s"]`          -> `("s", "s")`
//! * `["s", "t"]`     -> `("s", "t")`
//! * `[]`             -> `("", "")` (no separators)
//! * `{ left, right }` -> as given, a missing side is empty
//!
//! Everything else is a `ConfigError`.

use crate::error::ConfigError;
use serde::{Serialize, Serializer};
use toml::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SeparatorPair {
    pub left: String,
    pub right: String,
}

impl SeparatorPair {
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }

    pub fn symmetric(s: impl Into<String>) -> Self {
        let s = s.into();
        Self {
            left: s.clone(),
            right: s,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty() && self.right.is_empty()
    }

    /// Coerce a user value into a pair. `field` is only used for error text.
    pub fn coerce(field: &str, value: &Value) -> Result<Self, ConfigError> {
        match value {
            Value::String(s) => Ok(Self::symmetric(s.as_str())),
            Value::Array(items) => {
                let mut sides = Vec::with_capacity(2);
                for item in items {
                    match item {
                        Value::String(s) => sides.push(s.as_str()),
                        other => return Err(ConfigError::invalid_type(field, "string", other)),
                    }
                }
                match sides.as_slice() {
                    [] => Ok(Self::default()),
                    [s] => Ok(Self::symmetric(*s)),
                    [l, r] => Ok(Self::new(*l, *r)),
                    _ => Err(ConfigError::invalid_value(
                        field,
                        format!("expected at most two separators, found {}", sides.len()),
                    )),
                }
            }
            Value::Table(t) => {
                let side = |key: &str| -> Result<String, ConfigError> {
                    match t.get(key) {
                        None => Ok(String::new()),
                        Some(Value::String(s)) => Ok(s.clone()),
                        Some(other) => Err(ConfigError::invalid_type(
                            format!("{field}.{key}"),
                            "string",
                            other,
                        )),
                    }
                };
                Ok(Self::new(side("left")?, side("right")?))
            }
            other => Err(ConfigError::invalid_type(
                field,
                "string or list of strings",
                other,
            )),
        }
    }

    pub fn to_value(&self) -> Value {
        Value::Array(vec![
            Value::String(self.left.clone()),
            Value::String(self.right.clone()),
        ])
    }
}

impl Serialize for SeparatorPair {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.left.as_str(), self.right.as_str()].serialize(serializer)
    }
}
