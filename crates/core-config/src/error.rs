//! Error and advisory types produced while normalizing configuration.
//!
//! `ConfigError` is local to one field: the normalizer records it, keeps the
//! schema default for that field and carries on. `DeprecatedOptionNotice` is
//! never an error; the old key has already been migrated when it is emitted.

use std::fmt;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("`{field}`: expected {expected}, found {found}")]
    InvalidType {
        field: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("`{field}`: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("unknown section group `{key}` in `{group}`")]
    UnknownSlot { group: String, key: String },
    #[error("unknown component `{name}`")]
    UnknownComponent { name: String },
    #[error("unknown {kind} callback `{name}` on component `{component}`")]
    UnknownCallback {
        kind: &'static str,
        name: String,
        component: String,
    },
    #[error("unknown extension `{name}`")]
    UnknownExtension { name: String },
    #[error("component `{name}` failed to initialize: {reason}")]
    Build { name: String, reason: String },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

impl ConfigError {
    pub fn invalid_type(field: impl Into<String>, expected: &'static str, found: &toml::Value) -> Self {
        Self::InvalidType {
            field: field.into(),
            expected,
            found: found.type_str(),
        }
    }

    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Advisory emitted when a renamed component option is found. The value has
/// been moved to `new_key` by the time the notice exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeprecatedOptionNotice {
    pub component: String,
    pub old_key: String,
    pub new_key: String,
}

impl fmt::Display for DeprecatedOptionNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "component `{}`: option `{}` is deprecated, use `{}`",
            self.component, self.old_key, self.new_key
        )
    }
}
