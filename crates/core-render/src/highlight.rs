//! Highlight group registry for components with a custom `color`.
//!
//! Append-only mapping from color spec to the group identifier the host
//! allocated for it. Lookups are idempotent: the same spec always yields the
//! same group, and the host is asked to register it only once.

use crate::environment::Environment;
use core_config::{ConfigError, Slot};
use std::collections::HashMap;
use toml::Value;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColorSpec {
    /// Reuse an existing host highlight group by name.
    Group(String),
    Style {
        fg: Option<String>,
        bg: Option<String>,
        gui: Option<String>,
    },
}

impl ColorSpec {
    pub fn parse(field: &str, value: &Value) -> Result<Self, ConfigError> {
        match value {
            Value::String(name) => Ok(Self::Group(name.clone())),
            Value::Table(t) => {
                let attr = |key: &str| -> Result<Option<String>, ConfigError> {
                    match t.get(key) {
                        None => Ok(None),
                        Some(Value::String(s)) => Ok(Some(s.clone())),
                        Some(other) => Err(ConfigError::invalid_type(
                            format!("{field}.{key}"),
                            "string",
                            other,
                        )),
                    }
                };
                Ok(Self::Style {
                    fg: attr("fg")?,
                    bg: attr("bg")?,
                    gui: attr("gui")?,
                })
            }
            other => Err(ConfigError::invalid_type(field, "group name or color table", other)),
        }
    }
}

/// Who is asking for a group; hosts typically derive the group name from it.
#[derive(Debug, Clone, Copy)]
pub struct HighlightContext<'a> {
    pub component_name: &'a str,
    pub slot: Slot,
}

#[derive(Debug, Default)]
pub struct HighlightRegistry {
    groups: HashMap<ColorSpec, String>,
}

impl HighlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group for `color`, registering it with the host on first request.
    pub fn group_for(
        &mut self,
        color: &ColorSpec,
        context: &HighlightContext<'_>,
        env: &dyn Environment,
    ) -> String {
        if let Some(group) = self.groups.get(color) {
            return group.clone();
        }
        let group = env.register_highlight_group(color, context);
        tracing::debug!(
            target: "render.highlight",
            component = context.component_name,
            slot = %context.slot,
            group = group.as_str(),
            "highlight_group_registered"
        );
        self.groups.insert(color.clone(), group.clone());
        group
    }

    pub fn get(&self, color: &ColorSpec) -> Option<&str> {
        self.groups.get(color).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
