//! Component spec parsing and deprecated option migration.
//!
//! Accepted forms inside a section group:
//! * `"branch"`                                  bare identifier
//! * `["branch", { icon = "b" }, { upper = true }]` identifier + option tables
//! * `{ name = "branch", icon = "b" }`            table form (`"1"` also names it)
//!
//! Option values stay as raw TOML here; typed interpretation belongs to the
//! renderer, which knows the per-segment defaults. A nested `child` option is
//! parsed recursively into its own spec.

use crate::error::{ConfigError, DeprecatedOptionNotice};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use toml::Value;

const NAME_KEYS: [&str; 2] = ["name", "1"];
pub const CHILD_KEY: &str = "child";

/// Renamed option keys: (old, new).
const RENAMED_OPTIONS: &[(&str, &str)] = &[("condition", "cond"), ("format", "fmt")];
/// Old per-side padding keys folded into the `padding` table.
const RENAMED_PADDING: &[(&str, &str)] = &[("left_padding", "left"), ("right_padding", "right")];

#[derive(Debug, Clone, PartialEq)]
pub struct ComponentSpec {
    pub name: String,
    pub options: toml::Table,
    pub child: Option<Box<ComponentSpec>>,
}

impl ComponentSpec {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: toml::Table::new(),
            child: None,
        }
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: ComponentSpec) -> Self {
        self.child = Some(Box::new(child));
        self
    }

    /// Parse one entry of a section group. Migrated deprecated keys are
    /// appended to `notices`.
    pub fn parse(
        field: &str,
        value: &Value,
        notices: &mut Vec<DeprecatedOptionNotice>,
    ) -> Result<Self, ConfigError> {
        let (name, mut options) = match value {
            Value::String(s) => (s.clone(), toml::Table::new()),
            Value::Array(items) => {
                let Some((head, rest)) = items.split_first() else {
                    return Err(ConfigError::invalid_value(field, "component list is empty"));
                };
                let Value::String(name) = head else {
                    return Err(ConfigError::invalid_type(
                        format!("{field}[1]"),
                        "component identifier",
                        head,
                    ));
                };
                let mut options = toml::Table::new();
                for (i, item) in rest.iter().enumerate() {
                    match item {
                        Value::Table(t) => {
                            options.extend(t.iter().map(|(k, v)| (k.clone(), v.clone())))
                        }
                        other => {
                            return Err(ConfigError::invalid_type(
                                format!("{field}[{}]", i + 2),
                                "option table",
                                other,
                            ));
                        }
                    }
                }
                (name.clone(), options)
            }
            Value::Table(t) => {
                let mut options = t.clone();
                let mut name = None;
                for key in NAME_KEYS {
                    match options.remove(key) {
                        Some(Value::String(s)) if name.is_none() => name = Some(s),
                        Some(Value::String(_)) | None => {}
                        Some(other) => {
                            return Err(ConfigError::invalid_type(
                                format!("{field}.{key}"),
                                "component identifier",
                                &other,
                            ));
                        }
                    }
                }
                let Some(name) = name else {
                    return Err(ConfigError::invalid_value(field, "component table has no `name`"));
                };
                (name, options)
            }
            other => {
                return Err(ConfigError::invalid_type(
                    field,
                    "component identifier, list or table",
                    other,
                ));
            }
        };
        if name.is_empty() {
            return Err(ConfigError::invalid_value(field, "component identifier is empty"));
        }

        migrate_deprecated(&name, &mut options, notices);

        let child = match options.remove(CHILD_KEY) {
            Some(v) => Some(Box::new(Self::parse(
                &format!("{field}.{CHILD_KEY}"),
                &v,
                notices,
            )?)),
            None => None,
        };

        Ok(Self {
            name,
            options,
            child,
        })
    }
}

fn migrate_deprecated(
    component: &str,
    options: &mut toml::Table,
    notices: &mut Vec<DeprecatedOptionNotice>,
) {
    for (old, new) in RENAMED_OPTIONS {
        if let Some(v) = options.remove(*old) {
            // An explicit new key wins over the migrated value.
            options.entry(new.to_string()).or_insert(v);
            record(component, old, new, notices);
        }
    }
    for (old, side) in RENAMED_PADDING {
        let Some(v) = options.remove(*old) else {
            continue;
        };
        let padding = options
            .entry("padding")
            .or_insert_with(|| Value::Table(toml::Table::new()));
        if let Value::Integer(n) = padding {
            // Symmetric padding becomes explicit sides before merging.
            let n = *n;
            let mut sides = toml::Table::new();
            sides.insert("left".into(), n.into());
            sides.insert("right".into(), n.into());
            *padding = Value::Table(sides);
        }
        if let Value::Table(sides) = padding {
            sides.entry(side.to_string()).or_insert(v);
        }
        record(component, old, &format!("padding.{side}"), notices);
    }
}

fn record(component: &str, old: &str, new: &str, notices: &mut Vec<DeprecatedOptionNotice>) {
    tracing::warn!(
        target: "config.deprecated",
        component,
        old_key = old,
        new_key = new,
        "deprecated_option_migrated"
    );
    notices.push(DeprecatedOptionNotice {
        component: component.to_string(),
        old_key: old.to_string(),
        new_key: new.to_string(),
    });
}

/// Written back in list form, `["name", { options }]`, so no option key can
/// collide with the identifier.
impl Serialize for ComponentSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.options.is_empty() && self.child.is_none() {
            return serializer.serialize_str(&self.name);
        }
        let mut seq = serializer.serialize_seq(Some(2))?;
        seq.serialize_element(&self.name)?;
        seq.serialize_element(&OptionTable(self))?;
        seq.end()
    }
}

struct OptionTable<'a>(&'a ComponentSpec);

impl Serialize for OptionTable<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (k, v) in &self.0.options {
            map.serialize_entry(k, v)?;
        }
        if let Some(child) = &self.0.child {
            map.serialize_entry(CHILD_KEY, child)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> (Result<ComponentSpec, ConfigError>, Vec<DeprecatedOptionNotice>) {
        let t: toml::Table = toml::from_str(src).unwrap();
        let mut notices = Vec::new();
        (ComponentSpec::parse("c", &t["c"], &mut notices), notices)
    }

    #[test]
    fn bare_identifier() {
        let (spec, _) = parse("c = \"mode\"");
        assert_eq!(spec.unwrap(), ComponentSpec::named("mode"));
    }

    #[test]
    fn list_form_merges_option_tables_in_order() {
        let (spec, _) = parse("c = [\"branch\", { icon = \"b\", upper = true }, { icon = \"B\" }]");
        let spec = spec.unwrap();
        assert_eq!(spec.name, "branch");
        assert_eq!(spec.options["icon"].as_str(), Some("B"));
        assert_eq!(spec.options["upper"].as_bool(), Some(true));
    }

    #[test]
    fn table_form_with_child() {
        let (spec, _) = parse("c = { name = \"wrap\", child = { name = \"branch\", lower = true } }");
        let spec = spec.unwrap();
        assert_eq!(spec.name, "wrap");
        let child = spec.child.expect("child parsed");
        assert_eq!(child.name, "branch");
        assert!(!spec.options.contains_key(CHILD_KEY));
    }

    #[test]
    fn deprecated_keys_migrate_with_notice() {
        let (spec, notices) =
            parse("c = { name = \"x\", condition = \"modified\", left_padding = 2, padding = { right = 1 } }");
        let spec = spec.unwrap();
        assert_eq!(spec.options["cond"].as_str(), Some("modified"));
        let padding = spec.options["padding"].as_table().unwrap();
        assert_eq!(padding["left"].as_integer(), Some(2));
        assert_eq!(padding["right"].as_integer(), Some(1));
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[0].new_key, "cond");
        assert_eq!(notices[1].new_key, "padding.left");
    }

    #[test]
    fn option_named_like_identifier_survives_serialization() {
        let (spec, _) = parse("c = [\"branch\", { name = \"x\", \"1\" = \"y\", child = \"mode\" }]");
        let spec = spec.unwrap();
        assert_eq!(spec.name, "branch");
        assert_eq!(spec.options["name"].as_str(), Some("x"));

        let written = Value::try_from(&spec).unwrap();
        assert_eq!(written.as_array().map(Vec::len), Some(2));
        let again = ComponentSpec::parse("c", &written, &mut Vec::new()).unwrap();
        assert_eq!(again, spec);
    }

    #[test]
    fn malformed_entries_rejected() {
        assert!(parse("c = 5").0.is_err());
        assert!(parse("c = []").0.is_err());
        assert!(parse("c = [1]").0.is_err());
        assert!(parse("c = [\"a\", 2]").0.is_err());
        assert!(parse("c = { icon = \"i\" }").0.is_err());
        assert!(parse("c = \"\"").0.is_err());
    }
}
