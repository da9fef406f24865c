//! Configuration normalizer.
//!
//! Merge rules:
//! * `options` deep-merges onto the defaults key by key (nested tables
//!   recurse); unknown keys pass through to `GlobalOptions::extra`.
//! * `sections`, `inactive_sections`, `tabline`: per group key, a key present
//!   in user input replaces the default list outright (an empty list stays
//!   empty); absent keys keep the default.
//! * `extensions` is an ordered list, empty by default.
//!
//! Invariants:
//! * Every call builds its defaults fresh (see `schema`).
//! * A field that fails coercion keeps its default and records a
//!   `ConfigError`; other fields are unaffected.
//! * `normalize(config.to_table())` reproduces `config` (fixed point).

use crate::component_spec::ComponentSpec;
use crate::error::{ConfigError, DeprecatedOptionNotice};
use crate::schema::{
    SectionGroups, Slot, default_inactive_sections, default_options_table, default_sections,
};
use crate::separators::SeparatorPair;
use serde::Serialize;
use toml::Value;
use tracing::warn;

const TOP_LEVEL_KEYS: [&str; 5] = [
    "options",
    "sections",
    "inactive_sections",
    "tabline",
    "extensions",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalOptions {
    pub icons_enabled: bool,
    pub theme: String,
    pub component_separators: SeparatorPair,
    pub section_separators: SeparatorPair,
    pub disabled_filetypes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub always_divide_middle: Option<bool>,
    /// Keys outside the schema, consumed only by components.
    #[serde(flatten)]
    pub extra: toml::Table,
}

impl Default for GlobalOptions {
    fn default() -> Self {
        let mut errors = Vec::new();
        extract_options(default_options_table(), &mut errors)
    }
}

/// Extension defined inline in the configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtensionDef {
    pub name: String,
    pub filetypes: Vec<String>,
    pub sections: SectionGroups,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inactive_sections: Option<SectionGroups>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExtensionSpec {
    /// Resolved against the host's extension catalog.
    Named(String),
    Inline(ExtensionDef),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    pub options: GlobalOptions,
    pub sections: SectionGroups,
    pub inactive_sections: SectionGroups,
    pub tabline: SectionGroups,
    pub extensions: Vec<ExtensionSpec>,
    #[serde(skip)]
    pub notices: Vec<DeprecatedOptionNotice>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            options: GlobalOptions::default(),
            sections: default_sections(),
            inactive_sections: default_inactive_sections(),
            tabline: SectionGroups::new(),
            extensions: Vec::new(),
            notices: Vec::new(),
        }
    }
}

impl Config {
    /// Serialize back into a user-shaped tree that normalizes to `self`.
    pub fn to_table(&self) -> Result<toml::Table, toml::ser::Error> {
        match Value::try_from(self)? {
            Value::Table(t) => Ok(t),
            other => Err(<toml::ser::Error as serde::ser::Error>::custom(format!(
                "configuration serialized as {}",
                other.type_str()
            ))),
        }
    }
}

/// Lenient normalization result.
#[derive(Debug)]
pub struct Normalized {
    pub config: Config,
    pub errors: Vec<ConfigError>,
}

/// Strict entry point: returns the first field error, if any.
pub fn apply_configuration(user: &toml::Table) -> Result<Config, ConfigError> {
    let Normalized { config, errors } = normalize(user);
    match errors.into_iter().next() {
        Some(err) => Err(err),
        None => Ok(config),
    }
}

/// Lenient entry point: incompatible fields fall back to their defaults and
/// are reported in `errors`.
pub fn normalize(user: &toml::Table) -> Normalized {
    let mut errors = Vec::new();
    let mut notices = Vec::new();

    for key in user.keys() {
        if !TOP_LEVEL_KEYS.contains(&key.as_str()) {
            warn!(target: "config", key = key.as_str(), "unknown_top_level_key_ignored");
        }
    }

    let mut options_tree = default_options_table();
    match user.get("options") {
        None => {}
        Some(Value::Table(t)) => deep_merge(&mut options_tree, t),
        Some(other) => errors.push(ConfigError::invalid_type("options", "table", other)),
    }
    let options = extract_options(options_tree, &mut errors);

    let mut sections = default_sections();
    merge_groups("sections", &mut sections, user.get("sections"), &mut errors, &mut notices);
    let mut inactive_sections = default_inactive_sections();
    merge_groups(
        "inactive_sections",
        &mut inactive_sections,
        user.get("inactive_sections"),
        &mut errors,
        &mut notices,
    );
    let mut tabline = SectionGroups::new();
    merge_groups("tabline", &mut tabline, user.get("tabline"), &mut errors, &mut notices);

    let extensions = match user.get("extensions") {
        None => Vec::new(),
        Some(v) => parse_extensions(v, &mut errors, &mut notices),
    };

    for err in &errors {
        warn!(target: "config", error = %err, "config_field_rejected");
    }

    Normalized {
        config: Config {
            options,
            sections,
            inactive_sections,
            tabline,
            extensions,
            notices,
        },
        errors,
    }
}

/// Recursive key-by-key merge; non-table values in `overlay` replace.
pub fn deep_merge(base: &mut toml::Table, overlay: &toml::Table) {
    for (key, value) in overlay {
        if let (Some(Value::Table(b)), Value::Table(o)) = (base.get_mut(key), value) {
            deep_merge(b, o);
            continue;
        }
        base.insert(key.clone(), value.clone());
    }
}

fn extract_options(mut tree: toml::Table, errors: &mut Vec<ConfigError>) -> GlobalOptions {
    let icons_enabled = match tree.remove("icons_enabled") {
        Some(Value::Boolean(b)) => b,
        Some(other) => {
            errors.push(ConfigError::invalid_type("options.icons_enabled", "boolean", &other));
            true
        }
        None => true,
    };
    let theme = match tree.remove("theme") {
        Some(Value::String(s)) => s,
        Some(other) => {
            errors.push(ConfigError::invalid_type("options.theme", "string", &other));
            crate::schema::DEFAULT_THEME.to_string()
        }
        None => crate::schema::DEFAULT_THEME.to_string(),
    };
    let component_separators = separators(
        "options.component_separators",
        tree.remove("component_separators"),
        errors,
    );
    let section_separators = separators(
        "options.section_separators",
        tree.remove("section_separators"),
        errors,
    );
    let disabled_filetypes = match tree.remove("disabled_filetypes") {
        None => Vec::new(),
        Some(v) => string_list("options.disabled_filetypes", &v).unwrap_or_else(|e| {
            errors.push(e);
            Vec::new()
        }),
    };
    let always_divide_middle = match tree.remove("always_divide_middle") {
        None => None,
        Some(Value::Boolean(b)) => Some(b),
        Some(other) => {
            errors.push(ConfigError::invalid_type(
                "options.always_divide_middle",
                "boolean",
                &other,
            ));
            None
        }
    };
    GlobalOptions {
        icons_enabled,
        theme,
        component_separators,
        section_separators,
        disabled_filetypes,
        always_divide_middle,
        extra: tree,
    }
}

fn separators(field: &str, value: Option<Value>, errors: &mut Vec<ConfigError>) -> SeparatorPair {
    let Some(value) = value else {
        return SeparatorPair::default();
    };
    SeparatorPair::coerce(field, &value).unwrap_or_else(|e| {
        errors.push(e);
        SeparatorPair::default()
    })
}

/// A list of strings; a single string is accepted as a one-element list.
fn string_list(field: &str, value: &Value) -> Result<Vec<String>, ConfigError> {
    match value {
        Value::String(s) => Ok(vec![s.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(ConfigError::invalid_type(field, "string", other)),
            })
            .collect(),
        other => Err(ConfigError::invalid_type(field, "list of strings", other)),
    }
}

fn merge_groups(
    group: &str,
    target: &mut SectionGroups,
    user: Option<&Value>,
    errors: &mut Vec<ConfigError>,
    notices: &mut Vec<DeprecatedOptionNotice>,
) {
    let Some(user) = user else {
        return;
    };
    let Value::Table(user) = user else {
        errors.push(ConfigError::invalid_type(group, "table", user));
        return;
    };
    for (key, value) in user {
        let Some(slot) = Slot::from_key(key) else {
            errors.push(ConfigError::UnknownSlot {
                group: group.to_string(),
                key: key.clone(),
            });
            continue;
        };
        if let Some(list) = parse_component_list(&format!("{group}.{key}"), value, errors, notices) {
            target.insert(slot, list);
        }
    }
}

/// Returns `None` when the value is not a list at all (default kept); bad
/// entries inside a list are dropped individually.
fn parse_component_list(
    field: &str,
    value: &Value,
    errors: &mut Vec<ConfigError>,
    notices: &mut Vec<DeprecatedOptionNotice>,
) -> Option<Vec<ComponentSpec>> {
    let Value::Array(items) = value else {
        errors.push(ConfigError::invalid_type(field, "list of components", value));
        return None;
    };
    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        match ComponentSpec::parse(&format!("{field}[{}]", i + 1), item, notices) {
            Ok(spec) => out.push(spec),
            Err(e) => errors.push(e),
        }
    }
    Some(out)
}

fn parse_extensions(
    value: &Value,
    errors: &mut Vec<ConfigError>,
    notices: &mut Vec<DeprecatedOptionNotice>,
) -> Vec<ExtensionSpec> {
    let Value::Array(items) = value else {
        errors.push(ConfigError::invalid_type("extensions", "list", value));
        return Vec::new();
    };
    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let field = format!("extensions[{}]", i + 1);
        match item {
            Value::String(name) => out.push(ExtensionSpec::Named(name.clone())),
            Value::Table(t) => {
                if let Some(def) = parse_extension_def(&field, t, errors, notices) {
                    out.push(ExtensionSpec::Inline(def));
                }
            }
            other => errors.push(ConfigError::invalid_type(field, "extension name or table", other)),
        }
    }
    out
}

fn parse_extension_def(
    field: &str,
    t: &toml::Table,
    errors: &mut Vec<ConfigError>,
    notices: &mut Vec<DeprecatedOptionNotice>,
) -> Option<ExtensionDef> {
    let name = match t.get("name") {
        Some(Value::String(s)) => s.clone(),
        Some(other) => {
            errors.push(ConfigError::invalid_type(format!("{field}.name"), "string", other));
            return None;
        }
        None => {
            errors.push(ConfigError::invalid_value(field, "extension has no `name`"));
            return None;
        }
    };
    let filetypes = match t.get("filetypes") {
        Some(v) => match string_list(&format!("{field}.filetypes"), v) {
            Ok(list) => list,
            Err(e) => {
                errors.push(e);
                return None;
            }
        },
        None => Vec::new(),
    };
    // Extension sections start empty: nothing is inherited from the defaults.
    let mut sections = SectionGroups::new();
    merge_groups(&format!("{field}.sections"), &mut sections, t.get("sections"), errors, notices);
    let inactive_sections = t.get("inactive_sections").map(|v| {
        let mut groups = SectionGroups::new();
        merge_groups(&format!("{field}.inactive_sections"), &mut groups, Some(v), errors, notices);
        groups
    });
    Some(ExtensionDef {
        name,
        filetypes,
        sections,
        inactive_sections,
    })
}
