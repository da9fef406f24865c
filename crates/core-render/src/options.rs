//! Typed per-component options.
//!
//! A component's option tree is layered (later wins): global options, the
//! segment's static defaults, then the options written in the component
//! spec. `ComponentOptions::resolve` interprets the merged tree; keys it
//! does not recognize stay in `extra` for the segment to read.
//!
//! `cond` and `fmt` name callbacks. `cond` also accepts the built-in
//! predicates `"modified"`, `"readonly"`, `"writable"` and the table form
//! `{ min_width = N }`; anything else is looked up in `Callbacks`.

use crate::environment::Environment;
use crate::highlight::ColorSpec;
use core_config::normalize::deep_merge;
use core_config::{ConfigError, GlobalOptions, SeparatorPair, Slot};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use toml::Value;

pub type Predicate = Rc<dyn Fn(&dyn Environment) -> anyhow::Result<bool>>;
pub type Formatter = Rc<dyn Fn(&str) -> anyhow::Result<Option<String>>>;

/// Named predicates and formatters that `cond` / `fmt` options refer to.
#[derive(Default, Clone)]
pub struct Callbacks {
    conditions: HashMap<String, Predicate>,
    formatters: HashMap<String, Formatter>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_condition(
        mut self,
        name: impl Into<String>,
        predicate: impl Fn(&dyn Environment) -> anyhow::Result<bool> + 'static,
    ) -> Self {
        self.conditions.insert(name.into(), Rc::new(predicate));
        self
    }

    pub fn with_formatter(
        mut self,
        name: impl Into<String>,
        formatter: impl Fn(&str) -> anyhow::Result<Option<String>> + 'static,
    ) -> Self {
        self.formatters.insert(name.into(), Rc::new(formatter));
        self
    }

    pub fn condition(&self, name: &str) -> Option<Predicate> {
        self.conditions.get(name).cloned()
    }

    pub fn formatter(&self, name: &str) -> Option<Formatter> {
        self.formatters.get(name).cloned()
    }
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("conditions", &self.conditions.keys().collect::<Vec<_>>())
            .field("formatters", &self.formatters.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[derive(Clone)]
pub enum Condition {
    Modified,
    Readonly,
    Writable,
    MinWidth(u16),
    Named { name: String, predicate: Predicate },
}

impl Condition {
    pub fn evaluate(&self, env: &dyn Environment) -> anyhow::Result<bool> {
        Ok(match self {
            Condition::Modified => env.is_buffer_modified(),
            Condition::Readonly => env.is_buffer_readonly(),
            Condition::Writable => !env.is_buffer_readonly(),
            Condition::MinWidth(min) => env.display_width() >= *min,
            Condition::Named { predicate, .. } => predicate(env)?,
        })
    }

    fn parse(
        component: &str,
        value: &Value,
        callbacks: &Callbacks,
    ) -> Result<Self, ConfigError> {
        match value {
            Value::String(name) => Ok(match name.as_str() {
                "modified" => Condition::Modified,
                "readonly" => Condition::Readonly,
                "writable" => Condition::Writable,
                other => {
                    let predicate =
                        callbacks
                            .condition(other)
                            .ok_or_else(|| ConfigError::UnknownCallback {
                                kind: "cond",
                                name: other.to_string(),
                                component: component.to_string(),
                            })?;
                    Condition::Named {
                        name: other.to_string(),
                        predicate,
                    }
                }
            }),
            Value::Table(t) => match t.get("min_width") {
                Some(v) => Ok(Condition::MinWidth(parse_count("cond.min_width", v)?)),
                None => Err(ConfigError::invalid_value("cond", "expected `min_width`")),
            },
            other => Err(ConfigError::invalid_type("cond", "callback name or table", other)),
        }
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Modified => f.write_str("Modified"),
            Condition::Readonly => f.write_str("Readonly"),
            Condition::Writable => f.write_str("Writable"),
            Condition::MinWidth(n) => write!(f, "MinWidth({n})"),
            Condition::Named { name, .. } => write!(f, "Named({name})"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Padding {
    Symmetric(usize),
    Sides {
        left: Option<usize>,
        right: Option<usize>,
    },
}

impl Default for Padding {
    fn default() -> Self {
        Padding::Symmetric(1)
    }
}

impl Padding {
    pub fn sides(self) -> (Option<usize>, Option<usize>) {
        match self {
            Padding::Symmetric(n) => (Some(n), Some(n)),
            Padding::Sides { left, right } => (left, right),
        }
    }

    fn parse(value: &Value) -> Result<Self, ConfigError> {
        match value {
            Value::Integer(_) => Ok(Padding::Symmetric(parse_count("padding", value)?)),
            Value::Table(t) => {
                let side = |key: &str| -> Result<Option<usize>, ConfigError> {
                    t.get(key)
                        .map(|v| parse_count(&format!("padding.{key}"), v))
                        .transpose()
                };
                Ok(Padding::Sides {
                    left: side("left")?,
                    right: side("right")?,
                })
            }
            other => Err(ConfigError::invalid_type("padding", "integer or table", other)),
        }
    }
}

/// Separator a component draws after itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeparatorOption {
    /// Literal glyph appended after the text.
    Plain(String),
    /// Background-blending separator pair emitted as transition markers.
    Transitional(SeparatorPair),
}

impl SeparatorOption {
    pub fn is_transitional(&self) -> bool {
        matches!(self, SeparatorOption::Transitional(_))
    }

    fn parse(value: &Value) -> Result<Self, ConfigError> {
        match value {
            Value::String(s) => Ok(SeparatorOption::Plain(s.clone())),
            Value::Array(_) | Value::Table(_) => Ok(SeparatorOption::Transitional(
                SeparatorPair::coerce("separator", value)?,
            )),
            other => Err(ConfigError::invalid_type("separator", "string or pair", other)),
        }
    }
}

#[derive(Clone)]
pub struct ComponentOptions {
    pub component_name: String,
    pub slot: Slot,
    pub icons_enabled: bool,
    pub icon: Option<String>,
    pub upper: bool,
    pub lower: bool,
    pub padding: Padding,
    pub color: Option<ColorSpec>,
    pub separator: SeparatorOption,
    pub cond: Option<Condition>,
    pub fmt: Option<Formatter>,
    pub component_separators: SeparatorPair,
    pub section_separators: SeparatorPair,
    /// Segment-specific options and pass-through globals.
    pub extra: toml::Table,
}

impl fmt::Debug for ComponentOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentOptions")
            .field("component_name", &self.component_name)
            .field("slot", &self.slot)
            .field("icon", &self.icon)
            .field("padding", &self.padding)
            .field("color", &self.color)
            .field("separator", &self.separator)
            .field("cond", &self.cond)
            .field("fmt", &self.fmt.is_some())
            .finish_non_exhaustive()
    }
}

/// Build the layered option tree for one component.
pub fn layered_options(
    global: &GlobalOptions,
    segment_defaults: &toml::Table,
    spec_options: &toml::Table,
) -> toml::Table {
    let mut tree = global.extra.clone();
    tree.insert("icons_enabled".into(), Value::Boolean(global.icons_enabled));
    tree.insert(
        "component_separators".into(),
        global.component_separators.to_value(),
    );
    tree.insert(
        "section_separators".into(),
        global.section_separators.to_value(),
    );
    deep_merge(&mut tree, segment_defaults);
    deep_merge(&mut tree, spec_options);
    tree
}

impl ComponentOptions {
    /// Interpret a layered option tree. `component_no` names the component
    /// when no `component_name` is given.
    pub fn resolve(
        mut tree: toml::Table,
        slot: Slot,
        component_no: u64,
        callbacks: &Callbacks,
    ) -> Result<Self, ConfigError> {
        let component_name = match tree.remove("component_name") {
            Some(Value::String(s)) => s,
            Some(other) => return Err(ConfigError::invalid_type("component_name", "string", &other)),
            None => component_no.to_string(),
        };
        let icons_enabled = take_bool(&mut tree, "icons_enabled", true)?;
        let icon = match tree.remove("icon") {
            None => None,
            Some(Value::String(s)) => Some(s),
            Some(other) => return Err(ConfigError::invalid_type("icon", "string", &other)),
        };
        let upper = take_bool(&mut tree, "upper", false)?;
        let lower = take_bool(&mut tree, "lower", false)?;
        let padding = tree
            .remove("padding")
            .map(|v| Padding::parse(&v))
            .transpose()?
            .unwrap_or_default();
        let color = tree
            .remove("color")
            .map(|v| ColorSpec::parse("color", &v))
            .transpose()?;
        let component_separators = take_pair(&mut tree, "component_separators")?;
        let section_separators = take_pair(&mut tree, "section_separators")?;
        let separator = match tree.remove("separator") {
            Some(v) => SeparatorOption::parse(&v)?,
            None => SeparatorOption::Plain(side_of(&component_separators, slot).to_string()),
        };
        let cond = tree
            .remove("cond")
            .map(|v| Condition::parse(&component_name, &v, callbacks))
            .transpose()?;
        let fmt = match tree.remove("fmt") {
            None => None,
            Some(Value::String(name)) => Some(callbacks.formatter(&name).ok_or_else(|| {
                ConfigError::UnknownCallback {
                    kind: "fmt",
                    name: name.clone(),
                    component: component_name.clone(),
                }
            })?),
            Some(other) => return Err(ConfigError::invalid_type("fmt", "callback name", &other)),
        };
        Ok(Self {
            component_name,
            slot,
            icons_enabled,
            icon,
            upper,
            lower,
            padding,
            color,
            separator,
            cond,
            fmt,
            component_separators,
            section_separators,
            extra: tree,
        })
    }

    /// Component separator for this component's side of the line.
    pub fn slot_separator(&self) -> &str {
        side_of(&self.component_separators, self.slot)
    }
}

fn side_of(pair: &SeparatorPair, slot: Slot) -> &str {
    if slot.is_left() { &pair.left } else { &pair.right }
}

fn take_bool(tree: &mut toml::Table, key: &str, default: bool) -> Result<bool, ConfigError> {
    match tree.remove(key) {
        None => Ok(default),
        Some(Value::Boolean(b)) => Ok(b),
        Some(other) => Err(ConfigError::invalid_type(key, "boolean", &other)),
    }
}

fn take_pair(tree: &mut toml::Table, key: &str) -> Result<SeparatorPair, ConfigError> {
    tree.remove(key)
        .map(|v| SeparatorPair::coerce(key, &v))
        .transpose()
        .map(Option::unwrap_or_default)
}

fn parse_count<T: TryFrom<i64>>(field: &str, value: &Value) -> Result<T, ConfigError> {
    match value {
        Value::Integer(n) => T::try_from(*n)
            .map_err(|_| ConfigError::invalid_value(field, format!("{n} is out of range"))),
        other => Err(ConfigError::invalid_type(field, "integer", other)),
    }
}
