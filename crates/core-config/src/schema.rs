//! Schema defaults and slot identifiers.
//!
//! Every call into the normalizer builds its defaults through these
//! functions, so no template is shared (or mutated) between calls.

use crate::component_spec::ComponentSpec;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Canonical status line region. Ordering follows the letters, which is
/// what decides the separator side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slot {
    A,
    B,
    C,
    X,
    Y,
    Z,
}

impl Slot {
    pub const ALL: [Slot; 6] = [Slot::A, Slot::B, Slot::C, Slot::X, Slot::Y, Slot::Z];

    pub fn letter(self) -> char {
        match self {
            Slot::A => 'a',
            Slot::B => 'b',
            Slot::C => 'c',
            Slot::X => 'x',
            Slot::Y => 'y',
            Slot::Z => 'z',
        }
    }

    /// Configuration key (`lualine_a` ...).
    pub fn key(self) -> &'static str {
        match self {
            Slot::A => "lualine_a",
            Slot::B => "lualine_b",
            Slot::C => "lualine_c",
            Slot::X => "lualine_x",
            Slot::Y => "lualine_y",
            Slot::Z => "lualine_z",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.key() == key)
    }

    /// Slots before `x` take the left-hand separator.
    pub fn is_left(self) -> bool {
        self < Slot::X
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl Serialize for Slot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

pub type SectionGroups = BTreeMap<Slot, Vec<ComponentSpec>>;

pub const DEFAULT_THEME: &str = "gruvbox";

/// Raw option defaults as a TOML tree; user options are deep-merged on top
/// before typed extraction.
pub fn default_options_table() -> toml::Table {
    let mut t = toml::Table::new();
    t.insert("icons_enabled".into(), true.into());
    t.insert("theme".into(), DEFAULT_THEME.into());
    t.insert(
        "component_separators".into(),
        toml::Value::Array(vec!["".into(), "".into()]),
    );
    t.insert(
        "section_separators".into(),
        toml::Value::Array(vec!["".into(), "".into()]),
    );
    t.insert("disabled_filetypes".into(), toml::Value::Array(Vec::new()));
    t
}

fn groups(entries: &[(Slot, &[&str])]) -> SectionGroups {
    entries
        .iter()
        .map(|(slot, names)| {
            (
                *slot,
                names.iter().map(|n| ComponentSpec::named(*n)).collect(),
            )
        })
        .collect()
}

pub fn default_sections() -> SectionGroups {
    groups(&[
        (Slot::A, &["mode"]),
        (Slot::B, &["branch"]),
        (Slot::C, &["filename"]),
        (Slot::X, &["encoding", "fileformat", "filetype"]),
        (Slot::Y, &["progress"]),
        (Slot::Z, &["location"]),
    ])
}

pub fn default_inactive_sections() -> SectionGroups {
    groups(&[
        (Slot::A, &[]),
        (Slot::B, &[]),
        (Slot::C, &["filename"]),
        (Slot::X, &["location"]),
        (Slot::Y, &[]),
        (Slot::Z, &[]),
    ])
}
