//! Extensions: alternate section sets for specific filetypes.
//!
//! Named extensions in the configuration resolve against an
//! `ExtensionCatalog` the host populates; inline definitions are used as
//! written. The first loaded extension whose filetypes contain the buffer's
//! filetype replaces the regular sections for that buffer.

use core_config::ExtensionDef;
use std::collections::HashMap;

#[derive(Debug, Default, Clone)]
pub struct ExtensionCatalog {
    defs: HashMap<String, ExtensionDef>,
}

impl ExtensionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, def: ExtensionDef) -> &mut Self {
        self.defs.insert(def.name.clone(), def);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ExtensionDef> {
        self.defs.get(name)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

pub(crate) fn matches(def_filetypes: &[String], filetype: Option<&str>) -> bool {
    filetype.is_some_and(|ft| def_filetypes.iter().any(|candidate| candidate == ft))
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_config::SectionGroups;

    fn def(name: &str, filetypes: &[&str]) -> ExtensionDef {
        ExtensionDef {
            name: name.into(),
            filetypes: filetypes.iter().map(|s| s.to_string()).collect(),
            sections: SectionGroups::new(),
            inactive_sections: None,
        }
    }

    #[test]
    fn register_and_lookup() {
        let mut catalog = ExtensionCatalog::new();
        catalog.register(def("quickfix", &["qf"])).register(def("fugitive", &["fugitive"]));
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("quickfix").map(|d| d.filetypes.len()), Some(1));
        assert!(catalog.get("nerdtree").is_none());
    }

    #[test]
    fn filetype_matching() {
        let d = def("quickfix", &["qf", "loclist"]);
        assert!(matches(&d.filetypes, Some("loclist")));
        assert!(!matches(&d.filetypes, Some("rust")));
        assert!(!matches(&d.filetypes, None));
    }
}
