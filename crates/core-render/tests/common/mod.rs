#![allow(dead_code)] // Shared across integration tests; each test binary uses a subset of helpers.

use core_config::{Config, normalize};
use core_render::{
    Callbacks, ColorSpec, Environment, ExtensionCatalog, HighlightContext, SegmentCatalog,
    StatusLineAssembler, TextSegment,
};
use std::cell::{Cell, RefCell};

/// Scriptable host. `registered` uses interior mutability the way a real
/// editor binding must for `register_highlight_group`.
pub struct TestEnv {
    pub width: Cell<u16>,
    pub mode: String,
    pub filetype: Option<String>,
    pub modified: Cell<bool>,
    pub readonly: Cell<bool>,
    pub registered: RefCell<Vec<String>>,
}

impl Default for TestEnv {
    fn default() -> Self {
        Self {
            width: Cell::new(120),
            mode: "normal".into(),
            filetype: None,
            modified: Cell::new(false),
            readonly: Cell::new(false),
            registered: RefCell::new(Vec::new()),
        }
    }
}

impl TestEnv {
    pub fn with_filetype(mut self, ft: &str) -> Self {
        self.filetype = Some(ft.to_string());
        self
    }

    pub fn with_mode(mut self, mode: &str) -> Self {
        self.mode = mode.to_string();
        self
    }
}

impl Environment for TestEnv {
    fn display_width(&self) -> u16 {
        self.width.get()
    }

    fn register_highlight_group(&self, _color: &ColorSpec, ctx: &HighlightContext<'_>) -> String {
        let group = format!("{}_{}", ctx.slot.key(), ctx.component_name);
        self.registered.borrow_mut().push(group.clone());
        group
    }

    fn is_buffer_modified(&self) -> bool {
        self.modified.get()
    }

    fn is_buffer_readonly(&self) -> bool {
        self.readonly.get()
    }

    fn mode(&self) -> &str {
        &self.mode
    }

    fn filetype(&self) -> Option<&str> {
        self.filetype.as_deref()
    }
}

/// Catalog where every default component renders its own name.
pub fn echo_catalog() -> SegmentCatalog {
    let mut catalog = SegmentCatalog::new();
    for name in [
        "mode",
        "branch",
        "filename",
        "encoding",
        "fileformat",
        "filetype",
        "progress",
        "location",
    ] {
        catalog.register(name, move |_| Ok(TextSegment::new(name)));
    }
    catalog.register("text", |init| Ok(TextSegment::from_options(init.options)));
    catalog
}

pub fn config(src: &str) -> Config {
    let user: toml::Table = toml::from_str(src).expect("test config parses");
    let normalized = normalize(&user);
    assert!(normalized.errors.is_empty(), "unexpected config errors: {:?}", normalized.errors);
    normalized.config
}

pub fn assembler(src: &str, catalog: &SegmentCatalog, env: &TestEnv) -> StatusLineAssembler {
    assembler_with(src, catalog, &Callbacks::new(), &ExtensionCatalog::new(), env)
}

pub fn assembler_with(
    src: &str,
    catalog: &SegmentCatalog,
    callbacks: &Callbacks,
    extensions: &ExtensionCatalog,
    env: &TestEnv,
) -> StatusLineAssembler {
    StatusLineAssembler::new(&config(src), catalog, callbacks, extensions, env)
}
