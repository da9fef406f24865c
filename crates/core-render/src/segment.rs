//! Segment capability and catalog.
//!
//! A segment is the external, data-producing half of a component: it only
//! answers "what raw text do I show right now". Decoration (icon, case,
//! padding, highlights, separators) is owned by `ComponentInstance` and is
//! never overridden per segment.
//!
//! The catalog maps component identifiers used in configuration to segment
//! factories, together with each segment type's static default options.

use crate::environment::Environment;
use crate::options::ComponentOptions;
use std::collections::HashMap;
use std::fmt;

/// Per-call data handed to `Segment::produce`.
pub struct ProduceContext<'a> {
    pub env: &'a dyn Environment,
    pub focused: bool,
    pub options: &'a ComponentOptions,
}

pub trait Segment {
    /// Option defaults; options written on the component take precedence.
    fn default_options() -> toml::Table
    where
        Self: Sized,
    {
        toml::Table::new()
    }

    /// Raw status text; `None` (or empty) means nothing to show.
    fn produce(&mut self, ctx: &ProduceContext<'_>) -> anyhow::Result<Option<String>>;
}

/// Construction input for a segment factory.
pub struct SegmentInit<'a> {
    pub options: &'a ComponentOptions,
    /// Built child segment for composite components.
    pub child: Option<Box<dyn Segment>>,
}

type Factory = Box<dyn Fn(SegmentInit<'_>) -> anyhow::Result<Box<dyn Segment>>>;

struct CatalogEntry {
    defaults: toml::Table,
    build: Factory,
}

#[derive(Default)]
pub struct SegmentCatalog {
    entries: HashMap<String, CatalogEntry>,
}

impl SegmentCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<S, F>(&mut self, name: impl Into<String>, build: F) -> &mut Self
    where
        S: Segment + 'static,
        F: Fn(SegmentInit<'_>) -> anyhow::Result<S> + 'static,
    {
        self.entries.insert(
            name.into(),
            CatalogEntry {
                defaults: S::default_options(),
                build: Box::new(
                    move |init: SegmentInit<'_>| -> anyhow::Result<Box<dyn Segment>> {
                        Ok(Box::new(build(init)?))
                    },
                ),
            },
        );
        self
    }

    /// Register a closure as a segment without defaults.
    pub fn register_fn<F>(&mut self, name: impl Into<String>, produce: F) -> &mut Self
    where
        F: Fn(&ProduceContext<'_>) -> anyhow::Result<Option<String>> + Clone + 'static,
    {
        self.register(name, move |_| Ok(FnSegment(produce.clone())))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn defaults(&self, name: &str) -> Option<&toml::Table> {
        self.entries.get(name).map(|e| &e.defaults)
    }

    pub fn build(&self, name: &str, init: SegmentInit<'_>) -> Option<anyhow::Result<Box<dyn Segment>>> {
        self.entries.get(name).map(|e| (e.build)(init))
    }
}

impl fmt::Debug for SegmentCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.entries.keys().collect();
        names.sort();
        f.debug_struct("SegmentCatalog").field("names", &names).finish()
    }
}

/// Closure-backed segment.
pub struct FnSegment<F>(pub F);

impl<F> Segment for FnSegment<F>
where
    F: FnMut(&ProduceContext<'_>) -> anyhow::Result<Option<String>>,
{
    fn produce(&mut self, ctx: &ProduceContext<'_>) -> anyhow::Result<Option<String>> {
        (self.0)(ctx)
    }
}

/// Fixed text, taken from the `text` option.
pub struct TextSegment {
    text: String,
}

impl TextSegment {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn from_options(options: &ComponentOptions) -> Self {
        let text = options
            .extra
            .get("text")
            .and_then(toml::Value::as_str)
            .unwrap_or_default();
        Self::new(text)
    }
}

impl Segment for TextSegment {
    fn produce(&mut self, _ctx: &ProduceContext<'_>) -> anyhow::Result<Option<String>> {
        Ok(Some(self.text.clone()))
    }
}
