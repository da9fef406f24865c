//! Component render pipeline.
//!
//! One `draw` call runs a fixed sequence over the component's `status`:
//!
//! 1. reset `status` / `applied_separator`
//! 2. condition gate (`cond`), `produce` is not called when it is false
//! 3. produce raw text from the segment
//! 4. `fmt` post-processing (sees `""` when nothing was produced)
//! 5. empty guard, nothing below runs for empty text
//! 6. icon
//! 7. case (skipped for text carrying host escapes)
//! 8. padding (placed after a leading highlight escape)
//! 9. highlight wrap
//! 10. transitional section separators
//! 11. trailing separator
//!
//! Invariants:
//! * `applied_separator` is always a suffix of `status`, so
//!   `strip_separator` removes exactly what steps 9 and 11 appended.
//! * A component that draws empty contributes no padding, highlight or
//!   separator characters at all.
//! * Within one pass (same `DrawContext::pass`) repeated draws return the
//!   finalized status without re-running the pipeline.

use crate::environment::Environment;
use crate::highlight::{HighlightContext, HighlightRegistry};
use crate::markers::{self, Transition};
use crate::options::{Callbacks, ComponentOptions, SeparatorOption, layered_options};
use crate::segment::{ProduceContext, Segment, SegmentCatalog, SegmentInit};
use core_config::{ComponentSpec, ConfigError, GlobalOptions, Slot};
use std::fmt;

/// Hands out component identities; owned by whoever constructs components.
#[derive(Debug)]
pub struct ComponentIds {
    next: u64,
}

impl Default for ComponentIds {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl ComponentIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many identities have been handed out.
    pub fn allocated(&self) -> u64 {
        self.next - 1
    }

    pub fn allocate(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// Per-pass draw inputs.
#[derive(Clone, Copy)]
pub struct DrawContext<'a> {
    pub env: &'a dyn Environment,
    pub focused: bool,
    pub pass: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStage {
    Condition,
    Produce,
    Format,
}

impl fmt::Display for RenderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RenderStage::Condition => "cond",
            RenderStage::Produce => "produce",
            RenderStage::Format => "fmt",
        })
    }
}

/// A user callback or segment failed during a pass.
#[derive(Debug, thiserror::Error)]
#[error("component `{component}` ({component_no}) failed in {stage}: {error:#}")]
pub struct ComponentRenderError {
    pub component: String,
    pub component_no: u64,
    pub stage: RenderStage,
    pub error: anyhow::Error,
}

pub struct ComponentInstance {
    identifier: String,
    component_no: u64,
    options: ComponentOptions,
    color_group: Option<String>,
    segment: Box<dyn Segment>,
    status: String,
    applied_separator: String,
    strip_previous_separator: bool,
    drawn_pass: Option<u64>,
}

impl fmt::Debug for ComponentInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentInstance")
            .field("identifier", &self.identifier)
            .field("component_no", &self.component_no)
            .field("status", &self.status)
            .field("applied_separator", &self.applied_separator)
            .finish_non_exhaustive()
    }
}

impl ComponentInstance {
    pub fn new(
        identifier: impl Into<String>,
        component_no: u64,
        options: ComponentOptions,
        color_group: Option<String>,
        segment: Box<dyn Segment>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            component_no,
            options,
            color_group,
            segment,
            status: String::new(),
            applied_separator: String::new(),
            strip_previous_separator: false,
            drawn_pass: None,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn component_no(&self) -> u64 {
        self.component_no
    }

    pub fn options(&self) -> &ComponentOptions {
        &self.options
    }

    pub fn color_group(&self) -> Option<&str> {
        self.color_group.as_deref()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn applied_separator(&self) -> &str {
        &self.applied_separator
    }

    /// Set when a transitional separator on either side claimed the boundary
    /// with the previous component.
    pub fn strip_previous_separator(&self) -> bool {
        self.strip_previous_separator
    }

    pub fn draw(
        &mut self,
        default_highlight: &str,
        ctx: &DrawContext<'_>,
    ) -> Result<&str, ComponentRenderError> {
        if self.drawn_pass == Some(ctx.pass) {
            return Ok(&self.status);
        }
        self.drawn_pass = Some(ctx.pass);

        self.status.clear();
        self.applied_separator.clear();
        self.strip_previous_separator = false;

        if let Some(cond) = &self.options.cond {
            match cond.evaluate(ctx.env) {
                Ok(true) => {}
                Ok(false) => return Ok(&self.status),
                Err(e) => return Err(self.error(RenderStage::Condition, e)),
            }
        }

        let produce_ctx = ProduceContext {
            env: ctx.env,
            focused: ctx.focused,
            options: &self.options,
        };
        let raw = match self.segment.produce(&produce_ctx) {
            Ok(raw) => raw,
            Err(e) => return Err(self.error(RenderStage::Produce, e)),
        };

        let text = match &self.options.fmt {
            Some(fmt) => match fmt(raw.as_deref().unwrap_or_default()) {
                Ok(text) => text,
                Err(e) => return Err(self.error(RenderStage::Format, e)),
            },
            None => raw,
        };
        let Some(text) = text.filter(|t| !t.is_empty()) else {
            return Ok(&self.status);
        };

        self.status = text;
        self.apply_icon();
        self.apply_case();
        self.apply_padding();
        self.apply_highlights(default_highlight, ctx.env);
        self.apply_section_separators();
        self.apply_separator();
        Ok(&self.status)
    }

    /// Remove whatever this pass appended after the text (default highlight
    /// suffix and trailing separator).
    pub fn strip_separator(&mut self) -> &str {
        if let Some(kept) = self
            .status
            .strip_suffix(self.applied_separator.as_str())
            .map(str::len)
        {
            self.status.truncate(kept);
        }
        self.applied_separator.clear();
        &self.status
    }

    fn error(&self, stage: RenderStage, error: anyhow::Error) -> ComponentRenderError {
        ComponentRenderError {
            component: self.identifier.clone(),
            component_no: self.component_no,
            stage,
            error,
        }
    }

    fn apply_icon(&mut self) {
        if !self.options.icons_enabled {
            return;
        }
        if let Some(icon) = &self.options.icon {
            self.status = format!("{icon} {}", self.status);
        }
    }

    fn apply_case(&mut self) {
        if markers::has_unescaped_escape(&self.status) {
            return;
        }
        if self.options.upper {
            self.status = self.status.to_uppercase();
        } else if self.options.lower {
            self.status = self.status.to_lowercase();
        }
    }

    fn apply_padding(&mut self) {
        let (left, right) = self.options.padding.sides();
        if let Some(left) = left {
            let at = markers::leading_highlight(&self.status).map_or(0, str::len);
            self.status.insert_str(at, &" ".repeat(left));
        }
        if let Some(right) = right {
            self.status.push_str(&" ".repeat(right));
        }
    }

    fn apply_highlights(&mut self, default_highlight: &str, env: &dyn Environment) {
        if let Some(group) = &self.color_group {
            self.status.insert_str(0, &env.highlight_escape(group));
        }
        if !self.options.separator.is_transitional() && markers::contains_highlight(&self.status) {
            // Restore the section highlight for whatever follows; tracked so
            // stripping the separator also drops it.
            self.status.push_str(default_highlight);
            self.applied_separator = default_highlight.to_string();
        }
        if !markers::starts_with_highlight(&self.status) {
            self.status.insert_str(0, default_highlight);
        }
    }

    fn apply_section_separators(&mut self) {
        let SeparatorOption::Transitional(pair) = &self.options.separator else {
            return;
        };
        if !pair.left.is_empty() {
            self.status
                .insert_str(0, &markers::transition(&pair.left, Transition::Entry));
            self.strip_previous_separator = true;
        }
        if !pair.right.is_empty() {
            self.status
                .push_str(&markers::transition(&pair.right, Transition::Exit));
            self.strip_previous_separator = true;
        }
    }

    fn apply_separator(&mut self) {
        let separator = match &self.options.separator {
            SeparatorOption::Plain(s) => s.as_str(),
            SeparatorOption::Transitional(pair) if pair.right.is_empty() => {
                self.options.slot_separator()
            }
            SeparatorOption::Transitional(_) => return,
        };
        if !separator.is_empty() {
            self.status.push_str(separator);
            self.applied_separator.push_str(separator);
        }
    }
}

/// Constructs components from specs: resolves options, builds the segment
/// (and child), allocates the identity and registers the custom color.
pub struct ComponentBuilder<'a> {
    pub global: &'a GlobalOptions,
    pub catalog: &'a SegmentCatalog,
    pub callbacks: &'a Callbacks,
    pub env: &'a dyn Environment,
    pub ids: &'a mut ComponentIds,
    pub highlights: &'a mut HighlightRegistry,
}

impl ComponentBuilder<'_> {
    pub fn build(&mut self, spec: &ComponentSpec, slot: Slot) -> Result<ComponentInstance, ConfigError> {
        let (component_no, options, segment) = self.construct(spec, slot)?;
        let color_group = options.color.as_ref().map(|color| {
            let context = HighlightContext {
                component_name: &options.component_name,
                slot,
            };
            self.highlights.group_for(color, &context, self.env)
        });
        tracing::debug!(
            target: "render.component",
            identifier = spec.name.as_str(),
            component_no,
            slot = %slot,
            "component_constructed"
        );
        Ok(ComponentInstance::new(
            spec.name.clone(),
            component_no,
            options,
            color_group,
            segment,
        ))
    }

    fn construct(
        &mut self,
        spec: &ComponentSpec,
        slot: Slot,
    ) -> Result<(u64, ComponentOptions, Box<dyn Segment>), ConfigError> {
        let component_no = self.ids.allocate();
        let unknown = || ConfigError::UnknownComponent {
            name: spec.name.clone(),
        };
        let defaults = self.catalog.defaults(&spec.name).ok_or_else(unknown)?;
        let tree = layered_options(self.global, defaults, &spec.options);
        let options = ComponentOptions::resolve(tree, slot, component_no, self.callbacks)?;
        let child = match &spec.child {
            Some(child) => Some(self.construct(child, slot)?.2),
            None => None,
        };
        let init = SegmentInit {
            options: &options,
            child,
        };
        let segment = self
            .catalog
            .build(&spec.name, init)
            .ok_or_else(unknown)?
            .map_err(|e| ConfigError::Build {
                name: spec.name.clone(),
                reason: format!("{e:#}"),
            })?;
        Ok((component_no, options, segment))
    }
}
