//! Status line rendering: components, sections and full-line assembly.
//!
//! The crate turns a normalized `core_config::Config` into marker-annotated
//! strings (see `markers`) that a host paints. Nothing here touches a
//! terminal; host state is reached only through `Environment`.
//!
//! Layers, leaves first:
//! - `highlight`: registry of custom color groups, one host registration per
//!   distinct color spec.
//! - `options` / `segment`: typed per-component options and the segment
//!   capability that produces raw text.
//! - `component`: the per-pass decoration pipeline of a single component.
//! - `section`: one slot's components joined, with separator stripping.
//! - `assembler`: every slot, the center divider, inactive and extension
//!   selection, the tabline.
//!
//! Invariants:
//! - A pass id increases once per rendered line; a component draws at most
//!   once per pass.
//! - A failing component renders empty for that pass and never aborts the
//!   line; its error is reported once per session.
//! - Marker syntax is produced and recognized only by `markers`.

pub mod assembler;
pub mod component;
pub mod environment;
pub mod extension;
pub mod highlight;
pub mod markers;
pub mod options;
pub mod section;
pub mod segment;

pub use assembler::{RenderedLine, StatusLineAssembler};
pub use component::{
    ComponentBuilder, ComponentIds, ComponentInstance, ComponentRenderError, DrawContext,
    RenderStage,
};
pub use environment::Environment;
pub use extension::ExtensionCatalog;
pub use highlight::{ColorSpec, HighlightContext, HighlightRegistry};
pub use options::{Callbacks, ComponentOptions, Condition, Padding, SeparatorOption};
pub use section::{SectionOutput, draw_section};
pub use segment::{FnSegment, ProduceContext, Segment, SegmentCatalog, SegmentInit, TextSegment};
