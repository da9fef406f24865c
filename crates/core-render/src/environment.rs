//! Host editor capabilities consumed by the renderer.
//!
//! The renderer never paints or queries window state itself; everything
//! editor-specific flows through this trait. Methods take `&self`: a host
//! that needs to mutate on `register_highlight_group` uses interior
//! mutability, since render passes are strictly serial.

use crate::highlight::{ColorSpec, HighlightContext};
use crate::markers;

pub trait Environment {
    /// Width in columns of the window the line is drawn for.
    fn display_width(&self) -> u16;

    /// Escape activating `group`.
    fn highlight_escape(&self, group: &str) -> String {
        markers::highlight(group)
    }

    /// Define a highlight group for `color` and return its identifier.
    fn register_highlight_group(&self, color: &ColorSpec, context: &HighlightContext<'_>) -> String;

    fn is_buffer_modified(&self) -> bool;

    fn is_buffer_readonly(&self) -> bool;

    /// Lowercase editor mode name used in default highlight groups.
    fn mode(&self) -> &str {
        "normal"
    }

    /// Filetype of the buffer the line belongs to.
    fn filetype(&self) -> Option<&str> {
        None
    }
}
