//! Section assembly: one slot's components concatenated into one string.
//!
//! Separator rules applied here, after every component has drawn:
//! * a component drawing a transitional separator on either side strips
//!   the nearest previous non-empty component's separator;
//! * the last non-empty component never keeps a trailing separator;
//! * slots `a`/`b` close with the exit marker of `section_separators.left`,
//!   slots `y`/`z` open with the entry marker of `section_separators.right`,
//!   unless the boundary component already draws a transitional separator.
//!
//! A component whose draw fails is treated as empty; its error is returned
//! alongside the text so one faulty component never blanks the line.

use crate::component::{ComponentInstance, ComponentRenderError, DrawContext};
use crate::markers::{self, Transition};
use core_config::{SeparatorPair, Slot};

#[derive(Debug, Default)]
pub struct SectionOutput {
    pub text: String,
    pub errors: Vec<ComponentRenderError>,
}

pub fn draw_section(
    components: &mut [ComponentInstance],
    slot: Slot,
    default_highlight: &str,
    section_separators: &SeparatorPair,
    ctx: &DrawContext<'_>,
) -> SectionOutput {
    let mut errors = Vec::new();
    let mut shown = Vec::with_capacity(components.len());
    for (idx, component) in components.iter_mut().enumerate() {
        match component.draw(default_highlight, ctx) {
            Ok(status) if !status.is_empty() => shown.push(idx),
            Ok(_) => {}
            Err(e) => errors.push(e),
        }
    }

    for pair in shown.windows(2) {
        if components[pair[1]].strip_previous_separator() {
            components[pair[0]].strip_separator();
        }
    }
    let (Some(&first), Some(&last)) = (shown.first(), shown.last()) else {
        return SectionOutput {
            text: String::new(),
            errors,
        };
    };
    components[last].strip_separator();

    let body: String = shown.iter().map(|&idx| components[idx].status()).collect();
    let mut text = String::with_capacity(body.len() + default_highlight.len() + 8);
    if slot >= Slot::Y
        && !section_separators.right.is_empty()
        && !components[first].options().separator.is_transitional()
    {
        text.push_str(&markers::transition(&section_separators.right, Transition::Entry));
    }
    if !markers::starts_with_highlight(&body) {
        text.push_str(default_highlight);
    }
    text.push_str(&body);
    if slot <= Slot::B
        && !section_separators.left.is_empty()
        && !components[last].options().separator.is_transitional()
    {
        text.push_str(&markers::transition(&section_separators.left, Transition::Exit));
    }
    SectionOutput { text, errors }
}
