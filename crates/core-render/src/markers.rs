//! Inline escape micro-format shared with the host.
//!
//! The rendered line is plain text with embedded markers the host interprets
//! while painting:
//!
//! | marker        | meaning                                                  |
//! |---------------|----------------------------------------------------------|
//! | `%#group#`    | activate highlight group `group`                          |
//! | `%s{glyph}`   | transitional separator, activates on entry to a component |
//! | `%S{glyph}`   | transitional separator, activates on exit of a component  |
//! | `%=`          | alignment point between the left and right halves         |
//! | `%%`          | literal `%`                                               |
//!
//! All construction and detection of markers goes through this module; the
//! pipeline never matches on raw `%` sequences itself.

use regex::Regex;
use std::sync::LazyLock;
use unicode_width::UnicodeWidthStr;

pub const HIGHLIGHT_PREFIX: &str = "%#";
pub const DIVIDER: &str = "%=";

static LEADING_HIGHLIGHT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^%#[^#]*#").expect("static regex"));
static ANY_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%#[^#]*#|%[sS]\{([^}]*)\}|%=|%%").expect("static regex"));

/// Which side of a component boundary a transitional separator activates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Entry,
    Exit,
}

pub fn highlight(group: &str) -> String {
    format!("{HIGHLIGHT_PREFIX}{group}#")
}

pub fn transition(glyph: &str, side: Transition) -> String {
    match side {
        Transition::Entry => format!("%s{{{glyph}}}"),
        Transition::Exit => format!("%S{{{glyph}}}"),
    }
}

pub fn contains_highlight(text: &str) -> bool {
    text.contains(HIGHLIGHT_PREFIX)
}

pub fn starts_with_highlight(text: &str) -> bool {
    text.starts_with(HIGHLIGHT_PREFIX)
}

/// The complete `%#group#` escape at the very start of `text`, if any.
pub fn leading_highlight(text: &str) -> Option<&str> {
    LEADING_HIGHLIGHT.find(text).map(|m| m.as_str())
}

/// True when `text` carries a host escape that is not a doubled `%%`.
/// Case transforms are skipped for such text.
pub fn has_unescaped_escape(text: &str) -> bool {
    text.contains('%') && !text.contains("%%")
}

/// Text with every marker removed; transitional glyphs and escaped `%` are
/// kept since they are painted.
pub fn strip(text: &str) -> String {
    ANY_MARKER
        .replace_all(text, |caps: &regex::Captures<'_>| {
            if let Some(glyph) = caps.get(1) {
                glyph.as_str().to_string()
            } else if &caps[0] == "%%" {
                "%".to_string()
            } else {
                String::new()
            }
        })
        .into_owned()
}

/// Terminal columns the painted text occupies.
pub fn visible_width(text: &str) -> usize {
    strip(text).width()
}
