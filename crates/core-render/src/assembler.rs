//! StatusLineAssembler: builds every component once from a `Config` and
//! renders full lines from them.
//!
//! Line layout: slots `a..z` in order, each drawn by `draw_section` with the
//! slot's default highlight (`lualine_<slot>_<mode>` when focused,
//! `lualine_<slot>_inactive` otherwise). The center divider `<hl c>%=` goes
//! before the first non-empty section after `c`, or at the end of the line
//! when the right half is empty and `always_divide_middle` is not `false`.
//!
//! Selection order for one buffer: disabled filetype (empty line), then the
//! first matching extension, then `sections` / `inactive_sections`.
//!
//! Construction never fails: invalid component specs are collected as
//! diagnostics and left out of their section.

use crate::component::{
    ComponentBuilder, ComponentIds, ComponentInstance, ComponentRenderError, DrawContext,
};
use crate::environment::Environment;
use crate::extension::{self, ExtensionCatalog};
use crate::highlight::HighlightRegistry;
use crate::markers;
use crate::options::Callbacks;
use crate::section::draw_section;
use crate::segment::SegmentCatalog;
use core_config::{Config, ConfigError, ExtensionDef, ExtensionSpec, GlobalOptions, SectionGroups, Slot};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

/// One rendered line and the component failures of that pass.
#[derive(Debug, Default)]
pub struct RenderedLine {
    pub text: String,
    pub errors: Vec<ComponentRenderError>,
}

impl RenderedLine {
    /// Painted width in columns; markers take no space.
    pub fn display_width(&self) -> usize {
        markers::visible_width(&self.text)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[derive(Debug, Default)]
struct SectionSet {
    slots: BTreeMap<Slot, Vec<ComponentInstance>>,
}

impl SectionSet {
    fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[derive(Debug)]
struct LoadedExtension {
    name: String,
    filetypes: Vec<String>,
    sections: SectionSet,
    inactive_sections: Option<SectionSet>,
}

impl LoadedExtension {
    fn sections_mut(&mut self, focused: bool) -> &mut SectionSet {
        match (focused, self.inactive_sections.as_mut()) {
            (false, Some(inactive)) => inactive,
            _ => &mut self.sections,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Target {
    Active,
    Inactive,
    Extension(usize),
}

#[derive(Debug)]
pub struct StatusLineAssembler {
    options: GlobalOptions,
    active: SectionSet,
    inactive: SectionSet,
    tabline: SectionSet,
    extensions: Vec<LoadedExtension>,
    highlights: HighlightRegistry,
    ids: ComponentIds,
    pass: u64,
    reported: HashSet<u64>,
    diagnostics: Vec<ConfigError>,
}

impl StatusLineAssembler {
    pub fn new(
        config: &Config,
        catalog: &SegmentCatalog,
        callbacks: &Callbacks,
        extension_catalog: &ExtensionCatalog,
        env: &dyn Environment,
    ) -> Self {
        let mut ids = ComponentIds::new();
        let mut highlights = HighlightRegistry::new();
        let mut diagnostics = Vec::new();

        let mut builder = ComponentBuilder {
            global: &config.options,
            catalog,
            callbacks,
            env,
            ids: &mut ids,
            highlights: &mut highlights,
        };
        let active = build_set(&mut builder, &config.sections, &mut diagnostics);
        let inactive = build_set(&mut builder, &config.inactive_sections, &mut diagnostics);
        let tabline = build_set(&mut builder, &config.tabline, &mut diagnostics);

        let mut extensions = Vec::with_capacity(config.extensions.len());
        for spec in &config.extensions {
            let def: &ExtensionDef = match spec {
                ExtensionSpec::Inline(def) => def,
                ExtensionSpec::Named(name) => match extension_catalog.get(name) {
                    Some(def) => def,
                    None => {
                        warn!(target: "render.assembler", extension = name.as_str(), "unknown_extension");
                        diagnostics.push(ConfigError::UnknownExtension { name: name.clone() });
                        continue;
                    }
                },
            };
            let sections = build_set(&mut builder, &def.sections, &mut diagnostics);
            let inactive_sections = def
                .inactive_sections
                .as_ref()
                .map(|groups| build_set(&mut builder, groups, &mut diagnostics));
            extensions.push(LoadedExtension {
                name: def.name.clone(),
                filetypes: def.filetypes.clone(),
                sections,
                inactive_sections,
            });
        }

        debug!(
            target: "render.assembler",
            extensions = extensions.len(),
            diagnostics = diagnostics.len(),
            "assembler_built"
        );
        Self {
            options: config.options.clone(),
            active,
            inactive,
            tabline,
            extensions,
            highlights,
            ids,
            pass: 0,
            reported: HashSet::new(),
            diagnostics,
        }
    }

    /// Construction-time problems (unknown components, bad options, unknown
    /// extensions).
    pub fn diagnostics(&self) -> &[ConfigError] {
        &self.diagnostics
    }

    pub fn highlights(&self) -> &HighlightRegistry {
        &self.highlights
    }

    pub fn options(&self) -> &GlobalOptions {
        &self.options
    }

    /// Number of components constructed, children included.
    pub fn component_count(&self) -> u64 {
        self.ids.allocated()
    }

    pub fn statusline(&mut self, env: &dyn Environment, focused: bool) -> RenderedLine {
        self.pass += 1;
        let filetype = env.filetype();
        if let Some(ft) = filetype.filter(|ft| self.options.disabled_filetypes.iter().any(|d| d.as_str() == *ft)) {
            debug!(target: "render.assembler", filetype = ft, "filetype_disabled");
            return RenderedLine::default();
        }

        let target = self
            .extensions
            .iter()
            .position(|ext| extension::matches(&ext.filetypes, filetype))
            .map(Target::Extension)
            .unwrap_or(if focused { Target::Active } else { Target::Inactive });

        let ctx = DrawContext {
            env,
            focused,
            pass: self.pass,
        };
        let set = match target {
            Target::Active => &mut self.active,
            Target::Inactive => &mut self.inactive,
            Target::Extension(idx) => {
                let ext = &mut self.extensions[idx];
                debug!(target: "render.assembler", extension = ext.name.as_str(), "extension_selected");
                ext.sections_mut(focused)
            }
        };
        let (line, _) = render_set(set, &self.options, &ctx);
        self.report(&line.errors);
        line
    }

    /// The tabline groups, always drawn as focused. Empty when none are
    /// configured or none of them drew anything.
    pub fn tabline(&mut self, env: &dyn Environment) -> RenderedLine {
        self.pass += 1;
        if self.tabline.is_empty() {
            return RenderedLine::default();
        }
        let ctx = DrawContext {
            env,
            focused: true,
            pass: self.pass,
        };
        let (mut line, drawn) = render_set(&mut self.tabline, &self.options, &ctx);
        self.report(&line.errors);
        if !drawn {
            line.text.clear();
        }
        line
    }

    fn report(&mut self, errors: &[ComponentRenderError]) {
        for error in errors {
            if self.reported.insert(error.component_no) {
                warn!(
                    target: "render.component",
                    component = error.component.as_str(),
                    component_no = error.component_no,
                    stage = %error.stage,
                    error = %format!("{:#}", error.error),
                    "component_render_failed"
                );
            }
        }
    }
}

fn build_set(
    builder: &mut ComponentBuilder<'_>,
    groups: &SectionGroups,
    diagnostics: &mut Vec<ConfigError>,
) -> SectionSet {
    let mut slots = BTreeMap::new();
    for (&slot, specs) in groups {
        let mut components = Vec::with_capacity(specs.len());
        for spec in specs {
            match builder.build(spec, slot) {
                Ok(component) => components.push(component),
                Err(e) => {
                    warn!(
                        target: "render.assembler",
                        component = spec.name.as_str(),
                        slot = %slot,
                        error = %e,
                        "component_skipped"
                    );
                    diagnostics.push(e);
                }
            }
        }
        slots.insert(slot, components);
    }
    SectionSet { slots }
}

fn default_group(slot: Slot, suffix: &str) -> String {
    format!("lualine_{}_{}", slot.letter(), suffix)
}

/// Renders every slot of `set`; the flag reports whether any section drew text.
fn render_set(
    set: &mut SectionSet,
    options: &GlobalOptions,
    ctx: &DrawContext<'_>,
) -> (RenderedLine, bool) {
    let suffix = if ctx.focused {
        ctx.env.mode().to_string()
    } else {
        "inactive".to_string()
    };
    let divider = || {
        let mut d = ctx.env.highlight_escape(&default_group(Slot::C, &suffix));
        d.push_str(markers::DIVIDER);
        d
    };

    let mut text = String::new();
    let mut errors = Vec::new();
    let mut divided = false;
    let mut drawn = false;
    for slot in Slot::ALL {
        let Some(components) = set.slots.get_mut(&slot) else {
            continue;
        };
        let default_highlight = ctx.env.highlight_escape(&default_group(slot, &suffix));
        let out = draw_section(
            components,
            slot,
            &default_highlight,
            &options.section_separators,
            ctx,
        );
        errors.extend(out.errors);
        if out.text.is_empty() {
            continue;
        }
        drawn = true;
        if !divided && slot > Slot::C {
            text.push_str(&divider());
            divided = true;
        }
        text.push_str(&out.text);
    }
    if !divided && options.always_divide_middle != Some(false) {
        text.push_str(&divider());
    }
    (RenderedLine { text, errors }, drawn)
}
