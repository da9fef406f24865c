//! Demonstration segments for the default sections, backed by buffer facts
//! given on the command line.

use anyhow::{Result, bail};
use core_config::{ComponentSpec, ExtensionDef, SectionGroups, Slot};
use core_render::{
    Callbacks, ComponentOptions, ExtensionCatalog, ProduceContext, Segment, SegmentCatalog,
    TextSegment,
};
use std::path::PathBuf;
use std::rc::Rc;

/// What the host knows about the buffer being described.
#[derive(Debug, Clone)]
pub struct BufferInfo {
    pub path: Option<PathBuf>,
    pub branch: Option<String>,
    pub encoding: String,
    pub fileformat: String,
    pub line: usize,
    pub column: usize,
    pub total_lines: usize,
}

impl Default for BufferInfo {
    fn default() -> Self {
        Self {
            path: None,
            branch: None,
            encoding: "utf-8".into(),
            fileformat: "unix".into(),
            line: 1,
            column: 1,
            total_lines: 1,
        }
    }
}

pub fn catalog(info: Rc<BufferInfo>) -> SegmentCatalog {
    let mut catalog = SegmentCatalog::new();
    catalog.register("mode", |_| Ok(ModeSegment));
    {
        let info = info.clone();
        catalog.register("branch", move |_| Ok(BranchSegment { info: info.clone() }));
    }
    {
        let info = info.clone();
        catalog.register("filename", move |init| FilenameSegment::from_options(init.options, info.clone()));
    }
    {
        let info = info.clone();
        catalog.register_fn("encoding", move |_| Ok(Some(info.encoding.clone())));
    }
    {
        let info = info.clone();
        catalog.register_fn("fileformat", move |_| Ok(Some(info.fileformat.clone())));
    }
    catalog.register_fn("filetype", |ctx| Ok(ctx.env.filetype().map(str::to_string)));
    {
        let info = info.clone();
        catalog.register_fn("progress", move |_| Ok(Some(progress(info.line, info.total_lines))));
    }
    catalog.register_fn("location", move |_| Ok(Some(location(info.line, info.column))));
    catalog.register("text", |init| Ok(TextSegment::from_options(init.options)));
    catalog
}

/// Callbacks usable from `cond` / `fmt` in the configuration.
pub fn callbacks(info: Rc<BufferInfo>) -> Callbacks {
    Callbacks::new()
        .with_condition("has_branch", move |_| Ok(info.branch.is_some()))
        .with_condition("has_filetype", |env| Ok(env.filetype().is_some()))
        .with_formatter("first_char", |s| Ok(s.chars().next().map(String::from)))
}

pub fn extensions() -> ExtensionCatalog {
    let mut catalog = ExtensionCatalog::new();
    catalog.register(ExtensionDef {
        name: "quickfix".into(),
        filetypes: vec!["qf".into()],
        sections: SectionGroups::from([
            (
                Slot::A,
                vec![ComponentSpec::named("text").with_option("text", "Quickfix List")],
            ),
            (Slot::Z, vec![ComponentSpec::named("location")]),
        ]),
        inactive_sections: None,
    });
    catalog.register(ExtensionDef {
        name: "help".into(),
        filetypes: vec!["help".into()],
        sections: SectionGroups::from([
            (Slot::A, vec![ComponentSpec::named("text").with_option("text", "HELP")]),
            (Slot::B, vec![ComponentSpec::named("filename").with_option("file_status", false)]),
            (Slot::Z, vec![ComponentSpec::named("progress")]),
        ]),
        inactive_sections: None,
    });
    catalog
}

struct ModeSegment;

impl Segment for ModeSegment {
    fn produce(&mut self, ctx: &ProduceContext<'_>) -> Result<Option<String>> {
        let name = match ctx.env.mode() {
            "normal" => "NORMAL".to_string(),
            "insert" => "INSERT".to_string(),
            "visual" => "VISUAL".to_string(),
            "visual_line" => "V-LINE".to_string(),
            "replace" => "REPLACE".to_string(),
            "command" => "COMMAND".to_string(),
            other => other.to_uppercase(),
        };
        Ok(Some(name))
    }
}

struct BranchSegment {
    info: Rc<BufferInfo>,
}

impl Segment for BranchSegment {
    fn default_options() -> toml::Table {
        let mut defaults = toml::Table::new();
        defaults.insert("icon".into(), "\u{e0a0}".into());
        defaults
    }

    fn produce(&mut self, _ctx: &ProduceContext<'_>) -> Result<Option<String>> {
        Ok(self.info.branch.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PathStyle {
    Name,
    AsGiven,
    Absolute,
}

struct FilenameSegment {
    info: Rc<BufferInfo>,
    style: PathStyle,
    file_status: bool,
    modified_symbol: String,
    readonly_symbol: String,
}

impl FilenameSegment {
    fn from_options(options: &ComponentOptions, info: Rc<BufferInfo>) -> Result<Self> {
        let style = match options.extra.get("path").and_then(toml::Value::as_integer) {
            None | Some(0) => PathStyle::Name,
            Some(1) => PathStyle::AsGiven,
            Some(2) => PathStyle::Absolute,
            Some(other) => bail!("`path` must be 0, 1 or 2, got {other}"),
        };
        let file_status = options
            .extra
            .get("file_status")
            .and_then(toml::Value::as_bool)
            .unwrap_or(true);
        let symbol = |key: &str, default: &str| {
            options
                .extra
                .get("symbols")
                .and_then(|s| s.get(key))
                .and_then(toml::Value::as_str)
                .unwrap_or(default)
                .to_string()
        };
        Ok(Self {
            info,
            style,
            file_status,
            modified_symbol: symbol("modified", "[+]"),
            readonly_symbol: symbol("readonly", "[-]"),
        })
    }

    fn display_path(&self) -> String {
        let Some(path) = self.info.path.as_ref() else {
            return "[No Name]".to_string();
        };
        match self.style {
            PathStyle::Name => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            PathStyle::AsGiven => path.display().to_string(),
            PathStyle::Absolute => std::path::absolute(path)
                .unwrap_or_else(|_| path.clone())
                .display()
                .to_string(),
        }
    }
}

impl Segment for FilenameSegment {
    fn produce(&mut self, ctx: &ProduceContext<'_>) -> Result<Option<String>> {
        // `%` in file names must survive as a literal.
        let mut text = self.display_path().replace('%', "%%");
        if self.file_status {
            if ctx.env.is_buffer_modified() {
                text.push(' ');
                text.push_str(&self.modified_symbol);
            }
            if ctx.env.is_buffer_readonly() {
                text.push(' ');
                text.push_str(&self.readonly_symbol);
            }
        }
        Ok(Some(text))
    }
}

fn progress(line: usize, total: usize) -> String {
    if line <= 1 {
        "Top".to_string()
    } else if line >= total {
        "Bot".to_string()
    } else {
        format!("{}%%", line * 100 / total.max(1))
    }
}

fn location(line: usize, column: usize) -> String {
    format!("{line:>3}:{column:<2}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_config::Config;
    use core_render::{ColorSpec, Environment, HighlightContext, StatusLineAssembler};
    use pretty_assertions::assert_eq;

    struct Env {
        modified: bool,
        filetype: Option<&'static str>,
    }

    impl Environment for Env {
        fn display_width(&self) -> u16 {
            100
        }
        fn register_highlight_group(&self, _c: &ColorSpec, ctx: &HighlightContext<'_>) -> String {
            ctx.component_name.to_string()
        }
        fn is_buffer_modified(&self) -> bool {
            self.modified
        }
        fn is_buffer_readonly(&self) -> bool {
            false
        }
        fn filetype(&self) -> Option<&str> {
            self.filetype
        }
    }

    #[test]
    fn progress_and_location_formats() {
        assert_eq!(progress(1, 100), "Top");
        assert_eq!(progress(100, 100), "Bot");
        assert_eq!(progress(25, 100), "25%%");
        assert_eq!(location(7, 3), "  7:3 ");
    }

    #[test]
    fn default_sections_render_with_demo_segments() {
        let info = Rc::new(BufferInfo {
            path: Some(PathBuf::from("src/main.rs")),
            branch: Some("main".into()),
            line: 50,
            column: 12,
            total_lines: 200,
            ..BufferInfo::default()
        });
        let env = Env {
            modified: true,
            filetype: Some("rust"),
        };
        let mut asm = StatusLineAssembler::new(
            &Config::default(),
            &catalog(info.clone()),
            &callbacks(info),
            &extensions(),
            &env,
        );
        assert!(asm.diagnostics().is_empty());
        let line = asm.statusline(&env, true);
        assert_eq!(
            line.text,
            concat!(
                "%#lualine_a_normal# NORMAL ",
                "%#lualine_b_normal# \u{e0a0} main ",
                "%#lualine_c_normal# main.rs [+] ",
                "%#lualine_c_normal#%=",
                "%#lualine_x_normal# utf-8 %#lualine_x_normal# unix %#lualine_x_normal# rust ",
                "%#lualine_y_normal# 25%% ",
                "%#lualine_z_normal#  50:12 ",
            )
        );
    }

    #[test]
    fn quickfix_extension_applies() {
        let info = Rc::new(BufferInfo::default());
        let env = Env {
            modified: false,
            filetype: Some("qf"),
        };
        let user: toml::Table = toml::from_str("extensions = [\"quickfix\"]").unwrap();
        let config = core_config::normalize(&user).config;
        let mut asm = StatusLineAssembler::new(
            &config,
            &catalog(info.clone()),
            &callbacks(info),
            &extensions(),
            &env,
        );
        let line = asm.statusline(&env, true);
        assert_eq!(
            line.text,
            "%#lualine_a_normal# Quickfix List %#lualine_c_normal#%=%#lualine_z_normal#   1:1  "
        );
    }

    #[test]
    fn invalid_filename_path_option_is_reported() {
        let info = Rc::new(BufferInfo::default());
        let env = Env {
            modified: false,
            filetype: None,
        };
        let user: toml::Table =
            toml::from_str("[sections]\nlualine_c = [{ name = \"filename\", path = 5 }]").unwrap();
        let config = core_config::normalize(&user).config;
        let asm = StatusLineAssembler::new(
            &config,
            &catalog(info.clone()),
            &callbacks(info),
            &extensions(),
            &env,
        );
        assert!(matches!(
            asm.diagnostics(),
            [core_config::ConfigError::Build { name, .. }] if name == "filename"
        ));
    }
}
