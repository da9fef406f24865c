mod common;
use common::*;

use core_config::{ComponentSpec, ConfigError, ExtensionDef, SectionGroups, Slot};
use core_render::{Callbacks, ExtensionCatalog, RenderStage};
use pretty_assertions::assert_eq;
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::Level;
use tracing::subscriber::with_default;
use tracing_subscriber::fmt::MakeWriter;

#[test]
fn default_line_uses_mode_groups() {
    let env = TestEnv::default().with_mode("insert");
    let mut asm = assembler("", &echo_catalog(), &env);
    let line = asm.statusline(&env, true);
    assert_eq!(
        line.text,
        concat!(
            "%#lualine_a_insert# mode ",
            "%#lualine_b_insert# branch ",
            "%#lualine_c_insert# filename ",
            "%#lualine_c_insert#%=",
            "%#lualine_x_insert# encoding %#lualine_x_insert# fileformat %#lualine_x_insert# filetype ",
            "%#lualine_y_insert# progress ",
            "%#lualine_z_insert# location ",
        )
    );
    assert!(line.errors.is_empty());
    assert_eq!(
        line.display_width(),
        " mode  branch  filename  encoding  fileformat  filetype  progress  location ".len()
    );
}

#[test]
fn separators_frame_the_outer_sections() {
    let env = TestEnv::default();
    let src = r#"
[options]
component_separators = ["|", "/"]
section_separators = [">", "<"]

[sections]
lualine_a = ["mode"]
lualine_b = []
lualine_c = ["filename", "branch"]
lualine_x = ["encoding", "fileformat"]
lualine_y = []
lualine_z = ["location"]
"#;
    let mut asm = assembler(src, &echo_catalog(), &env);
    let line = asm.statusline(&env, true);
    assert_eq!(
        line.text,
        concat!(
            "%#lualine_a_normal# mode %S{>}",
            "%#lualine_c_normal# filename |%#lualine_c_normal# branch ",
            "%#lualine_c_normal#%=",
            "%#lualine_x_normal# encoding /%#lualine_x_normal# fileformat ",
            "%s{<}%#lualine_z_normal# location ",
        )
    );
}

#[test]
fn inline_extension_replaces_sections_for_its_filetype() {
    let src = r#"
extensions = [
  { name = "quickfix", filetypes = ["qf"], sections = { lualine_a = [{ name = "text", text = "Quickfix" }] }, inactive_sections = { lualine_c = [{ name = "text", text = "qf" }] } },
]
"#;
    let env = TestEnv::default().with_filetype("qf");
    let mut asm = assembler(src, &echo_catalog(), &env);

    let focused = asm.statusline(&env, true);
    assert_eq!(focused.text, "%#lualine_a_normal# Quickfix %#lualine_c_normal#%=");

    let unfocused = asm.statusline(&env, false);
    assert_eq!(
        unfocused.text,
        "%#lualine_c_inactive# qf %#lualine_c_inactive#%="
    );

    let rust = TestEnv::default().with_filetype("rust");
    let regular = asm.statusline(&rust, false);
    assert_eq!(
        regular.text,
        "%#lualine_c_inactive# filename %#lualine_c_inactive#%=%#lualine_x_inactive# location "
    );
}

#[test]
fn named_extension_resolves_from_catalog() {
    let mut extensions = ExtensionCatalog::new();
    extensions.register(ExtensionDef {
        name: "fugitive".into(),
        filetypes: vec!["fugitive".into()],
        sections: SectionGroups::from([(
            Slot::Z,
            vec![ComponentSpec::named("text").with_option("text", "Git")],
        )]),
        inactive_sections: None,
    });
    let env = TestEnv::default().with_filetype("fugitive");
    let src = "extensions = [\"fugitive\", \"nerdtree\"]\n";
    let mut asm = assembler_with(src, &echo_catalog(), &Callbacks::new(), &extensions, &env);

    assert!(matches!(
        asm.diagnostics(),
        [ConfigError::UnknownExtension { name }] if name == "nerdtree"
    ));
    // No inactive sections: the extension's sections govern both states.
    let expected = "%#lualine_c_inactive#%=%#lualine_z_inactive# Git ";
    assert_eq!(asm.statusline(&env, false).text, expected);
}

#[test]
fn tabline_renders_focused_groups() {
    let env = TestEnv::default().with_mode("visual");
    let src = "[tabline]\nlualine_a = [\"filename\"]\nlualine_z = [{ name = \"text\", text = \"tabs\" }]\n";
    let mut asm = assembler(src, &echo_catalog(), &env);
    let line = asm.tabline(&env);
    assert_eq!(
        line.text,
        "%#lualine_a_visual# filename %#lualine_c_visual#%=%#lualine_z_visual# tabs "
    );
}

#[test]
fn tabline_is_blank_until_a_group_draws() {
    let env = TestEnv::default();
    let src = "[tabline]\nlualine_a = [{ name = \"text\", text = \"+\", cond = \"modified\" }]\n";
    let mut asm = assembler(src, &echo_catalog(), &env);
    assert_eq!(asm.tabline(&env).text, "");

    env.modified.set(true);
    assert_eq!(
        asm.tabline(&env).text,
        "%#lualine_a_normal# + %#lualine_c_normal#%="
    );
}

#[test]
fn conditions_follow_buffer_state() {
    let env = TestEnv::default();
    let src = r#"
[sections]
lualine_a = [{ name = "text", text = "[+]", cond = "modified", padding = 0 }]
lualine_b = [{ name = "text", text = "wide", cond = { min_width = 100 } }]
lualine_c = []
lualine_x = []
lualine_y = []
lualine_z = []
"#;
    let mut asm = assembler(src, &echo_catalog(), &env);
    assert_eq!(asm.statusline(&env, true).text, "%#lualine_b_normal# wide %#lualine_c_normal#%=");

    env.modified.set(true);
    env.width.set(60);
    assert_eq!(asm.statusline(&env, true).text, "%#lualine_a_normal#[+]%#lualine_c_normal#%=");
}

#[derive(Clone)]
struct BufferWriter {
    inner: Arc<Mutex<Vec<u8>>>,
}

struct LockedWriter<'a> {
    guard: MutexGuard<'a, Vec<u8>>,
}

impl Write for LockedWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for BufferWriter {
    type Writer = LockedWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        LockedWriter {
            guard: self.inner.lock().expect("log buffer poisoned"),
        }
    }
}

#[test]
fn failing_component_is_isolated_and_logged_once() {
    let mut catalog = echo_catalog();
    catalog.register_fn("flaky", |_| Err(anyhow::anyhow!("backend unavailable")));
    let env = TestEnv::default();
    let src = "[sections]\nlualine_b = [\"flaky\", \"branch\"]\n";
    let mut asm = assembler(src, &catalog, &env);

    let buffer = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::WARN)
        .with_target(true)
        .with_ansi(false)
        .without_time()
        .with_writer(BufferWriter {
            inner: buffer.clone(),
        })
        .finish();

    let (first, second) = with_default(subscriber, || {
        (asm.statusline(&env, true), asm.statusline(&env, true))
    });

    for line in [&first, &second] {
        assert!(line.text.contains("%#lualine_b_normal# branch "));
        assert_eq!(line.errors.len(), 1);
        assert_eq!(line.errors[0].stage, RenderStage::Produce);
        assert_eq!(line.errors[0].component, "flaky");
    }
    let log_output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
    assert_eq!(log_output.matches("component_render_failed").count(), 1);
    assert!(log_output.contains("WARN render.component:"));
    assert!(log_output.contains("backend unavailable"));
}

#[test]
fn invalid_component_options_are_diagnosed() {
    let env = TestEnv::default();
    let src = "[sections]\nlualine_a = [{ name = \"mode\", padding = \"wide\" }, { name = \"mode\", fmt = \"missing\" }]\n";
    let mut asm = assembler(src, &echo_catalog(), &env);
    assert_eq!(asm.diagnostics().len(), 2);
    assert!(matches!(asm.diagnostics()[0], ConfigError::InvalidType { .. }));
    assert!(matches!(
        asm.diagnostics()[1],
        ConfigError::UnknownCallback { kind: "fmt", .. }
    ));
    assert!(!asm.statusline(&env, true).text.contains("lualine_a_normal"));
}
