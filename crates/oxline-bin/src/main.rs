//! oxline entrypoint: renders one status line (or tabline) for a buffer
//! described on the command line and prints the marker-annotated string.
mod segments;

use anyhow::Result;
use clap::Parser;
use core_config::{LoadedConfig, load_from};
use core_render::{ColorSpec, Environment, HighlightContext, StatusLineAssembler, markers};
use segments::BufferInfo;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Once;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;

const LOG_FILE: &str = "oxline.log";

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "oxline", version, about = "Render a configurable status line")]
struct Args {
    /// Optional configuration file path (overrides discovery of `oxline.toml`).
    #[arg(long = "config")]
    config: Option<PathBuf>,
    /// Editor mode name, used for the default highlight groups.
    #[arg(long, default_value = "normal")]
    mode: String,
    /// Path of the buffer being described.
    #[arg(long)]
    file: Option<PathBuf>,
    #[arg(long)]
    branch: Option<String>,
    /// Buffer filetype; guessed from the file extension when omitted.
    #[arg(long)]
    filetype: Option<String>,
    /// Window width in columns.
    #[arg(long, default_value_t = 120)]
    width: u16,
    #[arg(long, default_value_t = 1)]
    line: usize,
    #[arg(long, default_value_t = 1)]
    column: usize,
    /// Total number of lines in the buffer.
    #[arg(long, default_value_t = 1)]
    lines: usize,
    #[arg(long, default_value = "utf-8")]
    encoding: String,
    #[arg(long, default_value = "unix")]
    fileformat: String,
    /// Render the line of an unfocused window.
    #[arg(long)]
    inactive: bool,
    /// Render the tabline instead of the status line.
    #[arg(long)]
    tabline: bool,
    #[arg(long)]
    modified: bool,
    #[arg(long)]
    readonly: bool,
    /// Print painted text only, with every marker removed.
    #[arg(long)]
    plain: bool,
}

/// Host environment assembled from CLI flags.
struct CliEnvironment {
    width: u16,
    mode: String,
    filetype: Option<String>,
    modified: bool,
    readonly: bool,
    registered: RefCell<Vec<(String, ColorSpec)>>,
}

impl CliEnvironment {
    fn from_args(args: &Args) -> Self {
        let filetype = args
            .filetype
            .clone()
            .or_else(|| args.file.as_deref().and_then(guess_filetype));
        Self {
            width: args.width,
            mode: args.mode.to_lowercase(),
            filetype,
            modified: args.modified,
            readonly: args.readonly,
            registered: RefCell::new(Vec::new()),
        }
    }
}

impl Environment for CliEnvironment {
    fn display_width(&self) -> u16 {
        self.width
    }

    fn register_highlight_group(&self, color: &ColorSpec, context: &HighlightContext<'_>) -> String {
        let group = format!("lualine_{}_{}", context.slot.letter(), context.component_name);
        self.registered
            .borrow_mut()
            .push((group.clone(), color.clone()));
        group
    }

    fn is_buffer_modified(&self) -> bool {
        self.modified
    }

    fn is_buffer_readonly(&self) -> bool {
        self.readonly
    }

    fn mode(&self) -> &str {
        &self.mode
    }

    fn filetype(&self) -> Option<&str> {
        self.filetype.as_deref()
    }
}

fn guess_filetype(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?;
    let ft = match ext {
        "rs" => "rust",
        "py" => "python",
        "md" => "markdown",
        "js" => "javascript",
        "ts" => "typescript",
        "sh" => "bash",
        "h" => "c",
        "hpp" | "cc" => "cpp",
        other => other,
    };
    Some(ft.to_string())
}

struct AppStartup {
    log_guard: Option<WorkerGuard>,
}

impl AppStartup {
    fn new() -> Self {
        Self { log_guard: None }
    }

    fn configure_logging(&mut self) -> Result<()> {
        let log_dir = Path::new(".");
        let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
        let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
        match tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_ansi(false)
            .with_writer(nb_writer)
            .try_init()
        {
            Ok(_) => {
                self.log_guard = Some(guard);
            }
            Err(_err) => {
                // Global tracing subscriber already installed; drop guard so writer shuts down.
            }
        }
        Ok(())
    }

    fn install_panic_hook() {
        static HOOK: Once = Once::new();
        HOOK.call_once(|| {
            let default_panic = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                tracing::error!(target: "runtime.panic", ?info, "panic");
                default_panic(info);
            }));
        });
    }

    fn run(&mut self) -> Result<()> {
        self.configure_logging()?;
        Self::install_panic_hook();

        let args = Args::parse();
        info!(target: "runtime", config_override = args.config.is_some(), "startup");

        let LoadedConfig {
            path,
            config,
            errors,
            ..
        } = load_from(args.config.clone())?;
        for error in &errors {
            eprintln!("oxline: {}: {error}", path.display());
        }
        for notice in &config.notices {
            eprintln!("oxline: {notice}");
        }

        let info = Rc::new(BufferInfo {
            path: args.file.clone(),
            branch: args.branch.clone(),
            encoding: args.encoding.clone(),
            fileformat: args.fileformat.clone(),
            line: args.line,
            column: args.column,
            total_lines: args.lines.max(args.line),
        });
        let env = CliEnvironment::from_args(&args);
        let mut assembler = StatusLineAssembler::new(
            &config,
            &segments::catalog(info.clone()),
            &segments::callbacks(info),
            &segments::extensions(),
            &env,
        );
        for diagnostic in assembler.diagnostics() {
            eprintln!("oxline: {diagnostic}");
        }

        let line = if args.tabline {
            assembler.tabline(&env)
        } else {
            assembler.statusline(&env, !args.inactive)
        };
        for error in &line.errors {
            warn!(target: "runtime", %error, "render_error");
            eprintln!("oxline: {error}");
        }
        debug!(
            target: "runtime",
            width = line.display_width(),
            highlight_groups = env.registered.borrow().len(),
            "line_rendered"
        );

        if args.plain {
            println!("{}", markers::strip(&line.text));
        } else {
            println!("{}", line.text);
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    let mut startup = AppStartup::new();
    startup.run()
}
