//! Status line configuration loading and normalization.
//!
//! A user configuration is a partial TOML tree (`oxline.toml`, or an override
//! path provided by the binary) with the top-level tables `options`,
//! `sections`, `inactive_sections`, `tabline` and the `extensions` list.
//! `normalize` merges it against the documented defaults:
//!
//! * options: deep merge, unknown keys pass through for components;
//! * section groups: per `lualine_*` key replacement, never element-wise;
//! * separators: shorthand coercion (`"s"`, `["s"]`, `["s", "t"]`, `[]`).
//!
//! Loading is resilient: a missing file yields defaults and a parse error
//! falls back to defaults with the error returned alongside, so the host can
//! surface it once at startup.

pub mod component_spec;
pub mod error;
pub mod normalize;
pub mod schema;
pub mod separators;

pub use component_spec::ComponentSpec;
pub use error::{ConfigError, DeprecatedOptionNotice};
pub use normalize::{
    Config, ExtensionDef, ExtensionSpec, GlobalOptions, Normalized, apply_configuration, normalize,
};
pub use schema::{SectionGroups, Slot};
pub use separators::SeparatorPair;

use anyhow::Result;
use std::{fs, path::PathBuf};
use tracing::info;

pub const CONFIG_FILE_NAME: &str = "oxline.toml";

#[derive(Debug)]
pub struct LoadedConfig {
    pub path: PathBuf,
    pub raw: Option<String>, // file contents as read, if any
    pub config: Config,
    pub errors: Vec<ConfigError>,
}

/// Best-effort config path following platform conventions (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    // Prefer a local `oxline.toml` before the platform config dir.
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("oxline").join(CONFIG_FILE_NAME);
    }
    PathBuf::from(CONFIG_FILE_NAME)
}

pub fn load_from(path: Option<PathBuf>) -> Result<LoadedConfig> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        info!(target: "config", path = %path.display(), "config_missing_using_defaults");
        return Ok(LoadedConfig {
            path,
            raw: None,
            config: Config::default(),
            errors: Vec::new(),
        });
    };
    match toml::from_str::<toml::Table>(&content) {
        Ok(user) => {
            let Normalized { config, errors } = normalize(&user);
            info!(
                target: "config",
                path = %path.display(),
                errors = errors.len(),
                notices = config.notices.len(),
                extensions = config.extensions.len(),
                "config_loaded"
            );
            Ok(LoadedConfig {
                path,
                raw: Some(content),
                config,
                errors,
            })
        }
        Err(e) => {
            // Parse error falls back to defaults; the error is surfaced once.
            tracing::warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed");
            Ok(LoadedConfig {
                path,
                raw: Some(content),
                config: Config::default(),
                errors: vec![ConfigError::Parse(e)],
            })
        }
    }
}
