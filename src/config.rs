//! User settings (`config.toml`).
//!
//! ```toml
//! log_level = "info"
//!
//! [engine]
//! max_range_cells = 250000
//! ```

use directories::ProjectDirs;
use gridcalc_engine::engine::EvalOptions;
use serde::Deserialize;
use simplelog::LevelFilter;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub log_level: Option<String>,
    pub engine: EvalOptions,
}

impl Settings {
    /// Log level to install: `-v` wins, then the settings file, then `warn`.
    pub fn level_filter(&self, verbose: bool, warnings: &mut Vec<String>) -> LevelFilter {
        if verbose {
            return LevelFilter::Debug;
        }
        match self.log_level.as_deref().map(str::parse::<LevelFilter>) {
            Some(Ok(level)) => level,
            Some(Err(_)) => {
                warnings.push(format!(
                    "Unknown log_level {:?}, using warn",
                    self.log_level.as_deref().unwrap_or_default()
                ));
                LevelFilter::Warn
            }
            None => LevelFilter::Warn,
        }
    }
}

/// Load settings from `explicit`, or from the user config dir when no path is
/// given. Problems are reported as warnings and fall back to defaults.
pub fn load_settings(explicit: Option<&Path>) -> (Settings, Vec<String>) {
    let mut warnings = Vec::new();
    let path = explicit.map(Path::to_path_buf).or_else(user_config_path);

    let Some(path) = path else {
        return (Settings::default(), warnings);
    };
    if !path.exists() {
        if explicit.is_some() {
            warnings.push(format!("Config file not found: {}", path.display()));
        }
        return (Settings::default(), warnings);
    }

    let settings = match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str::<Settings>(&content) {
            Ok(settings) => settings,
            Err(err) => {
                warnings.push(format!("Failed to parse {}: {}", path.display(), err));
                Settings::default()
            }
        },
        Err(err) => {
            warnings.push(format!("Failed to read {}: {}", path.display(), err));
            Settings::default()
        }
    };
    (settings, warnings)
}

fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "gridcalc")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}
