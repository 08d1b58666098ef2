//! Program settings, read from `settings.toml` in the user's config directory.
use crate::get_config_dir;
use crate::input::{input_err_msg, read_toml};
use crate::log::{DEFAULT_LOG_LEVEL, parse_log_level};
use anyhow::{Context, Result};
use documented::DocumentedFields;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const SETTINGS_FILE_NAME: &str = "settings.toml";

/// Get the path to where the settings file will be read from
pub fn get_settings_file_path() -> PathBuf {
    get_config_dir().join(SETTINGS_FILE_NAME)
}

/// Program settings from config file
#[derive(Debug, DocumentedFields, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Log level used when RENEWABLE_COST_LOG_LEVEL is not set (off, error, warn, info, debug or
    /// trace)
    pub log_level: String,
    /// Replace the contents of an existing output folder without passing --overwrite
    pub overwrite: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            overwrite: false,
        }
    }
}

impl Settings {
    /// Read the program settings file, using defaults if there isn't one
    pub fn load() -> Result<Self> {
        Self::from_path(&get_settings_file_path())
    }

    /// Read settings from the given path, checking that the log level is one we know about
    fn from_path(file_path: &Path) -> Result<Self> {
        if !file_path.is_file() {
            return Ok(Self::default());
        }

        let settings: Self = read_toml(file_path)?;
        parse_log_level(&settings.log_level).with_context(|| input_err_msg(file_path))?;

        Ok(settings)
    }

    /// The contents of a placeholder settings file.
    ///
    /// Every setting appears commented out at its default value, preceded by its documentation.
    pub fn default_file_contents() -> String {
        let raw = toml::to_string(&Self::default()).expect("Could not convert settings to TOML");
        let defaults: toml::Table = toml::from_str(&raw).expect("Could not parse settings TOML");

        let body = defaults
            .iter()
            .map(|(field, value)| {
                let docs = Self::get_field_docs(field).expect("All settings have doc comments");
                let docs = docs
                    .lines()
                    .map(|line| format!("# # {}\n", line.trim()))
                    .collect::<String>();
                format!("\n{docs}# {field} = {value}\n")
            })
            .collect::<String>();

        format!("# Settings for renewable-cost. Uncomment a line to change it.\n{body}")
    }
}
