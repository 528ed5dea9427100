use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths::{Layout, DEFAULT_FOLDER, DEFAULT_SHARED_BASE_VAR};

/// Name of the optional settings file inside the config directory.
pub const SETTINGS_FILE: &str = "ydosbr.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub layout: LayoutConfig,

    #[serde(default)]
    pub environment: EnvironmentConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LayoutConfig {
    #[serde(default = "default_folder")]
    pub live_folder: String,

    #[serde(default = "default_folder")]
    pub shared_folder: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnvironmentConfig {
    /// Environment variable holding the shared defaults base path
    #[serde(default = "default_shared_base_var")]
    pub shared_base_var: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Filter directive, e.g. "info" or "ydosbr=debug"
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default)]
    pub json: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            live_folder: default_folder(),
            shared_folder: default_folder(),
        }
    }
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        EnvironmentConfig {
            shared_base_var: default_shared_base_var(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_level(),
            json: false,
        }
    }
}

impl Settings {
    pub fn layout(&self) -> Layout {
        Layout {
            live_folder: self.layout.live_folder.clone(),
            shared_folder: self.layout.shared_folder.clone(),
        }
    }
}

fn default_folder() -> String {
    DEFAULT_FOLDER.to_string()
}

fn default_shared_base_var() -> String {
    DEFAULT_SHARED_BASE_VAR.to_string()
}

fn default_level() -> String {
    "info".to_string()
}

/// Default settings path for a config directory.
pub fn default_path(config_dir: &Path) -> PathBuf {
    config_dir.join(SETTINGS_FILE)
}

/// Loads settings, falling back to defaults when the file does not exist.
pub fn load(settings_path: &Path) -> Result<Settings> {
    if !settings_path.exists() {
        return Ok(Settings::default());
    }

    let contents = fs::read_to_string(settings_path)
        .with_context(|| format!("Failed to read settings file {}", settings_path.display()))?;
    let settings: Settings = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse settings file {}", settings_path.display()))?;

    validate(&settings)?;
    Ok(settings)
}

pub fn save(settings_path: &Path, settings: &Settings) -> Result<()> {
    let toml_string = toml::to_string_pretty(settings).context("Failed to serialize settings")?;
    fs::write(settings_path, toml_string).context("Failed to write settings file")?;
    Ok(())
}

/// Writes a default settings file.
pub fn init(settings_path: &Path, force: bool) -> Result<()> {
    if settings_path.exists() && !force {
        anyhow::bail!(
            "Settings already exist at {}. Use --force to overwrite.",
            settings_path.display()
        );
    }

    if let Some(parent) = settings_path.parent() {
        fs::create_dir_all(parent).context("Failed to create settings directory")?;
    }

    save(settings_path, &Settings::default())
}

fn validate(settings: &Settings) -> Result<()> {
    for (key, value) in [
        ("layout.live_folder", &settings.layout.live_folder),
        ("layout.shared_folder", &settings.layout.shared_folder),
    ] {
        // Folder names are joined onto roots, so they must be a single component.
        if value.is_empty() || value.contains(['/', '\\']) || value == "." || value == ".." {
            anyhow::bail!("Invalid {}: {:?} must be a plain folder name", key, value);
        }
    }

    if settings.environment.shared_base_var.is_empty() {
        anyhow::bail!("environment.shared_base_var must not be empty");
    }

    Ok(())
}
