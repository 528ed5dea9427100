//! Resolution of the three root locations a reconciliation pass works on.
//!
//! The host supplies the run and config directories; the shared defaults
//! base comes from an environment variable unless given explicitly.

use std::env;
use std::path::{Path, PathBuf};

use crate::repo::ReconcileError;

/// Environment variable holding the shared defaults base path.
pub const DEFAULT_SHARED_BASE_VAR: &str = "APPDATA";

/// Folder name used for both the live config root and the shared cache.
pub const DEFAULT_FOLDER: &str = "ydosbr";

pub const OPTIONS_FILE: &str = "options.txt";
pub const CONFIG_SUBDIR: &str = "config";
pub const DEFAULT_OPTIONS_DIR: &str = "defaultoptions";

/// Fixed folder names of the managed layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Name of the live config root inside the config directory.
    pub live_folder: String,
    /// Name of the cache folder inside the shared defaults base.
    pub shared_folder: String,
}

impl Default for Layout {
    fn default() -> Self {
        Layout {
            live_folder: DEFAULT_FOLDER.to_string(),
            shared_folder: DEFAULT_FOLDER.to_string(),
        }
    }
}

/// Resolved directory handles for one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roots {
    pub run_dir: PathBuf,
    pub config_dir: PathBuf,
    /// `<shared base>/<shared folder>`
    pub shared_dir: PathBuf,
    live_folder: String,
}

impl Roots {
    /// Build roots from an already known shared base path.
    pub fn new(
        run_dir: impl Into<PathBuf>,
        config_dir: impl Into<PathBuf>,
        shared_base: impl AsRef<Path>,
        layout: &Layout,
    ) -> Self {
        Roots {
            run_dir: run_dir.into(),
            config_dir: config_dir.into(),
            shared_dir: shared_base.as_ref().join(&layout.shared_folder),
            live_folder: layout.live_folder.clone(),
        }
    }

    /// Build roots, reading the shared base from `var`.
    pub fn from_env(
        run_dir: impl Into<PathBuf>,
        config_dir: impl Into<PathBuf>,
        var: &str,
        layout: &Layout,
    ) -> Result<Self, ReconcileError> {
        let base = env::var_os(var).ok_or_else(|| ReconcileError::MissingSharedBase {
            var: var.to_string(),
        })?;
        Ok(Self::new(run_dir, config_dir, PathBuf::from(base), layout))
    }

    /// Explicit base wins; otherwise fall back to the environment.
    pub fn resolve(
        run_dir: impl Into<PathBuf>,
        config_dir: impl Into<PathBuf>,
        shared_base: Option<&Path>,
        var: &str,
        layout: &Layout,
    ) -> Result<Self, ReconcileError> {
        match shared_base {
            Some(base) => Ok(Self::new(run_dir, config_dir, base, layout)),
            None => Self::from_env(run_dir, config_dir, var, layout),
        }
    }

    /// `<config dir>/ydosbr`
    pub fn live_root(&self) -> PathBuf {
        self.config_dir.join(&self.live_folder)
    }

    /// `<config dir>/ydosbr/config`
    pub fn live_config(&self) -> PathBuf {
        self.live_root().join(CONFIG_SUBDIR)
    }

    /// `<config dir>/ydosbr/options.txt`
    pub fn options_file(&self) -> PathBuf {
        self.live_root().join(OPTIONS_FILE)
    }

    /// `<shared base>/ydosbr/defaultoptions`
    pub fn default_options(&self) -> PathBuf {
        self.shared_dir.join(DEFAULT_OPTIONS_DIR)
    }

    pub fn live_folder(&self) -> &str {
        &self.live_folder
    }
}
