//! Default options reconciliation.
//!
//! One pass runs four steps against the resolved [`Roots`]:
//! - bootstrap the live config root from the shared `defaultoptions` cache
//! - ensure `options.txt` and the nested `config` directory exist
//! - apply every default file to its live location without overwriting
//! - snapshot the live root into the shared cache if no snapshot exists yet

pub mod apply;
pub mod copy;

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::paths::Roots;

pub use apply::{apply_one, AppliedAction, AppliedMode};
pub use copy::{copy_tree, CopyStats};

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("shared defaults base is not set (environment variable {var} is missing)")]
    MissingSharedBase { var: String },

    #[error("could not create directory: {}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not create file: {}", .path.display())]
    CreateFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("illegal default config file: {}", .path.display())]
    IllegalDefaultFile { path: PathBuf },

    #[error("failed to apply {} to {}", .source_path.display(), .target.display())]
    Apply {
        source_path: PathBuf,
        target: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to walk {}", .root.display())]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Outcome of a successful pass.
#[derive(Debug, Clone, Default)]
pub struct Report {
    /// Live root was seeded from the shared cache.
    pub bootstrapped: bool,
    pub actions: Vec<AppliedAction>,
    /// Shared cache was created from the live root.
    pub persisted: bool,
    /// Counts from the bulk copies (bootstrap and persist).
    pub copy_stats: CopyStats,
}

impl Report {
    pub fn count(&self, mode: AppliedMode) -> usize {
        self.actions.iter().filter(|a| a.mode == mode).count()
    }
}

/// A default file together with the live path it applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedApply {
    pub target: PathBuf,
    pub default_file: PathBuf,
}

/// Runs one reconciliation pass.
pub fn reconcile(roots: &Roots) -> Result<Report, ReconcileError> {
    let mut report = Report::default();
    let live_root = roots.live_root();
    let default_options = roots.default_options();

    if !live_root.exists() {
        warn!(
            shared = %roots.shared_dir.display(),
            "Live config not found, falling back to default options"
        );
        if default_options.exists() {
            info!("Default options found, copying them into the live config root");
            report.copy_stats.absorb(copy_tree(&default_options, &live_root)?);
            report.bootstrapped = true;
        } else {
            warn!(
                shared = %roots.shared_dir.display(),
                "Default options not found, they will be created"
            );
        }
    }

    ensure_structure(roots)?;

    for planned in plan(roots)? {
        report
            .actions
            .push(apply_one(&planned.target, &planned.default_file)?);
    }

    if !default_options.exists() {
        info!(path = %default_options.display(), "Creating default options");
        report.copy_stats.absorb(copy_tree(&live_root, &default_options)?);
        report.persisted = true;
        info!("Default options created");
    } else {
        info!(path = %default_options.display(), "Default options found");
    }

    Ok(report)
}

/// Creates the live root, its `options.txt` marker and the nested `config`
/// directory.
pub fn ensure_structure(roots: &Roots) -> Result<(), ReconcileError> {
    create_dir(&roots.live_root())?;
    apply::touch(&roots.options_file())?;
    create_dir(&roots.live_config())
}

/// Lists every file under the live root with its target, in walk order.
///
/// All targets are resolved before anything is applied so an illegal file
/// stops the pass before the first write.
pub fn plan(roots: &Roots) -> Result<Vec<PlannedApply>, ReconcileError> {
    let live_root = roots.live_root();
    let mut planned = Vec::new();

    for entry in WalkDir::new(&live_root).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|e| ReconcileError::Walk {
            root: live_root.clone(),
            source: e,
        })?;
        if !copy::is_regular_file(&entry) {
            continue;
        }

        let default_file = entry.into_path();
        planned.push(PlannedApply {
            target: resolve_target(roots, &default_file)?,
            default_file,
        });
    }

    Ok(planned)
}

/// Maps a file under the live root to its live location.
///
/// Files under the nested `config` directory land in the config directory;
/// anything else lands in the run directory, relative to the live root.
pub fn resolve_target(roots: &Roots, file: &Path) -> Result<PathBuf, ReconcileError> {
    let illegal = || ReconcileError::IllegalDefaultFile {
        path: file.to_path_buf(),
    };

    if let Ok(rel) = file.strip_prefix(roots.live_config()) {
        if starts_with_folder(rel, roots.live_folder()) {
            return Err(illegal());
        }
        return Ok(roots.config_dir.join(rel));
    }

    let rel = file.strip_prefix(roots.live_root()).map_err(|_| illegal())?;
    Ok(roots.run_dir.join(rel))
}

fn starts_with_folder(rel: &Path, folder: &str) -> bool {
    match rel.components().next() {
        Some(Component::Normal(first)) => same_folder_name(first, folder),
        _ => false,
    }
}

// Windows file systems treat names case-insensitively.
#[cfg(windows)]
fn same_folder_name(name: &OsStr, folder: &str) -> bool {
    name.to_string_lossy().to_lowercase() == folder.to_lowercase()
}

#[cfg(not(windows))]
fn same_folder_name(name: &OsStr, folder: &str) -> bool {
    name == folder
}

fn create_dir(path: &Path) -> Result<(), ReconcileError> {
    fs::create_dir_all(path).map_err(|e| ReconcileError::CreateDir {
        path: path.to_path_buf(),
        source: e,
    })
}
