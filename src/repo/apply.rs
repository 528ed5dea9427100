use colored::*;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::info;

use super::ReconcileError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedAction {
    pub mode: AppliedMode,
    pub target: PathBuf,
    pub source: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AppliedMode {
    /// Default copied to a target that did not exist yet.
    Copied,
    /// Target already existed and was left alone.
    Kept,
    /// The default file itself had vanished and was recreated empty.
    Recreated,
}

impl AppliedMode {
    pub fn label(&self) -> &'static str {
        match self {
            AppliedMode::Copied => "Copied",
            AppliedMode::Kept => "Kept",
            AppliedMode::Recreated => "Recreated",
        }
    }

    pub fn color_str(&self) -> ColoredString {
        match self {
            AppliedMode::Copied => self.label().green(),
            AppliedMode::Kept => self.label().dimmed(),
            AppliedMode::Recreated => self.label().yellow(),
        }
    }
}

/// Applies one default file to its live location. An existing target is
/// never overwritten.
pub fn apply_one(target: &Path, default_file: &Path) -> Result<AppliedAction, ReconcileError> {
    ensure_parent(target)?;
    ensure_parent(default_file)?;

    let action = |mode| AppliedAction {
        mode,
        target: target.to_path_buf(),
        source: default_file.to_path_buf(),
    };

    if !default_file.exists() {
        touch(default_file)?;
        return Ok(action(AppliedMode::Recreated));
    }

    // Any entry counts, including a dangling symlink.
    if fs::symlink_metadata(target).is_ok() {
        return Ok(action(AppliedMode::Kept));
    }

    info!(
        file = %target.display(),
        from = %default_file.display(),
        "Applying default options"
    );
    fs::copy(default_file, target).map_err(|e| ReconcileError::Apply {
        source_path: default_file.to_path_buf(),
        target: target.to_path_buf(),
        source: e,
    })?;

    Ok(action(AppliedMode::Copied))
}

/// Creates `path` as an empty file unless it already exists. Existing
/// content is preserved.
pub(crate) fn touch(path: &Path) -> Result<(), ReconcileError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map(drop)
        .map_err(|e| ReconcileError::CreateFile {
            path: path.to_path_buf(),
            source: e,
        })
}

fn ensure_parent(path: &Path) -> Result<(), ReconcileError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| ReconcileError::CreateDir {
                path: parent.to_path_buf(),
                source: e,
            })
        }
        _ => Ok(()),
    }
}
