use std::fs;
use std::path::Path;
use tracing::{debug, error};
use walkdir::{DirEntry, WalkDir};

use super::ReconcileError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyStats {
    pub copied: usize,
    pub failed: usize,
}

impl CopyStats {
    pub(crate) fn absorb(&mut self, other: CopyStats) {
        self.copied += other.copied;
        self.failed += other.failed;
    }
}

/// Copies every regular file under `source` into `target`, overwriting
/// existing files. Only creating `target` itself is fatal; a file that fails
/// to copy is logged and counted.
pub fn copy_tree(source: &Path, target: &Path) -> Result<CopyStats, ReconcileError> {
    fs::create_dir_all(target).map_err(|e| ReconcileError::CreateDir {
        path: target.to_path_buf(),
        source: e,
    })?;

    let mut stats = CopyStats::default();

    for entry in WalkDir::new(source).follow_links(false).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                error!(source = %source.display(), error = %e, "Error walking default options");
                stats.failed += 1;
                continue;
            }
        };

        if !is_regular_file(&entry) {
            continue;
        }

        match copy_entry(source, target, entry.path()) {
            Ok(()) => stats.copied += 1,
            Err(e) => {
                error!(file = %entry.path().display(), error = %e, "Error copying file");
                stats.failed += 1;
            }
        }
    }

    Ok(stats)
}

/// Regular files, including symlinks that resolve to one. Directory links
/// are not descended into.
pub(crate) fn is_regular_file(entry: &DirEntry) -> bool {
    entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
}

fn copy_entry(source_root: &Path, target_root: &Path, file: &Path) -> std::io::Result<()> {
    let rel_path = file
        .strip_prefix(source_root)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    let target_path = target_root.join(rel_path);

    if let Some(parent) = target_path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::copy(file, &target_path)?;
    debug!(file = %rel_path.display(), "Copied file");
    Ok(())
}
