//! Host-facing entry points.
//!
//! The host loader calls [`HostPlugin::pre_launch`] once, before anything
//! else initializes. Failures are logged here and never reach the host.

use std::path::PathBuf;
use thiserror::Error;
use tracing::{error, info};

use crate::paths::{Layout, Roots};
use crate::repo::{self, ReconcileError, Report};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdapterError {
    #[error("ydosbr does not create entrypoint instances ({mod_id}: {value})")]
    Unsupported { mod_id: String, value: String },
}

/// Result of a pre-launch hook as seen by the host.
#[derive(Debug)]
pub enum Outcome {
    Applied(Report),
    Failed(ReconcileError),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Applied(_))
    }
}

/// Contract a host loader expects from a plugin.
pub trait HostPlugin {
    /// Runs at the pre-launch stage. Must not panic or propagate errors.
    fn pre_launch(&self) -> Outcome;

    /// Adapter-style instance creation. Not part of the default options flow.
    fn create(&self, mod_id: &str, value: &str) -> Result<(), AdapterError>;
}

/// Plugin that reconciles default options for one set of roots.
#[derive(Debug, Clone)]
pub struct DefaultOptionsPlugin {
    source: RootsSource,
}

#[derive(Debug, Clone)]
enum RootsSource {
    Resolved(Roots),
    /// Shared base read from an environment variable when the hook runs.
    Env {
        run_dir: PathBuf,
        config_dir: PathBuf,
        var: String,
        layout: Layout,
    },
}

impl DefaultOptionsPlugin {
    pub fn new(roots: Roots) -> Self {
        DefaultOptionsPlugin {
            source: RootsSource::Resolved(roots),
        }
    }

    /// Defers the environment lookup to [`HostPlugin::pre_launch`], so a
    /// missing variable is reported by the hook and construction never fails.
    pub fn from_env(
        run_dir: impl Into<PathBuf>,
        config_dir: impl Into<PathBuf>,
        var: &str,
        layout: &Layout,
    ) -> Self {
        DefaultOptionsPlugin {
            source: RootsSource::Env {
                run_dir: run_dir.into(),
                config_dir: config_dir.into(),
                var: var.to_string(),
                layout: layout.clone(),
            },
        }
    }

    pub fn resolve(&self) -> Result<Roots, ReconcileError> {
        match &self.source {
            RootsSource::Resolved(roots) => Ok(roots.clone()),
            RootsSource::Env {
                run_dir,
                config_dir,
                var,
                layout,
            } => Roots::from_env(run_dir, config_dir, var, layout),
        }
    }
}

impl HostPlugin for DefaultOptionsPlugin {
    fn pre_launch(&self) -> Outcome {
        info!("Applying default options...");

        let result = self.resolve().and_then(|roots| repo::reconcile(&roots));

        match result {
            Ok(report) => {
                info!(
                    copied = report.count(repo::AppliedMode::Copied),
                    kept = report.count(repo::AppliedMode::Kept),
                    bootstrapped = report.bootstrapped,
                    persisted = report.persisted,
                    "Default options applied"
                );
                Outcome::Applied(report)
            }
            Err(e) => {
                error!(error = %e, "Failed to apply default options");
                Outcome::Failed(e)
            }
        }
    }

    fn create(&self, mod_id: &str, value: &str) -> Result<(), AdapterError> {
        Err(AdapterError::Unsupported {
            mod_id: mod_id.to_string(),
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_pre_launch_success() {
        let temp = TempDir::new().unwrap();
        let roots = Roots::new(
            temp.path().join("run"),
            temp.path().join("run/config"),
            temp.path().join("shared"),
            &Layout::default(),
        );
        let plugin = DefaultOptionsPlugin::new(roots.clone());

        let outcome = plugin.pre_launch();

        assert!(outcome.is_success());
        assert!(roots.default_options().is_dir());
    }

    #[test]
    fn test_pre_launch_missing_env_is_swallowed() {
        let temp = TempDir::new().unwrap();
        let plugin = DefaultOptionsPlugin::from_env(
            temp.path(),
            temp.path().join("config"),
            "YDOSBR_PLUGIN_TEST_NEVER_SET",
            &Layout::default(),
        );

        match plugin.pre_launch() {
            Outcome::Failed(ReconcileError::MissingSharedBase { var }) => {
                assert_eq!(var, "YDOSBR_PLUGIN_TEST_NEVER_SET");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(!temp.path().join("config").exists());
    }

    #[test]
    #[serial]
    fn test_env_is_read_when_hook_runs() {
        let temp = TempDir::new().unwrap();
        let var = "YDOSBR_PLUGIN_TEST_LATE_BASE";
        std::env::remove_var(var);
        let plugin = DefaultOptionsPlugin::from_env(
            temp.path().join("run"),
            temp.path().join("run/config"),
            var,
            &Layout::default(),
        );
        assert!(matches!(
            plugin.resolve(),
            Err(ReconcileError::MissingSharedBase { .. })
        ));

        std::env::set_var(var, temp.path().join("shared"));
        let outcome = plugin.pre_launch();
        std::env::remove_var(var);

        assert!(outcome.is_success());
        assert!(temp.path().join("shared/ydosbr/defaultoptions").is_dir());
    }

    #[test]
    fn test_pre_launch_failure_is_swallowed() {
        let temp = TempDir::new().unwrap();
        // Config directory path is occupied by a file.
        fs::write(temp.path().join("config"), "not a directory").unwrap();
        let plugin = DefaultOptionsPlugin::new(Roots::new(
            temp.path(),
            temp.path().join("config"),
            temp.path().join("shared"),
            &Layout::default(),
        ));

        let outcome = plugin.pre_launch();

        assert!(matches!(outcome, Outcome::Failed(ReconcileError::CreateDir { .. })));
    }

    #[test]
    fn test_create_always_fails() {
        let temp = TempDir::new().unwrap();
        let plugin = DefaultOptionsPlugin::new(Roots::new(
            temp.path(),
            temp.path(),
            temp.path(),
            &Layout::default(),
        ));

        let err = plugin.create("ydosbr", "main").unwrap_err();
        assert_eq!(
            err,
            AdapterError::Unsupported {
                mod_id: "ydosbr".to_string(),
                value: "main".to_string()
            }
        );
    }
}
