use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ydosbr::cfg::{self, Settings};
use ydosbr::logging;
use ydosbr::paths::Roots;
use ydosbr::plugin::{DefaultOptionsPlugin, HostPlugin, Outcome};
use ydosbr::repo::Report;
use ydosbr::ui;

/// Your default options shall be respected: seeds config directories with default files
#[derive(Parser)]
#[command(name = "ydosbr")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Application run directory (defaults to the current directory)
    #[arg(long, global = true)]
    run_dir: Option<PathBuf>,

    /// Config directory (defaults to <run-dir>/config)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Shared defaults base path (defaults to the environment variable named in settings)
    #[arg(long, global = true)]
    shared_base: Option<PathBuf>,

    /// Path to settings file (defaults to <config-dir>/ydosbr.toml)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply default options, as the host loader does before launch
    Prelaunch {
        /// Exit with an error if default options could not be applied
        #[arg(long)]
        strict: bool,
    },

    /// Show resolved locations and whether they exist
    Paths,

    /// Create or view the settings file
    Config {
        /// Write a default settings file
        #[arg(long)]
        init: bool,

        /// Overwrite an existing settings file
        #[arg(short, long)]
        force: bool,

        /// Show effective settings
        #[arg(long)]
        show: bool,
    },
}

/// Locations shared by every subcommand.
struct Dirs {
    run_dir: PathBuf,
    config_dir: PathBuf,
    shared_base: Option<PathBuf>,
    settings_path: PathBuf,
}

impl Dirs {
    fn from_cli(cli: &Cli) -> Result<Self> {
        let run_dir = match &cli.run_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().context("Failed to determine current directory")?,
        };
        let config_dir = cli
            .config_dir
            .clone()
            .unwrap_or_else(|| run_dir.join("config"));
        let settings_path = cli
            .settings
            .clone()
            .unwrap_or_else(|| cfg::default_path(&config_dir));

        Ok(Dirs {
            run_dir,
            config_dir,
            shared_base: cli.shared_base.clone(),
            settings_path,
        })
    }

    fn plugin(&self, settings: &Settings) -> DefaultOptionsPlugin {
        let layout = settings.layout();
        match &self.shared_base {
            Some(base) => DefaultOptionsPlugin::new(Roots::new(
                &self.run_dir,
                &self.config_dir,
                base,
                &layout,
            )),
            None => DefaultOptionsPlugin::from_env(
                &self.run_dir,
                &self.config_dir,
                &settings.environment.shared_base_var,
                &layout,
            ),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize UI module
    ui::init();

    if let Err(e) = run(cli) {
        ui::error(&format!("Error: {:#}", e));
        std::process::exit(1);
    }

    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let dirs = Dirs::from_cli(&cli)?;

    match cli.command {
        Commands::Config { init, force, show } => {
            cmd_config(&dirs.settings_path, init, force, show)
        }
        Commands::Prelaunch { strict } => {
            let settings = load_settings(&dirs, cli.verbose)?;
            cmd_prelaunch(&dirs, &settings, strict)
        }
        Commands::Paths => {
            let settings = load_settings(&dirs, cli.verbose)?;
            cmd_paths(&dirs, &settings)
        }
    }
}

fn load_settings(dirs: &Dirs, verbose: bool) -> Result<Settings> {
    let settings = cfg::load(&dirs.settings_path)?;
    logging::init(&settings.logging, verbose)?;
    Ok(settings)
}

fn cmd_prelaunch(dirs: &Dirs, settings: &Settings, strict: bool) -> Result<()> {
    let plugin = dirs.plugin(settings);

    match plugin.pre_launch() {
        Outcome::Applied(report) => {
            print_summary(&report);
            ui::success("Default options applied");
        }
        Outcome::Failed(e) => {
            if strict {
                return Err(e).context("Default options were not applied");
            }
            ui::warn(&format!("Default options were not applied: {}", e));
            ui::hint("The application can still start; fix the problem above and relaunch");
        }
    }

    Ok(())
}

fn cmd_paths(dirs: &Dirs, settings: &Settings) -> Result<()> {
    let roots = Roots::resolve(
        &dirs.run_dir,
        &dirs.config_dir,
        dirs.shared_base.as_deref(),
        &settings.environment.shared_base_var,
        &settings.layout(),
    )?;

    ui::section("Resolved locations");
    ui::location("Run directory", &roots.run_dir);
    ui::location("Config directory", &roots.config_dir);
    ui::location("Live config root", &roots.live_root());
    ui::location("Shared defaults", &roots.shared_dir);
    ui::location("Default options", &roots.default_options());
    ui::location("Settings file", &dirs.settings_path);

    Ok(())
}

fn cmd_config(settings_path: &Path, init: bool, force: bool, show: bool) -> Result<()> {
    if init {
        cfg::init(settings_path, force)?;
        ui::success(&format!("Settings written to {}", settings_path.display()));
    } else if show {
        let settings = cfg::load(settings_path)?;
        println!("{}", toml::to_string_pretty(&settings)?);
    } else {
        ui::hint("Use --init to create or --show to view the settings");
    }

    Ok(())
}

fn print_summary(report: &Report) {
    ui::section("Default Options Summary");

    if report.bootstrapped {
        ui::info("Live config restored from shared default options");
    }
    if report.persisted {
        ui::info("Shared default options created from live config");
    }
    if report.copy_stats.failed > 0 {
        ui::warn(&format!(
            "{} file(s) could not be copied, see log for details",
            report.copy_stats.failed
        ));
    }

    let mut counts = BTreeMap::new();
    for action in &report.actions {
        *counts.entry(action.mode).or_insert(0) += 1;
    }

    println!();
    for (mode, count) in &counts {
        println!("{}: {}", mode.color_str(), count);
    }

    // Print detailed table if not too long
    if !report.actions.is_empty() && report.actions.len() <= 20 {
        let arrow = "←".dimmed().to_string();
        let rows: Vec<Vec<String>> = report
            .actions
            .iter()
            .map(|action| {
                vec![
                    action.mode.color_str().to_string(),
                    format!(
                        "{} {} {}",
                        action.target.display(),
                        arrow,
                        action.source.display()
                    ),
                ]
            })
            .collect();

        println!();
        ui::print_table(&["Mode", "Path"], &rows);
    }
}
