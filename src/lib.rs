//! ydosbr - Your default options shall be respected.
//!
//! Seeds an application's config directory with default files on first run
//! and keeps a copy of those defaults in a shared cache so they survive
//! reinstalls. This library provides:
//! - Root location resolution
//! - Tree copying and the default options reconciliation pass
//! - The host plugin entry point
//! - Settings, logging and terminal output for the CLI

pub mod cfg;
pub mod logging;
pub mod paths;
pub mod plugin;
pub mod repo;
pub mod ui;
