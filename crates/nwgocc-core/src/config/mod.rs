//! Configuration module wiring for nwgocc.
//!
//! Keeps the settings schema, user templates, and file I/O in separate files.

mod config_io;
mod config_types;
mod templates;

pub use config_io::{load_cli_commands, save_cli_commands, AppPaths, ConfigError, SYSTEM_DATA_DIR};
pub use config_types::*;
pub use templates::*;
