//! Shared types, configuration and output parsing for nwgocc.

pub mod cli;
pub mod config;
pub mod instance;
pub mod status;
pub mod theme;
pub mod util;

pub use config::*;
pub use instance::{InstanceError, InstanceLock};
pub use theme::*;
pub use util::{program_in_path, DebugLevel};
