//! Command tracing gated by the process-wide debug level.

use std::sync::atomic::{AtomicU8, Ordering};

use nwgocc_core::DebugLevel;
use tracing::{error, info, warn};

static DEBUG_LEVEL: AtomicU8 = AtomicU8::new(DebugLevel::Off as u8);

pub fn set_level(level: DebugLevel) {
    DEBUG_LEVEL.store(level as u8, Ordering::Relaxed);
}

pub fn level() -> DebugLevel {
    DebugLevel::from_u8(DEBUG_LEVEL.load(Ordering::Relaxed))
}

pub fn allows(level: DebugLevel) -> bool {
    let current = self::level();
    current != DebugLevel::Off && current >= level
}

pub fn log(level: DebugLevel, message: impl FnOnce() -> String) {
    if !allows(level) {
        return;
    }
    let message = message();
    match level {
        DebugLevel::Critical => error!(debug_level = ?level, message = %message, "nwgocc debug"),
        DebugLevel::Warn => warn!(debug_level = ?level, message = %message, "nwgocc debug"),
        DebugLevel::Info | DebugLevel::Verbose | DebugLevel::Off => {
            info!(debug_level = ?level, message = %message, "nwgocc debug")
        }
    }
}
