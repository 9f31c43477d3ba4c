//! Shared helper utilities: program lookup, log sanitizing, session and
//! network interface probing.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, OnceLock};

struct ProgramCache {
    // PATH snapshot the cached results were computed against.
    path: Option<String>,
    results: HashMap<String, bool>,
}

static PROGRAM_CACHE: OnceLock<Mutex<ProgramCache>> = OnceLock::new();
const DEFAULT_LOG_LIMIT: usize = 160;
const DIAGNOSTIC_LOG_LIMIT: usize = 512;

/// Verbosity of the extra command tracing enabled with `--debug`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum DebugLevel {
    #[default]
    Off = 0,
    Critical = 1,
    Warn = 2,
    Info = 3,
    Verbose = 4,
}

impl DebugLevel {
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => DebugLevel::Critical,
            2 => DebugLevel::Warn,
            3 => DebugLevel::Info,
            4 => DebugLevel::Verbose,
            _ => DebugLevel::Off,
        }
    }
}

/// Check whether a program exists in $PATH, caching results per PATH value.
pub fn program_in_path(program: &str) -> bool {
    if program.contains(std::path::MAIN_SEPARATOR) {
        return Path::new(program).is_file();
    }
    let current_path = env::var("PATH").ok();
    let cache = PROGRAM_CACHE.get_or_init(|| {
        Mutex::new(ProgramCache {
            path: None,
            results: HashMap::new(),
        })
    });
    if let Ok(mut cache) = cache.lock() {
        if cache.path.as_deref() != current_path.as_deref() {
            cache.path = current_path.clone();
            cache.results.clear();
        }
        if let Some(result) = cache.results.get(program) {
            return *result;
        }
    }

    let found = current_path
        .as_ref()
        .map(|paths| env::split_paths(paths).any(|dir| dir.join(program).is_file()))
        .unwrap_or(false);

    if let Ok(mut cache) = cache.lock() {
        if cache.path.as_deref() == current_path.as_deref() {
            cache.results.insert(program.to_string(), found);
        }
    }

    found
}

/// Returns true when `NWGOCC_DIAGNOSTIC` asks for longer log snippets.
pub fn diagnostic_mode() -> bool {
    diagnostic_mode_from(env::var("NWGOCC_DIAGNOSTIC").ok().as_deref())
}

fn diagnostic_mode_from(value: Option<&str>) -> bool {
    matches!(
        value
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase()
            .as_str(),
        "1" | "true" | "yes" | "on"
    )
}

pub fn log_limit() -> usize {
    log_limit_for(diagnostic_mode())
}

fn log_limit_for(diagnostic: bool) -> usize {
    if diagnostic {
        DIAGNOSTIC_LOG_LIMIT
    } else {
        DEFAULT_LOG_LIMIT
    }
}

/// Strips newlines and caps length so command output stays on one log line.
pub fn sanitize_log_value(value: &str, max_len: usize) -> String {
    if max_len == 0 {
        return String::new();
    }
    let mut cleaned = String::with_capacity(max_len.min(value.len()));
    let mut truncated = false;
    for (count, ch) in value.chars().enumerate() {
        if count >= max_len {
            truncated = true;
            break;
        }
        cleaned.push(if ch == '\n' || ch == '\r' { ' ' } else { ch });
    }
    let trimmed = cleaned.trim();
    if truncated {
        format!("{trimmed}...")
    } else {
        trimmed.to_string()
    }
}

pub fn log_snippet(value: &str) -> String {
    sanitize_log_value(value, log_limit())
}

/// Layer-shell placement only works on Wayland compositors.
pub fn is_wayland_session() -> bool {
    is_wayland_from(
        env::var("XDG_SESSION_TYPE").ok().as_deref(),
        env::var_os("WAYLAND_DISPLAY").is_some(),
    )
}

fn is_wayland_from(session_type: Option<&str>, wayland_display: bool) -> bool {
    session_type.is_some_and(|value| value.eq_ignore_ascii_case("wayland")) || wayland_display
}

/// Network interface names under `sys_class_net`, sorted, loopback excluded.
pub fn list_interfaces(sys_class_net: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(sys_class_net) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .flatten()
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name != "lo")
        .collect();
    names.sort();
    names
}

pub fn interface_is_up(sys_class_net: &Path, name: &str) -> bool {
    if name.is_empty() {
        return false;
    }
    fs::read_to_string(sys_class_net.join(name).join("operstate"))
        .map(|state| state.trim() == "up")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_log_value_strips_newlines_and_caps() {
        assert_eq!(sanitize_log_value("ab\ncd\rEF", 5), "ab cd...");
        assert_eq!(sanitize_log_value("ok", 5), "ok");
        assert_eq!(sanitize_log_value("exact", 5), "exact");
        assert_eq!(sanitize_log_value("anything", 0), "");
    }

    #[test]
    fn diagnostic_mode_parses_expected_values() {
        assert!(diagnostic_mode_from(Some("1")));
        assert!(diagnostic_mode_from(Some("YES")));
        assert!(diagnostic_mode_from(Some(" on ")));
        assert!(!diagnostic_mode_from(Some("false")));
        assert!(!diagnostic_mode_from(None));
    }

    #[test]
    fn log_limit_respects_mode() {
        assert_eq!(log_limit_for(false), DEFAULT_LOG_LIMIT);
        assert_eq!(log_limit_for(true), DIAGNOSTIC_LOG_LIMIT);
    }

    #[test]
    fn debug_levels_are_ordered() {
        assert!(DebugLevel::Verbose > DebugLevel::Info);
        assert!(DebugLevel::Critical > DebugLevel::Off);
        assert_eq!(DebugLevel::from_u8(DebugLevel::Warn as u8), DebugLevel::Warn);
        assert_eq!(DebugLevel::from_u8(42), DebugLevel::Off);
    }

    #[test]
    fn wayland_detection() {
        assert!(is_wayland_from(Some("Wayland"), false));
        assert!(is_wayland_from(Some("x11"), true));
        assert!(!is_wayland_from(Some("x11"), false));
        assert!(!is_wayland_from(None, false));
    }

    #[test]
    fn interfaces_are_listed_and_probed() {
        let root = tempfile::tempdir().expect("tempdir");
        for (name, state) in [("wlan0", "up\n"), ("lo", "unknown\n"), ("eth0", "down\n")] {
            let dir = root.path().join(name);
            fs::create_dir_all(&dir).expect("iface dir");
            fs::write(dir.join("operstate"), state).expect("operstate");
        }
        assert_eq!(list_interfaces(root.path()), vec!["eth0", "wlan0"]);
        assert!(interface_is_up(root.path(), "wlan0"));
        assert!(!interface_is_up(root.path(), "eth0"));
        assert!(!interface_is_up(root.path(), ""));
        assert!(!interface_is_up(root.path(), "missing0"));
    }

    #[test]
    fn absolute_program_paths_are_checked_directly() {
        assert!(program_in_path("/bin/sh"));
        assert!(!program_in_path("/nonexistent/nwgocc-missing"));
    }
}
