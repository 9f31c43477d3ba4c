//! Path resolution, on-disk defaults, and file I/O for nwgocc settings.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::{DEFAULT_CLI_COMMANDS, DEFAULT_STYLE_CSS, DEFAULT_TEMPLATES_JSON};

use super::{IconSet, Settings, Templates};

/// System-wide directory shipped by packages with default files and icons.
pub const SYSTEM_DATA_DIR: &str = "/usr/share/nwgocc";

const APP_DIR: &str = "nwgocc";
const PREFERENCES_FILE: &str = "preferences.json";
const CLI_COMMANDS_FILE: &str = "cli_commands";
const SYSTEM_TEMPLATES_FILE: &str = "config.json";
const SYSTEM_STYLE_FILE: &str = "style.css";
const ICON_DIRS: [&str; 2] = ["icons_light", "icons_dark"];
const MISSING_ICON: &str = "icon-missing.svg";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {reason}", path.display())]
    ReadFailed { path: PathBuf, reason: String },
    #[error("failed to write {}: {reason}", path.display())]
    WriteFailed { path: PathBuf, reason: String },
    #[error("failed to parse {}: {reason}", path.display())]
    ParseFailed { path: PathBuf, reason: String },
    #[error("failed to serialize settings: {0}")]
    SerializeFailed(String),
    #[error("missing $HOME, unable to resolve config directory")]
    MissingHome,
}

/// Resolved locations of every file the application reads or writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
    pub templates_file: PathBuf,
    pub style_file: PathBuf,
}

impl AppPaths {
    /// Resolve paths from the XDG environment, falling back to `$HOME`.
    pub fn resolve(templates_name: &str, style_name: &str) -> Result<Self, ConfigError> {
        let config_dir = xdg_dir("XDG_CONFIG_HOME", &[".config"])?;
        let data_dir = xdg_dir("XDG_DATA_HOME", &[".local", "share"])?;
        Ok(Self::from_dirs(config_dir, data_dir, templates_name, style_name))
    }

    pub fn from_dirs(
        config_dir: PathBuf,
        data_dir: PathBuf,
        templates_name: &str,
        style_name: &str,
    ) -> Self {
        let templates_file = resolve_path(&config_dir, templates_name);
        let style_file = resolve_path(&config_dir, style_name);
        Self {
            config_dir,
            data_dir,
            templates_file,
            style_file,
        }
    }

    pub fn preferences_path(&self) -> PathBuf {
        self.data_dir.join(PREFERENCES_FILE)
    }

    pub fn cli_commands_path(&self) -> PathBuf {
        self.config_dir.join(CLI_COMMANDS_FILE)
    }

    pub fn icons_dir(&self, icon_set: IconSet) -> Option<PathBuf> {
        icon_set.icons_dir(&self.data_dir)
    }

    /// Placeholder shown when an icon cannot be found anywhere.
    pub fn missing_icon_path(&self) -> PathBuf {
        self.data_dir.join(ICON_DIRS[0]).join(MISSING_ICON)
    }

    /// Create the config and data directories and fill in missing files.
    ///
    /// With `restore` set, every default file is overwritten. Files come from
    /// `system_dir` when it has them, otherwise from the embedded defaults.
    pub fn setup_dirs(&self, restore: bool, system_dir: &Path) -> Result<(), ConfigError> {
        create_dir(&self.config_dir)?;
        create_dir(&self.data_dir)?;

        let defaults_json = serde_json::to_string_pretty(&Settings::default())
            .map_err(|err| ConfigError::SerializeFailed(err.to_string()))?;
        let files: [(PathBuf, &str, &str); 4] = [
            (self.cli_commands_path(), CLI_COMMANDS_FILE, DEFAULT_CLI_COMMANDS),
            (self.templates_file.clone(), SYSTEM_TEMPLATES_FILE, DEFAULT_TEMPLATES_JSON),
            (self.style_file.clone(), SYSTEM_STYLE_FILE, DEFAULT_STYLE_CSS),
            (self.preferences_path(), PREFERENCES_FILE, defaults_json.as_str()),
        ];
        for (dst, system_name, embedded) in files {
            if dst.exists() && !restore {
                continue;
            }
            let src = system_dir.join(system_name);
            if src.is_file() {
                copy_file(&src, &dst)?;
            } else {
                write_file(&dst, embedded)?;
            }
        }

        for name in ICON_DIRS {
            let dst_dir = self.data_dir.join(name);
            create_dir(&dst_dir)?;
            let Ok(entries) = fs::read_dir(system_dir.join(name)) else {
                continue;
            };
            for entry in entries.flatten() {
                let src = entry.path();
                if !src.is_file() {
                    continue;
                }
                let dst = dst_dir.join(entry.file_name());
                if dst.exists() && !restore {
                    continue;
                }
                copy_file(&src, &dst)?;
            }
        }
        Ok(())
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut settings: Settings = read_json(path)?;
        settings.preferences.clamp_ranges();
        Ok(settings)
    }

    /// Load settings, logging and falling back to defaults on failure.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(err) => {
                warn!(?err, "using default preferences");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        write_json(path, self)
    }
}

impl Templates {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        read_json(path)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        write_json(path, self)
    }
}

/// Read the raw CLI commands file; a missing file reads as empty.
pub fn load_cli_commands(path: &Path) -> Result<String, ConfigError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(err) => Err(ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: err.to_string(),
        }),
    }
}

pub fn save_cli_commands(path: &Path, text: &str) -> Result<(), ConfigError> {
    write_file(path, text)
}

fn xdg_dir(var: &str, home_suffix: &[&str]) -> Result<PathBuf, ConfigError> {
    if let Some(dir) = env::var_os(var).filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(dir).join(APP_DIR));
    }
    let home = env::var_os("HOME")
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::MissingHome)?;
    let mut path = PathBuf::from(home);
    path.extend(home_suffix);
    Ok(path.join(APP_DIR))
}

fn resolve_path(base: &Path, value: &str) -> PathBuf {
    let path = PathBuf::from(value);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|err| ConfigError::ReadFailed {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    serde_json::from_str(&contents).map_err(|err| ConfigError::ParseFailed {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ConfigError> {
    let mut contents = serde_json::to_string_pretty(value)
        .map_err(|err| ConfigError::SerializeFailed(err.to_string()))?;
    contents.push('\n');
    write_file(path, &contents)
}

fn write_file(path: &Path, contents: &str) -> Result<(), ConfigError> {
    fs::write(path, contents).map_err(|err| ConfigError::WriteFailed {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    info!(path = %path.display(), "wrote file");
    Ok(())
}

fn copy_file(src: &Path, dst: &Path) -> Result<(), ConfigError> {
    fs::copy(src, dst).map_err(|err| ConfigError::WriteFailed {
        path: dst.to_path_buf(),
        reason: err.to_string(),
    })?;
    info!(src = %src.display(), dst = %dst.display(), "copied file");
    Ok(())
}

fn create_dir(dir: &Path) -> Result<(), ConfigError> {
    if dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|err| ConfigError::WriteFailed {
        path: dir.to_path_buf(),
        reason: err.to_string(),
    })?;
    info!(dir = %dir.display(), "created directory");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Shortcut;

    fn paths_in(root: &Path) -> AppPaths {
        AppPaths::from_dirs(
            root.join("config"),
            root.join("data"),
            "config.json",
            "style.css",
        )
    }

    #[test]
    fn setup_writes_embedded_defaults_without_system_dir() {
        let root = tempfile::tempdir().expect("tempdir");
        let paths = paths_in(root.path());
        paths
            .setup_dirs(false, &root.path().join("no-system"))
            .expect("setup dirs");

        assert_eq!(
            fs::read_to_string(paths.cli_commands_path()).expect("cli commands"),
            DEFAULT_CLI_COMMANDS
        );
        assert_eq!(
            fs::read_to_string(&paths.style_file).expect("style"),
            DEFAULT_STYLE_CSS
        );
        assert!(Templates::load(&paths.templates_file).is_ok());
        assert_eq!(
            Settings::load(&paths.preferences_path()).expect("preferences"),
            Settings::default()
        );
        assert!(paths.data_dir.join("icons_light").is_dir());
        assert!(paths.data_dir.join("icons_dark").is_dir());
    }

    #[test]
    fn setup_keeps_user_files_unless_restoring() {
        let root = tempfile::tempdir().expect("tempdir");
        let paths = paths_in(root.path());
        let system = root.path().join("system");
        fs::create_dir_all(system.join("icons_dark")).expect("system dir");
        fs::write(system.join("style.css"), "window {}").expect("system style");
        fs::write(system.join("icons_dark").join("user.svg"), "<svg/>").expect("icon");

        paths.setup_dirs(false, &system).expect("first setup");
        fs::write(&paths.style_file, "label {}").expect("user style");

        paths.setup_dirs(false, &system).expect("second setup");
        assert_eq!(fs::read_to_string(&paths.style_file).expect("style"), "label {}");

        paths.setup_dirs(true, &system).expect("restore");
        assert_eq!(fs::read_to_string(&paths.style_file).expect("style"), "window {}");
        assert!(paths.data_dir.join("icons_dark").join("user.svg").is_file());
    }

    #[test]
    fn settings_and_templates_survive_save_and_load() {
        let root = tempfile::tempdir().expect("tempdir");
        let mut settings = Settings::default();
        settings.preferences.dont_close = true;
        settings.preferences.interface_name = "wlan0".to_string();
        let prefs = root.path().join("preferences.json");
        settings.save(&prefs).expect("save settings");
        assert_eq!(Settings::load(&prefs).expect("load settings"), settings);

        let templates = Templates {
            custom_rows: vec![Shortcut {
                name: "Files".to_string(),
                cmd: "thunar".to_string(),
                icon: "folder".to_string(),
            }],
            buttons: Vec::new(),
        };
        let file = root.path().join("config.json");
        templates.save(&file).expect("save templates");
        assert_eq!(Templates::load(&file).expect("load templates"), templates);
    }

    #[test]
    fn load_reports_parse_errors_and_defaults_recover() {
        let root = tempfile::tempdir().expect("tempdir");
        let prefs = root.path().join("preferences.json");
        fs::write(&prefs, "{ not json").expect("write");
        assert!(matches!(
            Settings::load(&prefs),
            Err(ConfigError::ParseFailed { .. })
        ));
        assert_eq!(Settings::load_or_default(&prefs), Settings::default());
    }

    #[test]
    fn missing_cli_commands_file_reads_empty() {
        let root = tempfile::tempdir().expect("tempdir");
        let path = root.path().join("cli_commands");
        assert_eq!(load_cli_commands(&path).expect("load"), "");
        save_cli_commands(&path, "uname -r\n").expect("save");
        assert_eq!(load_cli_commands(&path).expect("load"), "uname -r\n");
    }

    #[test]
    fn absolute_names_are_kept() {
        let paths = AppPaths::from_dirs(
            PathBuf::from("/cfg"),
            PathBuf::from("/data"),
            "/etc/nwgocc.json",
            "alt.css",
        );
        assert_eq!(paths.templates_file, PathBuf::from("/etc/nwgocc.json"));
        assert_eq!(paths.style_file, PathBuf::from("/cfg/alt.css"));
        assert_eq!(
            paths.missing_icon_path(),
            PathBuf::from("/data/icons_light/icon-missing.svg")
        );
    }
}
