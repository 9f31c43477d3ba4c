//! Icon lookup for rows, sliders and buttons.
//!
//! Names resolve against the selected custom icon set first, then the GTK
//! icon theme; absolute paths load the file directly.

use std::path::{Path, PathBuf};

use gtk::gdk;
use gtk::prelude::*;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconSource {
    Themed(String),
    File(PathBuf),
}

/// Decide where an icon comes from without touching GTK.
pub fn resolve_icon_source(
    name: &str,
    icons_dir: Option<&Path>,
    missing: &Path,
    theme_has: impl Fn(&str) -> bool,
) -> IconSource {
    if name.starts_with('/') {
        let path = Path::new(name);
        if path.is_file() {
            return IconSource::File(path.to_path_buf());
        }
        return IconSource::File(missing.to_path_buf());
    }
    let Some(dir) = icons_dir else {
        return IconSource::Themed(name.to_string());
    };
    let candidate = dir.join(format!("{name}.svg"));
    if candidate.is_file() {
        IconSource::File(candidate)
    } else if theme_has(name) {
        IconSource::Themed(name.to_string())
    } else {
        IconSource::File(missing.to_path_buf())
    }
}

pub struct IconResolver {
    icons_dir: Option<PathBuf>,
    missing: PathBuf,
}

impl IconResolver {
    pub fn new(icons_dir: Option<PathBuf>, missing: PathBuf) -> Self {
        Self { icons_dir, missing }
    }

    pub fn icons_dir(&self) -> Option<&Path> {
        self.icons_dir.as_deref()
    }

    pub fn gicon(&self, name: &str) -> gio::Icon {
        let source =
            resolve_icon_source(name, self.icons_dir.as_deref(), &self.missing, theme_has_icon);
        match source {
            IconSource::Themed(name) => gio::ThemedIcon::new(&name).upcast(),
            IconSource::File(path) => {
                debug!(icon = name, path = %path.display(), "icon from file");
                gio::FileIcon::new(&gio::File::for_path(path)).upcast()
            }
        }
    }

    pub fn image(&self, name: &str, size: i32) -> gtk::Image {
        let image = gtk::Image::from_gicon(&self.gicon(name));
        image.set_pixel_size(size);
        image
    }

    pub fn apply(&self, image: &gtk::Image, name: &str) {
        image.set_from_gicon(&self.gicon(name));
    }
}

fn theme_has_icon(name: &str) -> bool {
    gdk::Display::default()
        .map(|display| gtk::IconTheme::for_display(&display).has_icon(name))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn absolute_paths_fall_back_to_missing_icon() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("icon-missing.svg");
        let present = dir.path().join("logo.png");
        fs::write(&present, b"png").expect("icon");

        let name = present.to_string_lossy().to_string();
        assert_eq!(
            resolve_icon_source(&name, None, &missing, |_| false),
            IconSource::File(present.clone())
        );
        assert_eq!(
            resolve_icon_source("/nope/logo.png", None, &missing, |_| true),
            IconSource::File(missing.clone())
        );
    }

    #[test]
    fn gtk_icon_set_uses_theme_names() {
        let missing = PathBuf::from("/data/icons_light/icon-missing.svg");
        assert_eq!(
            resolve_icon_source("battery-full-symbolic", None, &missing, |_| false),
            IconSource::Themed("battery-full-symbolic".to_string())
        );
    }

    #[test]
    fn custom_icon_set_prefers_svg_then_theme_then_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("icon-missing.svg");
        fs::write(dir.path().join("wifi-on.svg"), b"<svg/>").expect("icon");

        assert_eq!(
            resolve_icon_source("wifi-on", Some(dir.path()), &missing, |_| true),
            IconSource::File(dir.path().join("wifi-on.svg"))
        );
        assert_eq!(
            resolve_icon_source("folder", Some(dir.path()), &missing, |name| name == "folder"),
            IconSource::Themed("folder".to_string())
        );
        assert_eq!(
            resolve_icon_source("unknown", Some(dir.path()), &missing, |_| false),
            IconSource::File(missing)
        );
    }
}
