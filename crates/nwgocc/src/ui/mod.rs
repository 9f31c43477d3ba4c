//! Control center UI state, panel content, and event handling.

use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use gtk::prelude::*;
use gtk::{gdk, glib};
use nwgocc_core::cli::parse_cli_commands;
use nwgocc_core::{
    load_cli_commands, AppPaths, DebugLevel, Preferences, Settings, Shortcut, Templates,
};
use tracing::{debug, info, warn};

use crate::css::CssManager;
use crate::debug;
use crate::events::{RefreshTier, UiEvent};

mod cli_label;
mod icons;
mod launcher;
mod panel;
mod preferences;
mod refresh;
mod rows;
mod status_rows;
mod widgets;

use cli_label::CliLabel;
use icons::IconResolver;
use launcher::Launcher;
use preferences::PreferencesContext;
use rows::{RowContext, StatusRow};
use status_rows::StatusRows;
use widgets::brightness::BrightnessWidget;
use widgets::volume::VolumeWidget;

const PREFERENCES_ICON_FILE: &str = "nwgocc-symbolic.svg";
const APP_ICON: &str = "nwgocc";
const FALLBACK_PREFERENCES_ICON: &str = "preferences-system-symbolic";
const CUSTOM_BUTTON: &str = "custom-button";

pub struct UiStateInit {
    pub app: gtk::Application,
    pub paths: AppPaths,
    pub settings: Settings,
    pub templates: Templates,
    pub cli_text: String,
    pub css: CssManager,
    pub event_tx: async_channel::Sender<UiEvent>,
}

/// GTK state for the control center window.
pub struct UiState {
    app: gtk::Application,
    paths: AppPaths,
    settings: Rc<Settings>,
    templates: Templates,
    cli_text: String,
    css: CssManager,
    event_tx: async_channel::Sender<UiEvent>,
    panel: panel::PanelWidgets,
    content: Option<PanelContent>,
    timers: Vec<glib::SourceId>,
}

/// Widgets that are rebuilt whenever preferences change.
struct PanelContent {
    cli: Option<CliLabel>,
    brightness: Option<BrightnessWidget>,
    volume: Option<VolumeWidget>,
    status: StatusRows,
}

impl UiState {
    pub fn new(init: UiStateInit) -> Self {
        let panel = panel::build_panel_widgets(&init.app, &init.settings.preferences);
        let mut state = Self {
            app: init.app,
            paths: init.paths,
            settings: Rc::new(init.settings),
            templates: init.templates,
            cli_text: init.cli_text,
            css: init.css,
            event_tx: init.event_tx,
            panel,
            content: None,
            timers: Vec::new(),
        };
        state.rebuild();
        state.panel.window.present();
        state
    }

    pub fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Refresh(tier) => {
                debug::log(DebugLevel::Verbose, || format!("refresh tick: {tier:?}"));
                self.refresh(tier);
            }
            UiEvent::ConfigReload => {
                debug!("config reload requested");
                self.reload_config();
            }
            UiEvent::CssReload => {
                debug!("css reload requested");
                self.css.reload();
                debug::log(DebugLevel::Info, || "css reloaded".to_string());
            }
        }
    }

    fn refresh(&self, tier: RefreshTier) {
        let Some(content) = self.content.as_ref() else {
            return;
        };
        match tier {
            RefreshTier::Fast => {
                if let Some(brightness) = content.brightness.as_ref() {
                    brightness.refresh();
                }
                if let Some(volume) = content.volume.as_ref() {
                    volume.refresh();
                }
                content.status.refresh_fast();
            }
            RefreshTier::Slow => content.status.refresh_slow(),
            RefreshTier::Cli => {
                if let Some(cli) = content.cli.as_ref() {
                    cli.refresh();
                }
            }
        }
    }

    fn reload_config(&mut self) {
        if let Some(settings) = reload_settings(&self.paths.preferences_path()) {
            self.settings = Rc::new(settings);
        }
        match Templates::load(&self.paths.templates_file) {
            Ok(templates) => self.templates = templates,
            Err(err) => warn!(?err, "keeping previous templates"),
        }
        match load_cli_commands(&self.paths.cli_commands_path()) {
            Ok(text) => self.cli_text = text,
            Err(err) => warn!(?err, "keeping previous cli commands"),
        }

        self.css
            .set_custom_styling(self.settings.preferences.custom_styling);
        self.css.reload();
        panel::apply_panel_preferences(&self.panel, &self.settings.preferences);
        self.rebuild();
        info!("configuration reloaded");
    }

    fn rebuild(&mut self) {
        self.stop_timers();
        self.content = None;
        clear_container(&self.panel.root);
        self.content = Some(self.build_content());
        for tier in [RefreshTier::Fast, RefreshTier::Slow, RefreshTier::Cli] {
            self.refresh(tier);
        }
        self.start_timers();
    }

    fn build_content(&self) -> PanelContent {
        let settings = &self.settings;
        let prefs = &settings.preferences;
        let root = &self.panel.root;
        let resolver = Rc::new(IconResolver::new(
            self.paths.icons_dir(prefs.icon_set),
            self.paths.missing_icon_path(),
        ));
        let launcher = Launcher::new(self.app.clone(), prefs.dont_close);

        let commands = parse_cli_commands(&self.cli_text);
        let cli = (prefs.show_cli_label && !commands.is_empty()).then(|| {
            let cli = CliLabel::new(commands);
            root.append(cli.root());
            root.append(&separator());
            cli
        });

        let brightness = prefs.show_brightness_slider.then(|| {
            let widget = BrightnessWidget::new(settings, resolver.clone());
            root.append(widget.root());
            widget
        });
        let volume = prefs.show_volume_slider.then(|| {
            let widget = VolumeWidget::new(settings, resolver.clone());
            root.append(widget.root());
            widget
        });
        if brightness.is_some() || volume.is_some() {
            root.append(&separator());
        }

        let small = RowContext {
            resolver: resolver.clone(),
            launcher: launcher.clone(),
            icon_size: prefs.icon_size_small,
            custom_styling: prefs.custom_styling,
            click_me: settings.icons.click_me.clone(),
        };
        let status = StatusRows::build(root, &small, settings.clone());

        if let Some(custom_rows) = user_rows_section(prefs, &self.templates.custom_rows) {
            root.append(&separator());
            let large = RowContext {
                icon_size: prefs.icon_size_large,
                ..small.clone()
            };
            for shortcut in custom_rows {
                let row = StatusRow::new(&large, &shortcut.icon, &shortcut.name, &shortcut.cmd);
                root.append(&row.root);
            }
        }

        root.append(&separator());
        root.append(&self.build_buttons(&resolver, &launcher));

        debug!(
            cli = cli.is_some(),
            brightness = brightness.is_some(),
            volume = volume.is_some(),
            "panel content built"
        );
        PanelContent {
            cli,
            brightness,
            volume,
            status,
        }
    }

    fn build_buttons(&self, resolver: &Rc<IconResolver>, launcher: &Launcher) -> gtk::Box {
        let prefs = &self.settings.preferences;
        let buttons = gtk::Box::new(gtk::Orientation::Horizontal, 6);
        buttons.set_widget_name("buttons-box");
        buttons.set_halign(gtk::Align::Center);

        let icon = preferences_icon(resolver.icons_dir(), theme_has_icon);
        let preferences = icon_button(resolver, &icon, prefs.icon_size_large);
        if let Some(name) = button_widget_name(prefs.custom_styling) {
            preferences.set_widget_name(name);
        }
        preferences.set_tooltip_text(Some("Preferences"));
        let ctx = PreferencesContext {
            app: self.app.clone(),
            paths: self.paths.clone(),
            settings: (*self.settings).clone(),
            templates: self.templates.clone(),
            cli_text: self.cli_text.clone(),
            resolver: resolver.clone(),
            event_tx: self.event_tx.clone(),
        };
        preferences.connect_clicked(move |_| preferences::open_preferences(&ctx));
        buttons.append(&preferences);

        if prefs.show_user_buttons {
            for shortcut in &self.templates.buttons {
                buttons.append(&custom_button(
                    shortcut,
                    resolver,
                    launcher,
                    prefs.icon_size_large,
                    prefs.custom_styling,
                ));
            }
        }
        buttons
    }

    fn start_timers(&mut self) {
        let prefs = &self.settings.preferences;
        let intervals = [
            (RefreshTier::Fast, Duration::from_millis(prefs.refresh_fast_millis)),
            (RefreshTier::Slow, Duration::from_secs(prefs.refresh_slow_seconds)),
            (RefreshTier::Cli, Duration::from_secs(prefs.refresh_cli_seconds)),
        ];
        for (tier, interval) in intervals {
            if interval.is_zero() {
                debug!(?tier, "refresh disabled");
                continue;
            }
            let event_tx = self.event_tx.clone();
            let id = glib::timeout_add_local(interval, move || {
                let _ = event_tx.try_send(UiEvent::Refresh(tier));
                glib::ControlFlow::Continue
            });
            self.timers.push(id);
        }
        debug::log(DebugLevel::Info, || {
            format!("{} refresh timers started", self.timers.len())
        });
    }

    fn stop_timers(&mut self) {
        for id in self.timers.drain(..) {
            id.remove();
        }
    }
}

/// Settings read back after a file change; `None` keeps the running ones.
///
/// A file caught mid-write fails to parse, and falling back to defaults here
/// would let the next Apply in Preferences overwrite the user's file.
fn reload_settings(path: &Path) -> Option<Settings> {
    match Settings::load(path) {
        Ok(settings) => Some(settings),
        Err(err) => {
            warn!(?err, "keeping previous preferences");
            None
        }
    }
}

fn icon_button(resolver: &IconResolver, icon: &str, size: i32) -> gtk::Button {
    let button = gtk::Button::new();
    button.set_child(Some(&resolver.image(icon, size)));
    button
}

fn custom_button(
    shortcut: &Shortcut,
    resolver: &IconResolver,
    launcher: &Launcher,
    size: i32,
    custom_styling: bool,
) -> gtk::Button {
    let button = icon_button(resolver, &shortcut.icon, size);
    if let Some(name) = button_widget_name(custom_styling) {
        button.set_widget_name(name);
    }
    button.set_tooltip_text(Some(&shortcut.name));
    let launcher = launcher.clone();
    let cmd = shortcut.cmd.clone();
    button.connect_clicked(move |_| launcher.launch(&cmd));
    button
}

/// Custom rows to show; the section and its separator exist whenever enabled.
fn user_rows_section<'a>(prefs: &Preferences, rows: &'a [Shortcut]) -> Option<&'a [Shortcut]> {
    prefs.show_user_rows.then_some(rows)
}

/// Widget name shared by the Preferences button and custom buttons.
fn button_widget_name(custom_styling: bool) -> Option<&'static str> {
    custom_styling.then_some(CUSTOM_BUTTON)
}

/// Icon for the built-in Preferences button.
fn preferences_icon(icons_dir: Option<&Path>, theme_has: impl Fn(&str) -> bool) -> String {
    if let Some(dir) = icons_dir {
        return dir.join(PREFERENCES_ICON_FILE).to_string_lossy().into_owned();
    }
    if theme_has(APP_ICON) {
        APP_ICON.to_string()
    } else {
        FALLBACK_PREFERENCES_ICON.to_string()
    }
}

fn theme_has_icon(name: &str) -> bool {
    gdk::Display::default()
        .map(|display| gtk::IconTheme::for_display(&display).has_icon(name))
        .unwrap_or(false)
}

fn separator() -> gtk::Separator {
    gtk::Separator::new(gtk::Orientation::Horizontal)
}

fn clear_container(container: &gtk::Box) {
    while let Some(child) = container.first_child() {
        container.remove(&child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preferences_icon_prefers_icon_set_file() {
        let dir = Path::new("/data/icons_dark");
        assert_eq!(
            preferences_icon(Some(dir), |_| true),
            "/data/icons_dark/nwgocc-symbolic.svg"
        );
    }

    #[test]
    fn preferences_icon_falls_back_without_app_icon() {
        assert_eq!(preferences_icon(None, |name| name == "nwgocc"), "nwgocc");
        assert_eq!(preferences_icon(None, |_| false), "preferences-system-symbolic");
    }

    #[test]
    fn user_rows_section_is_kept_without_rows() {
        let mut prefs = Preferences::default();
        prefs.show_user_rows = true;
        assert_eq!(user_rows_section(&prefs, &[]).map(<[Shortcut]>::len), Some(0));
        prefs.show_user_rows = false;
        let rows = [Shortcut::default()];
        assert!(user_rows_section(&prefs, &rows).is_none());
    }

    #[test]
    fn buttons_share_custom_widget_name() {
        assert_eq!(button_widget_name(true), Some("custom-button"));
        assert_eq!(button_widget_name(false), None);
    }

    #[test]
    fn unreadable_preferences_keep_running_settings() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("preferences.json");
        std::fs::write(&path, "{\"preferences\": {").expect("write partial file");
        assert!(reload_settings(&path).is_none());
        std::fs::write(&path, "").expect("truncate");
        assert!(reload_settings(&path).is_none());

        let mut settings = Settings::default();
        settings.preferences.dont_close = !settings.preferences.dont_close;
        settings.save(&path).expect("save");
        let reloaded = reload_settings(&path).expect("reloaded");
        assert_eq!(reloaded.preferences.dont_close, settings.preferences.dont_close);
    }
}
