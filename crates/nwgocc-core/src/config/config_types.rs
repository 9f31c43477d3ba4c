//! Settings schema and defaults for nwgocc.
//!
//! Mirrors the layout of `preferences.json`: user preferences, icon names, and
//! the external commands used to probe system state.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const ICON_SIZE_RANGE: RangeInclusive<i32> = 8..=64;
pub const REFRESH_FAST_MILLIS_RANGE: RangeInclusive<u64> = 0..=1000;
pub const REFRESH_SLOW_SECONDS_RANGE: RangeInclusive<u64> = 0..=60;
pub const REFRESH_CLI_SECONDS_RANGE: RangeInclusive<u64> = 0..=3600;

/// Everything stored in `preferences.json`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub preferences: Preferences,
    pub icons: Icons,
    pub commands: Commands,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Preferences {
    pub icon_set: IconSet,
    pub custom_styling: bool,
    /// Keep the panel open after a row or button launched its command.
    pub dont_close: bool,
    pub window_decorations: bool,
    pub show_cli_label: bool,
    pub show_brightness_slider: bool,
    pub show_volume_slider: bool,
    pub show_playerctl: bool,
    pub show_user_line: bool,
    pub show_wifi_line: bool,
    pub show_interface_line: bool,
    pub show_bt_line: bool,
    pub show_battery_line: bool,
    pub show_user_rows: bool,
    pub show_user_buttons: bool,
    pub icon_size_small: i32,
    pub icon_size_large: i32,
    pub refresh_fast_millis: u64,
    pub refresh_slow_seconds: u64,
    pub refresh_cli_seconds: u64,
    /// Network interface shown in the interface row; empty means not selected.
    pub interface_name: String,
    #[serde(rename = "on-click-user")]
    pub on_click_user: String,
    #[serde(rename = "on-click-wifi")]
    pub on_click_wifi: String,
    #[serde(rename = "on-click-interface")]
    pub on_click_interface: String,
    #[serde(rename = "on-click-bluetooth")]
    pub on_click_bluetooth: String,
    #[serde(rename = "on-click-battery")]
    pub on_click_battery: String,
    /// Screen edge used when the compositor supports layer-shell surfaces.
    pub anchor: Anchor,
    pub margin: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            icon_set: IconSet::Gtk,
            custom_styling: false,
            dont_close: false,
            window_decorations: false,
            show_cli_label: true,
            show_brightness_slider: true,
            show_volume_slider: true,
            show_playerctl: true,
            show_user_line: true,
            show_wifi_line: true,
            show_interface_line: false,
            show_bt_line: true,
            show_battery_line: true,
            show_user_rows: true,
            show_user_buttons: true,
            icon_size_small: 16,
            icon_size_large: 24,
            refresh_fast_millis: 500,
            refresh_slow_seconds: 5,
            refresh_cli_seconds: 60,
            interface_name: String::new(),
            on_click_user: String::new(),
            on_click_wifi: String::new(),
            on_click_interface: String::new(),
            on_click_bluetooth: String::new(),
            on_click_battery: String::new(),
            anchor: Anchor::TopRight,
            margin: 12,
            log_level: None,
        }
    }
}

impl Preferences {
    /// Pull numeric values back into the ranges offered by the preferences window.
    pub fn clamp_ranges(&mut self) {
        self.icon_size_small = clamp_to(self.icon_size_small, &ICON_SIZE_RANGE);
        self.icon_size_large = clamp_to(self.icon_size_large, &ICON_SIZE_RANGE);
        self.refresh_fast_millis = clamp_to(self.refresh_fast_millis, &REFRESH_FAST_MILLIS_RANGE);
        self.refresh_slow_seconds =
            clamp_to(self.refresh_slow_seconds, &REFRESH_SLOW_SECONDS_RANGE);
        self.refresh_cli_seconds = clamp_to(self.refresh_cli_seconds, &REFRESH_CLI_SECONDS_RANGE);
    }
}

fn clamp_to<T: Ord + Copy>(value: T, range: &RangeInclusive<T>) -> T {
    value.clamp(*range.start(), *range.end())
}

/// Which icon source rows and buttons use.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IconSet {
    /// Names are looked up in the active GTK icon theme.
    #[default]
    Gtk,
    /// Bundled light SVG icons in the data directory.
    Light,
    /// Bundled dark SVG icons in the data directory.
    Dark,
}

impl IconSet {
    pub const ALL: [IconSet; 3] = [IconSet::Gtk, IconSet::Light, IconSet::Dark];

    pub fn as_str(self) -> &'static str {
        match self {
            IconSet::Gtk => "gtk",
            IconSet::Light => "light",
            IconSet::Dark => "dark",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            IconSet::Gtk => "GTK",
            IconSet::Light => "Custom light",
            IconSet::Dark => "Custom dark",
        }
    }

    /// Directory holding the custom icons, `None` when GTK icons are in use.
    pub fn icons_dir(self, data_dir: &Path) -> Option<PathBuf> {
        match self {
            IconSet::Gtk => None,
            IconSet::Light => Some(data_dir.join("icons_light")),
            IconSet::Dark => Some(data_dir.join("icons_dark")),
        }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    #[default]
    TopRight,
    TopLeft,
    BottomRight,
    BottomLeft,
    Top,
    Bottom,
    Left,
    Right,
    Center,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Icons {
    pub battery_empty: String,
    pub battery_low: String,
    pub battery_good: String,
    pub battery_full: String,
    pub user: String,
    pub wifi_on: String,
    pub wifi_off: String,
    pub network_connected: String,
    pub network_disconnected: String,
    pub brightness_low: String,
    pub brightness_medium: String,
    pub brightness_high: String,
    pub bt_on: String,
    pub bt_off: String,
    pub volume_low: String,
    pub volume_medium: String,
    pub volume_high: String,
    pub volume_muted: String,
    pub media_playback_pause: String,
    pub media_playback_start: String,
    pub media_playback_stop: String,
    pub media_skip_backward: String,
    pub media_skip_forward: String,
    pub click_me: String,
}

impl Default for Icons {
    fn default() -> Self {
        // Names resolve in the GTK theme; custom sets ship `<name>.svg` files.
        Self {
            battery_empty: "battery-empty-symbolic".to_string(),
            battery_low: "battery-low-symbolic".to_string(),
            battery_good: "battery-good-symbolic".to_string(),
            battery_full: "battery-full-symbolic".to_string(),
            user: "avatar-default-symbolic".to_string(),
            wifi_on: "network-wireless-signal-excellent-symbolic".to_string(),
            wifi_off: "network-wireless-offline-symbolic".to_string(),
            network_connected: "network-wired-symbolic".to_string(),
            network_disconnected: "network-wired-disconnected-symbolic".to_string(),
            brightness_low: "display-brightness-low-symbolic".to_string(),
            brightness_medium: "display-brightness-medium-symbolic".to_string(),
            brightness_high: "display-brightness-high-symbolic".to_string(),
            bt_on: "bluetooth-active-symbolic".to_string(),
            bt_off: "bluetooth-disabled-symbolic".to_string(),
            volume_low: "audio-volume-low-symbolic".to_string(),
            volume_medium: "audio-volume-medium-symbolic".to_string(),
            volume_high: "audio-volume-high-symbolic".to_string(),
            volume_muted: "audio-volume-muted-symbolic".to_string(),
            media_playback_pause: "media-playback-pause-symbolic".to_string(),
            media_playback_start: "media-playback-start-symbolic".to_string(),
            media_playback_stop: "media-playback-stop-symbolic".to_string(),
            media_skip_backward: "media-skip-backward-symbolic".to_string(),
            media_skip_forward: "media-skip-forward-symbolic".to_string(),
            click_me: "pan-end-symbolic".to_string(),
        }
    }
}

/// External commands used to read and change system state.
///
/// `{value}` and `{iface}` are substituted at runtime.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Commands {
    pub get_battery: String,
    pub get_battery_alt: String,
    #[serde(rename = "get_bt_name")]
    pub get_bluetooth_name: String,
    #[serde(rename = "get_bt_status")]
    pub get_bluetooth_status: String,
    pub get_brightness: String,
    pub set_brightness: String,
    pub get_host: String,
    pub get_ssid: String,
    pub get_user: String,
    pub get_volume: String,
    pub set_volume: String,
    pub toggle_mute: String,
    pub get_ip_addr: String,
    pub systemctl: String,
    pub playerctl: String,
}

impl Default for Commands {
    fn default() -> Self {
        Self {
            get_battery: "upower -i $(upower -e | grep BAT) | grep --color=never -E 'state|time to|percentage'"
                .to_string(),
            get_battery_alt: "acpi".to_string(),
            get_bluetooth_name: "bluetoothctl show | awk '/Name/{print $2}'".to_string(),
            get_bluetooth_status: "bluetoothctl show | awk '/Powered/{print $2}'".to_string(),
            get_brightness: "light -G".to_string(),
            set_brightness: "light -S {value}".to_string(),
            get_host: "uname -n".to_string(),
            get_ssid: "iwgetid -r".to_string(),
            get_user: "echo $USER".to_string(),
            // Shell sequencing captures volume and mute state in one call.
            get_volume: "pactl get-sink-volume @DEFAULT_SINK@; pactl get-sink-mute @DEFAULT_SINK@"
                .to_string(),
            set_volume: "pactl set-sink-volume @DEFAULT_SINK@ {value}%".to_string(),
            toggle_mute: "pactl set-sink-mute @DEFAULT_SINK@ toggle".to_string(),
            get_ip_addr: "ip -o -4 addr show dev {iface}".to_string(),
            systemctl: "systemctl".to_string(),
            playerctl: "playerctl".to_string(),
        }
    }
}

impl Commands {
    /// Pairs of (json key, program) for every configured command.
    pub fn programs(&self) -> Vec<(&'static str, &str)> {
        [
            ("get_battery", self.get_battery.as_str()),
            ("get_battery_alt", self.get_battery_alt.as_str()),
            ("get_bt_name", self.get_bluetooth_name.as_str()),
            ("get_bt_status", self.get_bluetooth_status.as_str()),
            ("get_brightness", self.get_brightness.as_str()),
            ("set_brightness", self.set_brightness.as_str()),
            ("get_host", self.get_host.as_str()),
            ("get_ssid", self.get_ssid.as_str()),
            ("get_user", self.get_user.as_str()),
            ("get_volume", self.get_volume.as_str()),
            ("set_volume", self.set_volume.as_str()),
            ("toggle_mute", self.toggle_mute.as_str()),
            ("get_ip_addr", self.get_ip_addr.as_str()),
            ("systemctl", self.systemctl.as_str()),
            ("playerctl", self.playerctl.as_str()),
        ]
        .into_iter()
        .filter_map(|(key, cmd)| first_program(cmd).map(|program| (key, program)))
        .collect()
    }

    /// Availability of every distinct program, keyed by program name.
    pub fn availability(&self, lookup: impl Fn(&str) -> bool) -> BTreeMap<String, bool> {
        let mut report = BTreeMap::new();
        for (_, program) in self.programs() {
            if !report.contains_key(program) {
                report.insert(program.to_string(), lookup(program));
            }
        }
        report
    }
}

/// First whitespace-separated token of a command line.
pub fn first_program(cmd: &str) -> Option<&str> {
    cmd.split_whitespace().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let json = r#"{ "preferences": { "icon_set": "dark", "show_bt_line": false } }"#;
        let settings: Settings = serde_json::from_str(json).expect("parse settings");
        assert_eq!(settings.preferences.icon_set, IconSet::Dark);
        assert!(!settings.preferences.show_bt_line);
        assert_eq!(settings.preferences.icon_size_small, 16);
        assert_eq!(settings.icons, Icons::default());
        assert_eq!(settings.commands.get_ssid, "iwgetid -r");
    }

    #[test]
    fn json_keys_match_preferences_file() {
        let mut settings = Settings::default();
        settings.preferences.on_click_wifi = "nm-connection-editor".to_string();
        let value = serde_json::to_value(&settings).expect("serialize settings");
        assert_eq!(value["preferences"]["on-click-wifi"], "nm-connection-editor");
        assert_eq!(value["preferences"]["icon_set"], "gtk");
        assert!(value["preferences"].get("log_level").is_none());
        assert!(value["icons"].get("battery-empty").is_some());
        assert!(value["icons"].get("media-skip-forward").is_some());
        assert!(value["commands"].get("get_bt_status").is_some());
        assert_eq!(value["preferences"]["anchor"], "top-right");
    }

    #[test]
    fn clamp_ranges_limits_numeric_preferences() {
        let mut preferences = Preferences {
            icon_size_small: 2,
            icon_size_large: 200,
            refresh_fast_millis: 5000,
            refresh_slow_seconds: 61,
            refresh_cli_seconds: 4000,
            ..Preferences::default()
        };
        preferences.clamp_ranges();
        assert_eq!(preferences.icon_size_small, 8);
        assert_eq!(preferences.icon_size_large, 64);
        assert_eq!(preferences.refresh_fast_millis, 1000);
        assert_eq!(preferences.refresh_slow_seconds, 60);
        assert_eq!(preferences.refresh_cli_seconds, 3600);
    }

    #[test]
    fn availability_reports_each_program_once() {
        let commands = Commands::default();
        let report = commands.availability(|program| program == "pactl" || program == "light");
        assert_eq!(report.get("pactl"), Some(&true));
        assert_eq!(report.get("light"), Some(&true));
        assert_eq!(report.get("bluetoothctl"), Some(&false));
        assert_eq!(report.keys().filter(|key| key.as_str() == "pactl").count(), 1);
    }

    #[test]
    fn icons_dir_follows_icon_set() {
        let data = Path::new("/data");
        assert_eq!(IconSet::Gtk.icons_dir(data), None);
        assert_eq!(IconSet::Light.icons_dir(data), Some(data.join("icons_light")));
        assert_eq!(IconSet::Dark.icons_dir(data), Some(data.join("icons_dark")));
    }
}
