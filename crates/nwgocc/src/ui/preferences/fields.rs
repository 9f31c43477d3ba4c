//! Editable preference fields and how they map onto `Preferences`.

use std::ops::RangeInclusive;

use nwgocc_core::{
    Preferences, ICON_SIZE_RANGE, REFRESH_CLI_SECONDS_RANGE, REFRESH_FAST_MILLIS_RANGE,
    REFRESH_SLOW_SECONDS_RANGE,
};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Flag {
    CliLabel,
    BrightnessSlider,
    VolumeSlider,
    Playerctl,
    UserLine,
    WifiLine,
    InterfaceLine,
    BtLine,
    BatteryLine,
    UserRows,
    UserButtons,
    CustomStyling,
    DontClose,
    WindowDecorations,
}

impl Flag {
    /// Content toggles, in panel order.
    pub const CONTENT: [Flag; 11] = [
        Flag::CliLabel,
        Flag::BrightnessSlider,
        Flag::VolumeSlider,
        Flag::Playerctl,
        Flag::UserLine,
        Flag::WifiLine,
        Flag::InterfaceLine,
        Flag::BtLine,
        Flag::BatteryLine,
        Flag::UserRows,
        Flag::UserButtons,
    ];
    pub const WINDOW: [Flag; 3] = [Flag::CustomStyling, Flag::DontClose, Flag::WindowDecorations];

    pub fn label(self) -> &'static str {
        match self {
            Flag::CliLabel => "CLI label",
            Flag::BrightnessSlider => "Brightness slider",
            Flag::VolumeSlider => "Volume slider",
            Flag::Playerctl => "Playerctl buttons",
            Flag::UserLine => "User info",
            Flag::WifiLine => "Wi-Fi status",
            Flag::InterfaceLine => "Network interface",
            Flag::BtLine => "Bluetooth status",
            Flag::BatteryLine => "Battery level",
            Flag::UserRows => "User rows",
            Flag::UserButtons => "User buttons",
            Flag::CustomStyling => "Custom styling",
            Flag::DontClose => "Keep open",
            Flag::WindowDecorations => "Window decorations",
        }
    }

    /// The row command this flag's line can run, if any.
    pub fn on_click(self) -> Option<OnClick> {
        match self {
            Flag::UserLine => Some(OnClick::User),
            Flag::WifiLine => Some(OnClick::Wifi),
            Flag::InterfaceLine => Some(OnClick::Interface),
            Flag::BtLine => Some(OnClick::Bluetooth),
            Flag::BatteryLine => Some(OnClick::Battery),
            _ => None,
        }
    }

    pub fn get(self, prefs: &Preferences) -> bool {
        match self {
            Flag::CliLabel => prefs.show_cli_label,
            Flag::BrightnessSlider => prefs.show_brightness_slider,
            Flag::VolumeSlider => prefs.show_volume_slider,
            Flag::Playerctl => prefs.show_playerctl,
            Flag::UserLine => prefs.show_user_line,
            Flag::WifiLine => prefs.show_wifi_line,
            Flag::InterfaceLine => prefs.show_interface_line,
            Flag::BtLine => prefs.show_bt_line,
            Flag::BatteryLine => prefs.show_battery_line,
            Flag::UserRows => prefs.show_user_rows,
            Flag::UserButtons => prefs.show_user_buttons,
            Flag::CustomStyling => prefs.custom_styling,
            Flag::DontClose => prefs.dont_close,
            Flag::WindowDecorations => prefs.window_decorations,
        }
    }

    pub fn set(self, prefs: &mut Preferences, value: bool) {
        let field = match self {
            Flag::CliLabel => &mut prefs.show_cli_label,
            Flag::BrightnessSlider => &mut prefs.show_brightness_slider,
            Flag::VolumeSlider => &mut prefs.show_volume_slider,
            Flag::Playerctl => &mut prefs.show_playerctl,
            Flag::UserLine => &mut prefs.show_user_line,
            Flag::WifiLine => &mut prefs.show_wifi_line,
            Flag::InterfaceLine => &mut prefs.show_interface_line,
            Flag::BtLine => &mut prefs.show_bt_line,
            Flag::BatteryLine => &mut prefs.show_battery_line,
            Flag::UserRows => &mut prefs.show_user_rows,
            Flag::UserButtons => &mut prefs.show_user_buttons,
            Flag::CustomStyling => &mut prefs.custom_styling,
            Flag::DontClose => &mut prefs.dont_close,
            Flag::WindowDecorations => &mut prefs.window_decorations,
        };
        *field = value;
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OnClick {
    User,
    Wifi,
    Interface,
    Bluetooth,
    Battery,
}

impl OnClick {
    pub fn get(self, prefs: &Preferences) -> &str {
        match self {
            OnClick::User => &prefs.on_click_user,
            OnClick::Wifi => &prefs.on_click_wifi,
            OnClick::Interface => &prefs.on_click_interface,
            OnClick::Bluetooth => &prefs.on_click_bluetooth,
            OnClick::Battery => &prefs.on_click_battery,
        }
    }

    pub fn set(self, prefs: &mut Preferences, command: &str) {
        let field = match self {
            OnClick::User => &mut prefs.on_click_user,
            OnClick::Wifi => &mut prefs.on_click_wifi,
            OnClick::Interface => &mut prefs.on_click_interface,
            OnClick::Bluetooth => &mut prefs.on_click_bluetooth,
            OnClick::Battery => &mut prefs.on_click_battery,
        };
        *field = command.trim().to_string();
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NumericField {
    IconSizeSmall,
    IconSizeLarge,
    RefreshFastMillis,
    RefreshSlowSeconds,
    RefreshCliSeconds,
}

impl NumericField {
    pub const ALL: [NumericField; 5] = [
        NumericField::IconSizeSmall,
        NumericField::IconSizeLarge,
        NumericField::RefreshFastMillis,
        NumericField::RefreshSlowSeconds,
        NumericField::RefreshCliSeconds,
    ];

    pub fn label(self) -> &'static str {
        match self {
            NumericField::IconSizeSmall => "Small icon size",
            NumericField::IconSizeLarge => "Large icon size",
            NumericField::RefreshFastMillis => "Sliders refresh [ms]",
            NumericField::RefreshSlowSeconds => "Battery refresh [s]",
            NumericField::RefreshCliSeconds => "CLI label refresh [s]",
        }
    }

    pub fn range(self) -> RangeInclusive<f64> {
        match self {
            NumericField::IconSizeSmall | NumericField::IconSizeLarge => {
                f64::from(*ICON_SIZE_RANGE.start())..=f64::from(*ICON_SIZE_RANGE.end())
            }
            NumericField::RefreshFastMillis => u64_range(&REFRESH_FAST_MILLIS_RANGE),
            NumericField::RefreshSlowSeconds => u64_range(&REFRESH_SLOW_SECONDS_RANGE),
            NumericField::RefreshCliSeconds => u64_range(&REFRESH_CLI_SECONDS_RANGE),
        }
    }

    pub fn get(self, prefs: &Preferences) -> f64 {
        match self {
            NumericField::IconSizeSmall => f64::from(prefs.icon_size_small),
            NumericField::IconSizeLarge => f64::from(prefs.icon_size_large),
            NumericField::RefreshFastMillis => prefs.refresh_fast_millis as f64,
            NumericField::RefreshSlowSeconds => prefs.refresh_slow_seconds as f64,
            NumericField::RefreshCliSeconds => prefs.refresh_cli_seconds as f64,
        }
    }

    /// Store a spin button value, rounded and clamped to the field range.
    pub fn set(self, prefs: &mut Preferences, value: f64) {
        let range = self.range();
        let value = value.round().clamp(*range.start(), *range.end());
        match self {
            NumericField::IconSizeSmall => prefs.icon_size_small = value as i32,
            NumericField::IconSizeLarge => prefs.icon_size_large = value as i32,
            NumericField::RefreshFastMillis => prefs.refresh_fast_millis = value as u64,
            NumericField::RefreshSlowSeconds => prefs.refresh_slow_seconds = value as u64,
            NumericField::RefreshCliSeconds => prefs.refresh_cli_seconds = value as u64,
        }
    }
}

fn u64_range(range: &RangeInclusive<u64>) -> RangeInclusive<f64> {
    *range.start() as f64..=*range.end() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_flag_writes_its_own_field() {
        for flag in Flag::CONTENT.into_iter().chain(Flag::WINDOW) {
            let mut prefs = Preferences::default();
            let before = flag.get(&prefs);
            flag.set(&mut prefs, !before);
            assert_eq!(flag.get(&prefs), !before, "{flag:?}");
            for other in Flag::CONTENT.into_iter().chain(Flag::WINDOW) {
                if other != flag {
                    assert_eq!(other.get(&prefs), other.get(&Preferences::default()));
                }
            }
        }
    }

    #[test]
    fn on_click_commands_are_trimmed() {
        let mut prefs = Preferences::default();
        OnClick::Wifi.set(&mut prefs, "  nm-connection-editor \n");
        assert_eq!(OnClick::Wifi.get(&prefs), "nm-connection-editor");
        assert_eq!(OnClick::Battery.get(&prefs), "");
        assert_eq!(Flag::WifiLine.on_click(), Some(OnClick::Wifi));
        assert_eq!(Flag::VolumeSlider.on_click(), None);
    }

    #[test]
    fn numeric_values_are_rounded_and_clamped() {
        let mut prefs = Preferences::default();
        NumericField::IconSizeSmall.set(&mut prefs, 200.0);
        assert_eq!(prefs.icon_size_small, 64);
        NumericField::RefreshFastMillis.set(&mut prefs, 249.6);
        assert_eq!(prefs.refresh_fast_millis, 250);
        NumericField::RefreshCliSeconds.set(&mut prefs, -5.0);
        assert_eq!(prefs.refresh_cli_seconds, 0);
        assert_eq!(NumericField::RefreshSlowSeconds.range(), 0.0..=60.0);
    }
}
