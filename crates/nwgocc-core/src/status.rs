//! Parsing of system tool output and icon selection for status rows.
//!
//! Everything here is pure: callers run the commands and hand over stdout.

use crate::config::{first_program, Icons};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatteryStatus {
    pub text: String,
    pub percent: u8,
}

/// Parse `upower -i <device>` output filtered to state, time and percentage lines.
pub fn parse_upower(output: &str) -> BatteryStatus {
    let mut state = "";
    let mut time = String::new();
    let mut percent = 0u8;

    for line in output.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "state" => state = value,
            "percentage" => {
                if let Some(parsed) = parse_percent_token(value) {
                    percent = parsed;
                }
            }
            "time to empty" | "time to full" => {
                // Units are separate tokens, e.g. "3.5 hours".
                time = value.split_whitespace().collect::<Vec<_>>().join(" ");
            }
            _ => {}
        }
    }

    let text = format!("{percent}% {state} {time}");
    BatteryStatus {
        text: text.trim().to_string(),
        percent,
    }
}

/// Parse the first battery line of `acpi` output.
///
/// `Battery 0: Discharging, 85%, 02:30:00 remaining` yields the text after the
/// `Battery 0:` prefix and a percent of 85.
pub fn parse_acpi(output: &str) -> BatteryStatus {
    let Some(line) = output.lines().find(|line| line.trim_start().starts_with("Battery")) else {
        return BatteryStatus::default();
    };
    let text = line.split_once(':').map(|(_, rest)| rest.trim()).unwrap_or("");
    let percent = text
        .split_whitespace()
        .find(|token| token.contains('%'))
        .and_then(parse_percent_token)
        .unwrap_or(0);
    BatteryStatus {
        text: text.to_string(),
        percent,
    }
}

/// Pick the parser matching the command that produced `output`.
pub fn parse_battery(command: &str, output: &str) -> BatteryStatus {
    let program = first_program(command)
        .map(|program| program.rsplit('/').next().unwrap_or(program))
        .unwrap_or("");
    match program {
        "upower" => parse_upower(output),
        "acpi" => parse_acpi(output),
        _ if output.contains("percentage:") => parse_upower(output),
        _ if output.trim_start().starts_with("Battery") => parse_acpi(output),
        _ => BatteryStatus::default(),
    }
}

fn parse_percent_token(token: &str) -> Option<u8> {
    let digits = token.trim().trim_end_matches([',', '%']);
    let value: f64 = digits.parse().ok()?;
    Some(value.round().clamp(0.0, 100.0) as u8)
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BatteryLevel {
    Empty,
    Low,
    Good,
    Full,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BrightnessLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum VolumeLevel {
    Muted,
    Low,
    Medium,
    High,
}

pub fn battery_level(percent: u8) -> BatteryLevel {
    match percent {
        p if p > 95 => BatteryLevel::Full,
        p if p > 50 => BatteryLevel::Good,
        p if p > 20 => BatteryLevel::Low,
        _ => BatteryLevel::Empty,
    }
}

pub fn brightness_level(value: f64) -> BrightnessLevel {
    if value > 70.0 {
        BrightnessLevel::High
    } else if value > 30.0 {
        BrightnessLevel::Medium
    } else {
        BrightnessLevel::Low
    }
}

pub fn volume_level(value: f64, muted: bool) -> VolumeLevel {
    if muted {
        VolumeLevel::Muted
    } else if value > 70.0 {
        VolumeLevel::High
    } else if value > 30.0 {
        VolumeLevel::Medium
    } else {
        VolumeLevel::Low
    }
}

impl Icons {
    pub fn battery_icon(&self, level: BatteryLevel) -> &str {
        match level {
            BatteryLevel::Full => self.battery_full.as_str(),
            BatteryLevel::Good => self.battery_good.as_str(),
            BatteryLevel::Low => self.battery_low.as_str(),
            BatteryLevel::Empty => self.battery_empty.as_str(),
        }
    }

    pub fn brightness_icon(&self, level: BrightnessLevel) -> &str {
        match level {
            BrightnessLevel::High => self.brightness_high.as_str(),
            BrightnessLevel::Medium => self.brightness_medium.as_str(),
            BrightnessLevel::Low => self.brightness_low.as_str(),
        }
    }

    pub fn volume_icon(&self, level: VolumeLevel) -> &str {
        match level {
            VolumeLevel::Muted => self.volume_muted.as_str(),
            VolumeLevel::High => self.volume_high.as_str(),
            VolumeLevel::Medium => self.volume_medium.as_str(),
            VolumeLevel::Low => self.volume_low.as_str(),
        }
    }
}

/// Icon and label for the Wi-Fi row.
pub fn wifi_status<'a>(icons: &'a Icons, ssid: &str) -> (&'a str, String) {
    let ssid = ssid.trim();
    if ssid.is_empty() {
        (icons.wifi_off.as_str(), "disconnected".to_string())
    } else {
        (icons.wifi_on.as_str(), ssid.to_string())
    }
}

/// Icon and label for the Bluetooth row, `powered` being the raw status output.
pub fn bluetooth_status<'a>(icons: &'a Icons, powered: &str, name: &str) -> (&'a str, String) {
    if powered.trim() == "yes" {
        (icons.bt_on.as_str(), name.trim().to_string())
    } else {
        (icons.bt_off.as_str(), "disabled".to_string())
    }
}

/// Label for the interface row.
pub fn interface_text(name: &str, up: bool, addr: Option<&str>) -> String {
    if name.is_empty() {
        return "Not selected".to_string();
    }
    match addr.filter(|addr| up && !addr.is_empty()) {
        Some(addr) => format!("{name}: {addr}"),
        None => name.to_string(),
    }
}

pub fn interface_icon<'a>(icons: &'a Icons, up: bool) -> &'a str {
    if up {
        icons.network_connected.as_str()
    } else {
        icons.network_disconnected.as_str()
    }
}

/// First IPv4 address in `ip -o -4 addr show` output, without prefix length.
pub fn parse_ip_addr(output: &str) -> Option<String> {
    let mut tokens = output.split_whitespace();
    while let Some(token) = tokens.next() {
        if token == "inet" {
            let addr = tokens.next()?;
            let addr = addr.split('/').next().unwrap_or(addr);
            return Some(addr.to_string());
        }
    }
    None
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PlayerState {
    Playing,
    Paused,
    Stopped,
}

impl PlayerState {
    /// Read `playerctl status` output; anything unknown counts as stopped.
    pub fn from_output(output: &str) -> Self {
        match output.trim() {
            "Playing" => PlayerState::Playing,
            "Paused" => PlayerState::Paused,
            _ => PlayerState::Stopped,
        }
    }

    /// Media controls are shown only for a player that has something loaded.
    pub fn is_active(self) -> bool {
        matches!(self, PlayerState::Playing | PlayerState::Paused)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NumericParseMode {
    /// Decimal values up to 5.0 are treated as ratios.
    Auto,
    /// Values are already percentages.
    Percent,
    /// Values are always ratios and get scaled by 100.
    Ratio,
}

/// Extract a value from tool output, preferring the last `N%` token.
pub fn parse_numeric(text: &str, min: f64, max: f64, mode: NumericParseMode) -> Option<f64> {
    struct Token {
        value: f64,
        decimal: bool,
        percent: bool,
    }

    let mut current = String::new();
    let mut tokens: Vec<Token> = Vec::new();
    let mut push = |current: &mut String, percent: bool| {
        if current.is_empty() {
            return;
        }
        if let Ok(value) = current.parse::<f64>() {
            tokens.push(Token {
                value,
                decimal: current.contains('.'),
                percent,
            });
        }
        current.clear();
    };

    for ch in text.chars() {
        if ch.is_ascii_digit() || ch == '.' {
            current.push(ch);
        } else {
            push(&mut current, ch == '%');
        }
    }
    push(&mut current, false);

    let token = tokens
        .iter()
        .rev()
        .find(|token| token.percent)
        .or_else(|| tokens.last())?;
    let mut value = token.value;
    let scale = match mode {
        NumericParseMode::Auto => !token.percent && token.decimal && value <= 5.0,
        NumericParseMode::Percent => false,
        NumericParseMode::Ratio => true,
    };
    if scale {
        value *= 100.0;
    }
    Some(value.clamp(min, max))
}

pub fn parse_muted(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    lower.contains("muted") || lower.contains("mute: yes")
}

/// Brightness from `light -G` style output, rounded.
pub fn parse_brightness(output: &str) -> Option<f64> {
    parse_numeric(output, 0.0, 100.0, NumericParseMode::Percent).map(f64::round)
}

#[cfg(test)]
mod tests {
    use super::*;

    const UPOWER: &str = "    state:               discharging\n    time to empty:       3.5 hours\n    percentage:          85%\n";

    #[test]
    fn upower_output_reports_state_and_time() {
        let status = parse_upower(UPOWER);
        assert_eq!(status.percent, 85);
        assert_eq!(status.text, "85% discharging 3.5 hours");
    }

    #[test]
    fn upower_fractional_percentage_rounds() {
        let status = parse_upower("state: charging\ntime to full: 40.2 minutes\npercentage: 66.6%\n");
        assert_eq!(status.percent, 67);
        assert_eq!(status.text, "67% charging 40.2 minutes");
    }

    #[test]
    fn upower_without_time_is_trimmed() {
        let status = parse_upower("state: fully-charged\npercentage: 100%\n");
        assert_eq!(status.text, "100% fully-charged");
        assert_eq!(status.percent, 100);
    }

    #[test]
    fn acpi_output_handles_full_battery() {
        let status = parse_acpi("Battery 0: Full, 100%\n");
        assert_eq!(status.text, "Full, 100%");
        assert_eq!(status.percent, 100);

        let status = parse_acpi("Battery 0: Discharging, 85%, 02:30:00 remaining\n");
        assert_eq!(status.text, "Discharging, 85%, 02:30:00 remaining");
        assert_eq!(status.percent, 85);
    }

    #[test]
    fn battery_parser_follows_command_then_content() {
        assert_eq!(parse_battery("upower -i x", UPOWER).percent, 85);
        assert_eq!(parse_battery("/usr/bin/acpi", "Battery 1: Charging, 9%").percent, 9);
        assert_eq!(parse_battery("my-script", UPOWER).percent, 85);
        assert_eq!(parse_battery("my-script", "nothing"), BatteryStatus::default());
    }

    #[test]
    fn level_thresholds_are_strict() {
        assert_eq!(battery_level(96), BatteryLevel::Full);
        assert_eq!(battery_level(95), BatteryLevel::Good);
        assert_eq!(battery_level(50), BatteryLevel::Low);
        assert_eq!(battery_level(20), BatteryLevel::Empty);
        assert_eq!(brightness_level(71.0), BrightnessLevel::High);
        assert_eq!(brightness_level(70.0), BrightnessLevel::Medium);
        assert_eq!(brightness_level(30.0), BrightnessLevel::Low);
        assert_eq!(volume_level(90.0, true), VolumeLevel::Muted);
        assert_eq!(volume_level(31.0, false), VolumeLevel::Medium);
    }

    #[test]
    fn icons_follow_levels() {
        let icons = Icons::default();
        assert_eq!(icons.battery_icon(BatteryLevel::Low), icons.battery_low);
        assert_eq!(icons.brightness_icon(BrightnessLevel::High), icons.brightness_high);
        assert_eq!(icons.volume_icon(VolumeLevel::Muted), icons.volume_muted);
    }

    #[test]
    fn wifi_and_bluetooth_rows() {
        let icons = Icons::default();
        assert_eq!(wifi_status(&icons, "home\n"), (icons.wifi_on.as_str(), "home".to_string()));
        assert_eq!(
            wifi_status(&icons, ""),
            (icons.wifi_off.as_str(), "disconnected".to_string())
        );
        assert_eq!(
            bluetooth_status(&icons, "yes", "laptop"),
            (icons.bt_on.as_str(), "laptop".to_string())
        );
        assert_eq!(
            bluetooth_status(&icons, "no", "laptop"),
            (icons.bt_off.as_str(), "disabled".to_string())
        );
    }

    #[test]
    fn interface_text_variants() {
        assert_eq!(interface_text("", true, Some("10.0.0.2")), "Not selected");
        assert_eq!(interface_text("eth0", true, Some("10.0.0.2")), "eth0: 10.0.0.2");
        assert_eq!(interface_text("eth0", false, Some("10.0.0.2")), "eth0");
        assert_eq!(interface_text("eth0", true, None), "eth0");
    }

    #[test]
    fn ip_addr_strips_prefix() {
        let output = "2: wlan0    inet 192.168.1.5/24 brd 192.168.1.255 scope global wlan0";
        assert_eq!(parse_ip_addr(output).as_deref(), Some("192.168.1.5"));
        assert_eq!(parse_ip_addr(""), None);
    }

    #[test]
    fn player_state_from_status() {
        assert_eq!(PlayerState::from_output("Playing\n"), PlayerState::Playing);
        assert!(PlayerState::from_output("Paused").is_active());
        assert!(!PlayerState::from_output("No players found").is_active());
    }

    #[test]
    fn parse_numeric_prefers_percent_tokens() {
        let pactl = "Volume: front-left: 39321 /  60% / -13.31 dB\nMute: no";
        assert_eq!(parse_numeric(pactl, 0.0, 100.0, NumericParseMode::Auto), Some(60.0));
        assert!(!parse_muted(pactl));
        assert!(parse_muted("Mute: yes"));
    }

    #[test]
    fn parse_numeric_modes() {
        assert_eq!(parse_numeric("0.45", 0.0, 100.0, NumericParseMode::Auto), Some(45.0));
        assert_eq!(parse_numeric("4.5", 0.0, 100.0, NumericParseMode::Percent), Some(4.5));
        assert_eq!(parse_numeric("1", 0.0, 100.0, NumericParseMode::Ratio), Some(100.0));
        assert_eq!(parse_numeric("250", 0.0, 100.0, NumericParseMode::Percent), Some(100.0));
        assert_eq!(parse_numeric("n/a", 0.0, 100.0, NumericParseMode::Auto), None);
    }

    #[test]
    fn brightness_is_rounded() {
        assert_eq!(parse_brightness("45.60\n"), Some(46.0));
        assert_eq!(parse_brightness("error"), None);
    }
}
