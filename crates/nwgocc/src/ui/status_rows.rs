//! Built-in status rows: user, Wi-Fi, interface, Bluetooth and battery.

use std::cell::Cell;
use std::path::Path;
use std::rc::Rc;

use gtk::glib;
use gtk::prelude::*;
use nwgocc_core::config::first_program;
use nwgocc_core::status::{
    battery_level, bluetooth_status, interface_icon, interface_text, parse_battery,
    parse_ip_addr, wifi_status,
};
use nwgocc_core::util::{interface_is_up, program_in_path};
use nwgocc_core::{Commands, Settings};
use tracing::debug;

use super::rows::{RowContext, StatusRow};
use super::widgets::command_utils::{
    command_output_text, run_command_capture_async, run_command_capture_status_async,
};

const SYS_CLASS_NET: &str = "/sys/class/net";

pub struct StatusRows {
    settings: Rc<Settings>,
    wifi: Option<Rc<StatusRow>>,
    interface: Option<Rc<StatusRow>>,
    bluetooth: Option<Rc<StatusRow>>,
    bluetooth_ready: Rc<Cell<bool>>,
    battery: Option<Rc<StatusRow>>,
}

impl StatusRows {
    /// Append enabled rows to `container` in panel order.
    pub fn build(container: &gtk::Box, ctx: &RowContext, settings: Rc<Settings>) -> Self {
        let prefs = &settings.preferences;
        let icons = &settings.icons;
        let mut add = |enabled: bool, icon: &str, text: &str, on_click: &str| {
            enabled.then(|| {
                let row = Rc::new(StatusRow::new(ctx, icon, text, on_click));
                container.append(&row.root);
                row
            })
        };

        let user = add(prefs.show_user_line, &icons.user, "", &prefs.on_click_user);
        let wifi = add(prefs.show_wifi_line, &icons.wifi_off, "", &prefs.on_click_wifi);
        let interface = add(
            prefs.show_interface_line,
            &icons.network_disconnected,
            "",
            &prefs.on_click_interface,
        );
        let bluetooth = add(prefs.show_bt_line, &icons.bt_off, "", &prefs.on_click_bluetooth);
        let battery = add(
            prefs.show_battery_line,
            &icons.battery_empty,
            "",
            &prefs.on_click_battery,
        );

        if let Some(row) = user.as_ref() {
            fill_user_row(row.clone(), &settings.commands);
        }
        let bluetooth_ready = Rc::new(Cell::new(false));
        if let Some(row) = bluetooth.as_ref() {
            // Shown only once systemd reports the service enabled and running.
            row.root.set_visible(false);
            check_bluetooth_service(row.clone(), bluetooth_ready.clone(), settings.clone());
        }

        Self {
            settings,
            wifi,
            interface,
            bluetooth,
            bluetooth_ready,
            battery,
        }
    }

    pub fn refresh_fast(&self) {
        if let Some(row) = self.wifi.as_ref() {
            refresh_wifi(row.clone(), self.settings.clone());
        }
        if let Some(row) = self.interface.as_ref() {
            refresh_interface(row.clone(), self.settings.clone());
        }
        if let Some(row) = self.bluetooth.as_ref() {
            if self.bluetooth_ready.get() {
                refresh_bluetooth(row.clone(), self.settings.clone());
            }
        }
    }

    pub fn refresh_slow(&self) {
        if let Some(row) = self.battery.as_ref() {
            refresh_battery(row.clone(), self.settings.clone());
        }
    }
}

async fn capture_text(cmd: &str) -> String {
    match run_command_capture_status_async(cmd).recv().await {
        Ok(result) => command_output_text(&result),
        Err(_) => String::new(),
    }
}

fn fill_user_row(row: Rc<StatusRow>, commands: &Commands) {
    let get_user = commands.get_user.clone();
    let get_host = commands.get_host.clone();
    glib::MainContext::default().spawn_local(async move {
        let user = capture_text(&get_user).await;
        let host = capture_text(&get_host).await;
        row.set_text(&user_host_text(&user, &host));
    });
}

fn user_host_text(user: &str, host: &str) -> String {
    format!("{user}@{host}")
}

fn check_bluetooth_service(row: Rc<StatusRow>, ready: Rc<Cell<bool>>, settings: Rc<Settings>) {
    let systemctl = settings.commands.systemctl.trim().to_string();
    if !first_program(&systemctl).is_some_and(program_in_path) {
        debug!("systemctl not available, bluetooth row hidden");
        return;
    }
    glib::MainContext::default().spawn_local(async move {
        let enabled = capture_text(&format!("{systemctl} is-enabled bluetooth.service")).await;
        let active = capture_text(&format!("{systemctl} is-active bluetooth.service")).await;
        if !bluetooth_service_ready(&enabled, &active) {
            debug!(%enabled, %active, "bluetooth service not running, row hidden");
            return;
        }
        ready.set(true);
        row.root.set_visible(true);
        refresh_bluetooth(row, settings);
    });
}

fn bluetooth_service_ready(enabled: &str, active: &str) -> bool {
    enabled.trim() == "enabled" && active.trim() == "active"
}

fn refresh_wifi(row: Rc<StatusRow>, settings: Rc<Settings>) {
    let Some(gen) = row.begin_refresh() else {
        return;
    };
    glib::MainContext::default().spawn_local(async move {
        let ssid = capture_text(&settings.commands.get_ssid).await;
        if !row.finish_refresh(gen) {
            return;
        }
        let (icon, text) = wifi_status(&settings.icons, &ssid);
        row.set_icon(icon);
        row.set_text(&text);
    });
}

fn refresh_interface(row: Rc<StatusRow>, settings: Rc<Settings>) {
    let name = settings.preferences.interface_name.trim().to_string();
    let up = interface_is_up(Path::new(SYS_CLASS_NET), &name);
    if !up {
        row.cancel_refresh();
        row.set_icon(interface_icon(&settings.icons, false));
        row.set_text(&interface_text(&name, false, None));
        return;
    }
    let Some(gen) = row.begin_refresh() else {
        return;
    };
    row.set_icon(interface_icon(&settings.icons, true));
    glib::MainContext::default().spawn_local(async move {
        let cmd = settings.commands.get_ip_addr.replace("{iface}", &name);
        let output = capture_text(&cmd).await;
        if !row.finish_refresh(gen) {
            return;
        }
        let addr = parse_ip_addr(&output);
        row.set_text(&interface_text(&name, true, addr.as_deref()));
    });
}

fn refresh_bluetooth(row: Rc<StatusRow>, settings: Rc<Settings>) {
    let Some(gen) = row.begin_refresh() else {
        return;
    };
    glib::MainContext::default().spawn_local(async move {
        let powered = capture_text(&settings.commands.get_bluetooth_status).await;
        let name = if powered.trim() == "yes" {
            capture_text(&settings.commands.get_bluetooth_name).await
        } else {
            String::new()
        };
        if !row.finish_refresh(gen) {
            return;
        }
        let (icon, text) = bluetooth_status(&settings.icons, &powered, &name);
        row.set_icon(icon);
        row.set_text(&text);
    });
}

/// The first battery command whose program is installed.
fn battery_command(commands: &Commands, lookup: impl Fn(&str) -> bool) -> Option<&str> {
    [commands.get_battery.as_str(), commands.get_battery_alt.as_str()]
        .into_iter()
        .find(|cmd| first_program(cmd).is_some_and(&lookup))
}

fn refresh_battery(row: Rc<StatusRow>, settings: Rc<Settings>) {
    let Some(cmd) = battery_command(&settings.commands, program_in_path).map(str::to_string)
    else {
        row.cancel_refresh();
        row.set_icon(&settings.icons.battery_empty);
        row.set_text("");
        return;
    };
    let Some(gen) = row.begin_refresh() else {
        return;
    };
    glib::MainContext::default().spawn_local(async move {
        let output = match run_command_capture_async(&cmd).recv().await {
            Ok(result) => command_output_text(&result),
            Err(_) => String::new(),
        };
        if !row.finish_refresh(gen) {
            return;
        }
        let status = parse_battery(&cmd, &output);
        row.set_icon(settings.icons.battery_icon(battery_level(status.percent)));
        row.set_text(&status.text);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_row_joins_user_and_host() {
        assert_eq!(user_host_text("ann", "box"), "ann@box");
    }

    #[test]
    fn bluetooth_needs_enabled_and_active_service() {
        assert!(bluetooth_service_ready("enabled\n", "active\n"));
        assert!(!bluetooth_service_ready("enabled", "inactive"));
        assert!(!bluetooth_service_ready("disabled", "active"));
    }

    #[test]
    fn battery_command_falls_back_to_alternative() {
        let commands = Commands::default();
        assert_eq!(
            battery_command(&commands, |program| program == "upower"),
            Some(commands.get_battery.as_str())
        );
        assert_eq!(
            battery_command(&commands, |program| program == "acpi"),
            Some("acpi")
        );
        assert_eq!(battery_command(&commands, |_| false), None);
    }
}
