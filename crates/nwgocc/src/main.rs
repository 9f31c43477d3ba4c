//! Control center entrypoint and GTK initialization.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use glib::MainContext;
use gtk::prelude::*;
use nwgocc_core::cli::parse_cli_commands;
use nwgocc_core::instance::default_lock_path;
use nwgocc_core::{
    load_cli_commands, program_in_path, util, AppPaths, DebugLevel, InstanceError, InstanceLock,
    Settings, Templates, SYSTEM_DATA_DIR,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod css;
mod debug;
mod events;
mod ui;

use events::UiEvent;

#[derive(Parser, Debug)]
#[command(author, version, about = "GTK control center for wlroots compositors")]
struct Args {
    /// Templates file name in the config directory
    #[arg(short, long, default_value = "config.json")]
    config: String,
    /// CSS file name in the config directory
    #[arg(short, long, default_value = "style.css")]
    style: String,
    /// Check command availability and trace commands
    #[arg(short, long)]
    debug: bool,
    /// Overwrite preferences, templates, CLI commands and CSS with defaults
    #[arg(short, long = "restore-defaults")]
    restore: bool,
}

fn main() -> Result<()> {
    let started = Instant::now();
    let args = Args::parse();
    let paths = AppPaths::resolve(&args.config, &args.style).context("resolve paths")?;
    // The log level lives in the preferences file; a missing file means defaults.
    init_tracing(Settings::load(&paths.preferences_path()).ok().as_ref());
    paths
        .setup_dirs(args.restore, Path::new(SYSTEM_DATA_DIR))
        .context("set up config and data directories")?;
    let settings = Settings::load_or_default(&paths.preferences_path());
    if util::diagnostic_mode() {
        info!(
            limit = util::log_limit(),
            "diagnostic logging enabled (snippets capped; newlines stripped)"
        );
    }

    let _lock = match InstanceLock::acquire(&default_lock_path()) {
        Ok(lock) => lock,
        Err(InstanceError::AlreadyRunning { pid }) => {
            info!(?pid, "another instance was running, asked it to quit");
            return Ok(());
        }
        Err(err) => return Err(err).context("acquire instance lock"),
    };

    if args.debug {
        print_availability(&settings);
        debug::set_level(DebugLevel::Verbose);
    }

    let templates = match Templates::load(&paths.templates_file) {
        Ok(templates) => templates,
        Err(err) => {
            warn!(?err, "using empty templates");
            Templates::default()
        }
    };
    let cli_text = match load_cli_commands(&paths.cli_commands_path()) {
        Ok(text) => text,
        Err(err) => {
            warn!(?err, "no cli commands loaded");
            String::new()
        }
    };
    info!(
        icon_set = settings.preferences.icon_set.as_str(),
        style = %paths.style_file.display(),
        custom_styling = settings.preferences.custom_styling,
        cli_commands = parse_cli_commands(&cli_text).len(),
        "configuration loaded"
    );

    let app = gtk::Application::new(
        Some("com.github.nwg-piotr.nwgocc"),
        gio::ApplicationFlags::NON_UNIQUE,
    );

    let init = RefCell::new(Some((paths, settings, templates, cli_text)));
    app.connect_activate(move |app| {
        let Some((paths, settings, templates, cli_text)) = init.borrow_mut().take() else {
            return;
        };
        let (event_tx, event_rx) = async_channel::unbounded();

        let css_manager =
            css::CssManager::new(paths.style_file.clone(), settings.preferences.custom_styling);
        css_manager.apply_to_display();
        css_manager.reload();

        let quit_app = app.clone();
        glib::unix_signal_add_local(libc::SIGTERM, move || {
            info!("SIGTERM received, quitting");
            quit_app.quit();
            glib::ControlFlow::Break
        });

        let watched = vec![
            paths.preferences_path(),
            paths.templates_file.clone(),
            paths.cli_commands_path(),
        ];
        let style_file = paths.style_file.clone();
        let ui = Rc::new(RefCell::new(ui::UiState::new(ui::UiStateInit {
            app: app.clone(),
            paths,
            settings,
            templates,
            cli_text,
            css: css_manager,
            event_tx: event_tx.clone(),
        })));

        let ui_clone = ui.clone();
        MainContext::default().spawn_local(async move {
            while let Ok(event) = event_rx.recv().await {
                ui_clone.borrow_mut().handle_event(event);
            }
        });

        css::start_css_watcher(style_file, {
            let event_tx = event_tx.clone();
            move || {
                let _ = event_tx.try_send(UiEvent::CssReload);
            }
        });
        css::start_config_watcher(watched, move || {
            let _ = event_tx.try_send(UiEvent::ConfigReload);
        });
        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "nwgocc ready"
        );
    });

    app.run_with_args::<String>(&[]);
    Ok(())
}

fn init_tracing(settings: Option<&Settings>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(settings)));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn default_directive(settings: Option<&Settings>) -> String {
    settings
        .and_then(|settings| settings.preferences.log_level.clone())
        .unwrap_or_else(|| "info".to_string())
}

fn print_availability(settings: &Settings) {
    println!("Checking commands availability:");
    for (program, found) in settings.commands.availability(program_in_path) {
        let status = if found { "OK" } else { "NOT FOUND" };
        println!("  {program}: {status}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level_comes_from_preferences_when_present() {
        assert_eq!(default_directive(None), "info");
        let mut settings = Settings::default();
        assert_eq!(default_directive(Some(&settings)), "info");
        settings.preferences.log_level = Some("nwgocc=debug".to_string());
        assert_eq!(default_directive(Some(&settings)), "nwgocc=debug");
    }
}
