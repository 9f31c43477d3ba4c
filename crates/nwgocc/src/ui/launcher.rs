//! Launching user commands from rows and buttons.

use std::time::Duration;

use gtk::glib;
use gtk::prelude::*;
use nwgocc_core::util;
use tracing::{info, warn};

use super::widgets::command_utils::launch_detached;

const QUIT_DELAY: Duration = Duration::from_millis(100);

/// Starts commands and closes the panel afterwards unless it should stay open.
#[derive(Clone)]
pub struct Launcher {
    app: gtk::Application,
    dont_close: bool,
}

impl Launcher {
    pub fn new(app: gtk::Application, dont_close: bool) -> Self {
        Self { app, dont_close }
    }

    pub fn launch(&self, cmd: &str) {
        match launch_detached(cmd) {
            Ok(()) => info!(command = %util::log_snippet(cmd), "launched command"),
            Err(err) => {
                warn!(command = %util::log_snippet(cmd), ?err, "failed to launch command");
                return;
            }
        }
        if self.dont_close {
            return;
        }
        let app = self.app.clone();
        glib::timeout_add_local_once(QUIT_DELAY, move || app.quit());
    }
}
