//! CSS providers and file watchers for hot reload.

use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use gtk::gdk;
use gtk::CssProvider;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use nwgocc_core::DEFAULT_STYLE_CSS;
use tracing::{debug, warn};

const RELOAD_DEBOUNCE: Duration = Duration::from_millis(150);

/// Embedded base stylesheet plus the optional user stylesheet.
#[derive(Clone)]
pub struct CssManager {
    style_file: PathBuf,
    custom_styling: bool,
    base: CssProvider,
    user: CssProvider,
}

impl CssManager {
    pub fn new(style_file: PathBuf, custom_styling: bool) -> Self {
        Self {
            style_file,
            custom_styling,
            base: CssProvider::new(),
            user: CssProvider::new(),
        }
    }

    /// Register providers for the default display.
    pub fn apply_to_display(&self) {
        let Some(display) = gdk::Display::default() else {
            warn!("no display available for css providers");
            return;
        };
        gtk::style_context_add_provider_for_display(
            &display,
            &self.base,
            gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
        gtk::style_context_add_provider_for_display(
            &display,
            &self.user,
            gtk::STYLE_PROVIDER_PRIORITY_USER,
        );
    }

    pub fn set_custom_styling(&mut self, enabled: bool) {
        self.custom_styling = enabled;
    }

    pub fn reload(&self) {
        self.base.load_from_data(DEFAULT_STYLE_CSS);
        let user_css = if self.custom_styling {
            read_user_css(&self.style_file)
        } else {
            String::new()
        };
        self.user.load_from_data(&user_css);
        debug!(
            custom_styling = self.custom_styling,
            style = %self.style_file.display(),
            "css reloaded"
        );
    }
}

fn read_user_css(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) => {
            warn!(?err, path = %path.display(), "failed to read style file");
            String::new()
        }
    }
}

/// Watch the user stylesheet and call `on_reload` when it changes.
pub fn start_css_watcher(style_file: PathBuf, on_reload: impl Fn() + Send + 'static) {
    watch_files("css", vec![style_file], on_reload);
}

/// Watch preference, template and CLI command files.
pub fn start_config_watcher(files: Vec<PathBuf>, on_reload: impl Fn() + Send + 'static) {
    watch_files("config", files, on_reload);
}

fn watch_files(label: &'static str, files: Vec<PathBuf>, on_reload: impl Fn() + Send + 'static) {
    let dirs: HashSet<PathBuf> = files
        .iter()
        .filter_map(|path| path.parent().map(Path::to_path_buf))
        .collect();
    let names: HashSet<OsString> = files
        .iter()
        .filter_map(|path| path.file_name().map(|name| name.to_os_string()))
        .collect();
    if dirs.is_empty() {
        return;
    }

    let spawned = thread::Builder::new()
        .name(format!("nwgocc-{label}-watcher"))
        .spawn(move || {
            let (event_tx, event_rx) = mpsc::channel::<notify::Result<Event>>();
            let mut watcher = match RecommendedWatcher::new(
                move |res| {
                    let _ = event_tx.send(res);
                },
                notify::Config::default(),
            ) {
                Ok(watcher) => watcher,
                Err(err) => {
                    warn!(?err, label, "failed to create file watcher");
                    return;
                }
            };

            for dir in &dirs {
                if let Err(err) = watcher.watch(dir, RecursiveMode::NonRecursive) {
                    warn!(?err, label, dir = %dir.display(), "failed to watch directory");
                }
            }

            while wait_for_quiet_change(&event_rx, &names, RELOAD_DEBOUNCE) {
                on_reload();
            }
        });
    if let Err(err) = spawned {
        warn!(?err, label, "failed to spawn file watcher thread");
    }
}

/// Block until a watched file changes and then stays quiet for `quiet`.
///
/// Editors and `fs::write` emit a truncate before the new contents land, so
/// firing on the first event would read a half-written file. Returns `false`
/// once the watcher is gone and no change is pending.
fn wait_for_quiet_change(
    rx: &mpsc::Receiver<notify::Result<Event>>,
    names: &HashSet<OsString>,
    quiet: Duration,
) -> bool {
    loop {
        match rx.recv() {
            Ok(Ok(event)) if touches_watched(&event.paths, names) => break,
            Ok(_) => {}
            Err(_) => return false,
        }
    }
    let mut deadline = Instant::now() + quiet;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match rx.recv_timeout(remaining) {
            Ok(Ok(event)) if touches_watched(&event.paths, names) => {
                deadline = Instant::now() + quiet;
            }
            Ok(_) => {}
            Err(mpsc::RecvTimeoutError::Timeout) => return true,
            Err(mpsc::RecvTimeoutError::Disconnected) => return true,
        }
    }
}

fn touches_watched(paths: &[PathBuf], names: &HashSet<OsString>) -> bool {
    paths
        .iter()
        .filter_map(|path| path.file_name())
        .any(|name| names.contains(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{EventKind, ModifyKind};

    fn modified(path: &str) -> notify::Result<Event> {
        Ok(Event::new(EventKind::Modify(ModifyKind::Any)).add_path(PathBuf::from(path)))
    }

    fn watched() -> HashSet<OsString> {
        [OsString::from("preferences.json")].into_iter().collect()
    }

    #[test]
    fn burst_of_writes_fires_once_after_quiet_period() {
        let (tx, rx) = mpsc::channel();
        let quiet = Duration::from_millis(80);
        let started = Instant::now();
        let sender = thread::spawn(move || {
            for _ in 0..3 {
                let _ = tx.send(modified("/cfg/preferences.json"));
                thread::sleep(Duration::from_millis(30));
            }
            tx
        });
        assert!(wait_for_quiet_change(&rx, &watched(), quiet));
        // The last write lands at ~60 ms; the reload waits a full quiet period after it.
        assert!(started.elapsed() >= Duration::from_millis(60) + quiet);

        let tx = sender.join().expect("sender thread");
        drop(tx);
        assert!(!wait_for_quiet_change(&rx, &watched(), quiet));
    }

    #[test]
    fn unrelated_files_never_trigger_a_reload() {
        let (tx, rx) = mpsc::channel();
        tx.send(modified("/cfg/preferences.json.swp")).expect("send");
        tx.send(modified("/cfg/other.json")).expect("send");
        drop(tx);
        assert!(!wait_for_quiet_change(&rx, &watched(), Duration::from_millis(10)));
    }

    #[test]
    fn events_are_filtered_by_file_name() {
        let names: HashSet<OsString> = ["style.css", "cli_commands"]
            .into_iter()
            .map(OsString::from)
            .collect();
        assert!(touches_watched(
            &[PathBuf::from("/home/u/.config/nwgocc/style.css")],
            &names
        ));
        assert!(!touches_watched(
            &[PathBuf::from("/home/u/.config/nwgocc/style.css.swp")],
            &names
        ));
        assert!(!touches_watched(&[], &names));
    }
}
