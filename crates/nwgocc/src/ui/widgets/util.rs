//! Slider backed by a get command and a set command template.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use gtk::prelude::*;
use gtk::{glib, Align};
use tracing::warn;

use super::command_utils::{run_command, run_command_capture_status_async};
use crate::ui::icons::IconResolver;
use crate::ui::refresh::RefreshGuard;

const SET_DEBOUNCE: Duration = Duration::from_millis(120);
const TOGGLE_REFRESH_DELAY: Duration = Duration::from_millis(160);

/// Reading taken from the get command output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderReading {
    pub value: f64,
    pub muted: bool,
}

pub struct SliderSpec {
    pub name: &'static str,
    pub get_cmd: String,
    /// Template with a `{value}` placeholder.
    pub set_cmd: String,
    /// Runs when the icon is clicked, followed by a refresh.
    pub toggle_cmd: Option<String>,
    pub parse: fn(&str) -> Option<SliderReading>,
    pub icon_for: Box<dyn Fn(SliderReading) -> String>,
    pub icon_size: i32,
}

pub struct CommandSlider {
    pub root: gtk::Box,
    inner: Rc<SliderInner>,
}

struct SliderInner {
    spec: SliderSpec,
    scale: gtk::Scale,
    image: gtk::Image,
    current_icon: RefCell<String>,
    resolver: Rc<IconResolver>,
    debounce: SetDebounce,
    refresh: RefreshGuard,
    timer: RefCell<Option<glib::SourceId>>,
}

/// What a user value change asks the slider to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SetRequest {
    /// The change came from a refresh writing the scale.
    Ignore,
    /// Arm the debounce timer.
    Arm,
    /// A timer is armed already and will pick up the latest value.
    Coalesce,
}

/// Debounce of scale changes into set commands, plus the echo guard.
#[derive(Debug, Default)]
struct SetDebounce {
    updating: Cell<bool>,
    armed: Cell<bool>,
    value: Cell<Option<f64>>,
}

impl SetDebounce {
    fn user_changed(&self, value: f64) -> SetRequest {
        if self.updating.get() {
            return SetRequest::Ignore;
        }
        self.value.set(Some(value));
        if self.armed.replace(true) {
            SetRequest::Coalesce
        } else {
            SetRequest::Arm
        }
    }

    /// Timer fired: the value to send, if any.
    fn fire(&self) -> Option<f64> {
        self.armed.set(false);
        self.value.take()
    }

    /// A pending set command wins over the value read back.
    fn accepts_reading(&self) -> bool {
        !self.armed.get()
    }

    /// Run a programmatic scale update without triggering a set command.
    fn programmatic(&self, update: impl FnOnce()) {
        self.updating.set(true);
        update();
        self.updating.set(false);
    }
}

impl CommandSlider {
    pub fn new(spec: SliderSpec, resolver: Rc<IconResolver>) -> Self {
        let root = gtk::Box::new(gtk::Orientation::Horizontal, 10);
        root.set_widget_name(&format!("{}-row", spec.name));

        let initial_icon = (spec.icon_for)(SliderReading {
            value: 0.0,
            muted: false,
        });
        let image = resolver.image(&initial_icon, spec.icon_size);
        image.set_valign(Align::Center);

        let scale = gtk::Scale::with_range(gtk::Orientation::Horizontal, 0.0, 100.0, 1.0);
        scale.set_draw_value(true);
        scale.set_digits(0);
        scale.set_value_pos(gtk::PositionType::Right);
        scale.set_hexpand(true);
        scale.set_valign(Align::Center);

        root.append(&image);
        root.append(&scale);

        let inner = Rc::new(SliderInner {
            spec,
            scale: scale.clone(),
            image: image.clone(),
            current_icon: RefCell::new(initial_icon),
            resolver,
            debounce: SetDebounce::default(),
            refresh: RefreshGuard::default(),
            timer: RefCell::new(None),
        });

        if inner.spec.toggle_cmd.is_some() {
            let click = gtk::GestureClick::new();
            let weak = Rc::downgrade(&inner);
            click.connect_pressed(move |_, _, _, _| {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                if let Some(cmd) = inner.spec.toggle_cmd.as_deref() {
                    run_command(cmd);
                }
                let weak = Rc::downgrade(&inner);
                glib::timeout_add_local_once(TOGGLE_REFRESH_DELAY, move || {
                    if let Some(inner) = weak.upgrade() {
                        // The reading in flight predates the toggle.
                        inner.refresh.cancel();
                        SliderInner::refresh(&inner);
                    }
                });
            });
            image.add_controller(click);
        }

        let weak = Rc::downgrade(&inner);
        scale.connect_value_changed(move |scale| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let value = scale.value();
            match inner.debounce.user_changed(value) {
                SetRequest::Ignore => return,
                SetRequest::Arm => SliderInner::arm_timer(&inner),
                SetRequest::Coalesce => {}
            }
            inner.update_icon(SliderReading {
                value,
                muted: false,
            });
        });

        Self { root, inner }
    }

    pub fn refresh(&self) {
        SliderInner::refresh(&self.inner);
    }
}

impl SliderInner {
    fn refresh(this: &Rc<Self>) {
        let Some(gen) = this.refresh.begin() else {
            return;
        };
        let rx = run_command_capture_status_async(&this.spec.get_cmd);
        let weak = Rc::downgrade(this);
        glib::MainContext::default().spawn_local(async move {
            let result = rx.recv().await;
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if !inner.refresh.finish(gen) {
                return;
            }
            let Ok(result) = result else {
                return;
            };
            let output = match result {
                Ok(output) if output.status.success() => output,
                Ok(_) => {
                    warn!(slider = inner.spec.name, "slider command returned error");
                    return;
                }
                Err(err) => {
                    warn!(slider = inner.spec.name, ?err, "slider command failed");
                    return;
                }
            };
            let stdout = String::from_utf8_lossy(&output.stdout);
            let Some(reading) = (inner.spec.parse)(&stdout) else {
                return;
            };
            if !inner.debounce.accepts_reading() {
                return;
            }
            inner
                .debounce
                .programmatic(|| inner.scale.set_value(reading.value));
            inner.update_icon(reading);
        });
    }

    fn update_icon(&self, reading: SliderReading) {
        let icon = (self.spec.icon_for)(reading);
        if *self.current_icon.borrow() == icon {
            return;
        }
        self.resolver.apply(&self.image, &icon);
        self.current_icon.replace(icon);
    }

    fn arm_timer(this: &Rc<Self>) {
        let weak = Rc::downgrade(this);
        let id = glib::timeout_add_local_once(SET_DEBOUNCE, move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            inner.timer.borrow_mut().take();
            if let Some(value) = inner.debounce.fire() {
                run_command(&fill_value(&inner.spec.set_cmd, value));
            }
        });
        *this.timer.borrow_mut() = Some(id);
    }
}

impl Drop for SliderInner {
    fn drop(&mut self) {
        if let Some(id) = self.timer.get_mut().take() {
            id.remove();
        }
    }
}

/// Substitute the rounded slider value into a set command template.
pub fn fill_value(template: &str, value: f64) -> String {
    template.replace("{value}", &format!("{value:.0}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_writes_do_not_echo_into_set_commands() {
        let debounce = SetDebounce::default();
        let mut seen = None;
        debounce.programmatic(|| seen = Some(debounce.user_changed(40.0)));
        assert_eq!(seen, Some(SetRequest::Ignore));
        assert_eq!(debounce.fire(), None);
    }

    #[test]
    fn rapid_changes_collapse_into_latest_value() {
        let debounce = SetDebounce::default();
        assert_eq!(debounce.user_changed(10.0), SetRequest::Arm);
        assert_eq!(debounce.user_changed(20.0), SetRequest::Coalesce);
        assert_eq!(debounce.user_changed(30.0), SetRequest::Coalesce);
        assert!(!debounce.accepts_reading());
        assert_eq!(debounce.fire(), Some(30.0));
        assert!(debounce.accepts_reading());
        assert_eq!(debounce.user_changed(35.0), SetRequest::Arm);
    }

    #[test]
    fn value_is_rounded_into_template() {
        assert_eq!(fill_value("light -S {value}", 42.6), "light -S 43");
        assert_eq!(
            fill_value("pactl set-sink-volume @DEFAULT_SINK@ {value}%", 7.0),
            "pactl set-sink-volume @DEFAULT_SINK@ 7%"
        );
        assert_eq!(fill_value("no-placeholder", 3.0), "no-placeholder");
    }
}
