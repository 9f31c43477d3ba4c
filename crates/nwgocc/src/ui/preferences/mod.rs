//! Preferences window: content toggles, row commands, icons, refresh rates
//! and the template editors.
//!
//! Edits go to a draft; Apply writes the files and asks the panel to reload.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use gtk::prelude::*;
use gtk::{gdk, glib, Align};
use nwgocc_core::util::list_interfaces;
use nwgocc_core::{
    save_cli_commands, AppPaths, ConfigError, IconSet, Preferences, Settings, Shortcut,
    TemplateKind, Templates,
};
use tracing::{info, warn};

use crate::events::UiEvent;
use crate::ui::icons::IconResolver;

mod command_dialog;
mod fields;
mod template_editor;

use command_dialog::open_command_dialog;
use fields::{Flag, NumericField, OnClick};
use template_editor::open_template_editor;

const NOT_SELECTED: &str = "Not selected";
const SYS_CLASS_NET: &str = "/sys/class/net";

/// State the preferences window starts from.
#[derive(Clone)]
pub struct PreferencesContext {
    pub app: gtk::Application,
    pub paths: AppPaths,
    pub settings: Settings,
    pub templates: Templates,
    pub cli_text: String,
    pub resolver: Rc<IconResolver>,
    pub event_tx: async_channel::Sender<UiEvent>,
}

/// Unsaved edits.
#[derive(Debug, Clone)]
pub struct PreferencesDraft {
    pub settings: Settings,
    pub templates: Templates,
    pub templates_changed: bool,
}

impl PreferencesDraft {
    pub fn new(settings: Settings, templates: Templates) -> Self {
        Self {
            settings,
            templates,
            templates_changed: false,
        }
    }

    pub fn set_templates(&mut self, kind: TemplateKind, list: Vec<Shortcut>) {
        self.templates.set_list(kind, list);
        self.templates_changed = true;
    }

    /// Write the CLI commands, the preferences and, if edited, the templates.
    pub fn save(&self, paths: &AppPaths, cli_text: &str) -> Result<(), ConfigError> {
        save_cli_commands(&paths.cli_commands_path(), cli_text)?;
        self.settings.save(&paths.preferences_path())?;
        if self.templates_changed {
            self.templates.save(&paths.templates_file)?;
        }
        Ok(())
    }
}

pub fn open_preferences(ctx: &PreferencesContext) {
    let draft = Rc::new(RefCell::new(PreferencesDraft::new(
        ctx.settings.clone(),
        ctx.templates.clone(),
    )));
    let window = gtk::Window::builder()
        .application(&ctx.app)
        .title("nwgocc: Preferences")
        .build();
    window.set_widget_name("preferences");
    close_on_escape(&window);

    let vbox = gtk::Box::new(gtk::Orientation::Vertical, 12);
    vbox.set_margin_top(12);
    vbox.set_margin_bottom(12);
    vbox.set_margin_start(12);
    vbox.set_margin_end(12);

    let cli_buffer = gtk::TextBuffer::new(None);
    cli_buffer.set_text(&ctx.cli_text);
    vbox.append(&frame("CLI label commands", &cli_view(&cli_buffer)));
    vbox.append(&frame("Content", &content_grid(ctx, &window, &draft)));
    vbox.append(&frame("Window", &window_flags(&draft)));
    vbox.append(&frame("Appearance", &appearance_grid(&draft)));
    vbox.append(&template_buttons(ctx, &window, &draft));
    vbox.append(&action_buttons(ctx, &window, &draft, &cli_buffer));

    let scroller = gtk::ScrolledWindow::new();
    scroller.set_policy(gtk::PolicyType::Never, gtk::PolicyType::Automatic);
    scroller.set_propagate_natural_height(true);
    scroller.set_child(Some(&vbox));
    window.set_child(Some(&scroller));
    window.present();
}

/// Escape closes the window.
pub(crate) fn close_on_escape(window: &gtk::Window) {
    let keys = gtk::EventControllerKey::new();
    let target = window.downgrade();
    keys.connect_key_pressed(move |_, key, _, _| {
        if key != gdk::Key::Escape {
            return glib::Propagation::Proceed;
        }
        if let Some(window) = target.upgrade() {
            window.close();
        }
        glib::Propagation::Stop
    });
    window.add_controller(keys);
}

fn frame(title: &str, child: &impl IsA<gtk::Widget>) -> gtk::Frame {
    let frame = gtk::Frame::new(Some(title));
    child.set_margin_top(6);
    child.set_margin_bottom(6);
    child.set_margin_start(6);
    child.set_margin_end(6);
    frame.set_child(Some(child));
    frame
}

fn cli_view(buffer: &gtk::TextBuffer) -> gtk::ScrolledWindow {
    let view = gtk::TextView::with_buffer(buffer);
    view.set_monospace(true);
    let scroller = gtk::ScrolledWindow::new();
    scroller.set_min_content_height(80);
    scroller.set_child(Some(&view));
    scroller
}

fn content_grid(
    ctx: &PreferencesContext,
    window: &gtk::Window,
    draft: &Rc<RefCell<PreferencesDraft>>,
) -> gtk::Grid {
    let grid = gtk::Grid::new();
    grid.set_column_spacing(10);
    grid.set_row_spacing(4);
    let prefs = draft.borrow().settings.preferences.clone();
    let click_me = ctx.settings.icons.click_me.clone();
    let icon_size = ctx.settings.preferences.icon_size_small;

    for (row, flag) in Flag::CONTENT.into_iter().enumerate() {
        grid.attach(&flag_check(flag, &prefs, draft), 0, row as i32, 1, 1);
        let Some(on_click) = flag.on_click() else {
            continue;
        };
        let button = gtk::Button::new();
        button.set_child(Some(&ctx.resolver.image(&click_me, icon_size)));
        button.set_tooltip_text(Some("Command run on click"));
        button.set_halign(Align::Start);
        let parent = window.downgrade();
        let draft = draft.clone();
        button.connect_clicked(move |_| {
            let Some(parent) = parent.upgrade() else {
                return;
            };
            let current = on_click.get(&draft.borrow().settings.preferences).to_string();
            let draft = draft.clone();
            open_command_dialog(&parent, &current, move |command| {
                set_on_click(&draft, on_click, &command);
            });
        });
        grid.attach(&button, 1, row as i32, 1, 1);
    }
    grid
}

fn set_on_click(draft: &RefCell<PreferencesDraft>, on_click: OnClick, command: &str) {
    on_click.set(&mut draft.borrow_mut().settings.preferences, command);
}

fn flag_check(
    flag: Flag,
    prefs: &Preferences,
    draft: &Rc<RefCell<PreferencesDraft>>,
) -> gtk::CheckButton {
    let check = gtk::CheckButton::with_label(flag.label());
    check.set_active(flag.get(prefs));
    let draft = draft.clone();
    check.connect_toggled(move |check| {
        flag.set(&mut draft.borrow_mut().settings.preferences, check.is_active());
    });
    check
}

fn window_flags(draft: &Rc<RefCell<PreferencesDraft>>) -> gtk::Box {
    let hbox = gtk::Box::new(gtk::Orientation::Horizontal, 12);
    let prefs = draft.borrow().settings.preferences.clone();
    for flag in Flag::WINDOW {
        hbox.append(&flag_check(flag, &prefs, draft));
    }
    hbox
}

fn appearance_grid(draft: &Rc<RefCell<PreferencesDraft>>) -> gtk::Grid {
    let grid = gtk::Grid::new();
    grid.set_column_spacing(10);
    grid.set_row_spacing(6);
    let prefs = draft.borrow().settings.preferences.clone();

    let icon_sets = gtk::DropDown::from_strings(&IconSet::ALL.map(IconSet::label));
    let selected = IconSet::ALL
        .iter()
        .position(|set| *set == prefs.icon_set)
        .unwrap_or(0);
    icon_sets.set_selected(selected as u32);
    let icon_draft = draft.clone();
    icon_sets.connect_selected_notify(move |dropdown| {
        if let Some(set) = IconSet::ALL.get(dropdown.selected() as usize) {
            icon_draft.borrow_mut().settings.preferences.icon_set = *set;
        }
    });
    attach_labeled(&grid, 0, "Icon set", &icon_sets);

    let (choices, selected) =
        interface_choices(list_interfaces(Path::new(SYS_CLASS_NET)), &prefs.interface_name);
    let labels: Vec<&str> = choices.iter().map(String::as_str).collect();
    let interfaces = gtk::DropDown::from_strings(&labels);
    interfaces.set_selected(selected);
    let iface_draft = draft.clone();
    interfaces.connect_selected_notify(move |dropdown| {
        let name = interface_for_choice(&choices, dropdown.selected());
        iface_draft.borrow_mut().settings.preferences.interface_name = name;
    });
    attach_labeled(&grid, 1, "Network interface", &interfaces);

    for (offset, field) in NumericField::ALL.into_iter().enumerate() {
        let range = field.range();
        let spin = gtk::SpinButton::with_range(*range.start(), *range.end(), 1.0);
        spin.set_value(field.get(&prefs));
        let spin_draft = draft.clone();
        spin.connect_value_changed(move |spin| {
            field.set(&mut spin_draft.borrow_mut().settings.preferences, spin.value());
        });
        attach_labeled(&grid, offset as i32 + 2, field.label(), &spin);
    }
    grid
}

fn attach_labeled(grid: &gtk::Grid, row: i32, title: &str, widget: &impl IsA<gtk::Widget>) {
    let label = gtk::Label::new(Some(title));
    label.set_halign(Align::Start);
    grid.attach(&label, 0, row, 1, 1);
    grid.attach(widget, 1, row, 1, 1);
}

/// Drop-down entries for the interface selector and the selected index.
///
/// A configured interface that no longer exists stays selectable.
fn interface_choices(mut interfaces: Vec<String>, current: &str) -> (Vec<String>, u32) {
    let current = current.trim();
    if !current.is_empty() && !interfaces.iter().any(|name| name == current) {
        interfaces.push(current.to_string());
    }
    let mut choices = Vec::with_capacity(interfaces.len() + 1);
    choices.push(NOT_SELECTED.to_string());
    choices.extend(interfaces);
    let selected = choices
        .iter()
        .skip(1)
        .position(|name| name == current)
        .map(|index| index as u32 + 1)
        .unwrap_or(0);
    (choices, selected)
}

fn interface_for_choice(choices: &[String], selected: u32) -> String {
    match selected {
        0 => String::new(),
        index => choices.get(index as usize).cloned().unwrap_or_default(),
    }
}

fn template_buttons(
    ctx: &PreferencesContext,
    window: &gtk::Window,
    draft: &Rc<RefCell<PreferencesDraft>>,
) -> gtk::Box {
    let hbox = gtk::Box::new(gtk::Orientation::Horizontal, 6);
    for kind in [TemplateKind::Rows, TemplateKind::Buttons] {
        let button = gtk::Button::with_label(kind.title());
        let parent = window.downgrade();
        let draft = draft.clone();
        let resolver = ctx.resolver.clone();
        button.connect_clicked(move |_| {
            let Some(parent) = parent.upgrade() else {
                return;
            };
            let entries = draft.borrow().templates.list(kind).to_vec();
            let draft = draft.clone();
            open_template_editor(&parent, kind, &entries, resolver.clone(), move |list| {
                draft.borrow_mut().set_templates(kind, list);
            });
        });
        hbox.append(&button);
    }
    hbox
}

fn action_buttons(
    ctx: &PreferencesContext,
    window: &gtk::Window,
    draft: &Rc<RefCell<PreferencesDraft>>,
    cli_buffer: &gtk::TextBuffer,
) -> gtk::Box {
    let hbox = gtk::Box::new(gtk::Orientation::Horizontal, 6);
    hbox.set_halign(Align::End);

    let cancel = gtk::Button::with_label("Cancel");
    let cancel_window = window.downgrade();
    cancel.connect_clicked(move |_| {
        if let Some(window) = cancel_window.upgrade() {
            window.close();
        }
    });

    let apply = gtk::Button::with_label("Apply");
    let apply_window = window.downgrade();
    let draft = draft.clone();
    let buffer = cli_buffer.clone();
    let paths = ctx.paths.clone();
    let event_tx = ctx.event_tx.clone();
    apply.connect_clicked(move |_| {
        let (start, end) = buffer.bounds();
        let cli_text = buffer.text(&start, &end, false);
        match draft.borrow().save(&paths, &cli_text) {
            Ok(()) => {
                info!("preferences saved");
                let _ = event_tx.try_send(UiEvent::ConfigReload);
            }
            Err(err) => warn!(?err, "failed to save preferences"),
        }
        if let Some(window) = apply_window.upgrade() {
            window.close();
        }
    });

    hbox.append(&cancel);
    hbox.append(&apply);
    hbox
}

#[cfg(test)]
mod tests {
    use super::*;
    use nwgocc_core::load_cli_commands;

    #[test]
    fn interface_choices_keep_missing_selection() {
        let (choices, selected) = interface_choices(vec!["eth0".into(), "wlan0".into()], "wlan0");
        assert_eq!(choices, vec![NOT_SELECTED, "eth0", "wlan0"]);
        assert_eq!(selected, 2);

        let (choices, selected) = interface_choices(vec!["eth0".into()], "usb0");
        assert_eq!(choices, vec![NOT_SELECTED, "eth0", "usb0"]);
        assert_eq!(interface_for_choice(&choices, selected), "usb0");

        let (choices, selected) = interface_choices(vec!["eth0".into()], "");
        assert_eq!(selected, 0);
        assert_eq!(interface_for_choice(&choices, selected), "");
    }

    #[test]
    fn draft_writes_templates_only_when_edited() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = AppPaths::from_dirs(
            dir.path().join("config"),
            dir.path().join("data"),
            "config.json",
            "style.css",
        );
        std::fs::create_dir_all(&paths.config_dir).expect("config dir");
        std::fs::create_dir_all(&paths.data_dir).expect("data dir");

        let mut draft = PreferencesDraft::new(Settings::default(), Templates::default());
        draft.settings.preferences.dont_close = true;
        draft.save(&paths, "uptime -p\n").expect("save");
        assert!(!paths.templates_file.exists());
        assert_eq!(
            load_cli_commands(&paths.cli_commands_path()).expect("cli"),
            "uptime -p\n"
        );
        let saved = Settings::load(&paths.preferences_path()).expect("settings");
        assert!(saved.preferences.dont_close);

        let shortcut = Shortcut {
            name: "Files".to_string(),
            cmd: "thunar".to_string(),
            icon: "folder".to_string(),
        };
        draft.set_templates(TemplateKind::Rows, vec![shortcut.clone()]);
        draft.save(&paths, "").expect("save");
        let templates = Templates::load(&paths.templates_file).expect("templates");
        assert_eq!(templates.custom_rows, vec![shortcut]);
    }
}
