//! Editor window for the custom rows and custom buttons templates.

use std::rc::Rc;

use gtk::prelude::*;
use gtk::{gio, Align};
use nwgocc_core::{apply_template_edits, Shortcut, ShortcutEdit, TemplateKind};
use tracing::debug;

use super::close_on_escape;
use crate::ui::icons::IconResolver;

const ICON_PATTERNS: [&str; 4] = ["*.svg", "*.SVG", "*.png", "*.PNG"];

struct EntryRow {
    name: gtk::Entry,
    cmd: gtk::Entry,
    icon: gtk::Entry,
    delete: Option<gtk::CheckButton>,
}

impl EntryRow {
    fn shortcut(&self) -> Shortcut {
        Shortcut {
            name: self.name.text().trim().to_string(),
            cmd: self.cmd.text().trim().to_string(),
            icon: self.icon.text().trim().to_string(),
        }
    }

    fn edit(&self) -> ShortcutEdit {
        ShortcutEdit {
            shortcut: self.shortcut(),
            delete: self.delete.as_ref().is_some_and(|check| check.is_active()),
        }
    }
}

pub fn open_template_editor(
    parent: &gtk::Window,
    kind: TemplateKind,
    entries: &[Shortcut],
    resolver: Rc<IconResolver>,
    on_apply: impl Fn(Vec<Shortcut>) + 'static,
) {
    let window = gtk::Window::builder()
        .title(format!("nwgocc: {}", kind.title()))
        .transient_for(parent)
        .modal(true)
        .build();
    window.set_widget_name("preferences");
    close_on_escape(&window);

    let grid = gtk::Grid::new();
    grid.set_column_spacing(10);
    grid.set_row_spacing(10);
    for (column, title) in ["Label", "Command", "Icon name or path"].into_iter().enumerate() {
        let label = gtk::Label::new(Some(title));
        label.set_halign(Align::Start);
        grid.attach(&label, column as i32, 0, 1, 1);
    }

    let mut rows: Vec<EntryRow> = Vec::with_capacity(entries.len());
    for (index, shortcut) in entries.iter().enumerate() {
        rows.push(attach_row(&grid, &window, index as i32 + 1, shortcut, &resolver, true));
    }
    let new_row = attach_row(
        &grid,
        &window,
        entries.len() as i32 + 1,
        &Shortcut::default(),
        &resolver,
        false,
    );

    let buttons = gtk::Box::new(gtk::Orientation::Horizontal, 6);
    buttons.set_halign(Align::End);
    let cancel = gtk::Button::with_label("Cancel");
    let cancel_window = window.downgrade();
    cancel.connect_clicked(move |_| {
        if let Some(window) = cancel_window.upgrade() {
            window.close();
        }
    });
    let apply = gtk::Button::with_label("Apply");
    let apply_window = window.downgrade();
    apply.connect_clicked(move |_| {
        let edits = rows.iter().map(EntryRow::edit).collect();
        let list = apply_template_edits(edits, new_row.shortcut());
        debug!(kind = kind.title(), entries = list.len(), "template edited");
        on_apply(list);
        if let Some(window) = apply_window.upgrade() {
            window.close();
        }
    });
    buttons.append(&cancel);
    buttons.append(&apply);

    let vbox = gtk::Box::new(gtk::Orientation::Vertical, 12);
    vbox.set_margin_top(20);
    vbox.set_margin_bottom(20);
    vbox.set_margin_start(20);
    vbox.set_margin_end(20);
    vbox.append(&grid);
    vbox.append(&buttons);
    window.set_child(Some(&vbox));
    window.present();
}

fn attach_row(
    grid: &gtk::Grid,
    window: &gtk::Window,
    row: i32,
    shortcut: &Shortcut,
    resolver: &Rc<IconResolver>,
    deletable: bool,
) -> EntryRow {
    let name = gtk::Entry::new();
    name.set_width_chars(20);
    name.set_text(&shortcut.name);
    grid.attach(&name, 0, row, 1, 1);

    let cmd = gtk::Entry::new();
    cmd.set_width_chars(25);
    cmd.set_text(&shortcut.cmd);
    grid.attach(&cmd, 1, row, 1, 1);

    let icon = gtk::Entry::new();
    icon.set_width_chars(40);
    icon.set_text(&shortcut.icon);
    preview_icon(&icon, resolver);
    let preview_resolver = resolver.clone();
    icon.connect_changed(move |entry| preview_icon(entry, &preview_resolver));
    grid.attach(&icon, 2, row, 1, 1);

    let choose = gtk::Button::from_icon_name("document-open-symbolic");
    choose.set_tooltip_text(Some("Choose icon file"));
    let dialog_window = window.downgrade();
    let target = icon.downgrade();
    choose.connect_clicked(move |_| {
        if let (Some(window), Some(entry)) = (dialog_window.upgrade(), target.upgrade()) {
            choose_icon_file(&window, entry);
        }
    });
    grid.attach(&choose, 3, row, 1, 1);

    let delete = deletable.then(|| {
        let check = gtk::CheckButton::with_label("Delete");
        grid.attach(&check, 4, row, 1, 1);
        check
    });

    EntryRow {
        name,
        cmd,
        icon,
        delete,
    }
}

fn preview_icon(entry: &gtk::Entry, resolver: &IconResolver) {
    let text = entry.text();
    let name = text.trim();
    if name.is_empty() {
        entry.set_icon_from_gicon(gtk::EntryIconPosition::Primary, None::<&gio::Icon>);
    } else {
        entry.set_icon_from_gicon(gtk::EntryIconPosition::Primary, Some(&resolver.gicon(name)));
    }
}

fn choose_icon_file(window: &gtk::Window, entry: gtk::Entry) {
    let filter = gtk::FileFilter::new();
    filter.set_name(Some("Icons"));
    for pattern in ICON_PATTERNS {
        filter.add_pattern(pattern);
    }
    let dialog = gtk::FileDialog::builder()
        .title("Select icon")
        .modal(true)
        .default_filter(&filter)
        .build();
    dialog.open(Some(window), gio::Cancellable::NONE, move |result| {
        if let Ok(file) = result {
            if let Some(path) = file.path() {
                entry.set_text(&path.to_string_lossy());
            }
        }
    });
}
