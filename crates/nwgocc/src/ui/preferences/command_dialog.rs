//! Small dialog editing the command a status row runs on click.

use gtk::prelude::*;

use super::close_on_escape;

pub fn open_command_dialog(
    parent: &gtk::Window,
    initial: &str,
    on_apply: impl Fn(String) + 'static,
) {
    let window = gtk::Window::builder()
        .title("nwgocc: Edit command")
        .transient_for(parent)
        .modal(true)
        .build();
    window.set_widget_name("preferences");
    close_on_escape(&window);

    let hbox = gtk::Box::new(gtk::Orientation::Horizontal, 6);
    hbox.set_margin_top(6);
    hbox.set_margin_bottom(6);
    hbox.set_margin_start(6);
    hbox.set_margin_end(6);

    let entry = gtk::Entry::new();
    entry.set_width_chars(25);
    entry.set_text(initial);
    entry.set_hexpand(true);
    hbox.append(&entry);

    let cancel = gtk::Button::with_label("Cancel");
    let cancel_window = window.downgrade();
    cancel.connect_clicked(move |_| {
        if let Some(window) = cancel_window.upgrade() {
            window.close();
        }
    });
    hbox.append(&cancel);

    let apply = gtk::Button::with_label("Apply");
    let apply_window = window.downgrade();
    let apply_entry = entry.downgrade();
    apply.connect_clicked(move |_| {
        if let Some(entry) = apply_entry.upgrade() {
            on_apply(entry.text().to_string());
        }
        if let Some(window) = apply_window.upgrade() {
            window.close();
        }
    });
    hbox.append(&apply);

    window.set_child(Some(&hbox));
    window.present();
}
