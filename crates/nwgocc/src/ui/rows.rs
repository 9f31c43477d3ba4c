//! Icon + label rows, optionally clickable, used for status lines and custom rows.

use std::cell::RefCell;
use std::rc::Rc;

use gtk::prelude::*;
use gtk::Align;

use super::icons::IconResolver;
use super::launcher::Launcher;
use super::refresh::RefreshGuard;

const ROW_NORMAL: &str = "row-normal";
const ROW_SELECTED: &str = "row-selected";

/// Shared settings for building rows.
#[derive(Clone)]
pub struct RowContext {
    pub resolver: Rc<IconResolver>,
    pub launcher: Launcher,
    pub icon_size: i32,
    pub custom_styling: bool,
    pub click_me: String,
}

pub struct StatusRow {
    pub root: gtk::Box,
    image: gtk::Image,
    label: gtk::Label,
    icon: RefCell<String>,
    resolver: Rc<IconResolver>,
    refresh: RefreshGuard,
}

impl StatusRow {
    /// Build a row; a non-empty `on_click` makes it clickable with hover highlight.
    pub fn new(ctx: &RowContext, icon: &str, text: &str, on_click: &str) -> Self {
        let root = gtk::Box::new(gtk::Orientation::Horizontal, 10);
        if ctx.custom_styling {
            root.set_widget_name(ROW_NORMAL);
        }

        let image = ctx.resolver.image(icon, ctx.icon_size);
        image.set_visible(!icon.is_empty());
        let label = gtk::Label::new(Some(text));
        label.set_widget_name("status-label");
        label.set_xalign(0.0);
        label.set_hexpand(true);
        root.append(&image);
        root.append(&label);

        let on_click = on_click.trim();
        if !on_click.is_empty() {
            let click_me = ctx.resolver.image(&ctx.click_me, ctx.icon_size);
            click_me.set_halign(Align::End);
            root.append(&click_me);
            connect_click(&root, ctx, on_click.to_string());
        }

        Self {
            root,
            image,
            label,
            icon: RefCell::new(icon.to_string()),
            resolver: ctx.resolver.clone(),
            refresh: RefreshGuard::default(),
        }
    }

    /// Swap the icon only when the name changed.
    pub fn set_icon(&self, name: &str) {
        if *self.icon.borrow() == name {
            return;
        }
        self.resolver.apply(&self.image, name);
        self.image.set_visible(!name.is_empty());
        self.icon.replace(name.to_string());
    }

    pub fn set_text(&self, text: &str) {
        if self.label.text().as_str() != text {
            self.label.set_text(text);
        }
    }

    /// Start a refresh unless one is still outstanding.
    pub fn begin_refresh(&self) -> Option<u64> {
        self.refresh.begin()
    }

    /// Close the refresh for `gen`; `false` when its result must be dropped.
    pub fn finish_refresh(&self, gen: u64) -> bool {
        self.refresh.finish(gen)
    }

    /// Drop whatever refresh is outstanding before a synchronous update.
    pub fn cancel_refresh(&self) {
        self.refresh.cancel();
    }
}

fn connect_click(root: &gtk::Box, ctx: &RowContext, cmd: String) {
    let motion = gtk::EventControllerMotion::new();
    let custom_styling = ctx.custom_styling;
    let enter_row = root.downgrade();
    motion.connect_enter(move |_, _, _| {
        if let Some(row) = enter_row.upgrade() {
            set_highlight(&row, true, custom_styling);
        }
    });
    let leave_row = root.downgrade();
    motion.connect_leave(move |_| {
        if let Some(row) = leave_row.upgrade() {
            set_highlight(&row, false, custom_styling);
        }
    });
    root.add_controller(motion);

    let click = gtk::GestureClick::new();
    let launcher = ctx.launcher.clone();
    click.connect_pressed(move |_, _, _, _| launcher.launch(&cmd));
    root.add_controller(click);
}

fn set_highlight(row: &gtk::Box, selected: bool, custom_styling: bool) {
    if custom_styling {
        row.set_widget_name(if selected { ROW_SELECTED } else { ROW_NORMAL });
    } else if selected {
        row.set_state_flags(gtk::StateFlags::SELECTED, false);
    } else {
        row.unset_state_flags(gtk::StateFlags::SELECTED);
    }
}
