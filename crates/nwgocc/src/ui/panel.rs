//! Control center window and layer-shell placement.

use gtk::{gdk, glib};
use gtk::prelude::*;
use gtk4_layer_shell::{Edge, KeyboardMode, Layer, LayerShell};
use nwgocc_core::util::is_wayland_session;
use nwgocc_core::{Anchor, Preferences};
use tracing::debug;

const WINDOW_TITLE: &str = "nwgocc: Control Center";
const DEFAULT_WIDTH: i32 = 300;
const DEFAULT_HEIGHT: i32 = 200;

pub struct PanelWidgets {
    pub window: gtk::ApplicationWindow,
    pub root: gtk::Box,
    layer_shell: bool,
}

pub fn build_panel_widgets(app: &gtk::Application, prefs: &Preferences) -> PanelWidgets {
    let window = gtk::ApplicationWindow::new(app);
    window.set_title(Some(WINDOW_TITLE));
    window.set_widget_name("window");
    window.set_default_size(DEFAULT_WIDTH, DEFAULT_HEIGHT);
    window.set_decorated(prefs.window_decorations);

    let layer_shell = gtk4_layer_shell::is_supported() && is_wayland_session();
    if layer_shell {
        window.init_layer_shell();
        window.set_namespace(Some("nwgocc"));
        window.set_layer(Layer::Overlay);
        window.set_keyboard_mode(KeyboardMode::OnDemand);
        window.set_exclusive_zone(0);
    } else {
        debug!("layer shell unavailable, using a regular window");
    }

    let root = gtk::Box::new(gtk::Orientation::Vertical, 6);
    root.set_margin_top(10);
    root.set_margin_bottom(10);
    root.set_margin_start(10);
    root.set_margin_end(10);
    window.set_child(Some(&root));

    let keys = gtk::EventControllerKey::new();
    let quit_app = app.downgrade();
    keys.connect_key_pressed(move |_, key, _, _| {
        if key == gdk::Key::Escape {
            if let Some(app) = quit_app.upgrade() {
                app.quit();
            }
            return glib::Propagation::Stop;
        }
        glib::Propagation::Proceed
    });
    window.add_controller(keys);

    let panel = PanelWidgets {
        window,
        root,
        layer_shell,
    };
    apply_panel_preferences(&panel, prefs);
    panel
}

/// Re-apply placement and decorations after a preferences reload.
pub fn apply_panel_preferences(panel: &PanelWidgets, prefs: &Preferences) {
    panel.window.set_decorated(prefs.window_decorations);
    if panel.layer_shell {
        apply_anchor(&panel.window, prefs.anchor, prefs.margin);
    }
}

fn apply_anchor(window: &impl IsA<gtk::Window>, anchor: Anchor, margin: i32) {
    let anchored = anchor_edges(anchor);
    for edge in [Edge::Top, Edge::Right, Edge::Bottom, Edge::Left] {
        let on = anchored.contains(&edge);
        window.set_anchor(edge, on);
        window.set_margin(edge, if on { margin } else { 0 });
    }
}

/// Edges a layer surface sticks to; `Center` leaves every edge free.
fn anchor_edges(anchor: Anchor) -> &'static [Edge] {
    match anchor {
        Anchor::TopRight => &[Edge::Top, Edge::Right],
        Anchor::TopLeft => &[Edge::Top, Edge::Left],
        Anchor::BottomRight => &[Edge::Bottom, Edge::Right],
        Anchor::BottomLeft => &[Edge::Bottom, Edge::Left],
        Anchor::Top => &[Edge::Top],
        Anchor::Bottom => &[Edge::Bottom],
        Anchor::Left => &[Edge::Left],
        Anchor::Right => &[Edge::Right],
        Anchor::Center => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_use_two_edges() {
        assert_eq!(anchor_edges(Anchor::TopRight), &[Edge::Top, Edge::Right]);
        assert_eq!(anchor_edges(Anchor::BottomLeft), &[Edge::Bottom, Edge::Left]);
    }

    #[test]
    fn center_and_sides_stay_centered_on_free_axis() {
        assert!(anchor_edges(Anchor::Center).is_empty());
        assert_eq!(anchor_edges(Anchor::Left), &[Edge::Left]);
    }
}
