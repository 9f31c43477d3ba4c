//! Previous / play-pause / next controls driven by `playerctl`.

use std::cell::RefCell;
use std::rc::Rc;

use gtk::prelude::*;
use gtk::{glib, Align};
use nwgocc_core::status::PlayerState;
use nwgocc_core::{program_in_path, Icons, Settings};

use super::command_utils::{command_output_text, run_command, run_command_capture_status_async};
use crate::ui::icons::IconResolver;
use crate::ui::refresh::RefreshGuard;

pub struct MediaControls {
    root: gtk::Box,
    inner: Rc<MediaInner>,
}

struct MediaInner {
    playerctl: String,
    icons: Icons,
    resolver: Rc<IconResolver>,
    play_image: gtk::Image,
    play_icon: RefCell<String>,
    refresh: RefreshGuard,
}

impl MediaControls {
    /// `None` when controls are disabled or `playerctl` is not installed.
    pub fn new(settings: &Settings, resolver: Rc<IconResolver>) -> Option<Self> {
        let playerctl = settings.commands.playerctl.trim().to_string();
        let program = playerctl.split_whitespace().next()?;
        if !settings.preferences.show_playerctl || !program_in_path(program) {
            return None;
        }

        let size = settings.preferences.icon_size_small;
        let icons = settings.icons.clone();
        let root = gtk::Box::new(gtk::Orientation::Horizontal, 4);
        root.set_widget_name("playerctl-box");
        root.set_valign(Align::Center);
        root.set_visible(false);

        let previous = resolver.image(&icons.media_skip_backward, size);
        let play_image = resolver.image(&icons.media_playback_start, size);
        let next = resolver.image(&icons.media_skip_forward, size);
        for (image, action) in [
            (&previous, "previous"),
            (&play_image, "play-pause"),
            (&next, "next"),
        ] {
            connect_action(image, format!("{playerctl} {action}"));
            root.append(image);
        }

        let inner = Rc::new(MediaInner {
            playerctl,
            play_icon: RefCell::new(icons.media_playback_start.clone()),
            icons,
            resolver,
            play_image,
            refresh: RefreshGuard::default(),
        });
        Some(Self { root, inner })
    }

    pub fn root(&self) -> &gtk::Box {
        &self.root
    }

    /// Show controls only while a player is playing or paused.
    pub fn refresh(&self) {
        let Some(gen) = self.inner.refresh.begin() else {
            return;
        };
        let rx = run_command_capture_status_async(&format!("{} status", self.inner.playerctl));
        let root = self.root.clone();
        let inner = self.inner.clone();
        glib::MainContext::default().spawn_local(async move {
            let result = rx.recv().await;
            if !inner.refresh.finish(gen) {
                return;
            }
            let Ok(result) = result else {
                return;
            };
            let state = PlayerState::from_output(&command_output_text(&result));
            root.set_visible(state.is_active());
            let icon = play_icon(&inner.icons, state);
            if *inner.play_icon.borrow() != icon {
                inner.resolver.apply(&inner.play_image, icon);
                inner.play_icon.replace(icon.to_string());
            }
        });
    }
}

fn connect_action(image: &gtk::Image, cmd: String) {
    let click = gtk::GestureClick::new();
    click.connect_pressed(move |_, _, _, _| run_command(&cmd));
    image.add_controller(click);
}

/// Pause icon while playing, play icon otherwise.
fn play_icon(icons: &Icons, state: PlayerState) -> &str {
    match state {
        PlayerState::Playing => icons.media_playback_pause.as_str(),
        PlayerState::Paused | PlayerState::Stopped => icons.media_playback_start.as_str(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn play_icon_follows_player_state() {
        let icons = Icons::default();
        assert_eq!(play_icon(&icons, PlayerState::Playing), icons.media_playback_pause);
        assert_eq!(play_icon(&icons, PlayerState::Paused), icons.media_playback_start);
    }
}
