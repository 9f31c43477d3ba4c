//! Slider and media widgets plus the command plumbing shared by the panel.

pub mod brightness;
pub(crate) mod command_utils;
pub mod media;
pub mod volume;

mod util;
