//! Volume slider with mute toggle and optional playerctl controls.

use std::rc::Rc;

use gtk::prelude::*;
use nwgocc_core::status::{parse_muted, parse_numeric, volume_level, NumericParseMode};
use nwgocc_core::Settings;

use super::media::MediaControls;
use super::util::{CommandSlider, SliderReading, SliderSpec};
use crate::ui::icons::IconResolver;

pub struct VolumeWidget {
    slider: CommandSlider,
    media: Option<MediaControls>,
}

impl VolumeWidget {
    pub fn new(settings: &Settings, resolver: Rc<IconResolver>) -> Self {
        let icons = settings.icons.clone();
        let toggle = settings.commands.toggle_mute.trim();
        let spec = SliderSpec {
            name: "volume",
            get_cmd: settings.commands.get_volume.clone(),
            set_cmd: settings.commands.set_volume.clone(),
            toggle_cmd: (!toggle.is_empty()).then(|| toggle.to_string()),
            parse: parse_reading,
            icon_for: Box::new(move |reading| {
                icons
                    .volume_icon(volume_level(reading.value, reading.muted))
                    .to_string()
            }),
            icon_size: settings.preferences.icon_size_small,
        };
        let slider = CommandSlider::new(spec, resolver.clone());
        let media = MediaControls::new(settings, resolver);
        if let Some(media) = media.as_ref() {
            slider.root.append(media.root());
        }
        Self { slider, media }
    }

    pub fn root(&self) -> &gtk::Box {
        &self.slider.root
    }

    pub fn refresh(&self) {
        self.slider.refresh();
        if let Some(media) = self.media.as_ref() {
            media.refresh();
        }
    }
}

fn parse_reading(text: &str) -> Option<SliderReading> {
    let value = parse_numeric(text, 0.0, 100.0, NumericParseMode::Auto)?;
    Some(SliderReading {
        value,
        muted: parse_muted(text),
    })
}

#[cfg(test)]
mod tests {
    use super::parse_reading;

    #[test]
    fn pactl_output_reads_volume_and_mute() {
        let text = "Volume: front-left: 45875 /  70% / -9.29 dB,   front-right: 45875 /  70% / -9.29 dB\n        balance 0.00\nMute: yes\n";
        let reading = parse_reading(text).expect("reading");
        assert_eq!(reading.value, 70.0);
        assert!(reading.muted);
    }

    #[test]
    fn wpctl_ratio_is_scaled() {
        let reading = parse_reading("Volume: 0.40").expect("reading");
        assert_eq!(reading.value, 40.0);
        assert!(!reading.muted);
    }
}
