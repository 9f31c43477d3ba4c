//! Brightness slider driven by `get_brightness` / `set_brightness`.

use std::rc::Rc;

use nwgocc_core::status::{brightness_level, parse_brightness};
use nwgocc_core::Settings;

use super::util::{CommandSlider, SliderReading, SliderSpec};
use crate::ui::icons::IconResolver;

pub struct BrightnessWidget {
    slider: CommandSlider,
}

impl BrightnessWidget {
    pub fn new(settings: &Settings, resolver: Rc<IconResolver>) -> Self {
        let icons = settings.icons.clone();
        let spec = SliderSpec {
            name: "brightness",
            get_cmd: settings.commands.get_brightness.clone(),
            set_cmd: settings.commands.set_brightness.clone(),
            toggle_cmd: None,
            parse: parse_reading,
            icon_for: Box::new(move |reading| {
                icons.brightness_icon(brightness_level(reading.value)).to_string()
            }),
            icon_size: settings.preferences.icon_size_small,
        };
        Self {
            slider: CommandSlider::new(spec, resolver),
        }
    }

    pub fn root(&self) -> &gtk::Box {
        &self.slider.root
    }

    pub fn refresh(&self) {
        self.slider.refresh();
    }
}

fn parse_reading(text: &str) -> Option<SliderReading> {
    Some(SliderReading {
        value: parse_brightness(text)?,
        muted: false,
    })
}

#[cfg(test)]
mod tests {
    use super::parse_reading;

    #[test]
    fn light_output_is_rounded() {
        let reading = parse_reading("54.55\n").expect("reading");
        assert_eq!(reading.value, 55.0);
        assert!(!reading.muted);
        assert!(parse_reading("").is_none());
    }
}
