// ── Strip configuration ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::error::CoreError;

/// Animation mode. The set is closed -- it must match what the firmware
/// implements, so there is no `Other` escape hatch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Off,
    Random,
    Wipe,
    Theater,
    Bounce,
    Rainbow,
    RainbowCycle,
    Spackle,
    Fire,
    Candle,
    Flicker,
    Phantom,
    Strobe,
    Rain,
    Comet,
}

/// An RGB color triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

/// A complete strip configuration.
///
/// Every field is mandatory: the store holds whole records and every
/// write replaces the whole record. Field edits are read-modify-write,
/// which is what preserves `name`/`group` across a targeted change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StripConfig {
    /// Firmware tag ("current" means: stay on whatever is running).
    pub version: String,
    pub name: String,
    /// Label used for bulk addressing; empty when the strip is ungrouped.
    pub group: String,
    pub mode: Mode,
    pub enabled: bool,
    /// Animation speed, 0-200.
    pub speed: u16,
    /// 0-255.
    pub brightness: u8,
    /// Color-change rate, 0-100.
    pub color_change: u8,
    pub num_pixels: u16,
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Default for StripConfig {
    fn default() -> Self {
        Self {
            version: "current".into(),
            name: String::new(),
            group: String::new(),
            mode: Mode::Off,
            enabled: false,
            speed: 100,
            brightness: 128,
            color_change: 0,
            num_pixels: 120,
            red: 127,
            green: 127,
            blue: 127,
        }
    }
}

impl StripConfig {
    /// Validate range-limited fields before a record crosses the store
    /// boundary. The `u8` fields are range-checked by their type.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.speed > 200 {
            return Err(CoreError::ValidationFailed {
                message: format!("speed {} out of range (0-200)", self.speed),
            });
        }
        if self.color_change > 100 {
            return Err(CoreError::ValidationFailed {
                message: format!("colorChange {} out of range (0-100)", self.color_change),
            });
        }
        Ok(())
    }

    /// Set the color triple in one go.
    pub fn set_color(&mut self, color: Rgb) {
        self.red = color.red;
        self.green = color.green;
        self.blue = color.blue;
    }

    /// Human-readable one-line summary, used in log entries and the
    /// spoken Describe response.
    pub fn summary(&self) -> String {
        format!(
            "{} pixels, enabled: {}, mode: {}, speed: {}, bright: {}, color: ({},{},{}), color change: {}",
            self.num_pixels,
            self.enabled,
            self.mode,
            self.speed,
            self.brightness,
            self.red,
            self.green,
            self.blue,
            self.color_change,
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!(Mode::from_str("Rainbow").unwrap(), Mode::Rainbow);
        assert_eq!(Mode::from_str("rainbowcycle").unwrap(), Mode::RainbowCycle);
        assert!(Mode::from_str("disco").is_err());
    }

    #[test]
    fn mode_displays_lowercase() {
        assert_eq!(Mode::RainbowCycle.to_string(), "rainbowcycle");
        assert_eq!(Mode::Off.to_string(), "off");
    }

    #[test]
    fn validate_rejects_out_of_range_speed() {
        let config = StripConfig {
            speed: 201,
            ..StripConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_out_of_range_color_change() {
        let config = StripConfig {
            color_change: 101,
            ..StripConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn default_config_is_valid() {
        assert!(StripConfig::default().validate().is_ok());
    }

    #[test]
    fn summary_mentions_mode_and_color() {
        let config = StripConfig {
            mode: Mode::Rainbow,
            red: 1,
            green: 2,
            blue: 3,
            ..StripConfig::default()
        };
        let s = config.summary();
        assert!(s.contains("mode: rainbow"));
        assert!(s.contains("color: (1,2,3)"));
    }
}
