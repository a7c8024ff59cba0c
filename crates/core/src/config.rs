//! Core options
//!
//! The host owns the option UI; the adapter only declares the option table
//! and reads values back by key. Every key falls back to its default on its
//! own, so one bad value never discards the others.

use crate::host::Host;
use crate::logging::{log, LogCategory, LogConfig, LogLevel};
use crate::types::PixelFormat;
use serde::{Deserialize, Serialize};

pub const PIXEL_FORMAT_KEY: &str = "pixelpump_pixel_format";
pub const SHOW_CURSOR_KEY: &str = "pixelpump_show_cursor";
pub const LOG_LEVEL_KEY: &str = "pixelpump_log_level";

/// One entry of the option table declared to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreOption {
    pub key: &'static str,
    pub description: &'static str,
    /// Allowed values, default first
    pub values: &'static [&'static str],
}

impl CoreOption {
    pub fn default_value(&self) -> &'static str {
        self.values[0]
    }

    /// libretro `SET_VARIABLES` form: `"Description; first|second"`
    pub fn declaration(&self) -> String {
        format!("{}; {}", self.description, self.values.join("|"))
    }
}

pub const CORE_OPTIONS: &[CoreOption] = &[
    CoreOption {
        key: PIXEL_FORMAT_KEY,
        description: "Pixel format (restart)",
        values: &["RGB565", "XRGB8888"],
    },
    CoreOption {
        key: SHOW_CURSOR_KEY,
        description: "Show cursor",
        values: &["enabled", "disabled"],
    },
    CoreOption {
        key: LOG_LEVEL_KEY,
        description: "Log level",
        values: &["info", "warn", "error", "debug", "trace", "off"],
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub pixel_format: PixelFormat,
    pub show_cursor: bool,
    pub log_level: LogLevel,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pixel_format: PixelFormat::Rgb565,
            show_cursor: true,
            log_level: LogLevel::Info,
        }
    }
}

impl Settings {
    /// Read every declared option from the host
    pub fn read<H: Host + ?Sized>(host: &mut H) -> Self {
        Self::default().reread(host)
    }

    /// Read every declared option again on top of these settings. Missing
    /// or invalid values keep what is already set.
    pub fn reread<H: Host + ?Sized>(&self, host: &mut H) -> Self {
        let mut settings = self.clone();
        for option in CORE_OPTIONS {
            if let Some(value) = host.variable(option.key) {
                settings.apply(option.key, &value);
            }
        }
        settings
    }

    /// Apply one `key = value` pair. Returns `false` (and keeps the current
    /// value) for unknown keys or values.
    pub fn apply(&mut self, key: &str, value: &str) -> bool {
        let applied = match key {
            PIXEL_FORMAT_KEY => match PixelFormat::from_option(value) {
                Some(format) => {
                    self.pixel_format = format;
                    true
                }
                None => false,
            },
            SHOW_CURSOR_KEY => match value {
                "enabled" => {
                    self.show_cursor = true;
                    true
                }
                "disabled" => {
                    self.show_cursor = false;
                    true
                }
                _ => false,
            },
            LOG_LEVEL_KEY => match LogLevel::from_str(value) {
                Some(level) => {
                    self.log_level = level;
                    true
                }
                None => false,
            },
            _ => false,
        };

        if !applied {
            log(LogCategory::Config, LogLevel::Warn, || {
                format!("Ignoring option {} = {:?}", key, value)
            });
        }
        applied
    }

    /// Push the configured level into the global log configuration
    pub fn apply_logging(&self) {
        LogConfig::global().set_global_level(self.log_level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::FrameView;
    use crate::input::LogicalInput;
    use std::collections::HashMap;

    /// Host that only answers option lookups
    #[derive(Default)]
    struct OptionHost {
        values: HashMap<&'static str, &'static str>,
    }

    impl Host for OptionHost {
        fn poll_inputs(&mut self) {}

        fn input_state(&mut self, _input: LogicalInput) -> i16 {
            0
        }

        fn present_frame(&mut self, _frame: FrameView<'_>) {}

        fn emit_audio_sample(&mut self, _left: i16, _right: i16) {}

        fn set_pixel_format(&mut self, _format: PixelFormat) -> bool {
            true
        }

        fn variable(&mut self, key: &str) -> Option<String> {
            self.values.get(key).map(|v| v.to_string())
        }

        fn variables_updated(&mut self) -> bool {
            false
        }

        fn request_shutdown(&mut self) {}
    }

    #[test]
    fn defaults_match_option_table() {
        let settings = Settings::default();
        let defaults: Vec<&str> = CORE_OPTIONS.iter().map(|o| o.default_value()).collect();
        assert_eq!(defaults, vec!["RGB565", "enabled", "info"]);
        assert_eq!(settings.pixel_format, PixelFormat::Rgb565);
        assert!(settings.show_cursor);
        assert_eq!(settings.log_level, LogLevel::Info);
    }

    #[test]
    fn declaration_format() {
        assert_eq!(
            CORE_OPTIONS[0].declaration(),
            "Pixel format (restart); RGB565|XRGB8888"
        );
    }

    #[test]
    fn apply_known_values() {
        let mut settings = Settings::default();
        assert!(settings.apply(PIXEL_FORMAT_KEY, "XRGB8888"));
        assert!(settings.apply(SHOW_CURSOR_KEY, "disabled"));
        assert!(settings.apply(LOG_LEVEL_KEY, "debug"));
        assert_eq!(settings.pixel_format, PixelFormat::Xrgb8888);
        assert!(!settings.show_cursor);
        assert_eq!(settings.log_level, LogLevel::Debug);
    }

    #[test]
    fn invalid_values_keep_previous() {
        let mut settings = Settings::default();
        assert!(!settings.apply(PIXEL_FORMAT_KEY, "RGB555"));
        assert!(!settings.apply(SHOW_CURSOR_KEY, "maybe"));
        assert!(!settings.apply("pixelpump_unknown", "1"));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn read_falls_back_per_key() {
        let mut host = OptionHost::default();
        host.values.insert(PIXEL_FORMAT_KEY, "RGB555");
        host.values.insert(SHOW_CURSOR_KEY, "disabled");
        let settings = Settings::read(&mut host);
        assert_eq!(settings.pixel_format, PixelFormat::Rgb565);
        assert!(!settings.show_cursor);
        assert_eq!(settings.log_level, LogLevel::Info);
    }

    #[test]
    fn reread_keeps_current_values_on_bad_input() {
        let current = Settings {
            pixel_format: PixelFormat::Xrgb8888,
            show_cursor: false,
            log_level: LogLevel::Warn,
        };
        let mut host = OptionHost::default();
        host.values.insert(PIXEL_FORMAT_KEY, "bogus");
        host.values.insert(SHOW_CURSOR_KEY, "maybe");
        assert_eq!(current.reread(&mut host), current);

        host.values.insert(SHOW_CURSOR_KEY, "enabled");
        let fresh = current.reread(&mut host);
        assert_eq!(fresh.pixel_format, PixelFormat::Xrgb8888);
        assert!(fresh.show_cursor);
        assert_eq!(fresh.log_level, LogLevel::Warn);
    }

    #[test]
    fn settings_json_shape() {
        let json = serde_json::to_value(Settings::default()).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "pixel_format": "RGB565",
                "show_cursor": true,
                "log_level": "info",
            })
        );
    }
}
