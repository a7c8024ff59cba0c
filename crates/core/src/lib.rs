//! Core frame-pump adapter primitives and traits.
//!
//! The [`Adapter`] bridges a host that pulls one frame per display refresh
//! to a pixel-buffer backend. The host is never stored; it is handed to each
//! entry point as a [`Host`] capability.

pub mod adapter;
pub mod buffer;
pub mod config;
pub mod error;
pub mod event;
pub mod graphics;
pub mod host;
pub mod input;
pub mod logging;
pub mod negotiate;
pub mod scene;
pub mod session;

pub mod types {
    use serde::{Deserialize, Serialize};

    /// Pixel encoding of the session's buffer
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub enum PixelFormat {
        /// 16-bit packed RGB (5-6-5)
        #[default]
        #[serde(rename = "RGB565")]
        Rgb565,
        /// 32-bit packed xRGB (8-8-8-8), top byte ignored by the host
        #[serde(rename = "XRGB8888")]
        Xrgb8888,
    }

    impl PixelFormat {
        pub const fn bytes_per_pixel(self) -> usize {
            match self {
                PixelFormat::Rgb565 => 2,
                PixelFormat::Xrgb8888 => 4,
            }
        }

        /// Identifier used by the libretro `SET_PIXEL_FORMAT` call
        pub const fn retro_id(self) -> u32 {
            match self {
                PixelFormat::Xrgb8888 => 1,
                PixelFormat::Rgb565 => 2,
            }
        }

        /// Parse a core option value (case-insensitive)
        pub fn from_option(value: &str) -> Option<Self> {
            match value.trim().to_ascii_uppercase().as_str() {
                "RGB565" => Some(PixelFormat::Rgb565),
                "XRGB8888" => Some(PixelFormat::Xrgb8888),
                _ => None,
            }
        }

        pub const fn option_value(self) -> &'static str {
            match self {
                PixelFormat::Rgb565 => "RGB565",
                PixelFormat::Xrgb8888 => "XRGB8888",
            }
        }
    }

    /// Video region reported to the host. There is no region-dependent behavior.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    #[repr(u32)]
    pub enum Region {
        Ntsc = 0,
    }

    #[derive(Debug, Clone, PartialEq, Eq, Serialize)]
    pub struct SystemInfo {
        pub library_name: &'static str,
        pub library_version: &'static str,
        /// `None` means any file (or no file) is accepted
        pub valid_extensions: Option<&'static str>,
        pub need_fullpath: bool,
        pub block_extract: bool,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Serialize)]
    pub struct GameGeometry {
        pub base_width: u32,
        pub base_height: u32,
        pub max_width: u32,
        pub max_height: u32,
        pub aspect_ratio: f32,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Serialize)]
    pub struct SystemTiming {
        pub fps: f64,
        pub sample_rate: f64,
    }

    /// Audio/video timing; only meaningful while a session is active
    #[derive(Debug, Clone, Copy, PartialEq, Serialize)]
    pub struct AvInfo {
        pub geometry: GameGeometry,
        pub timing: SystemTiming,
    }

    pub type AudioSample = i16;
}

pub use adapter::{Adapter, SessionState, TickReport};
pub use buffer::{FrameView, PixelBuffer};
pub use config::Settings;
pub use error::AdapterError;
pub use event::{Event, EventKind, EventQueue};
pub use host::Host;
pub use input::{Axis, Button, InputState, InputTracker, LogicalInput};
pub use types::{AvInfo, PixelFormat, Region, SystemInfo};

#[cfg(test)]
mod tests {
    use super::types::*;

    #[test]
    fn pixel_format_sizes() {
        assert_eq!(PixelFormat::Rgb565.bytes_per_pixel(), 2);
        assert_eq!(PixelFormat::Xrgb8888.bytes_per_pixel(), 4);
    }

    #[test]
    fn pixel_format_retro_ids() {
        assert_eq!(PixelFormat::Rgb565.retro_id(), 2);
        assert_eq!(PixelFormat::Xrgb8888.retro_id(), 1);
    }

    #[test]
    fn pixel_format_option_parsing() {
        assert_eq!(PixelFormat::from_option("RGB565"), Some(PixelFormat::Rgb565));
        assert_eq!(
            PixelFormat::from_option(" xrgb8888 "),
            Some(PixelFormat::Xrgb8888)
        );
        assert_eq!(PixelFormat::from_option("RGB555"), None);
        assert_eq!(PixelFormat::default(), PixelFormat::Rgb565);
    }

    #[test]
    fn pixel_format_serializes_as_option_value() {
        let s = serde_json::to_string(&PixelFormat::Xrgb8888).expect("serialize");
        assert_eq!(s, "\"XRGB8888\"");
        let f: PixelFormat = serde_json::from_str("\"RGB565\"").expect("deserialize");
        assert_eq!(f, PixelFormat::Rgb565);
    }
}
