//! Color operation utilities for pixel-buffer rendering
//!
//! Scene colors are plain [`Rgb`] triples. [`ColorOps`] packs them into the
//! two supported buffer encodings: RGB565 (`0bRRRRRGGGGGGBBBBB`) and
//! XRGB8888 (`0xFFRRGGBB`).

use crate::types::PixelFormat;

/// 8-bit-per-channel color, independent of buffer encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Color operation utilities
pub struct ColorOps;

impl ColorOps {
    /// Pack a color for the given buffer encoding
    #[inline]
    pub fn pack(color: Rgb, format: PixelFormat) -> u32 {
        match format {
            PixelFormat::Rgb565 => Self::to_rgb565(color.r, color.g, color.b) as u32,
            PixelFormat::Xrgb8888 => Self::from_rgb(color.r, color.g, color.b),
        }
    }

    /// Expand a packed pixel back to 8-bit channels
    #[inline]
    pub fn unpack(pixel: u32, format: PixelFormat) -> Rgb {
        match format {
            PixelFormat::Rgb565 => Self::rgb565_to_rgb(pixel as u16),
            PixelFormat::Xrgb8888 => {
                Rgb::new(Self::red(pixel), Self::green(pixel), Self::blue(pixel))
            }
        }
    }

    /// Truncate 8-bit channels to 5-6-5
    #[inline]
    pub fn to_rgb565(r: u8, g: u8, b: u8) -> u16 {
        ((r as u16 >> 3) << 11) | ((g as u16 >> 2) << 5) | (b as u16 >> 3)
    }

    /// Expand 5-6-5 to 8-bit channels, replicating high bits into the low ones
    #[inline]
    pub fn rgb565_to_rgb(pixel: u16) -> Rgb {
        let r5 = ((pixel >> 11) & 0x1F) as u8;
        let g6 = ((pixel >> 5) & 0x3F) as u8;
        let b5 = (pixel & 0x1F) as u8;
        Rgb::new((r5 << 3) | (r5 >> 2), (g6 << 2) | (g6 >> 4), (b5 << 3) | (b5 >> 2))
    }

    /// Scale the RGB channels by `factor`, clamped to [0, 255]
    #[inline]
    pub fn adjust_brightness(color: Rgb, factor: f32) -> Rgb {
        let scale = |c: u8| (c as f32 * factor).clamp(0.0, 255.0).round() as u8;
        Rgb::new(scale(color.r), scale(color.g), scale(color.b))
    }

    #[inline]
    pub fn red(color: u32) -> u8 {
        ((color >> 16) & 0xFF) as u8
    }

    #[inline]
    pub fn green(color: u32) -> u8 {
        ((color >> 8) & 0xFF) as u8
    }

    #[inline]
    pub fn blue(color: u32) -> u8 {
        (color & 0xFF) as u8
    }

    /// Construct XRGB color with the unused byte set
    #[inline]
    pub fn from_rgb(r: u8, g: u8, b: u8) -> u32 {
        0xFF000000 | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
    }
}
