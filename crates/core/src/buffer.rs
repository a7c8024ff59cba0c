//! Session pixel buffer
//!
//! Storage is typed per encoding so that every pixel write is a single
//! aligned store. The host only ever sees the bytes through a [`FrameView`].

use crate::error::AdapterError;
use crate::graphics::{Canvas, ColorOps, Rgb};
use crate::types::PixelFormat;

/// Largest width or height a buffer may have
pub const MAX_DIMENSION: u32 = 8192;

#[derive(Debug, Clone)]
enum Storage {
    Rgb565(Vec<u16>),
    Xrgb8888(Vec<u32>),
}

/// Fixed-size 2-D pixel array in one negotiated encoding
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    storage: Storage,
}

/// Read-only view of a finished frame, handed to the host for display
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pub data: &'a [u8],
    pub width: u32,
    pub height: u32,
    /// Bytes per row
    pub pitch: usize,
    pub format: PixelFormat,
}

impl FrameView<'_> {
    /// Color at (x, y), or `None` outside the frame
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let bpp = self.format.bytes_per_pixel();
        let offset = y as usize * self.pitch + x as usize * bpp;
        let bytes = self.data.get(offset..offset + bpp)?;
        let packed = match self.format {
            PixelFormat::Rgb565 => u16::from_ne_bytes([bytes[0], bytes[1]]) as u32,
            PixelFormat::Xrgb8888 => {
                u32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
            }
        };
        Some(ColorOps::unpack(packed, self.format))
    }
}

impl PixelBuffer {
    /// Allocate a zeroed buffer. Zero dimensions are raised to 1 so the
    /// cursor always has a valid position. Sides above [`MAX_DIMENSION`]
    /// are refused.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Result<Self, AdapterError> {
        let width = width.max(1);
        let height = height.max(1);
        let too_large = AdapterError::FrameTooLarge { width, height };
        if width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(too_large);
        }
        let len = (width as usize)
            .checked_mul(height as usize)
            .filter(|len| len.checked_mul(format.bytes_per_pixel()).is_some())
            .ok_or(too_large)?;
        let storage = match format {
            PixelFormat::Rgb565 => Storage::Rgb565(vec![0; len]),
            PixelFormat::Xrgb8888 => Storage::Xrgb8888(vec![0; len]),
        };
        Ok(Self {
            width,
            height,
            storage,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        match self.storage {
            Storage::Rgb565(_) => PixelFormat::Rgb565,
            Storage::Xrgb8888(_) => PixelFormat::Xrgb8888,
        }
    }

    /// Row stride in bytes
    pub fn pitch(&self) -> usize {
        self.width as usize * self.format().bytes_per_pixel()
    }

    pub fn as_bytes(&self) -> &[u8] {
        match &self.storage {
            Storage::Rgb565(pixels) => bytemuck::cast_slice(pixels),
            Storage::Xrgb8888(pixels) => bytemuck::cast_slice(pixels),
        }
    }

    pub fn view(&self) -> FrameView<'_> {
        FrameView {
            data: self.as_bytes(),
            width: self.width,
            height: self.height,
            pitch: self.pitch(),
            format: self.format(),
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }
}

impl Canvas for PixelBuffer {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn set_pixel(&mut self, x: i32, y: i32, color: Rgb) {
        let Some(idx) = self.index(x, y) else {
            return;
        };
        let packed = ColorOps::pack(color, self.format());
        match &mut self.storage {
            Storage::Rgb565(pixels) => pixels[idx] = packed as u16,
            Storage::Xrgb8888(pixels) => pixels[idx] = packed,
        }
    }

    fn fill(&mut self, color: Rgb) {
        let packed = ColorOps::pack(color, self.format());
        match &mut self.storage {
            Storage::Rgb565(pixels) => pixels.fill(packed as u16),
            Storage::Xrgb8888(pixels) => pixels.fill(packed),
        }
    }

    fn hline(&mut self, x0: i32, x1: i32, y: i32, color: Rgb) {
        if y < 0 || y as u32 >= self.height {
            return;
        }
        let (x0, x1) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        let x0 = x0.max(0);
        let x1 = x1.min(self.width as i32 - 1);
        if x0 > x1 {
            return;
        }
        let row = y as usize * self.width as usize;
        let span = row + x0 as usize..=row + x1 as usize;
        let packed = ColorOps::pack(color, self.format());
        match &mut self.storage {
            Storage::Rgb565(pixels) => pixels[span].fill(packed as u16),
            Storage::Xrgb8888(pixels) => pixels[span].fill(packed),
        }
    }
}
