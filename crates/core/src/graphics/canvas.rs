//! Drawing capability used by the scene
//!
//! The scene only needs to draw onto a pixel buffer given colors and
//! coordinates. Implementors provide [`Canvas::set_pixel`] and may override
//! the span and fill helpers with faster versions.
//!
//! All coordinates are signed and clipped to the canvas; drawing off-canvas
//! is never an error.

use super::color::Rgb;

pub trait Canvas {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Write one pixel; out-of-bounds coordinates are ignored
    fn set_pixel(&mut self, x: i32, y: i32, color: Rgb);

    /// Fill the whole canvas
    fn fill(&mut self, color: Rgb) {
        let (w, h) = (self.width() as i32, self.height() as i32);
        for y in 0..h {
            self.hline(0, w - 1, y, color);
        }
    }

    /// Horizontal span from `x0` to `x1` inclusive
    fn hline(&mut self, x0: i32, x1: i32, y: i32, color: Rgb) {
        if y < 0 || y >= self.height() as i32 {
            return;
        }
        let (x0, x1) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        let x0 = x0.max(0);
        let x1 = x1.min(self.width() as i32 - 1);
        for x in x0..=x1 {
            self.set_pixel(x, y, color);
        }
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: Rgb) {
        if w == 0 {
            return;
        }
        for row in 0..h as i32 {
            self.hline(x, x + w as i32 - 1, y + row, color);
        }
    }

    /// Filled circle, midpoint algorithm with span filling
    fn fill_circle(&mut self, cx: i32, cy: i32, radius: i32, color: Rgb) {
        if radius <= 0 {
            if radius == 0 {
                self.set_pixel(cx, cy, color);
            }
            return;
        }

        let mut x = radius;
        let mut y = 0;
        let mut err = 1 - radius;

        while x >= y {
            self.hline(cx - x, cx + x, cy + y, color);
            if y != 0 {
                self.hline(cx - x, cx + x, cy - y, color);
            }
            if x != y {
                self.hline(cx - y, cx + y, cy + x, color);
                if y != 0 {
                    self.hline(cx - y, cx + y, cy - x, color);
                }
            }

            y += 1;
            if err < 0 {
                err += 2 * y + 1;
            } else {
                x -= 1;
                err += 2 * (y - x) + 1;
            }
        }
    }

    /// Bresenham line, both endpoints included
    fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgb) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);

        loop {
            self.set_pixel(x, y, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }
}
