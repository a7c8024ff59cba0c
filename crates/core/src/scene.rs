//! Per-frame scene content
//!
//! A fixed backdrop plus a live view of the input state: one indicator per
//! button along the top edge and a crosshair at the cursor.

use crate::config::Settings;
use crate::graphics::{Canvas, ColorOps, Rgb};
use crate::input::{Button, InputState};

pub const BACKGROUND: Rgb = Rgb::new(241, 250, 238);
pub const RED: Rgb = Rgb::new(230, 57, 70);
pub const BLUE: Rgb = Rgb::new(69, 123, 157);
pub const INK: Rgb = Rgb::new(29, 53, 87);

const INDICATOR_SIZE: u32 = 8;
const INDICATOR_SPACING: i32 = 12;
const INDICATOR_ORIGIN: (i32, i32) = (8, 8);
const CROSSHAIR_RADIUS: i32 = 4;

pub fn render<C: Canvas + ?Sized>(canvas: &mut C, input: &InputState, settings: &Settings) {
    canvas.fill(BACKGROUND);

    // Corners (20, 40) and (100, 100), both inclusive
    canvas.fill_rect(20, 40, 81, 61, RED);
    canvas.fill_circle(200, 150, 30, BLUE);
    canvas.line(250, 10, 230, 130, BLUE);

    for (i, button) in Button::ALL.iter().enumerate() {
        let (x, y) = indicator_position(i);
        let color = if input.is_pressed(*button) {
            RED
        } else {
            ColorOps::adjust_brightness(BACKGROUND, 0.8)
        };
        canvas.fill_rect(x, y, INDICATOR_SIZE, INDICATOR_SIZE, color);
    }

    if settings.show_cursor {
        let (cx, cy) = input.cursor();
        let (cx, cy) = (cx as i32, cy as i32);
        canvas.hline(cx - CROSSHAIR_RADIUS, cx + CROSSHAIR_RADIUS, cy, INK);
        canvas.line(cx, cy - CROSSHAIR_RADIUS, cx, cy + CROSSHAIR_RADIUS, INK);
    }
}

/// Top-left corner of the indicator for the `index`-th button in poll order
pub fn indicator_position(index: usize) -> (i32, i32) {
    (
        INDICATOR_ORIGIN.0 + index as i32 * INDICATOR_SPACING,
        INDICATOR_ORIGIN.1,
    )
}
