//! Edge-triggered input translation
//!
//! The host exposes input as "current state" that has to be polled. The
//! [`InputTracker`] keeps the last observed value of every logical button,
//! diffs it against a fresh read once per tick, and turns each change into
//! exactly one [`Event`]. The cursor is driven by relative deltas and kept
//! inside the buffer.

use crate::event::{Event, EventKind, EventQueue};
use crate::host::Host;
use crate::logging::{log, LogCategory, LogLevel};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Logical buttons of the single input source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Button {
    MouseLeft,
    MouseRight,
    Up,
    Down,
    Left,
    Right,
    A,
    B,
    Select,
    Start,
}

const BUTTON_COUNT: usize = 10;

impl Button {
    /// Polling order. Events for one tick are queued in this order.
    pub const ALL: [Button; BUTTON_COUNT] = [
        Button::MouseLeft,
        Button::MouseRight,
        Button::Up,
        Button::Down,
        Button::Left,
        Button::Right,
        Button::A,
        Button::B,
        Button::Select,
        Button::Start,
    ];

    const fn index(self) -> usize {
        match self {
            Button::MouseLeft => 0,
            Button::MouseRight => 1,
            Button::Up => 2,
            Button::Down => 3,
            Button::Left => 4,
            Button::Right => 5,
            Button::A => 6,
            Button::B => 7,
            Button::Select => 8,
            Button::Start => 9,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Button::MouseLeft => "Mouse Left",
            Button::MouseRight => "Mouse Right",
            Button::Up => "Up",
            Button::Down => "Down",
            Button::Left => "Left",
            Button::Right => "Right",
            Button::A => "A",
            Button::B => "B",
            Button::Select => "Select",
            Button::Start => "Start",
        }
    }
}

/// Relative cursor axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    CursorX,
    CursorY,
}

/// Anything the host can be asked about through [`Host::input_state`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalInput {
    Button(Button),
    Axis(Axis),
}

/// Last observed input values for one session
#[derive(Debug, Clone)]
pub struct InputState {
    buttons: [bool; BUTTON_COUNT],
    cursor: (u32, u32),
    bounds: (u32, u32),
}

impl InputState {
    /// All buttons released, cursor at the origin of a `width` x `height` area
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            buttons: [false; BUTTON_COUNT],
            cursor: (0, 0),
            bounds: (width.max(1), height.max(1)),
        }
    }

    pub fn is_pressed(&self, button: Button) -> bool {
        self.buttons[button.index()]
    }

    pub fn cursor(&self) -> (u32, u32) {
        self.cursor
    }

    /// Apply a relative move and clamp to `[0, width-1] x [0, height-1]`
    fn move_cursor(&mut self, dx: i32, dy: i32) -> (u32, u32) {
        let (w, h) = self.bounds;
        let x = (self.cursor.0 as i64 + dx as i64).clamp(0, w as i64 - 1);
        let y = (self.cursor.1 as i64 + dy as i64).clamp(0, h as i64 - 1);
        self.cursor = (x as u32, y as u32);
        self.cursor
    }
}

/// Turns polled host state into queued edge events
#[derive(Debug, Clone)]
pub struct InputTracker {
    state: InputState,
}

impl InputTracker {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            state: InputState::new(width, height),
        }
    }

    pub fn state(&self) -> &InputState {
        &self.state
    }

    /// Poll the host once and queue an event for every change since the
    /// previous poll. Returns the number of events queued.
    pub fn poll_once<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        queue: &mut EventQueue,
        timestamp: Duration,
    ) -> usize {
        host.poll_inputs();
        let before = queue.len();

        for button in Button::ALL {
            let pressed = host.input_state(LogicalInput::Button(button)) != 0;
            let stored = &mut self.state.buttons[button.index()];
            if pressed != *stored {
                *stored = pressed;
                queue.push(Event::button(button, pressed, timestamp));
            }
        }

        let dx = host.input_state(LogicalInput::Axis(Axis::CursorX)) as i32;
        let dy = host.input_state(LogicalInput::Axis(Axis::CursorY)) as i32;
        if dx != 0 || dy != 0 {
            let (x, y) = self.state.move_cursor(dx, dy);
            queue.push(Event {
                kind: EventKind::CursorMove { dx, dy, x, y },
                timestamp,
            });
        }

        let queued = queue.len() - before;
        if queued > 0 {
            log(LogCategory::Input, LogLevel::Trace, || {
                format!("Queued {} input event(s) at {:?}", queued, timestamp)
            });
        }
        queued
    }
}
