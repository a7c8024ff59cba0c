//! Discrete input events and the per-tick queue that carries them

use crate::input::Button;
use std::collections::VecDeque;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A button changed state
    Button { button: Button, pressed: bool },
    /// The cursor received a non-zero delta; `x`/`y` is the clamped result
    CursorMove { dx: i32, dy: i32, x: u32, y: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    /// Session time at which the change was detected
    pub timestamp: Duration,
}

impl Event {
    pub fn button(button: Button, pressed: bool, timestamp: Duration) -> Self {
        Self {
            kind: EventKind::Button { button, pressed },
            timestamp,
        }
    }

    pub fn is_press(&self, which: Button) -> bool {
        matches!(self.kind, EventKind::Button { button, pressed: true } if button == which)
    }
}

/// FIFO of events detected during one tick
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<Event>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: Event) {
        self.events.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Oldest event without removing it
    pub fn peek(&self) -> Option<&Event> {
        self.events.front()
    }

    /// Remove every queued event in insertion order
    pub fn drain(&mut self) -> std::collections::vec_deque::Drain<'_, Event> {
        self.events.drain(..)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_is_fifo() {
        let mut queue = EventQueue::new();
        queue.push(Event::button(Button::A, true, Duration::from_millis(1)));
        queue.push(Event::button(Button::B, true, Duration::from_millis(2)));
        queue.push(Event::button(Button::A, false, Duration::from_millis(3)));

        assert_eq!(queue.len(), 3);
        assert!(queue.peek().is_some_and(|e| e.is_press(Button::A)));

        let drained: Vec<Event> = queue.drain().collect();
        assert_eq!(drained.len(), 3);
        assert!(drained[0].is_press(Button::A));
        assert!(drained[1].is_press(Button::B));
        assert!(!drained[2].is_press(Button::A));
        assert!(queue.is_empty());
    }

    #[test]
    fn is_press_ignores_releases_and_moves() {
        let release = Event::button(Button::MouseLeft, false, Duration::ZERO);
        assert!(!release.is_press(Button::MouseLeft));

        let moved = Event {
            kind: EventKind::CursorMove {
                dx: 1,
                dy: 0,
                x: 1,
                y: 0,
            },
            timestamp: Duration::ZERO,
        };
        assert!(!moved.is_press(Button::MouseLeft));
    }
}
