//! Live per-load resources
//!
//! A [`Session`] owns the pixel buffer, input state and event queue from a
//! successful load until unload. Dropping it releases all of them.

use crate::buffer::PixelBuffer;
use crate::error::AdapterError;
use crate::event::EventQueue;
use crate::host::Host;
use crate::input::InputTracker;
use crate::logging::{log, LogCategory, LogLevel};
use crate::types::PixelFormat;
use std::time::Duration;

pub const DEFAULT_WIDTH: u32 = 400;
pub const DEFAULT_HEIGHT: u32 = 225;

/// Tick length assumed when the host gives no frame-time hint (60 Hz)
pub const NOMINAL_FRAME_TIME: Duration = Duration::from_micros(16_667);

/// Session time, advanced once per tick. Only used to timestamp events.
#[derive(Debug, Default, Clone, Copy)]
pub struct SessionClock {
    elapsed: Duration,
}

impl SessionClock {
    pub fn advance(&mut self, hint: Option<Duration>) -> Duration {
        self.elapsed += hint.unwrap_or(NOMINAL_FRAME_TIME);
        self.elapsed
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

#[derive(Debug)]
pub struct Session {
    pub(crate) buffer: PixelBuffer,
    pub(crate) input: InputTracker,
    pub(crate) events: EventQueue,
    pub(crate) clock: SessionClock,
    format: PixelFormat,
    frames: u64,
}

impl Session {
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Result<Self, AdapterError> {
        let buffer = PixelBuffer::new(width, height, format)?;
        let input = InputTracker::new(buffer.width(), buffer.height());
        Ok(Self {
            buffer,
            input,
            events: EventQueue::new(),
            clock: SessionClock::default(),
            format,
            frames: 0,
        })
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn input(&self) -> &InputTracker {
        &self.input
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    /// Format negotiated at load; fixed for the session
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Frames handed to the host so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn elapsed(&self) -> Duration {
        self.clock.elapsed()
    }

    /// Hand the finished buffer to the host. A buffer that no longer matches
    /// the negotiated format is not delivered; the tick goes on without it.
    pub(crate) fn present<H: Host + ?Sized>(&mut self, host: &mut H) -> Result<(), AdapterError> {
        let found = self.buffer.format();
        if found != self.format {
            log(LogCategory::Video, LogLevel::Warn, || {
                format!(
                    "Skipping frame: buffer is {} but host expects {}",
                    found.option_value(),
                    self.format.option_value()
                )
            });
            return Err(AdapterError::FormatMismatch {
                expected: self.format,
                found,
            });
        }

        host.present_frame(self.buffer.view());
        self.frames += 1;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn replace_buffer(&mut self, buffer: PixelBuffer) {
        self.buffer = buffer;
    }
}
