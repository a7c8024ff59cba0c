//! Host capability interface
//!
//! Everything the adapter needs from the frontend that drives it. A host is
//! passed into each entry point for the duration of that call only; the
//! adapter never keeps a reference to it.

use crate::buffer::FrameView;
use crate::input::LogicalInput;
use crate::types::{AudioSample, PixelFormat};

pub trait Host {
    /// Latch the host's input devices. Called once per tick, before any read.
    fn poll_inputs(&mut self);

    /// Current value of a logical input. Buttons report 0/1, axes report a
    /// relative delta since the previous poll.
    fn input_state(&mut self, input: LogicalInput) -> i16;

    /// Display a finished frame. The view is only valid during this call.
    fn present_frame(&mut self, frame: FrameView<'_>);

    /// Emit one stereo audio sample
    fn emit_audio_sample(&mut self, left: AudioSample, right: AudioSample);

    /// Declare the pixel format the adapter will render in.
    /// Returns `false` if the host cannot accept it.
    fn set_pixel_format(&mut self, format: PixelFormat) -> bool;

    /// Look up a named configuration variable
    fn variable(&mut self, key: &str) -> Option<String>;

    /// Whether any configuration variable changed since the last query
    fn variables_updated(&mut self) -> bool;

    /// Ask the host to end the session
    fn request_shutdown(&mut self);
}
