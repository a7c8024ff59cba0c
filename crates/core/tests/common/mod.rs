//! Scriptable host shared by the integration tests

use pump_core::input::{Axis, Button, LogicalInput};
use pump_core::{FrameView, Host, PixelFormat};
use std::collections::HashMap;

/// Copy of one presented frame
#[allow(dead_code)]
pub struct PresentedFrame {
    pub width: u32,
    pub height: u32,
    pub pitch: usize,
    pub format: PixelFormat,
    pub bytes: Vec<u8>,
}

/// Host that records every call the adapter makes
#[derive(Default)]
pub struct RecordingHost {
    pub accepted_formats: Option<Vec<PixelFormat>>,
    pub declared_formats: Vec<PixelFormat>,
    pub variables: HashMap<String, String>,
    pub variables_dirty: bool,
    pub inputs: HashMap<LogicalInput, i16>,
    pub polls: usize,
    pub frames: Vec<PresentedFrame>,
    pub audio: Vec<(i16, i16)>,
    pub shutdown_requests: usize,
}

#[allow(dead_code)]
impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host that only accepts the given formats
    pub fn accepting(formats: &[PixelFormat]) -> Self {
        Self {
            accepted_formats: Some(formats.to_vec()),
            ..Self::default()
        }
    }

    pub fn set_variable(&mut self, key: &str, value: &str) {
        self.variables.insert(key.to_string(), value.to_string());
        self.variables_dirty = true;
    }

    pub fn press(&mut self, button: Button, pressed: bool) {
        self.inputs.insert(LogicalInput::Button(button), pressed as i16);
    }

    /// Relative cursor motion reported on the next polls
    pub fn motion(&mut self, dx: i16, dy: i16) {
        self.inputs.insert(LogicalInput::Axis(Axis::CursorX), dx);
        self.inputs.insert(LogicalInput::Axis(Axis::CursorY), dy);
    }
}

impl Host for RecordingHost {
    fn poll_inputs(&mut self) {
        self.polls += 1;
    }

    fn input_state(&mut self, input: LogicalInput) -> i16 {
        self.inputs.get(&input).copied().unwrap_or(0)
    }

    fn present_frame(&mut self, frame: FrameView<'_>) {
        self.frames.push(PresentedFrame {
            width: frame.width,
            height: frame.height,
            pitch: frame.pitch,
            format: frame.format,
            bytes: frame.data.to_vec(),
        });
    }

    fn emit_audio_sample(&mut self, left: i16, right: i16) {
        self.audio.push((left, right));
    }

    fn set_pixel_format(&mut self, format: PixelFormat) -> bool {
        self.declared_formats.push(format);
        match &self.accepted_formats {
            Some(accepted) => accepted.contains(&format),
            None => true,
        }
    }

    fn variable(&mut self, key: &str) -> Option<String> {
        self.variables.get(key).cloned()
    }

    fn variables_updated(&mut self) -> bool {
        std::mem::take(&mut self.variables_dirty)
    }

    fn request_shutdown(&mut self) {
        self.shutdown_requests += 1;
    }
}
