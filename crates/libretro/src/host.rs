//! [`Host`] over the frontend's registered callbacks

use crate::ffi::*;
use pump_core::input::{Axis, Button, LogicalInput};
use pump_core::logging::{LogCategory, LogLevel, LogSink};
use pump_core::{FrameView, Host, PixelFormat};
use std::ffi::{CStr, CString};
use std::os::raw::{c_uint, c_void};
use std::ptr;

/// Callbacks handed over by the `retro_set_*` entry points. Any of them may
/// still be missing when an entry point runs; calls through a missing one do
/// nothing.
#[derive(Default, Clone, Copy)]
pub struct Callbacks {
    pub environment: Option<retro_environment_t>,
    pub video_refresh: Option<retro_video_refresh_t>,
    pub audio_sample: Option<retro_audio_sample_t>,
    pub audio_sample_batch: Option<retro_audio_sample_batch_t>,
    pub input_poll: Option<retro_input_poll_t>,
    pub input_state: Option<retro_input_state_t>,
}

impl Callbacks {
    /// Issue an environment command. `false` if the frontend refused it or
    /// no environment callback is set.
    pub fn environment(&self, cmd: c_uint, data: *mut c_void) -> bool {
        match self.environment {
            // SAFETY: `data` points to the struct libretro.h defines for `cmd`
            Some(cb) => unsafe { cb(cmd, data) },
            None => false,
        }
    }
}

/// (device, id) a logical input is read from. Everything is on port 0.
pub fn device_binding(input: LogicalInput) -> (c_uint, c_uint) {
    match input {
        LogicalInput::Button(button) => match button {
            Button::MouseLeft => (RETRO_DEVICE_MOUSE, RETRO_DEVICE_ID_MOUSE_LEFT),
            Button::MouseRight => (RETRO_DEVICE_MOUSE, RETRO_DEVICE_ID_MOUSE_RIGHT),
            Button::Up => (RETRO_DEVICE_JOYPAD, RETRO_DEVICE_ID_JOYPAD_UP),
            Button::Down => (RETRO_DEVICE_JOYPAD, RETRO_DEVICE_ID_JOYPAD_DOWN),
            Button::Left => (RETRO_DEVICE_JOYPAD, RETRO_DEVICE_ID_JOYPAD_LEFT),
            Button::Right => (RETRO_DEVICE_JOYPAD, RETRO_DEVICE_ID_JOYPAD_RIGHT),
            Button::A => (RETRO_DEVICE_JOYPAD, RETRO_DEVICE_ID_JOYPAD_A),
            Button::B => (RETRO_DEVICE_JOYPAD, RETRO_DEVICE_ID_JOYPAD_B),
            Button::Select => (RETRO_DEVICE_JOYPAD, RETRO_DEVICE_ID_JOYPAD_SELECT),
            Button::Start => (RETRO_DEVICE_JOYPAD, RETRO_DEVICE_ID_JOYPAD_START),
        },
        LogicalInput::Axis(Axis::CursorX) => (RETRO_DEVICE_MOUSE, RETRO_DEVICE_ID_MOUSE_X),
        LogicalInput::Axis(Axis::CursorY) => (RETRO_DEVICE_MOUSE, RETRO_DEVICE_ID_MOUSE_Y),
    }
}

pub struct LibretroHost<'a> {
    callbacks: &'a Callbacks,
}

impl<'a> LibretroHost<'a> {
    pub fn new(callbacks: &'a Callbacks) -> Self {
        Self { callbacks }
    }
}

impl Host for LibretroHost<'_> {
    fn poll_inputs(&mut self) {
        if let Some(poll) = self.callbacks.input_poll {
            unsafe { poll() }
        }
    }

    fn input_state(&mut self, input: LogicalInput) -> i16 {
        let Some(state) = self.callbacks.input_state else {
            return 0;
        };
        let (device, id) = device_binding(input);
        unsafe { state(0, device, 0, id) }
    }

    fn present_frame(&mut self, frame: FrameView<'_>) {
        if let Some(refresh) = self.callbacks.video_refresh {
            // SAFETY: the frontend reads `height * pitch` bytes during the call
            unsafe {
                refresh(
                    frame.data.as_ptr().cast(),
                    frame.width,
                    frame.height,
                    frame.pitch,
                )
            }
        }
    }

    fn emit_audio_sample(&mut self, left: i16, right: i16) {
        if let Some(sample) = self.callbacks.audio_sample {
            unsafe { sample(left, right) }
        }
    }

    fn set_pixel_format(&mut self, format: PixelFormat) -> bool {
        let mut id: c_uint = format.retro_id();
        self.callbacks.environment(
            RETRO_ENVIRONMENT_SET_PIXEL_FORMAT,
            ptr::addr_of_mut!(id).cast(),
        )
    }

    fn variable(&mut self, key: &str) -> Option<String> {
        let key = CString::new(key).ok()?;
        let mut var = retro_variable {
            key: key.as_ptr(),
            value: ptr::null(),
        };
        if !self
            .callbacks
            .environment(RETRO_ENVIRONMENT_GET_VARIABLE, ptr::addr_of_mut!(var).cast())
            || var.value.is_null()
        {
            return None;
        }
        // SAFETY: non-null values are NUL-terminated strings owned by the frontend
        let value = unsafe { CStr::from_ptr(var.value) };
        Some(value.to_string_lossy().into_owned())
    }

    fn variables_updated(&mut self) -> bool {
        let mut updated = false;
        self.callbacks.environment(
            RETRO_ENVIRONMENT_GET_VARIABLE_UPDATE,
            ptr::addr_of_mut!(updated).cast(),
        ) && updated
    }

    fn request_shutdown(&mut self) {
        self.callbacks
            .environment(RETRO_ENVIRONMENT_SHUTDOWN, ptr::null_mut());
    }
}

/// Log sink writing through the frontend's log interface
pub struct HostLog {
    printf: retro_log_printf_t,
}

impl HostLog {
    pub fn new(printf: retro_log_printf_t) -> Self {
        Self { printf }
    }
}

pub fn retro_log_level(level: LogLevel) -> c_uint {
    match level {
        LogLevel::Error | LogLevel::Off => RETRO_LOG_ERROR,
        LogLevel::Warn => RETRO_LOG_WARN,
        LogLevel::Info => RETRO_LOG_INFO,
        LogLevel::Debug | LogLevel::Trace => RETRO_LOG_DEBUG,
    }
}

/// Host log line for a message; interior NULs are dropped
pub fn format_line(category: LogCategory, message: &str) -> CString {
    let line: String = format!("[pixelpump] [{:?}] {}", category, message)
        .chars()
        .filter(|c| *c != '\0')
        .collect();
    CString::new(line).unwrap_or_default()
}

impl LogSink for HostLog {
    fn write(&self, category: LogCategory, level: LogLevel, message: &str) {
        let line = format_line(category, message);
        // The message is passed as an argument, never as the format string
        unsafe { (self.printf)(retro_log_level(level), c"%s\n".as_ptr(), line.as_ptr()) }
    }
}
