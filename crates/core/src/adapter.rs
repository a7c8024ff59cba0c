//! Lifecycle manager and frame orchestrator
//!
//! [`Adapter`] is the single value a host binding keeps. It sequences
//! session creation and teardown across load/unload/reset and runs the
//! per-refresh [`Adapter::tick`]:
//!
//! ```text
//! poll input -> drain events -> render -> present -> silent audio -> config check
//! ```
//!
//! Every entry point is safe to call in any state. Calls that need an
//! initialized adapter or an active session quietly do nothing without one.

use crate::config::Settings;
use crate::error::AdapterError;
use crate::event::{Event, EventKind};
use crate::host::Host;
use crate::input::Button;
use crate::logging::{log, LogCategory, LogLevel};
use crate::negotiate::negotiate;
use crate::scene;
use crate::session::{Session, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::types::{AvInfo, GameGeometry, PixelFormat, Region, SystemInfo, SystemTiming};
use serde_json::json;
use std::time::Duration;

pub const API_VERSION: u32 = 1;
pub const FRAMES_PER_SECOND: f64 = 60.0;

/// Pressing this button asks the host to end the session
pub const EXIT_BUTTON: Button = Button::MouseLeft;

/// Where the adapter is in its load cycle.
///
/// `Negotiating` and `Unloading` only exist inside `load_session` and
/// `unload_session`; callers observe `Uninitialized` or `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Negotiating,
    Active,
    Unloading,
}

/// What one tick did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Events drained and dispatched
    pub events: usize,
    pub exit_requested: bool,
    /// Whether a frame reached the host
    pub presented: bool,
}

#[derive(Debug)]
pub struct Adapter {
    initialized: bool,
    state: SessionState,
    settings: Settings,
    session: Option<Session>,
    frame_time_hint: Option<Duration>,
    width: u32,
    height: u32,
}

impl Default for Adapter {
    fn default() -> Self {
        Self::new()
    }
}

impl Adapter {
    /// An adapter rendering at the default 400x225
    pub fn new() -> Self {
        Self::with_dimensions(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }

    pub fn with_dimensions(width: u32, height: u32) -> Self {
        Self {
            initialized: false,
            state: SessionState::Uninitialized,
            settings: Settings::default(),
            session: None,
            frame_time_hint: None,
            width,
            height,
        }
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Prepare adapter-wide defaults. Calling it again is a no-op.
    pub fn initialize(&mut self) {
        if self.initialized {
            return;
        }
        self.settings = Settings::default();
        self.settings.apply_logging();
        self.initialized = true;
        log(LogCategory::Lifecycle, LogLevel::Debug, || {
            "Adapter initialized".to_string()
        });
    }

    /// Tear down any session and adapter-wide state. Safe to repeat.
    pub fn deinitialize(&mut self) {
        if !self.initialized {
            return;
        }
        self.unload_session();
        self.frame_time_hint = None;
        self.initialized = false;
        log(LogCategory::Lifecycle, LogLevel::Debug, || {
            "Adapter deinitialized".to_string()
        });
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Negotiate a pixel format and allocate the session.
    ///
    /// A second load while a session is active keeps the live session and
    /// succeeds without allocating again.
    pub fn load_session<H: Host + ?Sized>(&mut self, host: &mut H) -> Result<(), AdapterError> {
        if !self.initialized {
            return Err(AdapterError::NotInitialized);
        }
        if self.session.is_some() {
            log(LogCategory::Lifecycle, LogLevel::Warn, || {
                "Load requested with a session already active; keeping it".to_string()
            });
            return Ok(());
        }

        self.state = SessionState::Negotiating;
        self.settings = Settings::read(host);
        self.settings.apply_logging();

        let format = match negotiate(host, &self.settings) {
            Ok(format) => format,
            Err(e) => {
                self.state = SessionState::Uninitialized;
                return Err(e);
            }
        };

        let session = match Session::new(self.width, self.height, format) {
            Ok(session) => session,
            Err(e) => {
                log(LogCategory::Lifecycle, LogLevel::Error, || {
                    format!("Session allocation failed: {}", e)
                });
                self.state = SessionState::Uninitialized;
                return Err(e);
            }
        };
        log(LogCategory::Lifecycle, LogLevel::Info, || {
            format!(
                "Session loaded: {}x{} {}",
                session.buffer().width(),
                session.buffer().height(),
                format.option_value()
            )
        });
        self.session = Some(session);
        self.state = SessionState::Active;
        Ok(())
    }

    /// Release the session's buffer and queue. No-op without a session.
    pub fn unload_session(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        self.state = SessionState::Unloading;
        let frames = session.frames();
        drop(session);
        self.state = SessionState::Uninitialized;
        log(LogCategory::Lifecycle, LogLevel::Info, || {
            format!("Session unloaded after {} frame(s)", frames)
        });
    }

    /// Reset keeps all state: the adapter has nothing a reset could restore.
    pub fn reset_session(&mut self) {
        log(LogCategory::Lifecycle, LogLevel::Debug, || {
            "Reset requested; session state is kept".to_string()
        });
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // ------------------------------------------------------------------
    // Per-frame
    // ------------------------------------------------------------------

    /// Elapsed-time hint for the next tick, in microseconds
    pub fn set_frame_time(&mut self, usec: i64) {
        self.frame_time_hint = u64::try_from(usec).ok().map(Duration::from_micros);
    }

    /// Produce one frame. Does nothing unless a session is active.
    pub fn tick<H: Host + ?Sized>(&mut self, host: &mut H) -> TickReport {
        let mut report = TickReport::default();
        let Some(session) = self.session.as_mut() else {
            return report;
        };

        let timestamp = session.clock.advance(self.frame_time_hint.take());
        session.input.poll_once(host, &mut session.events, timestamp);

        for event in session.events.drain() {
            report.events += 1;
            if dispatch(&event) {
                report.exit_requested = true;
            }
        }
        if report.exit_requested {
            log(LogCategory::Lifecycle, LogLevel::Info, || {
                "Exit requested, asking host to shut down".to_string()
            });
            host.request_shutdown();
        }

        scene::render(&mut session.buffer, session.input.state(), &self.settings);
        report.presented = session.present(host).is_ok();

        host.emit_audio_sample(0, 0);

        if host.variables_updated() {
            let format = session.format();
            self.refresh_settings(host, format);
        }
        report
    }

    /// Re-read options mid-session. Everything but the pixel format applies
    /// now; a new format needs an unload/load cycle.
    fn refresh_settings<H: Host + ?Sized>(&mut self, host: &mut H, session_format: PixelFormat) {
        let current = Settings {
            pixel_format: session_format,
            ..self.settings.clone()
        };
        let mut fresh = current.reread(host);
        if fresh.pixel_format != session_format {
            log(LogCategory::Config, LogLevel::Warn, || {
                format!(
                    "Pixel format {} takes effect on the next load; keeping {}",
                    fresh.pixel_format.option_value(),
                    session_format.option_value()
                )
            });
            fresh.pixel_format = session_format;
        }
        fresh.apply_logging();
        self.settings = fresh;
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn api_version(&self) -> u32 {
        API_VERSION
    }

    pub fn system_info(&self) -> SystemInfo {
        SystemInfo {
            library_name: "pixelpump",
            library_version: env!("CARGO_PKG_VERSION"),
            valid_extensions: None,
            need_fullpath: false,
            block_extract: true,
        }
    }

    /// Timing and geometry of the active session
    pub fn av_info(&self) -> Option<AvInfo> {
        let buffer = self.session.as_ref()?.buffer();
        let (w, h) = (buffer.width(), buffer.height());
        Some(AvInfo {
            geometry: GameGeometry {
                base_width: w,
                base_height: h,
                max_width: w,
                max_height: h,
                aspect_ratio: w as f32 / h as f32,
            },
            timing: SystemTiming {
                fps: FRAMES_PER_SECOND,
                sample_rate: 0.0,
            },
        })
    }

    pub fn region(&self) -> Region {
        Region::Ntsc
    }

    pub fn set_controller_port_device(&mut self, port: u32, device: u32) {
        log(LogCategory::Input, LogLevel::Info, || {
            format!("Plugging device {} into port {}", device, port)
        });
    }

    // ------------------------------------------------------------------
    // Intentional no-ops: no save states, memory maps or cheats
    // ------------------------------------------------------------------

    pub fn serialize_size(&self) -> usize {
        0
    }

    pub fn serialize(&self, _data: &mut [u8]) -> bool {
        true
    }

    pub fn deserialize(&mut self, data: &[u8]) -> bool {
        log(LogCategory::Stubs, LogLevel::Debug, || {
            format!("Ignoring {} byte(s) of state", data.len())
        });
        true
    }

    pub fn memory_region(&mut self, _id: u32) -> Option<&mut [u8]> {
        None
    }

    pub fn memory_size(&self, _id: u32) -> usize {
        0
    }

    pub fn cheat_reset(&mut self) {
        log(LogCategory::Stubs, LogLevel::Debug, || "Cheat reset ignored".to_string());
    }

    pub fn apply_cheat(&mut self, index: u32, enabled: bool, code: &str) {
        log(LogCategory::Stubs, LogLevel::Debug, || {
            format!("Cheat {} ({}) ignored: {:?}", index, enabled, code)
        });
    }

    /// JSON snapshot for debugging; not a save state
    pub fn debug_state(&self) -> serde_json::Value {
        let session = self.session.as_ref().map(|s| {
            let input = s.input().state();
            let pressed: Vec<&str> = Button::ALL
                .iter()
                .filter(|b| input.is_pressed(**b))
                .map(|b| b.name())
                .collect();
            json!({
                "width": s.buffer().width(),
                "height": s.buffer().height(),
                "format": s.format(),
                "frames": s.frames(),
                "elapsed_ms": s.elapsed().as_millis() as u64,
                "cursor": [input.cursor().0, input.cursor().1],
                "pressed": pressed,
            })
        });
        json!({
            "initialized": self.initialized,
            "state": format!("{:?}", self.state),
            "settings": self.settings,
            "session": session,
        })
    }

    #[cfg(test)]
    pub(crate) fn session_mut(&mut self) -> Option<&mut Session> {
        self.session.as_mut()
    }
}

/// React to one event. Returns `true` if it requests exit.
fn dispatch(event: &Event) -> bool {
    if event.is_press(EXIT_BUTTON) {
        return true;
    }
    log(LogCategory::Input, LogLevel::Trace, || match event.kind {
        EventKind::Button { button, pressed } => format!(
            "{} {} at {:?}",
            button.name(),
            if pressed { "pressed" } else { "released" },
            event.timestamp
        ),
        EventKind::CursorMove { dx, dy, x, y } => {
            format!("Cursor moved by ({}, {}) to ({}, {})", dx, dy, x, y)
        }
    });
    false
}
