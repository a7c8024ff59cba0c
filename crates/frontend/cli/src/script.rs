//! Scripted host: replays a JSON input timeline against the adapter

use pump_core::graphics::Rgb;
use pump_core::input::{Axis, Button, LogicalInput};
use pump_core::{FrameView, Host, PixelFormat};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Input timeline loaded from `--script`
///
/// ```json
/// { "steps": [
///     { "frame": 2, "press": ["A"] },
///     { "frame": 4, "release": ["A"], "motion": [5, -3] },
///     { "frame": 6, "options": { "pixelpump_show_cursor": "disabled" } }
/// ] }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// Changes applied right before the given frame is ticked
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Step {
    pub frame: u32,
    /// Buttons held from this frame on
    #[serde(default)]
    pub press: Vec<Button>,
    #[serde(default)]
    pub release: Vec<Button>,
    /// Cursor delta reported on this frame only
    #[serde(default)]
    pub motion: Option<(i16, i16)>,
    /// Frame-time hint in microseconds
    #[serde(default)]
    pub frame_time_us: Option<i64>,
    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

impl Script {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        let mut script: Script = serde_json::from_str(text)?;
        script.steps.sort_by_key(|s| s.frame);
        Ok(script)
    }

    pub fn steps_at(&self, frame: u32) -> impl Iterator<Item = &Step> {
        self.steps.iter().filter(move |s| s.frame == frame)
    }
}

/// Last frame the host received, converted to RGBA
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub rgba: Vec<u8>,
}

impl Snapshot {
    fn capture(frame: &FrameView<'_>) -> Self {
        let mut rgba = Vec::with_capacity(frame.width as usize * frame.height as usize * 4);
        for y in 0..frame.height {
            for x in 0..frame.width {
                let c = frame.pixel(x, y).unwrap_or(Rgb::new(0, 0, 0));
                rgba.extend_from_slice(&[c.r, c.g, c.b, 0xFF]);
            }
        }
        Self {
            width: frame.width,
            height: frame.height,
            format: frame.format,
            rgba,
        }
    }
}

/// Counters for the JSON run report
#[derive(Debug, Clone, Default, Serialize)]
pub struct HostStats {
    pub polls: u64,
    pub frames_presented: u64,
    pub audio_samples: u64,
    pub shutdown_requested: bool,
    pub declared_formats: Vec<PixelFormat>,
}

pub struct ScriptedHost {
    held: HashSet<Button>,
    motion: (i16, i16),
    options: BTreeMap<String, String>,
    options_dirty: bool,
    reject_formats: bool,
    pub stats: HostStats,
    pub last_frame: Option<Snapshot>,
}

impl ScriptedHost {
    pub fn new(options: BTreeMap<String, String>, reject_formats: bool) -> Self {
        Self {
            held: HashSet::new(),
            motion: (0, 0),
            options,
            options_dirty: false,
            reject_formats,
            stats: HostStats::default(),
            last_frame: None,
        }
    }

    /// Apply a script step. Returns the frame-time hint it carries.
    pub fn apply(&mut self, step: &Step) -> Option<i64> {
        self.held.extend(step.press.iter().copied());
        for button in &step.release {
            self.held.remove(button);
        }
        if let Some(motion) = step.motion {
            self.motion = motion;
        }
        if !step.options.is_empty() {
            self.options.extend(step.options.clone());
            self.options_dirty = true;
        }
        step.frame_time_us
    }

    /// Forget one-frame inputs once a tick consumed them
    pub fn end_frame(&mut self) {
        self.motion = (0, 0);
    }
}

impl Host for ScriptedHost {
    fn poll_inputs(&mut self) {
        self.stats.polls += 1;
    }

    fn input_state(&mut self, input: LogicalInput) -> i16 {
        match input {
            LogicalInput::Button(button) => self.held.contains(&button) as i16,
            LogicalInput::Axis(Axis::CursorX) => self.motion.0,
            LogicalInput::Axis(Axis::CursorY) => self.motion.1,
        }
    }

    fn present_frame(&mut self, frame: FrameView<'_>) {
        self.stats.frames_presented += 1;
        self.last_frame = Some(Snapshot::capture(&frame));
    }

    fn emit_audio_sample(&mut self, _left: i16, _right: i16) {
        self.stats.audio_samples += 1;
    }

    fn set_pixel_format(&mut self, format: PixelFormat) -> bool {
        self.stats.declared_formats.push(format);
        !self.reject_formats
    }

    fn variable(&mut self, key: &str) -> Option<String> {
        self.options.get(key).cloned()
    }

    fn variables_updated(&mut self) -> bool {
        std::mem::take(&mut self.options_dirty)
    }

    fn request_shutdown(&mut self) {
        self.stats.shutdown_requested = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_orders_steps() {
        let script = Script::from_json(
            r#"{"steps": [
                {"frame": 4, "release": ["A"]},
                {"frame": 1, "press": ["A", "MouseRight"], "motion": [3, -2]}
            ]}"#,
        )
        .unwrap();
        assert_eq!(script.steps[0].frame, 1);
        assert_eq!(script.steps[0].press, vec![Button::A, Button::MouseRight]);
        assert_eq!(script.steps[0].motion, Some((3, -2)));
        assert_eq!(script.steps_at(4).count(), 1);
        assert_eq!(script.steps_at(2).count(), 0);
    }

    #[test]
    fn held_buttons_and_one_frame_motion() {
        let mut host = ScriptedHost::new(BTreeMap::new(), false);
        host.apply(&Step {
            frame: 0,
            press: vec![Button::Start],
            motion: Some((4, 1)),
            ..Step::default()
        });
        assert_eq!(host.input_state(LogicalInput::Button(Button::Start)), 1);
        assert_eq!(host.input_state(LogicalInput::Axis(Axis::CursorX)), 4);

        host.end_frame();
        assert_eq!(host.input_state(LogicalInput::Button(Button::Start)), 1);
        assert_eq!(host.input_state(LogicalInput::Axis(Axis::CursorX)), 0);
    }

    #[test]
    fn option_steps_mark_variables_dirty() {
        let mut host = ScriptedHost::new(BTreeMap::new(), false);
        assert!(!host.variables_updated());

        let mut options = BTreeMap::new();
        options.insert("pixelpump_show_cursor".to_string(), "disabled".to_string());
        host.apply(&Step {
            frame: 0,
            options,
            ..Step::default()
        });
        assert!(host.variables_updated());
        assert!(!host.variables_updated());
        assert_eq!(
            host.variable("pixelpump_show_cursor").as_deref(),
            Some("disabled")
        );
    }
}
