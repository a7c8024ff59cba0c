//! Process-wide logging for the adapter.
//!
//! - **LogLevel**: Off < Error < Warn < Info < Debug < Trace
//! - **LogCategory**: which part of the adapter a message comes from
//! - **LogConfig**: global level, per-category overrides, throttling, sink
//! - **LogSink**: where accepted messages are written
//! - **log()**: the one entry point every module uses
//!
//! The embedding picks the sink: the libretro binding installs the
//! frontend's log callback, the CLI forwards into the `log` crate. Without a
//! sink, messages go to stderr.
//!
//! ```rust
//! use pump_core::logging::{log, LogCategory, LogLevel};
//!
//! // The closure only runs when Input/Debug is enabled
//! log(LogCategory::Input, LogLevel::Debug, || {
//!     format!("Cursor moved to ({}, {})", 12, 34)
//! });
//! ```

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, OnceLock};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum LogLevel {
    Off = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl LogLevel {
    const ALL: [LogLevel; 6] = [
        LogLevel::Off,
        LogLevel::Error,
        LogLevel::Warn,
        LogLevel::Info,
        LogLevel::Debug,
        LogLevel::Trace,
    ];

    /// Parse a level name or its number (case-insensitive)
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.trim().to_ascii_lowercase();
        let level = match s.as_str() {
            "off" | "none" => LogLevel::Off,
            "error" | "err" => LogLevel::Error,
            "warn" | "warning" => LogLevel::Warn,
            "info" => LogLevel::Info,
            "debug" => LogLevel::Debug,
            "trace" => LogLevel::Trace,
            digits => return digits.parse::<u8>().ok().and_then(Self::from_repr),
        };
        Some(level)
    }

    fn from_repr(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogCategory {
    /// Init, load, unload, reset
    Lifecycle,
    /// Input polling and event dispatch
    Input,
    /// Pixel format negotiation and frame hand-off
    Video,
    Audio,
    /// Core option reads
    Config,
    /// Entry points that are intentionally no-ops
    Stubs,
}

const CATEGORY_COUNT: usize = 6;

impl LogCategory {
    pub const ALL: [LogCategory; CATEGORY_COUNT] = [
        LogCategory::Lifecycle,
        LogCategory::Input,
        LogCategory::Video,
        LogCategory::Audio,
        LogCategory::Config,
        LogCategory::Stubs,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// Destination for log messages that passed level and rate checks
pub trait LogSink: Send + Sync {
    fn write(&self, category: LogCategory, level: LogLevel, message: &str);
}

/// Verdict of the throttle for one message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Admission {
    allowed: bool,
    /// Messages suppressed since the last report, when one is due
    report_dropped: Option<usize>,
}

/// Sliding one-second window for a single category
#[derive(Debug, Default)]
struct Window {
    recent: VecDeque<Instant>,
    dropped: usize,
    last_report: Option<Instant>,
}

impl Window {
    const SPAN: Duration = Duration::from_secs(1);

    fn admit(&mut self, now: Instant, limit: usize) -> Admission {
        while self
            .recent
            .front()
            .is_some_and(|t| now.duration_since(*t) > Self::SPAN)
        {
            self.recent.pop_front();
        }

        if self.recent.len() < limit {
            self.recent.push_back(now);
            return Admission {
                allowed: true,
                report_dropped: self.take_dropped(now),
            };
        }

        self.dropped += 1;
        let report_due = self
            .last_report
            .map_or(true, |last| now.duration_since(last) >= Self::SPAN);
        Admission {
            allowed: false,
            report_dropped: if report_due { self.take_dropped(now) } else { None },
        }
    }

    fn take_dropped(&mut self, now: Instant) -> Option<usize> {
        if self.dropped == 0 {
            return None;
        }
        self.last_report = Some(now);
        Some(std::mem::take(&mut self.dropped))
    }
}

/// Per-category message throttle
struct Throttle {
    limit: AtomicUsize,
    windows: Mutex<[Window; CATEGORY_COUNT]>,
}

impl Throttle {
    fn new(limit: usize) -> Self {
        Self {
            limit: AtomicUsize::new(limit),
            windows: Mutex::new(Default::default()),
        }
    }

    fn admit(&self, category: LogCategory) -> Admission {
        let limit = self.limit.load(Ordering::Relaxed);
        lock(&self.windows)[category.index()].admit(Instant::now(), limit)
    }
}

/// A poisoned lock only means another thread panicked mid-log; keep logging.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

const NO_OVERRIDE: u8 = LogLevel::Off as u8;

pub struct LogConfig {
    global_level: AtomicU8,
    /// `Off` means "follow the global level"
    overrides: [AtomicU8; CATEGORY_COUNT],
    sink: Mutex<Option<Box<dyn LogSink>>>,
    throttle: Throttle,
}

impl LogConfig {
    pub const DEFAULT_RATE_LIMIT: usize = 60;

    fn new() -> Self {
        Self {
            global_level: AtomicU8::new(LogLevel::Info as u8),
            overrides: Default::default(),
            sink: Mutex::new(None),
            throttle: Throttle::new(Self::DEFAULT_RATE_LIMIT),
        }
    }

    pub fn global() -> &'static Self {
        static INSTANCE: OnceLock<LogConfig> = OnceLock::new();
        INSTANCE.get_or_init(LogConfig::new)
    }

    pub fn set_global_level(&self, level: LogLevel) {
        self.global_level.store(level as u8, Ordering::Relaxed);
    }

    pub fn global_level(&self) -> LogLevel {
        LogLevel::from_repr(self.global_level.load(Ordering::Relaxed)).unwrap_or(LogLevel::Off)
    }

    /// Give one category its own level; `Off` clears the override
    pub fn set_level(&self, category: LogCategory, level: LogLevel) {
        self.overrides[category.index()].store(level as u8, Ordering::Relaxed);
    }

    /// The category's override, `None` when it follows the global level
    pub fn level(&self, category: LogCategory) -> Option<LogLevel> {
        match self.overrides[category.index()].load(Ordering::Relaxed) {
            NO_OVERRIDE => None,
            raw => LogLevel::from_repr(raw),
        }
    }

    pub fn effective_level(&self, category: LogCategory) -> LogLevel {
        self.level(category).unwrap_or_else(|| self.global_level())
    }

    pub fn should_log(&self, category: LogCategory, level: LogLevel) -> bool {
        level != LogLevel::Off && level <= self.effective_level(category)
    }

    /// Global Info, no overrides, default rate limit
    pub fn reset(&self) {
        self.set_global_level(LogLevel::Info);
        for category in LogCategory::ALL {
            self.set_level(category, LogLevel::Off);
        }
        self.set_rate_limit(Self::DEFAULT_RATE_LIMIT);
    }

    /// Messages per second each category may emit
    pub fn set_rate_limit(&self, per_second: usize) {
        self.throttle.limit.store(per_second, Ordering::Relaxed);
    }

    pub fn rate_limit(&self) -> usize {
        self.throttle.limit.load(Ordering::Relaxed)
    }

    /// Replace the current sink
    pub fn set_sink(&self, sink: Box<dyn LogSink>) {
        *lock(&self.sink) = Some(sink);
    }

    /// Back to stderr
    pub fn clear_sink(&self) {
        *lock(&self.sink) = None;
    }

    pub fn has_sink(&self) -> bool {
        lock(&self.sink).is_some()
    }

    fn emit(&self, category: LogCategory, level: LogLevel, message: &str) {
        match lock(&self.sink).as_deref() {
            Some(sink) => sink.write(category, level, message),
            None => eprintln!("[pixelpump] [{:?}] {}", category, message),
        }
    }
}

/// Log a lazily formatted message.
///
/// Each category gets at most [`LogConfig::rate_limit`] messages per
/// second; the rest are counted and summarised in a single warning.
pub fn log<F>(category: LogCategory, level: LogLevel, message_fn: F)
where
    F: FnOnce() -> String,
{
    let config = LogConfig::global();
    if !config.should_log(category, level) {
        return;
    }

    let admission = config.throttle.admit(category);
    if let Some(dropped) = admission.report_dropped {
        config.emit(
            category,
            LogLevel::Warn,
            &format!("{} message(s) suppressed by rate limit", dropped),
        );
    }
    if admission.allowed {
        config.emit(category, level, &message_fn());
    }
}
