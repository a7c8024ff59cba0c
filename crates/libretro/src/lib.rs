//! libretro core exposing the pixelpump adapter
//!
//! The frontend drives everything through the `retro_*` symbols below. All
//! of them lock one process-wide `Core` holding the adapter and the
//! callbacks registered so far.

pub mod ffi;
pub mod host;

use ffi::*;
use host::{Callbacks, HostLog, LibretroHost};
use pump_core::config::CORE_OPTIONS;
use pump_core::logging::{log, LogCategory, LogConfig, LogLevel};
use pump_core::Adapter;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_uint, c_void};
use std::ptr;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

struct Core {
    adapter: Adapter,
    callbacks: Callbacks,
}

static CORE: OnceLock<Mutex<Core>> = OnceLock::new();

fn core() -> MutexGuard<'static, Core> {
    CORE.get_or_init(|| {
        Mutex::new(Core {
            adapter: Adapter::new(),
            callbacks: Callbacks::default(),
        })
    })
    .lock()
    .unwrap_or_else(PoisonError::into_inner)
}

/// Option declarations in `SET_VARIABLES` form, null-terminated
struct OptionTable {
    _strings: Vec<CString>,
    variables: Vec<retro_variable>,
}

// SAFETY: the pointers in `variables` refer to `_strings`, which is never
// mutated after construction
unsafe impl Send for OptionTable {}
unsafe impl Sync for OptionTable {}

impl OptionTable {
    fn build() -> Self {
        let mut strings = Vec::with_capacity(CORE_OPTIONS.len() * 2);
        let mut variables = Vec::with_capacity(CORE_OPTIONS.len() + 1);
        for option in CORE_OPTIONS {
            let (Ok(key), Ok(value)) = (
                CString::new(option.key),
                CString::new(option.declaration()),
            ) else {
                continue;
            };
            variables.push(retro_variable {
                key: key.as_ptr(),
                value: value.as_ptr(),
            });
            strings.push(key);
            strings.push(value);
        }
        variables.push(retro_variable {
            key: ptr::null(),
            value: ptr::null(),
        });
        Self {
            _strings: strings,
            variables,
        }
    }
}

static OPTION_TABLE: OnceLock<OptionTable> = OnceLock::new();

/// `retro_system_info` strings, kept alive for the process
struct InfoStrings {
    name: CString,
    version: CString,
    extensions: Option<CString>,
}

static INFO_STRINGS: OnceLock<InfoStrings> = OnceLock::new();

fn info_strings(adapter: &Adapter) -> &'static InfoStrings {
    INFO_STRINGS.get_or_init(|| {
        let info = adapter.system_info();
        InfoStrings {
            name: CString::new(info.library_name).unwrap_or_default(),
            version: CString::new(info.library_version).unwrap_or_default(),
            extensions: info.valid_extensions.and_then(|e| CString::new(e).ok()),
        }
    })
}

unsafe extern "C" fn frame_time(usec: i64) {
    core().adapter.set_frame_time(usec);
}

#[no_mangle]
pub extern "C" fn retro_api_version() -> c_uint {
    core().adapter.api_version()
}

/// # Safety
/// `info` must be null or point to a writable `retro_system_info`.
#[no_mangle]
pub unsafe extern "C" fn retro_get_system_info(info: *mut retro_system_info) {
    let Some(info) = info.as_mut() else {
        return;
    };
    let core = core();
    let system = core.adapter.system_info();
    let strings = info_strings(&core.adapter);
    *info = retro_system_info {
        library_name: strings.name.as_ptr(),
        library_version: strings.version.as_ptr(),
        valid_extensions: strings
            .extensions
            .as_ref()
            .map_or(ptr::null(), |e| e.as_ptr()),
        need_fullpath: system.need_fullpath,
        block_extract: system.block_extract,
    };
}

/// # Safety
/// `info` must be null or point to a writable `retro_system_av_info`.
#[no_mangle]
pub unsafe extern "C" fn retro_get_system_av_info(info: *mut retro_system_av_info) {
    let Some(info) = info.as_mut() else {
        return;
    };
    let Some(av) = core().adapter.av_info() else {
        log(LogCategory::Lifecycle, LogLevel::Warn, || {
            "AV info requested without an active session".to_string()
        });
        return;
    };
    *info = retro_system_av_info {
        geometry: retro_game_geometry {
            base_width: av.geometry.base_width,
            base_height: av.geometry.base_height,
            max_width: av.geometry.max_width,
            max_height: av.geometry.max_height,
            aspect_ratio: av.geometry.aspect_ratio,
        },
        timing: retro_system_timing {
            fps: av.timing.fps,
            sample_rate: av.timing.sample_rate,
        },
    };
}

#[no_mangle]
pub extern "C" fn retro_set_environment(cb: Option<retro_environment_t>) {
    let mut core = core();
    core.callbacks.environment = cb;
    let callbacks = core.callbacks;
    drop(core);

    let mut no_game = true;
    callbacks.environment(
        RETRO_ENVIRONMENT_SET_SUPPORT_NO_GAME,
        ptr::addr_of_mut!(no_game).cast(),
    );

    let table = OPTION_TABLE.get_or_init(OptionTable::build);
    callbacks.environment(
        RETRO_ENVIRONMENT_SET_VARIABLES,
        table.variables.as_ptr().cast_mut().cast(),
    );

    let mut logging = retro_log_callback { log: None };
    let host_log = callbacks
        .environment(
            RETRO_ENVIRONMENT_GET_LOG_INTERFACE,
            ptr::addr_of_mut!(logging).cast(),
        )
        .then_some(logging.log)
        .flatten();
    match host_log {
        Some(printf) => LogConfig::global().set_sink(Box::new(HostLog::new(printf))),
        None => LogConfig::global().clear_sink(),
    }

    let mut frame_time_cb = retro_frame_time_callback {
        callback: Some(frame_time),
        reference: pump_core::session::NOMINAL_FRAME_TIME.as_micros() as i64,
    };
    if !callbacks.environment(
        RETRO_ENVIRONMENT_SET_FRAME_TIME_CALLBACK,
        ptr::addr_of_mut!(frame_time_cb).cast(),
    ) {
        log(LogCategory::Lifecycle, LogLevel::Error, || {
            "Failed to set frame time callback".to_string()
        });
    }
}

#[no_mangle]
pub extern "C" fn retro_set_video_refresh(cb: Option<retro_video_refresh_t>) {
    core().callbacks.video_refresh = cb;
}

#[no_mangle]
pub extern "C" fn retro_set_audio_sample(cb: Option<retro_audio_sample_t>) {
    core().callbacks.audio_sample = cb;
}

#[no_mangle]
pub extern "C" fn retro_set_audio_sample_batch(cb: Option<retro_audio_sample_batch_t>) {
    core().callbacks.audio_sample_batch = cb;
}

#[no_mangle]
pub extern "C" fn retro_set_input_poll(cb: Option<retro_input_poll_t>) {
    core().callbacks.input_poll = cb;
}

#[no_mangle]
pub extern "C" fn retro_set_input_state(cb: Option<retro_input_state_t>) {
    core().callbacks.input_state = cb;
}

#[no_mangle]
pub extern "C" fn retro_init() {
    core().adapter.initialize();
}

#[no_mangle]
pub extern "C" fn retro_deinit() {
    core().adapter.deinitialize();
}

#[no_mangle]
pub extern "C" fn retro_set_controller_port_device(port: c_uint, device: c_uint) {
    core().adapter.set_controller_port_device(port, device);
}

#[no_mangle]
pub extern "C" fn retro_reset() {
    core().adapter.reset_session();
}

#[no_mangle]
pub extern "C" fn retro_run() {
    let mut core = core();
    let Core { adapter, callbacks } = &mut *core;
    adapter.tick(&mut LibretroHost::new(callbacks));
}

/// Content is ignored; the core runs without a game.
#[no_mangle]
pub extern "C" fn retro_load_game(_info: *const retro_game_info) -> bool {
    let mut core = core();
    let Core { adapter, callbacks } = &mut *core;
    match adapter.load_session(&mut LibretroHost::new(callbacks)) {
        Ok(()) => true,
        Err(e) => {
            log(LogCategory::Lifecycle, LogLevel::Error, || {
                format!("Load failed: {}", e)
            });
            false
        }
    }
}

#[no_mangle]
pub extern "C" fn retro_load_game_special(
    _game_type: c_uint,
    info: *const retro_game_info,
    _num_info: usize,
) -> bool {
    retro_load_game(info)
}

#[no_mangle]
pub extern "C" fn retro_unload_game() {
    core().adapter.unload_session();
}

#[no_mangle]
pub extern "C" fn retro_get_region() -> c_uint {
    core().adapter.region() as c_uint
}

#[no_mangle]
pub extern "C" fn retro_serialize_size() -> usize {
    core().adapter.serialize_size()
}

#[no_mangle]
pub extern "C" fn retro_serialize(_data: *mut c_void, _size: usize) -> bool {
    core().adapter.serialize(&mut [])
}

/// # Safety
/// `data` must be null or valid for reads of `size` bytes.
#[no_mangle]
pub unsafe extern "C" fn retro_unserialize(data: *const c_void, size: usize) -> bool {
    let state = if data.is_null() {
        &[][..]
    } else {
        std::slice::from_raw_parts(data.cast::<u8>(), size)
    };
    core().adapter.deserialize(state)
}

#[no_mangle]
pub extern "C" fn retro_get_memory_data(id: c_uint) -> *mut c_void {
    core()
        .adapter
        .memory_region(id)
        .map_or(ptr::null_mut(), |region| region.as_mut_ptr().cast())
}

#[no_mangle]
pub extern "C" fn retro_get_memory_size(id: c_uint) -> usize {
    core().adapter.memory_size(id)
}

#[no_mangle]
pub extern "C" fn retro_cheat_reset() {
    core().adapter.cheat_reset();
}

/// # Safety
/// `code` must be null or a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn retro_cheat_set(index: c_uint, enabled: bool, code: *const c_char) {
    let code = if code.is_null() {
        String::new()
    } else {
        CStr::from_ptr(code).to_string_lossy().into_owned()
    };
    core().adapter.apply_cheat(index, enabled, &code);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pump_core::graphics::ColorOps;
    use pump_core::scene::BACKGROUND;
    use pump_core::PixelFormat;
    use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering::SeqCst};

    #[test]
    fn option_table_is_null_terminated() {
        let table = OptionTable::build();
        assert_eq!(table.variables.len(), CORE_OPTIONS.len() + 1);

        let last = table.variables.last().expect("terminator");
        assert!(last.key.is_null() && last.value.is_null());

        let first = &table.variables[0];
        let key = unsafe { CStr::from_ptr(first.key) };
        let value = unsafe { CStr::from_ptr(first.value) };
        assert_eq!(key.to_str(), Ok("pixelpump_pixel_format"));
        assert_eq!(value.to_str(), Ok("Pixel format (restart); RGB565|XRGB8888"));
    }

    #[test]
    fn system_info_strings() {
        let mut info = retro_system_info {
            library_name: ptr::null(),
            library_version: ptr::null(),
            valid_extensions: ptr::null(),
            need_fullpath: true,
            block_extract: false,
        };
        unsafe { retro_get_system_info(&mut info) };
        let name = unsafe { CStr::from_ptr(info.library_name) };
        assert_eq!(name.to_str(), Ok("pixelpump"));
        assert!(info.valid_extensions.is_null());
        assert!(!info.need_fullpath);
        assert!(info.block_extract);
    }

    #[test]
    fn fixed_entry_points() {
        assert_eq!(retro_api_version(), RETRO_API_VERSION);
        assert_eq!(retro_get_region(), 0);
        assert_eq!(retro_serialize_size(), 0);
        assert!(unsafe { retro_unserialize(ptr::null(), 0) });
        assert!(retro_get_memory_data(0).is_null());
        assert_eq!(retro_get_memory_size(0), 0);
    }

    /// Frontend side of the round trip, recorded in statics since the
    /// callbacks are plain C functions
    mod frontend {
        use super::*;

        pub static FORMAT: AtomicU32 = AtomicU32::new(0);
        pub static CURSOR_HIDDEN: AtomicBool = AtomicBool::new(false);
        pub static UPDATED: AtomicBool = AtomicBool::new(false);
        pub static SHUTDOWNS: AtomicUsize = AtomicUsize::new(0);
        pub static EXIT_HELD: AtomicBool = AtomicBool::new(false);
        pub static POLLS: AtomicUsize = AtomicUsize::new(0);
        pub static SAMPLES: AtomicUsize = AtomicUsize::new(0);
        pub static FRAMES: AtomicUsize = AtomicUsize::new(0);
        pub static WIDTH: AtomicU32 = AtomicU32::new(0);
        pub static HEIGHT: AtomicU32 = AtomicU32::new(0);
        pub static PITCH: AtomicUsize = AtomicUsize::new(0);
        pub static LAST_PIXEL: AtomicU32 = AtomicU32::new(0);

        pub unsafe extern "C" fn environment(cmd: c_uint, data: *mut c_void) -> bool {
            match cmd {
                RETRO_ENVIRONMENT_SET_PIXEL_FORMAT => {
                    FORMAT.store(*data.cast::<c_uint>(), SeqCst);
                    true
                }
                RETRO_ENVIRONMENT_GET_VARIABLE => {
                    let var = &mut *data.cast::<retro_variable>();
                    var.value = match CStr::from_ptr(var.key).to_bytes() {
                        b"pixelpump_pixel_format" => c"XRGB8888".as_ptr(),
                        b"pixelpump_show_cursor" if CURSOR_HIDDEN.load(SeqCst) => {
                            c"disabled".as_ptr()
                        }
                        _ => return false,
                    };
                    true
                }
                RETRO_ENVIRONMENT_GET_VARIABLE_UPDATE => {
                    *data.cast::<bool>() = UPDATED.swap(false, SeqCst);
                    true
                }
                RETRO_ENVIRONMENT_SHUTDOWN => {
                    SHUTDOWNS.fetch_add(1, SeqCst);
                    true
                }
                RETRO_ENVIRONMENT_SET_SUPPORT_NO_GAME
                | RETRO_ENVIRONMENT_SET_VARIABLES
                | RETRO_ENVIRONMENT_SET_FRAME_TIME_CALLBACK => true,
                _ => false,
            }
        }

        pub unsafe extern "C" fn video_refresh(
            data: *const c_void,
            width: c_uint,
            height: c_uint,
            pitch: usize,
        ) {
            FRAMES.fetch_add(1, SeqCst);
            WIDTH.store(width, SeqCst);
            HEIGHT.store(height, SeqCst);
            PITCH.store(pitch, SeqCst);
            // Last pixel of the last row, so the whole pitch * height span is read
            let last = pitch * height as usize - 4;
            let bytes = std::slice::from_raw_parts(data.cast::<u8>().add(last), 4);
            LAST_PIXEL.store(
                u32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
                SeqCst,
            );
        }

        pub unsafe extern "C" fn audio_sample(left: i16, right: i16) {
            assert_eq!((left, right), (0, 0));
            SAMPLES.fetch_add(1, SeqCst);
        }

        pub unsafe extern "C" fn input_poll() {
            POLLS.fetch_add(1, SeqCst);
        }

        pub unsafe extern "C" fn input_state(
            port: c_uint,
            device: c_uint,
            _index: c_uint,
            id: c_uint,
        ) -> i16 {
            let exit_button =
                port == 0 && device == RETRO_DEVICE_MOUSE && id == RETRO_DEVICE_ID_MOUSE_LEFT;
            (exit_button && EXIT_HELD.load(SeqCst)) as i16
        }
    }

    #[test]
    fn frontend_round_trip() {
        retro_set_environment(Some(frontend::environment));
        retro_set_video_refresh(Some(frontend::video_refresh));
        retro_set_audio_sample(Some(frontend::audio_sample));
        retro_set_input_poll(Some(frontend::input_poll));
        retro_set_input_state(Some(frontend::input_state));
        retro_init();

        assert!(retro_load_game(ptr::null()));
        assert_eq!(
            frontend::FORMAT.load(SeqCst),
            PixelFormat::Xrgb8888.retro_id()
        );

        let mut av = retro_system_av_info {
            geometry: retro_game_geometry {
                base_width: 0,
                base_height: 0,
                max_width: 0,
                max_height: 0,
                aspect_ratio: 0.0,
            },
            timing: retro_system_timing {
                fps: 0.0,
                sample_rate: 0.0,
            },
        };
        unsafe { retro_get_system_av_info(&mut av) };
        assert_eq!(av.geometry.base_width, 400);
        assert_eq!(av.geometry.base_height, 225);
        assert_eq!(av.timing.fps, 60.0);

        retro_run();
        assert_eq!(frontend::POLLS.load(SeqCst), 1);
        assert_eq!(frontend::FRAMES.load(SeqCst), 1);
        assert_eq!(frontend::SAMPLES.load(SeqCst), 1);
        assert_eq!(frontend::WIDTH.load(SeqCst), 400);
        assert_eq!(frontend::HEIGHT.load(SeqCst), 225);
        assert_eq!(frontend::PITCH.load(SeqCst), 1600);
        assert_eq!(
            frontend::LAST_PIXEL.load(SeqCst),
            ColorOps::pack(BACKGROUND, PixelFormat::Xrgb8888)
        );

        frontend::CURSOR_HIDDEN.store(true, SeqCst);
        frontend::UPDATED.store(true, SeqCst);
        retro_run();
        assert!(!core().adapter.settings().show_cursor);
        assert_eq!(
            core().adapter.settings().pixel_format,
            PixelFormat::Xrgb8888
        );

        frontend::EXIT_HELD.store(true, SeqCst);
        retro_run();
        retro_run();
        assert_eq!(frontend::SHUTDOWNS.load(SeqCst), 1);
        assert_eq!(frontend::FRAMES.load(SeqCst), 4);

        retro_unload_game();
        retro_deinit();
        retro_run();
        assert_eq!(frontend::FRAMES.load(SeqCst), 4);
    }
}
