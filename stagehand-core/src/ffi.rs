//! C FFI layer for engine hosts.
//!
//! This module exposes the countdown timer through a C-compatible API.
//! All functions are `extern "C"` and use raw pointers for interop. The host
//! calls `stagehand_timer_tick` once per frame from the thread that owns the timer.

use std::ffi::{c_void, CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::config::{ConfigLoader, TimerConfig};
use crate::timer::{CountdownTimer, ListenerId, TimerState};

/// Called with the milestone value and the registered `user_data`.
pub type MilestoneCallback = extern "C" fn(milestone: u32, user_data: *mut c_void);

/// Called on completion with the registered `user_data`.
pub type CompletionCallback = extern "C" fn(user_data: *mut c_void);

/// Opaque handle for CountdownTimer.
pub struct FfiCountdownTimer {
    timer: CountdownTimer,
    milestone_listener: Option<ListenerId>,
    completion_listener: Option<ListenerId>,
}

impl FfiCountdownTimer {
    fn new(timer: CountdownTimer) -> *mut Self {
        Box::into_raw(Box::new(Self {
            timer,
            milestone_listener: None,
            completion_listener: None,
        }))
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

/// Creates an idle countdown timer.
///
/// Returns null if `duration` is negative or not finite.
///
/// # Safety
/// - The returned pointer must be freed with `stagehand_timer_free`
#[no_mangle]
pub extern "C" fn stagehand_timer_new(duration: f64, top_milestone: u32) -> *mut FfiCountdownTimer {
    let config = TimerConfig {
        top_milestone,
        ..TimerConfig::default()
    };
    match CountdownTimer::from_config(duration, &config) {
        Ok(timer) => FfiCountdownTimer::new(timer),
        Err(e) => {
            tracing::warn!("stagehand_timer_new failed: {}", e);
            ptr::null_mut()
        }
    }
}

/// Creates an idle countdown timer using the `timer` section of a YAML config file.
///
/// # Safety
/// - `config_path` must be a valid null-terminated UTF-8 string
/// - The returned pointer must be freed with `stagehand_timer_free`
#[no_mangle]
pub unsafe extern "C" fn stagehand_timer_new_from_config(
    config_path: *const c_char,
    duration: f64,
) -> *mut FfiCountdownTimer {
    if config_path.is_null() {
        return ptr::null_mut();
    }

    let config_path = match CStr::from_ptr(config_path).to_str() {
        Ok(s) => s,
        Err(_) => return ptr::null_mut(),
    };

    let config = match ConfigLoader::new().load(config_path) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("stagehand_timer_new_from_config failed: {}", e);
            return ptr::null_mut();
        }
    };

    match CountdownTimer::from_config(duration, &config.timer) {
        Ok(timer) => FfiCountdownTimer::new(timer),
        Err(_) => ptr::null_mut(),
    }
}

/// Frees a countdown timer.
///
/// # Safety
/// - `timer` must be a valid pointer returned by `stagehand_timer_new*`, or null
/// - `timer` must not be used after this call
#[no_mangle]
pub unsafe extern "C" fn stagehand_timer_free(timer: *mut FfiCountdownTimer) {
    if !timer.is_null() {
        drop(Box::from_raw(timer));
    }
}

// ============================================================================
// Control
// ============================================================================

/// Sets the duration for the next restart. Returns false if `duration` is invalid.
///
/// # Safety
/// - `timer` must be a valid pointer or null
#[no_mangle]
pub unsafe extern "C" fn stagehand_timer_set_duration(
    timer: *mut FfiCountdownTimer,
    duration: f64,
) -> bool {
    match timer.as_mut() {
        Some(t) => t.timer.set_duration(duration).is_ok(),
        None => false,
    }
}

/// Restarts the countdown from the full duration.
///
/// # Safety
/// - `timer` must be a valid pointer or null
#[no_mangle]
pub unsafe extern "C" fn stagehand_timer_restart(timer: *mut FfiCountdownTimer) {
    if let Some(t) = timer.as_mut() {
        t.timer.restart();
    }
}

/// Resumes counting without resetting.
///
/// # Safety
/// - `timer` must be a valid pointer or null
#[no_mangle]
pub unsafe extern "C" fn stagehand_timer_resume(timer: *mut FfiCountdownTimer) {
    if let Some(t) = timer.as_mut() {
        t.timer.resume();
    }
}

/// Pauses counting.
///
/// # Safety
/// - `timer` must be a valid pointer or null
#[no_mangle]
pub unsafe extern "C" fn stagehand_timer_pause(timer: *mut FfiCountdownTimer) {
    if let Some(t) = timer.as_mut() {
        t.timer.pause();
    }
}

/// Stops the countdown, optionally firing the completion callback.
///
/// # Safety
/// - `timer` must be a valid pointer or null
#[no_mangle]
pub unsafe extern "C" fn stagehand_timer_stop(timer: *mut FfiCountdownTimer, invoke_completion: bool) {
    if let Some(t) = timer.as_mut() {
        t.timer.stop(invoke_completion);
    }
}

/// Advances the countdown by `dt` seconds. Callbacks fire synchronously.
///
/// # Safety
/// - `timer` must be a valid pointer or null
#[no_mangle]
pub unsafe extern "C" fn stagehand_timer_tick(timer: *mut FfiCountdownTimer, dt: f64) {
    if let Some(t) = timer.as_mut() {
        t.timer.tick(dt);
    }
}

// ============================================================================
// Queries
// ============================================================================

/// Returns the time left, or the time left at the last stop.
///
/// # Safety
/// - `timer` must be a valid pointer or null
#[no_mangle]
pub unsafe extern "C" fn stagehand_timer_time_left(timer: *const FfiCountdownTimer) -> f64 {
    match timer.as_ref() {
        Some(t) => t.timer.time_left(),
        None => 0.0,
    }
}

/// Returns the timer state: 0 idle, 1 running, 2 paused, 3 stopped.
///
/// # Safety
/// - `timer` must be a valid pointer or null
#[no_mangle]
pub unsafe extern "C" fn stagehand_timer_state(timer: *const FfiCountdownTimer) -> u32 {
    match timer.as_ref().map(|t| t.timer.state()) {
        Some(TimerState::Running) => 1,
        Some(TimerState::Paused) => 2,
        Some(TimerState::Stopped) => 3,
        Some(TimerState::Idle) | None => 0,
    }
}

/// Returns the remaining time formatted for display.
///
/// # Safety
/// - `timer` must be a valid pointer or null
/// - The returned string must be freed with `stagehand_free_string`
#[no_mangle]
pub unsafe extern "C" fn stagehand_timer_formatted(timer: *const FfiCountdownTimer) -> *mut c_char {
    let Some(t) = timer.as_ref() else {
        return ptr::null_mut();
    };
    match CString::new(t.timer.formatted()) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

// ============================================================================
// Callbacks
// ============================================================================

/// Sets (or with a null callback, clears) the milestone callback.
///
/// # Safety
/// - `timer` must be a valid pointer or null
/// - `user_data` must stay valid for as long as the callback is registered
#[no_mangle]
pub unsafe extern "C" fn stagehand_timer_set_milestone_callback(
    timer: *mut FfiCountdownTimer,
    callback: Option<MilestoneCallback>,
    user_data: *mut c_void,
) {
    let Some(t) = timer.as_mut() else {
        return;
    };
    if let Some(previous) = t.milestone_listener.take() {
        t.timer.remove_listener(previous);
    }
    if let Some(callback) = callback {
        let id = t.timer.on_milestone(move |milestone| callback(milestone, user_data));
        t.milestone_listener = Some(id);
    }
}

/// Sets (or with a null callback, clears) the completion callback.
///
/// # Safety
/// - `timer` must be a valid pointer or null
/// - `user_data` must stay valid for as long as the callback is registered
#[no_mangle]
pub unsafe extern "C" fn stagehand_timer_set_completion_callback(
    timer: *mut FfiCountdownTimer,
    callback: Option<CompletionCallback>,
    user_data: *mut c_void,
) {
    let Some(t) = timer.as_mut() else {
        return;
    };
    if let Some(previous) = t.completion_listener.take() {
        t.timer.remove_listener(previous);
    }
    if let Some(callback) = callback {
        let id = t.timer.on_complete(move || callback(user_data));
        t.completion_listener = Some(id);
    }
}

// ============================================================================
// Utilities
// ============================================================================

/// Frees a string returned by an FFI function.
///
/// # Safety
/// - `s` must be a valid pointer returned by a stagehand FFI function, or null
#[no_mangle]
pub unsafe extern "C" fn stagehand_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

/// Returns the library version as a string.
///
/// # Safety
/// - The returned string must be freed with `stagehand_free_string`
#[no_mangle]
pub extern "C" fn stagehand_version() -> *mut c_char {
    let version = env!("CARGO_PKG_VERSION");
    match CString::new(version) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

// ============================================================================
// Tests
// ============================================================================
