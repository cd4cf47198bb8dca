//! TOTP (RFC 6238) and the time-window helpers built on it.

use crate::otp::hotp;
use crate::otp::types::{Algorithm, OtpError, OtpErrorKind};

/// TOTP code at `unix_time`: HOTP over the number of whole `time_step`
/// windows since `initial_counter` (the start time, usually 0).
pub fn calculate(
    key: &[u8],
    unix_time: u64,
    time_step: u32,
    digits: u8,
    algorithm: Algorithm,
    initial_counter: u64,
) -> Result<String, OtpError> {
    let counter = counter_at(unix_time, time_step, initial_counter)?;
    hotp::calculate(key, counter, digits, algorithm)
}

/// Moving factor for `unix_time`. Fails for a zero time step or a time
/// before the start time.
pub fn counter_at(unix_time: u64, time_step: u32, initial_counter: u64) -> Result<u64, OtpError> {
    if time_step == 0 {
        return Err(OtpError::new(
            OtpErrorKind::InvalidParameters,
            "Time step must be greater than zero",
        ));
    }
    let since_start = unix_time.checked_sub(initial_counter).ok_or_else(|| {
        OtpError::new(
            OtpErrorKind::InvalidParameters,
            "Current time is before the TOTP start time",
        )
        .with_detail(format!("time {} < start {}", unix_time, initial_counter))
    })?;
    Ok(since_start / u64::from(time_step))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Window helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Compute the time-step counter for a given unix timestamp.
pub fn time_step_at(unix_seconds: u64, period: u32) -> u64 {
    if period == 0 {
        return 0;
    }
    unix_seconds / u64::from(period)
}

/// Seconds already spent in the current window.
pub fn seconds_elapsed_at(unix_seconds: u64, period: u32) -> u32 {
    if period == 0 {
        return 0;
    }
    (unix_seconds % u64::from(period)) as u32
}

/// Seconds remaining until the current window expires (1 through `period`).
pub fn seconds_remaining_at(unix_seconds: u64, period: u32) -> u32 {
    period - seconds_elapsed_at(unix_seconds, period)
}

/// Seconds until the moving factor for windows starting at `initial_counter`
/// next changes. Before the start time this is the wait for the first window.
pub fn seconds_until_rollover(unix_seconds: u64, period: u32, initial_counter: u64) -> u64 {
    if period == 0 {
        return 0;
    }
    match unix_seconds.checked_sub(initial_counter) {
        Some(since_start) => u64::from(seconds_remaining_at(since_start, period)),
        None => initial_counter - unix_seconds,
    }
}

/// Progress fraction (0.0 = fresh code, 1.0 = about to expire).
pub fn progress_fraction_at(unix_seconds: u64, period: u32) -> f64 {
    if period == 0 {
        return 0.0;
    }
    f64::from(seconds_elapsed_at(unix_seconds, period)) / f64::from(period)
}

/// Current unix timestamp in seconds.
pub fn current_unix_time() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
