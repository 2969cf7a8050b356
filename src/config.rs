/// Application configuration constants
///
/// Centralized configuration for the reminder manager.

/// Interval between due-reminder scans, in milliseconds
pub const SCAN_INTERVAL_MS: u64 = 5_000;

/// Toast lifetime before it auto-dismisses, in milliseconds
pub const TOAST_DISMISS_MS: i64 = 10_000;

/// Sentinel ringtone URL meaning "no sound"
pub const RINGTONE_NONE: &str = "NONE";

/// Ringtone selected when the active custom ringtone is removed
pub const DEFAULT_RINGTONE_URL: &str =
    "https://cdn.jsdelivr.net/gh/k-f-group/remind-me-app-sounds/sounds/beep.mp3";

/// Default snooze duration in minutes
pub const DEFAULT_SNOOZE_MINUTES: u32 = 5;

/// Largest accepted custom ringtone upload, in bytes (pre-encoding)
pub const MAX_RINGTONE_BYTES: usize = 1024 * 1024;

/// Directory name under the platform-local app data dir
pub const APP_DATA_DIR: &str = "RemindMe";
