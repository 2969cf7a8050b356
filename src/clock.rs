use chrono::Utc;

/// Time source for the due-scan loop and snooze arithmetic. The scan loop
/// queries it once per tick; injecting it keeps firing deterministic in tests.
pub trait Clock: Send {
    /// Current wall-clock time in epoch milliseconds.
    fn now_ms(&self) -> i64;
}

/// System wall clock.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}
