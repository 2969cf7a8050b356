use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::config::SCAN_INTERVAL_MS;
use crate::reminder::Reminder;

/// Due detection with session-scoped de-duplication.
///
/// The triggered-set is the sole mechanism preventing duplicate alerts: a
/// reminder fires when it is ACTIVE, its due time has passed, and its id is
/// not in the set. Ids leave the set only through `rearm` (snooze), which
/// makes the reminder eligible again once its new due time passes. The set
/// is never persisted.
#[derive(Debug, Default)]
pub struct DueScanner {
    triggered: HashSet<i64>,
}

impl DueScanner {
    /// One pass over the whole collection. Returns the reminders that newly
    /// fired this tick, in collection order, and marks them triggered.
    pub fn scan(&mut self, reminders: &[Reminder], now_ms: i64) -> Vec<Reminder> {
        let mut fired = Vec::new();
        for reminder in reminders {
            if reminder.is_due(now_ms) && !self.triggered.contains(&reminder.id) {
                self.triggered.insert(reminder.id);
                fired.push(reminder.clone());
            }
        }
        fired
    }

    /// Snoozing removes the id so the reminder can fire again later.
    pub fn rearm(&mut self, id: i64) {
        self.triggered.remove(&id);
    }
}

/// Owns the background scan thread. Dropping the handle stops the loop; the
/// thread notices within one interval and exits without finishing a partial
/// tick.
pub struct ScanLoop {
    stop: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<()>>,
}

impl ScanLoop {
    /// Spawns a thread invoking `tick` every `SCAN_INTERVAL_MS` until the
    /// handle is dropped.
    pub fn spawn<F>(mut tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = stop.clone();
        let thread = thread::spawn(move || {
            while !stop_flag.load(Ordering::SeqCst) {
                thread::sleep(Duration::from_millis(SCAN_INTERVAL_MS));
                if stop_flag.load(Ordering::SeqCst) {
                    break;
                }
                tick();
            }
        });
        Self {
            stop,
            thread: Some(thread),
        }
    }
}

impl Drop for ScanLoop {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        // detach rather than join: the thread may be mid-sleep and teardown
        // must not block the UI thread
        let _ = self.thread.take();
    }
}
