use crate::config::TOAST_DISMISS_MS;
use crate::reminder::Reminder;

/// Single-occupancy register for the blocking fullscreen alert.
///
/// Offers are accepted only while the slot is empty, so when several
/// reminders fire in the same pass the first one wins and the rest are never
/// shown fullscreen. Displaced reminders are not re-offered when the slot
/// empties.
#[derive(Debug, Default)]
pub struct AlertSlot {
    current: Option<Reminder>,
}

impl AlertSlot {
    /// Set-if-absent. Returns whether the offer was accepted.
    pub fn offer_if_empty(&mut self, reminder: &Reminder) -> bool {
        if self.current.is_some() {
            return false;
        }
        self.current = Some(reminder.clone());
        true
    }

    pub fn occupant(&self) -> Option<&Reminder> {
        self.current.as_ref()
    }

    pub fn is_occupied(&self) -> bool {
        self.current.is_some()
    }

    /// Clears the slot when the displayed reminder matches `id`, covering
    /// both explicit dismissal and external mutations (e.g. deleted while
    /// displayed). Returns whether anything was cleared.
    pub fn clear_if(&mut self, id: i64) -> bool {
        if self.current.as_ref().is_some_and(|r| r.id == id) {
            self.current = None;
            return true;
        }
        false
    }
}

/// Transient toast slot: last-one-wins, with a fresh auto-dismiss deadline
/// each time a reminder is shown (replacement restarts the countdown).
#[derive(Debug, Default)]
pub struct ToastSlot {
    current: Option<Toast>,
}

#[derive(Debug)]
struct Toast {
    reminder: Reminder,
    deadline_ms: i64,
}

impl ToastSlot {
    pub fn show(&mut self, reminder: &Reminder, now_ms: i64) {
        self.current = Some(Toast {
            reminder: reminder.clone(),
            deadline_ms: now_ms + TOAST_DISMISS_MS,
        });
    }

    pub fn occupant(&self) -> Option<&Reminder> {
        self.current.as_ref().map(|t| &t.reminder)
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }

    /// Auto-dismiss once the deadline passes. Returns whether a toast was
    /// dropped.
    pub fn expire(&mut self, now_ms: i64) -> bool {
        if self.current.as_ref().is_some_and(|t| t.deadline_ms <= now_ms) {
            self.current = None;
            return true;
        }
        false
    }
}
