use serde::Serialize;

use crate::reminder::{Reminder, ReminderType};

/// One fired event, denormalized for the bell/panel UI. Created exactly once
/// per firing; only `read` ever changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub id: i64,
    #[serde(rename = "reminderId")]
    pub reminder_id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ReminderType,
    pub timestamp: i64,
    pub read: bool,
}

/// Session-scoped history of fired reminders, newest first. Independent of
/// alert delivery and never persisted.
#[derive(Debug, Default)]
pub struct NotificationLog {
    entries: Vec<Notification>,
    next_id: i64,
}

impl NotificationLog {
    pub fn record(&mut self, reminder: &Reminder, now_ms: i64) {
        self.next_id += 1;
        let notification = Notification {
            id: self.next_id,
            reminder_id: reminder.id,
            title: reminder.title.clone(),
            kind: reminder.kind.reminder_type(),
            timestamp: now_ms,
            read: false,
        };
        self.entries.insert(0, notification);
    }

    pub fn entries(&self) -> &[Notification] {
        &self.entries
    }

    pub fn unread_count(&self) -> usize {
        self.entries.iter().filter(|n| !n.read).count()
    }

    pub fn mark_all_read(&mut self) {
        for n in self.entries.iter_mut() {
            n.read = true;
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
