use std::fs;
use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::reminder::{NewReminder, Reminder, ReminderStatus};

const REMINDERS_FILE: &str = "reminders.json";

/// On-disk shape of the reminder collection. `last_id` is a persisted
/// counter so deleting the newest reminder never recycles its id into the
/// session triggered-set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ReminderData {
    reminders: Vec<Reminder>,
    #[serde(default)]
    last_id: i64,
}

/// The authoritative reminder collection, saved to a local JSON file after
/// every mutation. Mutations on a missing id are silent no-ops; validation
/// happens before the store is touched.
pub struct ReminderStore {
    data: ReminderData,
    path: PathBuf,
}

impl ReminderStore {
    pub fn load(dir: &Path) -> Self {
        let path = dir.join(REMINDERS_FILE);
        let mut data = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<ReminderData>(&content) {
                Ok(data) => data,
                Err(e) => {
                    warn!("{} is unreadable ({}), starting empty", REMINDERS_FILE, e);
                    ReminderData::default()
                }
            },
            Err(_) => ReminderData::default(),
        };
        // files written before the counter existed reseed it from the data
        let max_id = data.reminders.iter().map(|r| r.id).max().unwrap_or(0);
        data.last_id = data.last_id.max(max_id);
        Self { data, path }
    }

    pub fn reminders(&self) -> &[Reminder] {
        &self.data.reminders
    }

    pub fn get(&self, id: i64) -> Option<&Reminder> {
        self.data.reminders.iter().find(|r| r.id == id)
    }

    /// Assigns a fresh id and prepends: newly added reminders sort first by
    /// insertion until the view re-sorts them.
    pub fn add(&mut self, new: NewReminder) -> AppResult<i64> {
        self.data.last_id += 1;
        let id = self.data.last_id;
        self.data.reminders.insert(0, new.into_reminder(id));
        self.save()?;
        Ok(id)
    }

    pub fn update_status(&mut self, id: i64, status: ReminderStatus) -> AppResult<()> {
        if let Some(reminder) = self.data.reminders.iter_mut().find(|r| r.id == id) {
            reminder.status = status;
            self.save()?;
        }
        Ok(())
    }

    pub fn delete(&mut self, id: i64) -> AppResult<()> {
        let before = self.data.reminders.len();
        self.data.reminders.retain(|r| r.id != id);
        if self.data.reminders.len() != before {
            self.save()?;
        }
        Ok(())
    }

    /// Pushes the due time forward to `now + minutes`; status is untouched.
    pub fn snooze(&mut self, id: i64, minutes: u32, now_ms: i64) -> AppResult<()> {
        if let Some(reminder) = self.data.reminders.iter_mut().find(|r| r.id == id) {
            reminder.due_timestamp = now_ms + i64::from(minutes) * 60_000;
            self.save()?;
        }
        Ok(())
    }

    fn save(&self) -> AppResult<()> {
        let content = serde_json::to_string_pretty(&self.data)
            .map_err(|e| AppError::storage(e.to_string()))?;
        fs::write(&self.path, content).map_err(|e| AppError::storage(e.to_string()))
    }
}
