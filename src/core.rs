use std::path::Path;

use crate::alert::{AlertSlot, ToastSlot};
use crate::audio::{self, AudioDevice, AudioPlayer};
use crate::clock::Clock;
use crate::error::AppResult;
use crate::notification::{Notification, NotificationLog};
use crate::reminder::{NewReminder, Reminder, ReminderStatus};
use crate::scan::DueScanner;
use crate::settings::{Ringtone, Settings, SettingsStore};
use crate::store::ReminderStore;

/// What one scan pass produced, for the shell to forward to the UI.
#[derive(Debug, Default)]
pub struct TickOutcome {
    /// Reminders that transitioned to fired in this pass.
    pub fired: Vec<Reminder>,
    /// Set when this pass placed a reminder into the fullscreen slot.
    pub fullscreen: Option<Reminder>,
    /// Set when this pass replaced the toast slot.
    pub toast: Option<Reminder>,
    /// True when a stale toast auto-dismissed in this pass.
    pub toast_dismissed: bool,
}

/// The application core: reminder collection, notification log, settings,
/// due detection, alert slots and the audio channel, coordinated behind one
/// lock. The clock and audio device are injected so every transition is
/// deterministic under test.
pub struct ReminderCore {
    store: ReminderStore,
    notifications: NotificationLog,
    settings: SettingsStore,
    scanner: DueScanner,
    fullscreen: AlertSlot,
    toast: ToastSlot,
    audio: AudioPlayer,
    clock: Box<dyn Clock>,
    has_interacted: bool,
}

impl ReminderCore {
    pub fn new(data_dir: &Path, device: Box<dyn AudioDevice>, clock: Box<dyn Clock>) -> Self {
        Self {
            store: ReminderStore::load(data_dir),
            notifications: NotificationLog::default(),
            settings: SettingsStore::load(data_dir),
            scanner: DueScanner::default(),
            fullscreen: AlertSlot::default(),
            toast: ToastSlot::default(),
            audio: AudioPlayer::new(device),
            has_interacted: false,
            clock,
        }
    }

    /// One due-scan pass: expire a stale toast, fire newly-due reminders,
    /// fan each out to the log and exactly one alert channel, then settle
    /// the ringtone.
    pub fn tick(&mut self) -> TickOutcome {
        let now = self.clock.now_ms();
        let mut outcome = TickOutcome {
            toast_dismissed: self.toast.expire(now),
            ..TickOutcome::default()
        };

        let fired = self.scanner.scan(self.store.reminders(), now);
        let high_alert = self.settings.get().notifications.high_alert;
        for reminder in &fired {
            self.notifications.record(reminder, now);
            if high_alert {
                if self.fullscreen.offer_if_empty(reminder) {
                    outcome.fullscreen = Some(reminder.clone());
                }
                // a reminder that lost the slot race stays fired with no
                // visual alert and is not re-offered when the slot empties
            } else {
                self.toast.show(reminder, now);
                outcome.toast = Some(reminder.clone());
            }
        }
        outcome.fired = fired;

        self.sync_alert_sound();
        outcome
    }

    // ============ Reminder mutations ============

    pub fn add_reminder(&mut self, new: NewReminder) -> AppResult<i64> {
        // rejected before the store is touched
        new.validate()?;
        self.store.add(new)
    }

    pub fn update_status(&mut self, id: i64, status: ReminderStatus) -> AppResult<()> {
        self.store.update_status(id, status)?;
        if self.fullscreen.clear_if(id) {
            self.sync_alert_sound();
        }
        Ok(())
    }

    pub fn delete_reminder(&mut self, id: i64) -> AppResult<()> {
        self.store.delete(id)?;
        if self.fullscreen.clear_if(id) {
            self.sync_alert_sound();
        }
        Ok(())
    }

    /// Snooze by the configured duration. Re-arms the reminder for a future
    /// firing and clears a matching fullscreen alert. Returns the minutes
    /// applied, for the confirmation toast.
    pub fn snooze_reminder(&mut self, id: i64) -> AppResult<u32> {
        let minutes = self.settings.get().snooze_duration;
        let now = self.clock.now_ms();
        self.store.snooze(id, minutes, now)?;
        self.scanner.rearm(id);
        if self.fullscreen.clear_if(id) {
            self.sync_alert_sound();
        }
        Ok(minutes)
    }

    /// DEBIT shortcut: completing and launching are one action. Returns the
    /// payment URL to open, or None when the reminder has no payment target.
    pub fn payment_action(&mut self, id: i64) -> AppResult<Option<String>> {
        let Some(url) = self.store.get(id).and_then(|r| r.payment_url()) else {
            return Ok(None);
        };
        self.update_status(id, ReminderStatus::Completed)?;
        Ok(Some(url))
    }

    /// WHATSAPP shortcut, same shape as `payment_action`.
    pub fn whatsapp_action(&mut self, id: i64) -> AppResult<Option<String>> {
        let Some(url) = self.store.get(id).and_then(|r| r.whatsapp_url()) else {
            return Ok(None);
        };
        self.update_status(id, ReminderStatus::Completed)?;
        Ok(Some(url))
    }

    pub fn reminders(&self) -> &[Reminder] {
        self.store.reminders()
    }

    // ============ Alerts ============

    pub fn current_fullscreen(&self) -> Option<&Reminder> {
        self.fullscreen.occupant()
    }

    pub fn current_toast(&self) -> Option<&Reminder> {
        self.toast.occupant()
    }

    pub fn dismiss_toast(&mut self) {
        self.toast.dismiss();
    }

    /// One-shot: the first click or key press after load unlocks audio.
    pub fn mark_interacted(&mut self) {
        if !self.has_interacted {
            self.has_interacted = true;
            // an alert may already be on screen waiting for the gate
            self.sync_alert_sound();
        }
    }

    // ============ Notification log ============

    pub fn notifications(&self) -> &[Notification] {
        self.notifications.entries()
    }

    pub fn unread_count(&self) -> usize {
        self.notifications.unread_count()
    }

    pub fn mark_notifications_read(&mut self) {
        self.notifications.mark_all_read();
    }

    pub fn clear_notifications(&mut self) {
        self.notifications.clear();
    }

    // ============ Settings & audio ============

    pub fn settings(&self) -> &Settings {
        self.settings.get()
    }

    pub fn update_settings(&mut self, settings: Settings) -> AppResult<()> {
        self.settings.replace(settings)?;
        // the ringtone, sound toggle or alert mode may have changed
        self.sync_alert_sound();
        Ok(())
    }

    pub fn all_ringtones(&self) -> Vec<Ringtone> {
        self.settings.all_ringtones()
    }

    pub fn add_custom_ringtone(&mut self, ringtone: Ringtone) -> AppResult<()> {
        self.settings.add_custom_ringtone(ringtone)?;
        self.sync_alert_sound();
        Ok(())
    }

    pub fn remove_custom_ringtone(&mut self, url: &str) -> AppResult<()> {
        self.settings.remove_custom_ringtone(url)?;
        self.sync_alert_sound();
        Ok(())
    }

    pub fn preview_ringtone(&mut self, url: &str) {
        self.audio.play(url, false);
    }

    pub fn stop_preview(&mut self) {
        self.audio.stop();
    }

    pub fn playback_ended(&mut self) {
        self.audio.playback_ended();
    }

    fn sync_alert_sound(&mut self) {
        let ringtone = self.settings.get().notifications.ringtone.clone();
        let sound_alert = self.settings.get().notifications.sound_alert;
        audio::sync_alert_sound(
            &mut self.audio,
            self.fullscreen.is_occupied(),
            &ringtone,
            sound_alert,
            self.has_interacted,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::testing::FakeAudioDevice;
    use crate::clock::testing::ManualClock;
    use crate::config::{DEFAULT_RINGTONE_URL, RINGTONE_NONE, TOAST_DISMISS_MS};
    use crate::reminder::ReminderKind;
    use tempfile::TempDir;

    const TICK_MS: i64 = 5_000;

    struct Fixture {
        core: ReminderCore,
        clock: ManualClock,
        device: FakeAudioDevice,
        _dir: TempDir,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let clock = ManualClock::at(100_000);
        let device = FakeAudioDevice::default();
        let core = ReminderCore::new(
            dir.path(),
            Box::new(device.clone()),
            Box::new(clock.clone()),
        );
        Fixture {
            core,
            clock,
            device,
            _dir: dir,
        }
    }

    fn add_due_task(f: &mut Fixture, title: &str, due: i64) -> i64 {
        f.core
            .add_reminder(NewReminder {
                title: title.to_string(),
                description: None,
                kind: ReminderKind::Task,
                due_timestamp: due,
            })
            .unwrap()
    }

    fn set_high_alert(f: &mut Fixture, on: bool) {
        let mut settings = f.core.settings().clone();
        settings.notifications.high_alert = on;
        f.core.update_settings(settings).unwrap();
    }

    #[test]
    fn test_past_due_reminder_fires_on_first_tick() {
        let mut f = fixture();
        let now = f.clock.now_ms();
        // created already a second overdue
        let id = add_due_task(&mut f, "overdue", now - 1_000);

        f.clock.advance(TICK_MS);
        let outcome = f.core.tick();

        assert_eq!(outcome.fired.len(), 1);
        assert_eq!(outcome.fired[0].id, id);
        assert_eq!(f.core.notifications().len(), 1);
        assert_eq!(f.core.notifications()[0].reminder_id, id);
    }

    #[test]
    fn test_fired_reminder_does_not_refire() {
        let mut f = fixture();
        let now = f.clock.now_ms();
        add_due_task(&mut f, "once", now);

        f.clock.advance(TICK_MS);
        assert_eq!(f.core.tick().fired.len(), 1);

        for _ in 0..5 {
            f.clock.advance(TICK_MS);
            assert!(f.core.tick().fired.is_empty());
        }
        assert_eq!(f.core.notifications().len(), 1);
    }

    #[test]
    fn test_future_reminder_waits_for_due_time() {
        let mut f = fixture();
        let now = f.clock.now_ms();
        add_due_task(&mut f, "later", now + 3 * TICK_MS);

        f.clock.advance(TICK_MS);
        assert!(f.core.tick().fired.is_empty());
        f.clock.advance(TICK_MS);
        assert!(f.core.tick().fired.is_empty());
        f.clock.advance(TICK_MS);
        assert_eq!(f.core.tick().fired.len(), 1);
    }

    #[test]
    fn test_snooze_rearms_and_moves_due_time() {
        let mut f = fixture();
        let now = f.clock.now_ms();
        let id = add_due_task(&mut f, "snoozable", now);

        f.clock.advance(TICK_MS);
        f.core.tick();

        let minutes = f.core.snooze_reminder(id).unwrap();
        assert_eq!(minutes, f.core.settings().snooze_duration);
        let snoozed_at = f.clock.now_ms();
        let due = f.core.reminders()[0].due_timestamp;
        assert_eq!(due, snoozed_at + i64::from(minutes) * 60_000);

        // not due again until the new time passes
        f.clock.advance(TICK_MS);
        assert!(f.core.tick().fired.is_empty());

        f.clock.set(due);
        assert_eq!(f.core.tick().fired.len(), 1);
        assert_eq!(f.core.notifications().len(), 2);
    }

    #[test]
    fn test_high_alert_takes_fullscreen_slot() {
        let mut f = fixture();
        let now = f.clock.now_ms();
        let id = add_due_task(&mut f, "urgent", now);

        f.clock.advance(TICK_MS);
        let outcome = f.core.tick();

        assert_eq!(outcome.fullscreen.as_ref().unwrap().id, id);
        assert!(outcome.toast.is_none());
        assert_eq!(f.core.current_fullscreen().unwrap().id, id);
    }

    #[test]
    fn test_simultaneous_high_alerts_first_wins_rest_fire_silently() {
        let mut f = fixture();
        let now = f.clock.now_ms();
        let second = add_due_task(&mut f, "second added", now);
        let first = add_due_task(&mut f, "first in collection", now);

        f.clock.advance(TICK_MS);
        let outcome = f.core.tick();

        // both fire and are logged, but only the first in collection order
        // reaches the slot; the other is never shown
        assert_eq!(outcome.fired.len(), 2);
        assert_eq!(f.core.notifications().len(), 2);
        assert!(f.core.notifications().iter().any(|n| n.reminder_id == second));
        assert_eq!(f.core.current_fullscreen().unwrap().id, first);
        assert!(f.core.current_toast().is_none());

        // clearing the slot does not resurface the displaced reminder
        f.core.update_status(first, ReminderStatus::Completed).unwrap();
        f.clock.advance(TICK_MS);
        let outcome = f.core.tick();
        assert!(outcome.fired.is_empty());
        assert!(f.core.current_fullscreen().is_none());
    }

    #[test]
    fn test_toast_channel_when_high_alert_off() {
        let mut f = fixture();
        set_high_alert(&mut f, false);
        let now = f.clock.now_ms();
        let id = add_due_task(&mut f, "gentle", now);

        f.clock.advance(TICK_MS);
        let outcome = f.core.tick();

        assert_eq!(outcome.toast.as_ref().unwrap().id, id);
        assert!(outcome.fullscreen.is_none());
        assert!(f.core.current_fullscreen().is_none());
        assert_eq!(f.core.current_toast().unwrap().id, id);
    }

    #[test]
    fn test_toast_auto_dismisses_after_deadline() {
        let mut f = fixture();
        set_high_alert(&mut f, false);
        let now = f.clock.now_ms();
        add_due_task(&mut f, "toast", now);

        f.clock.advance(TICK_MS);
        f.core.tick();
        assert!(f.core.current_toast().is_some());

        // still inside the 10s window on the next tick
        f.clock.advance(TICK_MS);
        let outcome = f.core.tick();
        assert!(!outcome.toast_dismissed);

        f.clock.advance(TOAST_DISMISS_MS - TICK_MS);
        let outcome = f.core.tick();
        assert!(outcome.toast_dismissed);
        assert!(f.core.current_toast().is_none());
    }

    #[test]
    fn test_newer_toast_replaces_older() {
        let mut f = fixture();
        set_high_alert(&mut f, false);
        let now = f.clock.now_ms();
        add_due_task(&mut f, "early", now);

        f.clock.advance(TICK_MS);
        f.core.tick();

        let now = f.clock.now_ms();
        let late = add_due_task(&mut f, "late", now);
        f.clock.advance(TICK_MS);
        f.core.tick();
        assert_eq!(f.core.current_toast().unwrap().id, late);
    }

    #[test]
    fn test_delete_clears_fullscreen_without_new_notification() {
        let mut f = fixture();
        let now = f.clock.now_ms();
        let id = add_due_task(&mut f, "doomed", now);

        f.clock.advance(TICK_MS);
        f.core.tick();
        assert!(f.core.current_fullscreen().is_some());

        f.core.delete_reminder(id).unwrap();
        assert!(f.core.current_fullscreen().is_none());
        assert!(f.core.reminders().is_empty());
        assert_eq!(f.core.notifications().len(), 1);
    }

    #[test]
    fn test_completing_displayed_reminder_clears_slot() {
        let mut f = fixture();
        let now = f.clock.now_ms();
        let id = add_due_task(&mut f, "done", now);

        f.clock.advance(TICK_MS);
        f.core.tick();

        f.core.update_status(id, ReminderStatus::Completed).unwrap();
        assert!(f.core.current_fullscreen().is_none());
    }

    #[test]
    fn test_audio_gated_on_interaction() {
        let mut f = fixture();
        let now = f.clock.now_ms();
        add_due_task(&mut f, "loud", now);

        f.clock.advance(TICK_MS);
        f.core.tick();
        // alert is up, but the user has not touched the page yet
        assert_eq!(f.device.playing(), None);

        f.core.mark_interacted();
        assert_eq!(
            f.device.playing(),
            Some((DEFAULT_RINGTONE_URL.to_string(), true))
        );
    }

    #[test]
    fn test_audio_starts_with_alert_once_interacted() {
        let mut f = fixture();
        f.core.mark_interacted();
        let now = f.clock.now_ms();
        let id = add_due_task(&mut f, "loud", now);

        f.clock.advance(TICK_MS);
        f.core.tick();
        assert_eq!(
            f.device.playing(),
            Some((DEFAULT_RINGTONE_URL.to_string(), true))
        );

        // dismissing the alert stops the ringtone
        f.core.snooze_reminder(id).unwrap();
        assert_eq!(f.device.playing(), None);
    }

    #[test]
    fn test_audio_silent_with_none_ringtone() {
        let mut f = fixture();
        f.core.mark_interacted();
        let mut settings = f.core.settings().clone();
        settings.notifications.ringtone = RINGTONE_NONE.to_string();
        f.core.update_settings(settings).unwrap();

        let now = f.clock.now_ms();
        add_due_task(&mut f, "silent", now);
        f.clock.advance(TICK_MS);
        f.core.tick();

        assert!(f.core.current_fullscreen().is_some());
        assert_eq!(f.device.playing(), None);
    }

    #[test]
    fn test_disabling_sound_stops_active_ringtone() {
        let mut f = fixture();
        f.core.mark_interacted();
        let now = f.clock.now_ms();
        add_due_task(&mut f, "loud", now);
        f.clock.advance(TICK_MS);
        f.core.tick();
        assert!(f.device.playing().is_some());

        let mut settings = f.core.settings().clone();
        settings.notifications.sound_alert = false;
        f.core.update_settings(settings).unwrap();
        assert_eq!(f.device.playing(), None);
    }

    #[test]
    fn test_playback_failure_degrades_to_silence() {
        let mut f = fixture();
        f.core.mark_interacted();
        f.device.fail_next_play();

        let now = f.clock.now_ms();
        add_due_task(&mut f, "blocked", now);
        f.clock.advance(TICK_MS);
        f.core.tick();

        // the alert still shows; only the sound is missing
        assert!(f.core.current_fullscreen().is_some());
        assert_eq!(f.device.playing(), None);
    }

    #[test]
    fn test_preview_shares_channel_with_alert() {
        let mut f = fixture();
        f.core.mark_interacted();
        let now = f.clock.now_ms();
        add_due_task(&mut f, "loud", now);
        f.clock.advance(TICK_MS);
        f.core.tick();

        // a manual preview pre-empts the alert ringtone
        f.core.preview_ringtone("preview.mp3");
        assert_eq!(
            f.device.playing(),
            Some(("preview.mp3".to_string(), false))
        );

        // the next pass hands the channel back to the alert
        f.clock.advance(TICK_MS);
        f.core.tick();
        assert_eq!(
            f.device.playing(),
            Some((DEFAULT_RINGTONE_URL.to_string(), true))
        );
    }

    #[test]
    fn test_payment_action_completes_and_returns_url() {
        let mut f = fixture();
        let now = f.clock.now_ms();
        let id = f
            .core
            .add_reminder(NewReminder {
                title: "Pay rent".to_string(),
                description: None,
                kind: ReminderKind::Debit {
                    amount: Some(12_000.0),
                    recipient_name: Some("Landlord".to_string()),
                    payment_mode: None,
                    upi_id: Some("landlord@upi".to_string()),
                    mobile_number: None,
                },
                due_timestamp: now,
            })
            .unwrap();

        let url = f.core.payment_action(id).unwrap().unwrap();
        assert!(url.starts_with("upi://pay?pa=landlord@upi"));
        assert_eq!(f.core.reminders()[0].status, ReminderStatus::Completed);
    }

    #[test]
    fn test_payment_action_without_target_is_inert() {
        let mut f = fixture();
        let now = f.clock.now_ms();
        let id = add_due_task(&mut f, "plain task", now);

        assert_eq!(f.core.payment_action(id).unwrap(), None);
        assert_eq!(f.core.reminders()[0].status, ReminderStatus::Active);
    }

    #[test]
    fn test_invalid_reminder_never_reaches_store() {
        let mut f = fixture();
        let result = f.core.add_reminder(NewReminder {
            title: String::new(),
            description: None,
            kind: ReminderKind::Task,
            due_timestamp: 1_000,
        });
        assert!(result.is_err());
        assert!(f.core.reminders().is_empty());
    }

    #[test]
    fn test_notification_log_lifecycle() {
        let mut f = fixture();
        let now = f.clock.now_ms();
        add_due_task(&mut f, "a", now);
        add_due_task(&mut f, "b", now);

        f.clock.advance(TICK_MS);
        f.core.tick();
        assert_eq!(f.core.unread_count(), 2);

        f.core.mark_notifications_read();
        assert_eq!(f.core.unread_count(), 0);

        f.core.clear_notifications();
        assert!(f.core.notifications().is_empty());
    }
}
