mod alert;
mod audio;
mod clock;
mod config;
mod core;
mod error;
mod notification;
mod reminder;
mod scan;
mod settings;
mod store;

use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use tauri::{Emitter, Manager, WindowEvent};

use crate::audio::AudioDevice;
use crate::clock::SystemClock;
use crate::config::{APP_DATA_DIR, SCAN_INTERVAL_MS};
use crate::core::{ReminderCore, TickOutcome};
use crate::error::{AppError, AppResult};
use crate::notification::Notification;
use crate::reminder::{NewReminder, Reminder, ReminderStatus};
use crate::scan::ScanLoop;
use crate::settings::{Ringtone, Settings};

pub struct AppState {
    pub core: Mutex<ReminderCore>,
}

impl AppState {
    /// Lock the core, recovering from poison if needed
    fn lock_core(&self) -> MutexGuard<'_, ReminderCore> {
        self.core.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// The scan loop's handle lives here so closing the main window can dispose
/// of it; dropping the handle is the cancellation.
struct ScanLoopState(Mutex<Option<ScanLoop>>);

/// Forwards playback to the webview, which owns the only audio element.
/// Autoplay rejection surfaces through the `audio_playback_ended` command
/// rather than here, since the element lives on the other side.
struct WebviewAudioDevice {
    app: tauri::AppHandle,
}

#[derive(Clone, serde::Serialize)]
struct AudioPlayPayload {
    url: String,
    looping: bool,
}

impl AudioDevice for WebviewAudioDevice {
    fn play(&mut self, url: &str, looping: bool) -> AppResult<()> {
        self.app
            .emit(
                "audio:play",
                AudioPlayPayload {
                    url: url.to_string(),
                    looping,
                },
            )
            .map_err(|e| AppError::audio(e.to_string()))
    }

    fn stop(&mut self) {
        let _ = self.app.emit("audio:stop", ());
    }
}

fn app_data_dir() -> AppResult<PathBuf> {
    let dir = dirs::data_local_dir()
        .ok_or_else(|| AppError::storage("failed to get local data dir"))?
        .join(APP_DATA_DIR);
    fs::create_dir_all(&dir).map_err(|e| AppError::storage(e.to_string()))?;
    Ok(dir)
}

fn emit_tick_events(app: &tauri::AppHandle, outcome: &TickOutcome) {
    for reminder in &outcome.fired {
        let _ = app.emit("reminder:fired", reminder.clone());
    }
    if let Some(reminder) = &outcome.fullscreen {
        let _ = app.emit("alert:show", reminder.clone());
    }
    if let Some(reminder) = &outcome.toast {
        let _ = app.emit("toast:show", reminder.clone());
    }
    if outcome.toast_dismissed {
        let _ = app.emit("toast:dismiss", ());
    }
}

// ============ Reminder commands ============

#[tauri::command]
fn get_reminders(state: tauri::State<AppState>) -> Result<Vec<Reminder>, String> {
    Ok(state.lock_core().reminders().to_vec())
}

#[tauri::command]
fn add_reminder(state: tauri::State<AppState>, reminder: NewReminder) -> Result<i64, String> {
    state.lock_core().add_reminder(reminder).map_err(String::from)
}

#[tauri::command]
fn update_reminder_status(
    state: tauri::State<AppState>,
    id: i64,
    status: ReminderStatus,
) -> Result<(), String> {
    state
        .lock_core()
        .update_status(id, status)
        .map_err(String::from)
}

#[tauri::command]
fn delete_reminder(state: tauri::State<AppState>, id: i64) -> Result<(), String> {
    state.lock_core().delete_reminder(id).map_err(String::from)
}

/// Returns the snooze duration applied, for the confirmation toast.
#[tauri::command]
fn snooze_reminder(state: tauri::State<AppState>, id: i64) -> Result<u32, String> {
    state.lock_core().snooze_reminder(id).map_err(String::from)
}

/// Pay-now shortcut: completes the reminder and opens the UPI target.
/// Returns false when the reminder has nothing to launch.
#[tauri::command]
fn complete_via_payment(state: tauri::State<AppState>, id: i64) -> Result<bool, String> {
    let url = state.lock_core().payment_action(id).map_err(String::from)?;
    match url {
        Some(url) => {
            open::that(&url).map_err(|e| AppError::launch(e.to_string()))?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Send-WhatsApp shortcut, same contract as `complete_via_payment`.
#[tauri::command]
fn complete_via_whatsapp(state: tauri::State<AppState>, id: i64) -> Result<bool, String> {
    let url = state.lock_core().whatsapp_action(id).map_err(String::from)?;
    match url {
        Some(url) => {
            open::that(&url).map_err(|e| AppError::launch(e.to_string()))?;
            Ok(true)
        }
        None => Ok(false),
    }
}

// ============ Alert commands ============

#[tauri::command]
fn get_active_alert(state: tauri::State<AppState>) -> Result<Option<Reminder>, String> {
    Ok(state.lock_core().current_fullscreen().cloned())
}

#[tauri::command]
fn get_active_toast(state: tauri::State<AppState>) -> Result<Option<Reminder>, String> {
    Ok(state.lock_core().current_toast().cloned())
}

#[tauri::command]
fn dismiss_toast(state: tauri::State<AppState>) -> Result<(), String> {
    state.lock_core().dismiss_toast();
    Ok(())
}

/// Fired once by the webview on the first click or key press after load.
#[tauri::command]
fn mark_interacted(state: tauri::State<AppState>) -> Result<(), String> {
    state.lock_core().mark_interacted();
    Ok(())
}

// ============ Notification log commands ============

#[tauri::command]
fn get_notifications(state: tauri::State<AppState>) -> Result<Vec<Notification>, String> {
    Ok(state.lock_core().notifications().to_vec())
}

#[tauri::command]
fn get_unread_count(state: tauri::State<AppState>) -> Result<usize, String> {
    Ok(state.lock_core().unread_count())
}

#[tauri::command]
fn mark_notifications_read(state: tauri::State<AppState>) -> Result<(), String> {
    state.lock_core().mark_notifications_read();
    Ok(())
}

#[tauri::command]
fn clear_notifications(state: tauri::State<AppState>) -> Result<(), String> {
    state.lock_core().clear_notifications();
    Ok(())
}

// ============ Settings & audio commands ============

#[tauri::command]
fn get_settings(state: tauri::State<AppState>) -> Result<Settings, String> {
    Ok(state.lock_core().settings().clone())
}

#[tauri::command]
fn update_settings(state: tauri::State<AppState>, settings: Settings) -> Result<(), String> {
    state
        .lock_core()
        .update_settings(settings)
        .map_err(String::from)
}

#[tauri::command]
fn get_ringtones(state: tauri::State<AppState>) -> Result<Vec<Ringtone>, String> {
    Ok(state.lock_core().all_ringtones())
}

#[tauri::command]
fn add_custom_ringtone(state: tauri::State<AppState>, ringtone: Ringtone) -> Result<(), String> {
    state
        .lock_core()
        .add_custom_ringtone(ringtone)
        .map_err(String::from)
}

#[tauri::command]
fn remove_custom_ringtone(state: tauri::State<AppState>, url: String) -> Result<(), String> {
    state
        .lock_core()
        .remove_custom_ringtone(&url)
        .map_err(String::from)
}

#[tauri::command]
fn preview_ringtone(state: tauri::State<AppState>, url: String) -> Result<(), String> {
    state.lock_core().preview_ringtone(&url);
    Ok(())
}

#[tauri::command]
fn stop_ringtone_preview(state: tauri::State<AppState>) -> Result<(), String> {
    state.lock_core().stop_preview();
    Ok(())
}

/// The webview's audio element finished (or refused) playback on its own.
#[tauri::command]
fn audio_playback_ended(state: tauri::State<AppState>) -> Result<(), String> {
    state.lock_core().playback_ended();
    Ok(())
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        .setup(|app| {
            let data_dir = app_data_dir()?;
            let device = Box::new(WebviewAudioDevice {
                app: app.handle().clone(),
            });
            app.manage(AppState {
                core: Mutex::new(ReminderCore::new(
                    &data_dir,
                    device,
                    Box::new(SystemClock),
                )),
            });

            // the due-scan loop lives exactly as long as the main view
            let app_handle = app.handle().clone();
            let scan_loop = ScanLoop::spawn(move || {
                let outcome = {
                    let state = app_handle.state::<AppState>();
                    let mut core = state.lock_core();
                    core.tick()
                };
                emit_tick_events(&app_handle, &outcome);
            });
            app.manage(ScanLoopState(Mutex::new(Some(scan_loop))));

            println!("Due-reminder scan started ({}ms interval)", SCAN_INTERVAL_MS);
            Ok(())
        })
        .on_window_event(|window, event| {
            if let WindowEvent::Destroyed = event {
                if window.label() == "main" {
                    if let Some(state) = window.app_handle().try_state::<ScanLoopState>() {
                        // dropping the handle cancels the loop
                        state.0.lock().unwrap_or_else(|e| e.into_inner()).take();
                    }
                }
            }
        })
        .invoke_handler(tauri::generate_handler![
            get_reminders,
            add_reminder,
            update_reminder_status,
            delete_reminder,
            snooze_reminder,
            complete_via_payment,
            complete_via_whatsapp,
            get_active_alert,
            get_active_toast,
            dismiss_toast,
            mark_interacted,
            get_notifications,
            get_unread_count,
            mark_notifications_read,
            clear_notifications,
            get_settings,
            update_settings,
            get_ringtones,
            add_custom_ringtone,
            remove_custom_ringtone,
            preview_ringtone,
            stop_ringtone_preview,
            audio_playback_ended,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
