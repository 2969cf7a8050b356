use std::fs;
use std::path::{Path, PathBuf};

use log::warn;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::config::{
    DEFAULT_RINGTONE_URL, DEFAULT_SNOOZE_MINUTES, MAX_RINGTONE_BYTES, RINGTONE_NONE,
};
use crate::error::{AppError, AppResult};

const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Hi,
    Mr,
    Gu,
    Ta,
    Te,
    Kn,
    Ml,
    Pa,
    Bn,
    Or,
    As,
    Ur,
    Sa,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ringtone {
    pub name: String,
    pub url: String,
}

/// Built-in ringtones, always offered ahead of user uploads. The first entry
/// is the "no sound" sentinel.
pub static BUILTIN_RINGTONES: Lazy<Vec<Ringtone>> = Lazy::new(|| {
    vec![
        Ringtone {
            name: "None".to_string(),
            url: RINGTONE_NONE.to_string(),
        },
        Ringtone {
            name: "Default Beep".to_string(),
            url: DEFAULT_RINGTONE_URL.to_string(),
        },
        Ringtone {
            name: "Chime".to_string(),
            url: "https://cdn.jsdelivr.net/gh/k-f-group/remind-me-app-sounds/sounds/chime.mp3"
                .to_string(),
        },
        Ringtone {
            name: "Utopia".to_string(),
            url: "https://cdn.jsdelivr.net/gh/k-f-group/remind-me-app-sounds/sounds/utopia.mp3"
                .to_string(),
        },
    ]
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationSettings {
    #[serde(default = "default_true")]
    pub sound_alert: bool,
    #[serde(default = "default_true", rename = "highAlert")]
    pub high_alert: bool,
    #[serde(default = "default_ringtone")]
    pub ringtone: String,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            sound_alert: true,
            high_alert: true,
            ringtone: default_ringtone(),
        }
    }
}

/// Every field carries a serde default so a settings blob written by an
/// older version is merged over the current defaults on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub language: Language,
    #[serde(default = "default_snooze")]
    pub snooze_duration: u32,
    #[serde(default)]
    pub notifications: NotificationSettings,
    #[serde(default)]
    pub custom_ringtones: Vec<Ringtone>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            language: Language::default(),
            snooze_duration: default_snooze(),
            notifications: NotificationSettings::default(),
            custom_ringtones: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_snooze() -> u32 {
    DEFAULT_SNOOZE_MINUTES
}

fn default_ringtone() -> String {
    DEFAULT_RINGTONE_URL.to_string()
}

/// Settings persistence: loaded once at startup, rewritten on every change.
pub struct SettingsStore {
    current: Settings,
    path: PathBuf,
}

impl SettingsStore {
    pub fn load(dir: &Path) -> Self {
        let path = dir.join(SETTINGS_FILE);
        let current = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Settings>(&content) {
                Ok(settings) => settings,
                Err(e) => {
                    // a malformed blob falls back to defaults wholesale
                    warn!("{} is malformed ({}), using defaults", SETTINGS_FILE, e);
                    Settings::default()
                }
            },
            Err(_) => Settings::default(),
        };
        Self { current, path }
    }

    pub fn get(&self) -> &Settings {
        &self.current
    }

    pub fn replace(&mut self, settings: Settings) -> AppResult<()> {
        self.current = settings;
        self.save()
    }

    /// Built-ins followed by user uploads, for the settings UI.
    pub fn all_ringtones(&self) -> Vec<Ringtone> {
        let mut all = BUILTIN_RINGTONES.clone();
        all.extend(self.current.custom_ringtones.iter().cloned());
        all
    }

    /// Stores an uploaded ringtone and makes it the active one. A URL that
    /// already exists (built-in or custom) is left alone.
    pub fn add_custom_ringtone(&mut self, ringtone: Ringtone) -> AppResult<()> {
        if !ringtone.url.starts_with("data:audio/") {
            return Err(AppError::validation("ringtone must be an audio file"));
        }
        // base64 data URLs carry 4 bytes per 3 bytes of audio
        if ringtone.url.len() > MAX_RINGTONE_BYTES / 3 * 4 + 64 {
            return Err(AppError::validation("ringtone file too large (max 1MB)"));
        }
        if self.all_ringtones().iter().any(|r| r.url == ringtone.url) {
            return Ok(());
        }
        self.current.notifications.ringtone = ringtone.url.clone();
        self.current.custom_ringtones.push(ringtone);
        self.save()
    }

    /// Removes an uploaded ringtone; a removed active ringtone falls back to
    /// the default beep.
    pub fn remove_custom_ringtone(&mut self, url: &str) -> AppResult<()> {
        let before = self.current.custom_ringtones.len();
        self.current.custom_ringtones.retain(|r| r.url != url);
        if self.current.custom_ringtones.len() == before {
            return Ok(());
        }
        if self.current.notifications.ringtone == url {
            self.current.notifications.ringtone = default_ringtone();
        }
        self.save()
    }

    fn save(&self) -> AppResult<()> {
        let content = serde_json::to_string_pretty(&self.current)
            .map_err(|e| AppError::settings(e.to_string()))?;
        fs::write(&self.path, content).map_err(|e| AppError::settings(e.to_string()))
    }
}
