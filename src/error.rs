use serde::Serialize;
use std::fmt;

/// Application error types for better error handling and user feedback.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "message")]
pub enum AppError {
    /// Errors related to reminder persistence
    Storage(String),
    /// Errors related to the settings file
    Settings(String),
    /// Errors related to data validation
    Validation(String),
    /// Errors related to audio playback
    Audio(String),
    /// Errors related to launching external apps/URLs
    Launch(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
            AppError::Settings(msg) => write!(f, "Settings error: {}", msg),
            AppError::Validation(msg) => write!(f, "Validation error: {}", msg),
            AppError::Audio(msg) => write!(f, "Audio error: {}", msg),
            AppError::Launch(msg) => write!(f, "Launch error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

// Conversion to String for Tauri command return types
impl From<AppError> for String {
    fn from(error: AppError) -> Self {
        error.to_string()
    }
}

// Convenience constructors
impl AppError {
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        AppError::Storage(msg.into())
    }

    pub fn settings<S: Into<String>>(msg: S) -> Self {
        AppError::Settings(msg.into())
    }

    pub fn validation<S: Into<String>>(msg: S) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn audio<S: Into<String>>(msg: S) -> Self {
        AppError::Audio(msg.into())
    }

    pub fn launch<S: Into<String>>(msg: S) -> Self {
        AppError::Launch(msg.into())
    }
}

/// Result type alias for commands
pub type AppResult<T> = Result<T, AppError>;
