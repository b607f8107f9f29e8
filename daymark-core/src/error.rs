//! Error types for daymark.

use std::time::Duration;

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors that can occur in daymark operations.
#[derive(Error, Debug)]
pub enum DaymarkError {
    #[error("Calendar access was not granted")]
    PermissionDenied,

    #[error("No calendar available from the provider")]
    CalendarNotFound,

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Provider '{0}' not found in PATH")]
    ProviderNotInstalled(String),

    #[error("Provider request timed out after {0:?}")]
    ProviderTimeout(Duration),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("An event is already being saved")]
    FormBusy,

    #[error("No event form is open")]
    NoActiveForm,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl DaymarkError {
    /// Whether the failure came from the provider side of the boundary.
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            DaymarkError::Provider(_)
                | DaymarkError::ProviderNotInstalled(_)
                | DaymarkError::ProviderTimeout(_)
                | DaymarkError::Io(_)
                | DaymarkError::Serialization(_)
        )
    }

    /// The single message shown to the user for this failure.
    pub fn notice(&self) -> String {
        match self {
            DaymarkError::PermissionDenied => {
                "Calendar permission was not granted. Allow access and try again.".to_string()
            }
            DaymarkError::CalendarNotFound => "No calendar is available to store events.".to_string(),
            DaymarkError::Validation(e) => e.to_string(),
            DaymarkError::FormBusy | DaymarkError::NoActiveForm | DaymarkError::Config(_) => {
                self.to_string()
            }
            _ => format!("The calendar could not be updated ({self})."),
        }
    }
}

/// Result type alias for daymark operations.
pub type DaymarkResult<T> = Result<T, DaymarkError>;
