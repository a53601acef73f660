//! Error types for the club administration tool

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClubError>;

#[derive(Error, Debug)]
pub enum ClubError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Failed to parse id: {0}")]
    InvalidId(#[from] std::num::ParseIntError),

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Invalid {kind}: {value}")]
    InvalidValue { kind: &'static str, value: String },

    #[error("Invalid amount: {value}")]
    InvalidAmount { value: String },

    #[error("Invalid date or time: {value}")]
    InvalidDate { value: String },

    #[error("No term covers {date}")]
    NoTermForDate { date: String },

    #[error("Team {team_id} is not enrolled in term {term_id}")]
    TeamNotEnrolled { team_id: i64, term_id: i64 },

    #[error("Player {player_id} is not on the roll for event {event_id}")]
    NotOnRoll { player_id: i64, event_id: i64 },

    #[error("Payment of {amount} exceeds the outstanding balance of {outstanding}")]
    Overpayment { amount: String, outstanding: String },

    #[error("{message}")]
    Conflict { message: String },

    #[error("Service not configured: {env_var} environment variable not set")]
    MissingServiceConfig { env_var: String },
}

impl ClubError {
    pub(crate) fn validation(field: &str, message: impl Into<String>) -> Self {
        ClubError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for ClubError {
    fn from(err: anyhow::Error) -> Self {
        ClubError::Storage {
            message: format!("{:#}", err),
        }
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for ClubError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        ClubError::Storage {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests;
