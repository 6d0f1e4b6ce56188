use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse float error: {0}")]
    ParseFloat(#[from] std::num::ParseFloatError),

    #[error("Parse int error: {0}")]
    ParseInt(#[from] std::num::ParseIntError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{venue}: request timed out after {after:?}")]
    Timeout { venue: String, after: Duration },

    #[error("{venue}: {message}")]
    Venue { venue: String, message: String },

    #[error("Fetch task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl AppError {
    pub fn venue(venue: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Venue {
            venue: venue.into(),
            message: message.into(),
        }
    }
}
