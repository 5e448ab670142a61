//! Error types for the gamedex CLI

use std::path::PathBuf;

use thiserror::Error;

use crate::cli::types::ids::GameId;

pub type Result<T> = std::result::Result<T, GamedexError>;

#[derive(Error, Debug)]
pub enum GamedexError {
    #[error("invalid arguments: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Failed to parse numeric id: {0}")]
    InvalidId(#[from] std::num::ParseIntError),

    #[error("request to {url} failed: {message}")]
    Fetch {
        url: String,
        /// HTTP status when the server answered at all.
        status: Option<u16>,
        message: String,
    },

    #[error("cannot write output to {path}: {source}")]
    Export {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed export data in {path}: {message}")]
    Import { path: PathBuf, message: String },

    #[error("game {id} not found in exported data")]
    GameNotFound { id: GameId },

    #[error("no demo link in response for game {id}")]
    DemoLinkMissing { id: GameId },
}

impl GamedexError {
    /// Whether a fresh attempt at the same request could plausibly succeed.
    ///
    /// Timeouts, connection failures, and 429/5xx responses are transient;
    /// everything else (4xx, malformed requests, parse errors, config
    /// errors) is not.
    pub fn is_retryable(&self) -> bool {
        match self {
            GamedexError::Http(e) => e.is_timeout() || e.is_connect(),
            GamedexError::Fetch { status, .. } => match status {
                Some(429) => true,
                Some(s) => *s >= 500,
                None => true,
            },
            _ => false,
        }
    }
}
