//! Error types with fix suggestions

use thiserror::Error;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

#[derive(Error, Debug)]
pub enum TaskflowError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Backend returned HTTP {status}")]
    Backend { status: u16 },

    #[error("Invalid backend URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Schedule error: {0}")]
    Schedule(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FixSuggestion for TaskflowError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            TaskflowError::Transport(_) => {
                Some("Check the backend is reachable (taskflow health --url <URL>)")
            }
            TaskflowError::Backend { .. } => {
                Some("Check backend logs; non-2xx responses are not retried at this layer")
            }
            TaskflowError::InvalidUrl(_) => Some("Use a full URL like http://localhost:8000"),
            TaskflowError::Schedule(_) => {
                Some("Run script timeline offsets must strictly increase")
            }
            TaskflowError::Io(_) => Some("Check file path and permissions"),
            TaskflowError::Json(_) => Some("Backend response did not match the wire contract"),
        }
    }
}
