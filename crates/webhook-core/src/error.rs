use thiserror::Error;

/// Why a poll produced no new data. Neither kind is fatal: the last good
/// snapshot stays on screen and the next tick retries.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PollError {
    #[error("fetch failed: {0}")]
    Fetch(String),
    #[error("fetch failed with status {status}")]
    Status { status: u16 },
    #[error("payload parse failed: {0}")]
    Parse(String),
}

impl PollError {
    pub fn kind(&self) -> &'static str {
        match self {
            PollError::Fetch(_) | PollError::Status { .. } => "fetch",
            PollError::Parse(_) => "parse",
        }
    }
}

impl From<serde_json::Error> for PollError {
    fn from(err: serde_json::Error) -> Self {
        PollError::Parse(err.to_string())
    }
}
