use shared::error::ApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PairSourceError {
    #[error("not enough candidates: {0}")]
    InsufficientCandidates(String),
    #[error("pair request rejected: {0:?}")]
    Status(ApiError),
    #[error("pair request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("pair response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("pair response is malformed: {0}")]
    Malformed(String),
}

impl PairSourceError {
    /// Message shown to the user when the next comparison cannot be loaded.
    pub fn notice_text(&self) -> String {
        match self {
            Self::InsufficientCandidates(_) => "Not enough candidates.".to_string(),
            Self::Status(err) => format!("Could not load the next pair: {}", err.message),
            Self::Transport(_) => "Server unreachable; could not load the next pair.".to_string(),
            Self::Decode(_) | Self::Malformed(_) => {
                "The server sent an unusable pair.".to_string()
            }
        }
    }
}
