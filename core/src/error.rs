use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Seed catalog is empty")]
    EmptyCatalog,

    #[error("Invalid scenario '{id}': {reason}")]
    InvalidScenario { id: String, reason: String },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type GameResult<T> = Result<T, GameError>;

/// Failures of the remote content collaborators.
/// Never escape the provider: every variant maps to a seed fallback.
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("Generator not configured")]
    Unavailable,

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Generator returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Generator returned an empty response")]
    EmptyResponse,

    #[error("Malformed payload: {0}")]
    Malformed(String),

    #[error("Generated scenario rejected: {0}")]
    Rejected(String),
}

impl From<reqwest::Error> for GeneratorError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

impl From<serde_json::Error> for GeneratorError {
    fn from(e: serde_json::Error) -> Self {
        Self::Malformed(e.to_string())
    }
}
