use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// No pooled corpus connection became available in time.
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A startup collaborator (scaler artifact, corpus) is unreachable or
    /// corrupt. Nothing can be predicted without it.
    #[error("initialization failed: {0}")]
    Initialization(String),

    /// The sequence has no residues to extract features from.
    #[error("degenerate input: {0}")]
    DegenerateInput(String),

    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl Error {
    /// Returns `true` for errors that reject a single request and leave the
    /// process healthy.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::DegenerateInput(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
