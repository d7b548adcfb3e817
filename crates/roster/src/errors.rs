use thiserror::Error;

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("storage io: {0}")]
    Io(#[from] std::io::Error),
    #[error("roster serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),
}

pub type RosterResult<T> = Result<T, RosterError>;
