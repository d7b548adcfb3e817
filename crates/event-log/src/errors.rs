use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogError {
    #[error("action tag must not be empty")]
    EmptyAction,
}

pub type LogResult<T> = Result<T, LogError>;
