use std::path::PathBuf;
use thiserror::Error;

/// Failure taxonomy shared by sandbox operations, index access, and the
/// retrieval/action pipelines.
#[derive(Debug, Error)]
pub enum Error {
    #[error("not found: {0}")]
    NotFound(PathBuf),
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("already exists: {0}")]
    AlreadyExists(String),
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
    #[error("collaborator failure: {0}")]
    Collaborator(#[from] providers::ProviderError),
    #[error("io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage failure: {0}")]
    Db(#[from] sqlx::Error),
}
