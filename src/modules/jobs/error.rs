use thiserror::Error;

use super::model::JobStatus;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JobError {
    #[error("job {0} not found")]
    NotFound(String),

    #[error("job id {0} already exists")]
    DuplicateId(String),

    #[error("job cannot move from {from} to {to}")]
    InvalidTransition { from: JobStatus, to: JobStatus },

    #[error("job id space exhausted after {0} attempts")]
    IdExhausted(u32),

    #[error("dispatcher is shutting down")]
    ShuttingDown,
}

pub type JobResult<T> = Result<T, JobError>;
