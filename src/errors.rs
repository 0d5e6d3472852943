use super::model::Job;
use thiserror::Error;


#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum DispatchError {
    #[error("queue is closed")]
    QueueClosed,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("result queue closed after {received} of {expected} results")]
    ResultsExhausted { expected: usize, received: usize },

    #[error("worker failed: {0}")]
    WorkerFailed(String),
}

pub type DispatchResult<T> = Result<T, DispatchError>;


/// Почему обработка задачи не дала результата
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum JobFailure {
    #[error("failed: {0}")]
    Failed(String),

    #[error("panicked: {0}")]
    Panicked(String),
}

/// Ошибка конкретной задачи, доходит до того, кто читает результаты
#[derive(Error, Debug, PartialEq, Eq, Clone)]
#[error("job {job} {cause}")]
pub struct JobError {
    pub job: Job,
    pub cause: JobFailure,
}

impl JobError {
    pub fn failed(job: Job, msg: impl Into<String>) -> Self {
        Self { job, cause: JobFailure::Failed(msg.into()) }
    }

    pub fn panicked(job: Job, msg: impl Into<String>) -> Self {
        Self { job, cause: JobFailure::Panicked(msg.into()) }
    }
}
