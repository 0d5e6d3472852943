//! Пул воркеров с ограниченными очередями задач и результатов
//!
//! # Features
//! - N воркеров на tokio читают общую очередь задач (work-conserving)
//! - Ограниченные MPMC очереди с backpressure и закрытием
//! - Ошибки и паники задач доходят до читателя результатов как `JobError`
//! - Последний воркер закрывает очередь результатов
//! - Барьер "запустить N, дождаться N"

pub mod barrier;
pub mod config;
pub mod errors;
pub mod logging;
pub mod model;
pub mod pool;
pub mod processor;
pub mod queue;

pub use barrier::{launch_and_wait, TaskBarrier};
pub use config::PoolConfig;
pub use errors::{DispatchError, JobError, JobFailure};
pub use model::{Job, JobOutcome, JobResult, PoolMetrics, WorkerId};
pub use pool::{drain, drain_all, submit, WorkerPool};
pub use processor::{BoxError, Doubler, Processor};
pub use queue::{BoundedQueue, JobQueue, ResultQueue};
