use super::{
    config::PoolConfig,
    errors::{DispatchError, DispatchResult, JobError},
    model::{Job, JobOutcome, JobResult, PoolMetrics, WorkerId},
    processor::Processor,
    queue::{JobQueue, ResultQueue},
};
use std::{
    any::Any,
    panic::AssertUnwindSafe,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};
use futures::FutureExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};


#[derive(Debug, Default)]
struct PoolState {
    live_workers: AtomicUsize,
    busy_workers: AtomicUsize,
    completed_jobs: AtomicUsize,
    failed_jobs: AtomicUsize,
}


/// Пул воркеров: N задач tokio читают общую очередь задач
/// и пишут исходы в общую очередь результатов
pub struct WorkerPool {
    jobs: Arc<JobQueue>,
    results: Arc<ResultQueue>,
    handles: Vec<(WorkerId, JoinHandle<()>)>,
    state: Arc<PoolState>,
    workers: usize,
}

impl WorkerPool {
    pub fn start<P: Processor>(
        worker_count: usize,
        jobs: Arc<JobQueue>,
        results: Arc<ResultQueue>,
        processor: P,
    ) -> DispatchResult<Self> {
        if worker_count == 0 {
            return Err(DispatchError::InvalidConfig("worker count must be at least 1".into()));
        }

        let processor = Arc::new(processor);
        let state = Arc::new(PoolState::default());
        state.live_workers.store(worker_count, Ordering::Release);

        let handles = (1..=worker_count)
            .map(|n| {
                let id = WorkerId(n);
                let worker = Worker {
                    id,
                    jobs: jobs.clone(),
                    results: results.clone(),
                    processor: processor.clone(),
                    state: state.clone(),
                };
                (id, tokio::spawn(worker.run()))
            })
            .collect();

        info!(workers = worker_count, "worker pool started");

        Ok(Self {
            jobs,
            results,
            handles,
            state,
            workers: worker_count,
        })
    }

    pub fn with_config<P: Processor>(config: &PoolConfig, processor: P) -> DispatchResult<Self> {
        config.validate()?;
        let jobs = Arc::new(JobQueue::new(config.job_capacity)?);
        let results = Arc::new(ResultQueue::new(config.result_capacity)?);
        Self::start(config.workers, jobs, results, processor)
    }

    #[inline]
    pub fn jobs(&self) -> &Arc<JobQueue> {
        &self.jobs
    }

    #[inline]
    pub fn results(&self) -> &Arc<ResultQueue> {
        &self.results
    }

    #[inline]
    pub fn metrics(&self) -> PoolMetrics {
        PoolMetrics {
            workers: self.workers,
            live_workers: self.state.live_workers.load(Ordering::Relaxed),
            busy_workers: self.state.busy_workers.load(Ordering::Relaxed),
            completed_jobs: self.state.completed_jobs.load(Ordering::Relaxed),
            failed_jobs: self.state.failed_jobs.load(Ordering::Relaxed),
        }
    }

    /// Ждет выхода всех воркеров. Воркеры выходят сами,
    /// когда очередь задач закрыта и пуста.
    pub async fn join(self) -> DispatchResult<()> {
        let mut first_error = None;
        for (id, handle) in self.handles {
            if let Err(join_err) = handle.await {
                warn!(worker_id = %id, error = %join_err, "worker task aborted");
                first_error.get_or_insert(DispatchError::WorkerFailed(format!(
                    "worker {id}: {join_err}"
                )));
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}


struct Worker<P> {
    id: WorkerId,
    jobs: Arc<JobQueue>,
    results: Arc<ResultQueue>,
    processor: Arc<P>,
    state: Arc<PoolState>,
}

impl<P: Processor> Worker<P> {
    async fn run(self) {
        let _exit = ExitGuard {
            state: self.state.clone(),
            results: self.results.clone(),
            id: self.id,
        };
        debug!(worker_id = %self.id, "worker started");

        while let Some(job) = self.jobs.recv().await {
            self.state.busy_workers.fetch_add(1, Ordering::Relaxed);
            info!(worker_id = %self.id, job = %job, "worker started job");

            let outcome = self.process(job).await;
            match &outcome {
                Ok(result) => {
                    self.state.completed_jobs.fetch_add(1, Ordering::Relaxed);
                    info!(worker_id = %self.id, job = %job, value = result.value, "worker finished job");
                }
                Err(err) => {
                    self.state.failed_jobs.fetch_add(1, Ordering::Relaxed);
                    warn!(worker_id = %self.id, job = %job, error = %err, "job failed");
                }
            }
            self.state.busy_workers.fetch_sub(1, Ordering::Relaxed);

            if self.results.send(outcome).await.is_err() {
                warn!(worker_id = %self.id, job = %job, "result queue closed, outcome dropped");
            }
        }

        debug!(worker_id = %self.id, "job queue closed, worker exiting");
    }

    async fn process(&self, job: Job) -> JobOutcome {
        match AssertUnwindSafe(self.processor.process(job)).catch_unwind().await {
            Ok(Ok(value)) => Ok(JobResult { job, value, worker: self.id }),
            Ok(Err(err)) => Err(JobError::failed(job, err.to_string())),
            Err(panic_info) => Err(JobError::panicked(job, panic_message(panic_info.as_ref()))),
        }
    }
}


/// Последний вышедший воркер закрывает очередь результатов
struct ExitGuard {
    state: Arc<PoolState>,
    results: Arc<ResultQueue>,
    id: WorkerId,
}

impl Drop for ExitGuard {
    fn drop(&mut self) {
        if self.state.live_workers.fetch_sub(1, Ordering::AcqRel) == 1 {
            debug!(worker_id = %self.id, "last worker exited, closing result queue");
            self.results.close();
        }
    }
}

fn panic_message(panic_info: &(dyn Any + Send)) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}


/// Кладет задачи в очередь по порядку и закрывает ее.
/// Ждет, если очередь заполнена.
pub async fn submit<I>(jobs: &JobQueue, items: I) -> DispatchResult<usize>
where
    I: IntoIterator,
    I::Item: Into<Job>,
{
    let mut sent = 0;
    for item in items {
        if let Err(err) = jobs.send(item.into()).await {
            jobs.close();
            return Err(err);
        }
        sent += 1;
    }
    jobs.close();
    debug!(jobs = sent, "submission complete, job queue closed");
    Ok(sent)
}

/// Забирает ровно `expected` исходов
pub async fn drain(results: &ResultQueue, expected: usize) -> DispatchResult<Vec<JobOutcome>> {
    let mut outcomes = Vec::with_capacity(expected);
    while outcomes.len() < expected {
        match results.recv().await {
            Some(outcome) => outcomes.push(outcome),
            None => {
                return Err(DispatchError::ResultsExhausted {
                    expected,
                    received: outcomes.len(),
                })
            }
        }
    }
    Ok(outcomes)
}

/// Забирает исходы, пока очередь результатов не закроется
pub async fn drain_all(results: &ResultQueue) -> Vec<JobOutcome> {
    let mut outcomes = Vec::new();
    while let Some(outcome) = results.recv().await {
        outcomes.push(outcome);
    }
    outcomes
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_message_from_payloads() {
        let s: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(s.as_ref()), "boom");
        let s: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(s.as_ref()), "bang");
        let s: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(s.as_ref()), "unknown panic");
    }

    #[tokio::test]
    async fn zero_workers_rejected() {
        let jobs = Arc::new(JobQueue::new(1).unwrap());
        let results = Arc::new(ResultQueue::new(1).unwrap());
        let doubler = crate::processor::Doubler::new(tokio::time::Duration::ZERO);
        assert!(matches!(
            WorkerPool::start(0, jobs, results, doubler),
            Err(DispatchError::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn submit_to_closed_queue_fails() {
        let jobs = JobQueue::new(4).unwrap();
        jobs.close();
        assert_eq!(submit(&jobs, [1i64, 2]).await, Err(DispatchError::QueueClosed));
    }
}
