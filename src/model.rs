use super::errors::JobError;
use std::fmt;


/// Единица работы: целочисленный идентификатор
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Job(pub i64);

impl Job {
    #[inline]
    pub fn value(self) -> i64 {
        self.0
    }
}

impl From<i64> for Job {
    fn from(value: i64) -> Self {
        Job(value)
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkerId(pub usize);

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}


/// Результат обработки одной задачи
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobResult {
    pub job: Job,
    pub value: i64,
    pub worker: WorkerId,
}

pub type JobOutcome = Result<JobResult, JobError>;


#[derive(Debug, Clone)]
pub struct PoolMetrics {
    pub workers: usize,
    pub live_workers: usize,
    pub busy_workers: usize,
    pub completed_jobs: usize,
    pub failed_jobs: usize,
}

impl PoolMetrics {
    pub fn utilization(&self) -> f64 {
        if self.live_workers == 0 {
            return 0.0;
        }
        self.busy_workers as f64 / self.live_workers as f64
    }

    pub fn processed(&self) -> usize {
        self.completed_jobs + self.failed_jobs
    }

    pub fn success_rate(&self) -> f64 {
        let total = self.processed();
        if total == 0 {
            return 1.0;
        }
        self.completed_jobs as f64 / total as f64
    }
}
