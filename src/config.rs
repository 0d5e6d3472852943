use super::errors::{DispatchError, DispatchResult};
use std::{str::FromStr, time::Duration};


pub const DEFAULT_QUEUE_CAPACITY: usize = 100;
pub const DEFAULT_WORK_DELAY: Duration = Duration::from_secs(1);

pub const ENV_WORKERS: &str = "DISPATCH_WORKERS";
pub const ENV_JOB_CAPACITY: &str = "DISPATCH_JOB_CAPACITY";
pub const ENV_RESULT_CAPACITY: &str = "DISPATCH_RESULT_CAPACITY";
pub const ENV_WORK_DELAY_MS: &str = "DISPATCH_WORK_DELAY_MS";


/// Конфигурация пула воркеров
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    pub workers: usize,
    pub job_capacity: usize,
    pub result_capacity: usize,
    pub work_delay: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: num_cpus::get(),
            job_capacity: DEFAULT_QUEUE_CAPACITY,
            result_capacity: DEFAULT_QUEUE_CAPACITY,
            work_delay: DEFAULT_WORK_DELAY,
        }
    }
}

impl PoolConfig {
    /// Три воркера, очереди на 100 элементов, секунда на задачу
    pub fn demo() -> Self {
        Self {
            workers: 3,
            ..Default::default()
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_work_delay(mut self, work_delay: Duration) -> Self {
        self.work_delay = work_delay;
        self
    }

    pub fn with_env_overrides(self) -> DispatchResult<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Переопределения из произвольного источника ключ -> значение
    pub fn with_overrides<F>(mut self, lookup: F) -> DispatchResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_WORKERS) {
            self.workers = parse_var(ENV_WORKERS, &v)?;
        }
        if let Some(v) = lookup(ENV_JOB_CAPACITY) {
            self.job_capacity = parse_var(ENV_JOB_CAPACITY, &v)?;
        }
        if let Some(v) = lookup(ENV_RESULT_CAPACITY) {
            self.result_capacity = parse_var(ENV_RESULT_CAPACITY, &v)?;
        }
        if let Some(v) = lookup(ENV_WORK_DELAY_MS) {
            self.work_delay = Duration::from_millis(parse_var(ENV_WORK_DELAY_MS, &v)?);
        }
        Ok(self)
    }

    pub fn validate(&self) -> DispatchResult<()> {
        if self.workers == 0 {
            return Err(DispatchError::InvalidConfig("worker count must be at least 1".into()));
        }
        if self.job_capacity == 0 || self.result_capacity == 0 {
            return Err(DispatchError::InvalidConfig("queue capacity must be at least 1".into()));
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(key: &str, raw: &str) -> DispatchResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| DispatchError::Config(format!("{key}: cannot parse '{raw}'")))
}
