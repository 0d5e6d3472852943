use super::model::Job;
use std::future::Future;
use tokio::time::Duration;


pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;


/// Обработчик задач, общий для всех воркеров пула
pub trait Processor: Send + Sync + 'static {
    fn process(&self, job: Job) -> impl Future<Output = Result<i64, BoxError>> + Send;
}

impl<F, Fut> Processor for F
where
    F: Fn(Job) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<i64, BoxError>> + Send,
{
    #[inline(always)]
    fn process(&self, job: Job) -> impl Future<Output = Result<i64, BoxError>> + Send {
        self(job)
    }
}


/// Эталонная работа: пауза, затем job * 2
#[derive(Debug, Clone, Copy)]
pub struct Doubler {
    delay: Duration,
}

impl Doubler {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Processor for Doubler {
    async fn process(&self, job: Job) -> Result<i64, BoxError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        job.value()
            .checked_mul(2)
            .ok_or_else(|| format!("{job} * 2 overflows").into())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn doubler_doubles() {
        let doubler = Doubler::new(Duration::ZERO);
        assert_eq!(doubler.process(Job(21)).await.unwrap(), 42);
        assert_eq!(doubler.process(Job(-3)).await.unwrap(), -6);
    }

    #[tokio::test]
    async fn doubler_reports_overflow() {
        let doubler = Doubler::new(Duration::ZERO);
        let err = doubler.process(Job(i64::MAX)).await.unwrap_err();
        assert!(err.to_string().contains("overflows"));
    }

    #[tokio::test]
    async fn closures_are_processors() {
        let negate = |job: Job| async move { Ok::<_, BoxError>(-job.value()) };
        assert_eq!(negate.process(Job(7)).await.unwrap(), -7);
    }
}
