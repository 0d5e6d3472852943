use std::{
    future::Future,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};
use tokio::sync::Notify;
use tracing::{debug, trace};


/// Барьер "запустить N, дождаться N".
///
/// Задачи независимы и ничего не возвращают; `wait` возвращается,
/// когда все запущенные задачи завершились (в том числе паникой).
#[derive(Clone, Default)]
pub struct TaskBarrier {
    pending: Arc<AtomicUsize>,
    notify: Arc<Notify>,
}

impl TaskBarrier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.pending.fetch_add(1, Ordering::AcqRel);
        let done = DoneGuard {
            pending: self.pending.clone(),
            notify: self.notify.clone(),
        };

        tokio::spawn(async move {
            let _done = done;
            fut.await;
        });
    }

    #[inline]
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    pub async fn wait(&self) {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.pending.load(Ordering::Acquire) == 0 {
                return;
            }
            trace!(pending = self.pending(), "waiting for tasks");
            notified.await;
        }
    }
}


struct DoneGuard {
    pending: Arc<AtomicUsize>,
    notify: Arc<Notify>,
}

impl Drop for DoneGuard {
    fn drop(&mut self) {
        if self.pending.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.notify.notify_waiters();
        }
    }
}


/// Запускает `f(i)` для `i in 0..n` и ждет завершения всех
pub async fn launch_and_wait<F, Fut>(n: usize, f: F)
where
    F: Fn(usize) -> Fut,
    Fut: Future<Output = ()> + Send + 'static,
{
    let barrier = TaskBarrier::new();
    for i in 0..n {
        barrier.spawn(f(i));
    }
    barrier.wait().await;
    debug!(tasks = n, "all tasks finished");
}
