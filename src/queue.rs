use super::{
    errors::{DispatchError, DispatchResult},
    model::{Job, JobOutcome},
};
use std::sync::atomic::{AtomicBool, Ordering};
use crossbeam::queue::ArrayQueue;
use tokio::sync::Notify;


pub type JobQueue = BoundedQueue<Job>;
pub type ResultQueue = BoundedQueue<JobOutcome>;


/// Ограниченная MPMC очередь с закрытием.
///
/// `send` ждет свободного места, `recv` ждет элемента. После `close`
/// новые элементы не принимаются, а уже лежащие в очереди отдаются
/// получателям до конца, после чего `recv` возвращает `None`.
pub struct BoundedQueue<T> {
    buffer: ArrayQueue<T>,
    closed: AtomicBool,
    item_ready: Notify,
    slot_free: Notify,
}

impl<T> BoundedQueue<T> {
    pub fn new(capacity: usize) -> DispatchResult<Self> {
        if capacity == 0 {
            return Err(DispatchError::InvalidConfig("queue capacity must be at least 1".into()));
        }
        Ok(Self {
            buffer: ArrayQueue::new(capacity),
            closed: AtomicBool::new(false),
            item_ready: Notify::new(),
            slot_free: Notify::new(),
        })
    }

    pub async fn send(&self, item: T) -> DispatchResult<()> {
        let mut item = item;
        loop {
            // подписываемся до проверки, чтобы не потерять пробуждение
            let slot_free = self.slot_free.notified();
            tokio::pin!(slot_free);
            slot_free.as_mut().enable();

            if self.closed.load(Ordering::Acquire) {
                return Err(DispatchError::QueueClosed);
            }
            match self.buffer.push(item) {
                Ok(()) => {
                    self.item_ready.notify_one();
                    return Ok(());
                }
                Err(rejected) => item = rejected,
            }

            slot_free.await;
        }
    }

    pub async fn recv(&self) -> Option<T> {
        loop {
            let item_ready = self.item_ready.notified();
            tokio::pin!(item_ready);
            item_ready.as_mut().enable();

            if let Some(item) = self.take() {
                return Some(item);
            }
            if self.closed.load(Ordering::Acquire) {
                // push мог успеть перед close
                return self.take();
            }

            item_ready.await;
        }
    }

    #[inline]
    pub fn try_recv(&self) -> Option<T> {
        self.take()
    }

    #[inline(always)]
    fn take(&self) -> Option<T> {
        let item = self.buffer.pop()?;
        self.slot_free.notify_one();
        Some(item)
    }

    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            self.item_ready.notify_waiters();
            self.slot_free.notify_waiters();
        }
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::{sync::Arc, time::Duration};

    #[test]
    fn zero_capacity_rejected() {
        assert!(matches!(
            BoundedQueue::<i32>::new(0),
            Err(DispatchError::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn fifo_for_single_sender() {
        let queue = BoundedQueue::new(8).unwrap();
        for i in 0..5 {
            queue.send(i).await.unwrap();
        }
        assert_eq!(queue.len(), 5);
        for i in 0..5 {
            assert_eq!(queue.recv().await, Some(i));
        }
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn close_drains_remaining_items_then_ends() {
        let queue = BoundedQueue::new(4).unwrap();
        queue.send(1).await.unwrap();
        queue.send(2).await.unwrap();
        queue.close();

        assert_eq!(queue.send(3).await, Err(DispatchError::QueueClosed));
        assert_eq!(queue.recv().await, Some(1));
        assert_eq!(queue.recv().await, Some(2));
        assert_eq!(queue.recv().await, None);
        assert_eq!(queue.recv().await, None);
    }

    #[tokio::test]
    async fn close_wakes_waiting_receiver() {
        let queue = Arc::new(BoundedQueue::<i32>::new(1).unwrap());
        let waiter = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.recv().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        queue.close();

        let got = tokio::time::timeout(Duration::from_secs(1), waiter).await;
        assert_eq!(got.unwrap().unwrap(), None);
    }

    #[tokio::test]
    async fn full_queue_applies_backpressure() {
        let queue = Arc::new(BoundedQueue::new(2).unwrap());
        queue.send(1).await.unwrap();
        queue.send(2).await.unwrap();

        let sender = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.send(3).await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!sender.is_finished(), "send must wait while the queue is full");

        assert_eq!(queue.recv().await, Some(1));
        let sent = tokio::time::timeout(Duration::from_secs(1), sender).await;
        assert!(sent.unwrap().unwrap().is_ok());
        assert_eq!(queue.len(), 2);
    }

    #[tokio::test]
    async fn close_fails_blocked_sender() {
        let queue = Arc::new(BoundedQueue::new(1).unwrap());
        queue.send(1).await.unwrap();

        let sender = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.send(2).await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        queue.close();

        let sent = tokio::time::timeout(Duration::from_secs(1), sender).await;
        assert_eq!(sent.unwrap().unwrap(), Err(DispatchError::QueueClosed));
        assert_eq!(queue.recv().await, Some(1));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn many_senders_many_receivers_lose_nothing() {
        let queue = Arc::new(BoundedQueue::new(4).unwrap());

        let receivers: Vec<_> = (0..3)
            .map(|_| {
                let queue = queue.clone();
                tokio::spawn(async move {
                    let mut got = Vec::new();
                    while let Some(v) = queue.recv().await {
                        got.push(v);
                    }
                    got
                })
            })
            .collect();

        let senders: Vec<_> = (0..4)
            .map(|s| {
                let queue = queue.clone();
                tokio::spawn(async move {
                    for i in 0..250 {
                        queue.send(s * 1000 + i).await.unwrap();
                    }
                })
            })
            .collect();

        for s in senders {
            s.await.unwrap();
        }
        queue.close();

        let mut all = Vec::new();
        for r in receivers {
            all.extend(r.await.unwrap());
        }
        all.sort_unstable();

        let mut expected: Vec<_> = (0..4).flat_map(|s| (0..250).map(move |i| s * 1000 + i)).collect();
        expected.sort_unstable();
        assert_eq!(all, expected);
    }
}
