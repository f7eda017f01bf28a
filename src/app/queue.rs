use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};

use crate::domain::{DomainError, Job};

/// An entry in the job queue.
#[derive(Debug)]
pub enum QueueItem {
    Job(Job),
    /// Sentinel that wakes the worker for shutdown.
    Stop,
}

/// Outcome of one bounded wait on the queue.
#[derive(Debug)]
pub enum Poll {
    Item(QueueItem),
    /// Nothing arrived within the poll interval.
    Empty,
    Closed,
}

/// Unbounded FIFO shared by the dispatcher (producer) and the worker
/// (consumer). Enqueue never blocks.
#[derive(Clone)]
pub struct JobQueue {
    sender: Sender<QueueItem>,
    receiver: Receiver<QueueItem>,
}

impl JobQueue {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    pub fn enqueue(&self, job: Job) -> Result<(), DomainError> {
        self.sender
            .send(QueueItem::Job(job))
            .map_err(|_| DomainError::Worker("Job queue closed".to_string()))
    }

    /// Push the stop sentinel behind any queued jobs.
    pub fn push_stop(&self) {
        let _ = self.sender.send(QueueItem::Stop);
    }

    /// Wait up to `timeout` for the next item.
    pub fn next(&self, timeout: Duration) -> Poll {
        match self.receiver.recv_timeout(timeout) {
            Ok(item) => Poll::Item(item),
            Err(RecvTimeoutError::Timeout) => Poll::Empty,
            Err(RecvTimeoutError::Disconnected) => Poll::Closed,
        }
    }

    /// Remove every queued job without blocking. Sentinels are dropped.
    pub fn drain(&self) -> Vec<Job> {
        self.receiver
            .try_iter()
            .filter_map(|item| match item {
                QueueItem::Job(job) => Some(job),
                QueueItem::Stop => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

impl Default for JobQueue {
    fn default() -> Self {
        Self::new()
    }
}
