//! Bounded background rebuild pool

use std::future::Future;
use std::pin::Pin;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;

type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Fixed-size pool of tokio workers draining a bounded job queue.
///
/// Owned by the cache client that created it rather than living as a
/// process-wide singleton; construction must happen inside a tokio runtime
/// because the workers are spawned on it. Submission is non-blocking: when
/// the queue is full the job is rejected and the caller decides what to do.
pub struct RebuildPool {
    tx: Mutex<Option<mpsc::Sender<Job>>>,
    workers: AsyncMutex<Vec<JoinHandle<()>>>,
}

impl RebuildPool {
    /// Create a pool with `workers` tasks and a queue of `queue_depth` jobs
    pub fn new(workers: usize, queue_depth: usize) -> Self {
        let (tx, rx) = mpsc::channel::<Job>(queue_depth.max(1));
        let rx = std::sync::Arc::new(AsyncMutex::new(rx));

        let handles = (0..workers.max(1))
            .map(|_| {
                let rx = std::sync::Arc::clone(&rx);
                tokio::spawn(async move {
                    loop {
                        // The receiver guard is dropped before the job runs,
                        // so workers execute jobs concurrently.
                        let job = {
                            let mut rx = rx.lock().await;
                            rx.recv().await
                        };
                        match job {
                            Some(job) => job.await,
                            None => break,
                        }
                    }
                })
            })
            .collect();

        Self {
            tx: Mutex::new(Some(tx)),
            workers: AsyncMutex::new(handles),
        }
    }

    /// Hand a job to the pool without waiting
    ///
    /// Returns `false` when the queue is full or the pool has been shut
    /// down; the job is dropped in that case.
    pub fn try_submit<F>(&self, job: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        match self.tx.lock().as_ref() {
            Some(tx) => tx.try_send(Box::pin(job)).is_ok(),
            None => false,
        }
    }

    /// Close the queue, drain queued jobs, and join every worker
    pub async fn shutdown(&self) {
        let tx = self.tx.lock().take();
        drop(tx);

        let mut workers = self.workers.lock().await;
        for handle in workers.drain(..) {
            let _ = handle.await;
        }
    }
}
