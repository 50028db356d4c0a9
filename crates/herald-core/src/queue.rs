//! Single-consumer job queues.
//!
//! Every processor owns one `JobQueue`: an unbounded channel feeding exactly
//! one worker task spawned at construction. Submission never blocks; jobs
//! within one queue run strictly one at a time in FIFO order; queues for
//! different processors run in parallel.
//!
//! Failure policy is at-most-once with no retry: a job that errors is handed
//! to the [`FailureHandler`] and dropped, and the worker moves on. The loop
//! itself never exits on a job failure. The handler is pluggable so tests can
//! observe failures without changing that default.

use std::future::Future;
use std::sync::Arc;
use std::sync::Mutex;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use herald_types::error::{JobError, TurnError};
use herald_types::job::JobRequest;

/// Sink for job failures caught at the worker boundary.
pub trait FailureHandler: Send + Sync {
    fn on_job_failure(&self, worker: &str, job_id: Uuid, error: &JobError);
}

/// Default failure sink: log and forget.
pub struct LogFailureHandler;

impl FailureHandler for LogFailureHandler {
    fn on_job_failure(&self, worker: &str, job_id: Uuid, error: &JobError) {
        tracing::error!(worker, %job_id, error = %error, "job failed; dropping");
    }
}

/// An unbounded FIFO queue with a dedicated consumer task.
pub struct JobQueue<P> {
    name: &'static str,
    tx: Mutex<Option<mpsc::UnboundedSender<JobRequest<P>>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl<P: Send + 'static> JobQueue<P> {
    /// Create the queue and spawn its worker.
    ///
    /// `handler` runs one job to completion; an `Err` is reported to
    /// `failure` and the worker continues with the next job.
    pub fn spawn<H, Fut>(name: &'static str, failure: Arc<dyn FailureHandler>, handler: H) -> Self
    where
        H: Fn(JobRequest<P>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), JobError>> + Send,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<JobRequest<P>>();
        let worker = tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                let job_id = job.id;
                tracing::debug!(worker = name, %job_id, "picked up job");
                if let Err(error) = handler(job).await {
                    failure.on_job_failure(name, job_id, &error);
                }
            }
            tracing::debug!(worker = name, "queue closed, worker exiting");
        });
        Self {
            name,
            tx: Mutex::new(Some(tx)),
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Enqueue a job. Returns immediately; the worker picks it up in FIFO
    /// order.
    pub fn submit(&self, job: JobRequest<P>) -> Result<(), TurnError> {
        let guard = self.tx.lock().expect("queue sender lock poisoned");
        match guard.as_ref() {
            Some(tx) => tx
                .send(job)
                .map_err(|_| TurnError::QueueClosed(self.name.to_string())),
            None => Err(TurnError::QueueClosed(self.name.to_string())),
        }
    }

    /// Stop accepting new jobs. Already-queued jobs still drain.
    pub fn close(&self) {
        self.tx.lock().expect("queue sender lock poisoned").take();
    }

    /// Wait for the worker to drain and exit. Only meaningful after
    /// [`Self::close`].
    pub async fn join(&self) {
        let handle = self.worker.lock().expect("queue worker lock poisoned").take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}
