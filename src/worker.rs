//! Background execution for merge operations.
//!
//! A merge is long-running; [`MergeWorker`] keeps it off the caller's
//! task. The worker is a dedicated tokio task fed through a job channel.
//! Everything crossing the channel is plain data (file bytes, metadata,
//! progress events), never live resource handles, so the same types could
//! cross a process or thread boundary unchanged.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::{MergeConfig, OutputSpec};
use crate::error::{MergeError, Result};
use crate::model::{DocumentRef, MergeOutput};
use crate::progress::{ProgressCallback, ProgressEvent};
use crate::service::MergeService;

/// One unit of work submitted to a worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeJob {
    /// The ordered batch to merge.
    pub files: Vec<DocumentRef>,

    /// Desired output name and metadata.
    pub spec: OutputSpec,
}

/// Notification emitted by a worker while processing a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WorkerEvent {
    /// An in-flight progress notification.
    Progress(ProgressEvent),

    /// The job finished; carries the merged output.
    Complete(MergeOutput),

    /// The job failed; carries the human-readable error message.
    Failed {
        /// Why the job failed.
        message: String,
    },
}

struct Job {
    job: MergeJob,
    events: mpsc::UnboundedSender<WorkerEvent>,
}

/// Dedicated background task running merge jobs.
///
/// Jobs are processed one at a time, in submission order. Dropping the
/// worker lets the task drain and exit; [`dispose`](Self::dispose) kills
/// it immediately.
pub struct MergeWorker {
    jobs: mpsc::UnboundedSender<Job>,
    handle: JoinHandle<()>,
    disposed: Arc<AtomicBool>,
}

impl MergeWorker {
    /// Spawn a worker on the current tokio runtime.
    pub fn spawn(config: MergeConfig) -> Self {
        let (jobs, mut queue) = mpsc::unbounded_channel::<Job>();

        let handle = tokio::spawn(async move {
            let service = MergeService::new(config);

            while let Some(Job { job, events }) = queue.recv().await {
                let progress_events = events.clone();
                let forward = move |event: ProgressEvent| {
                    // Best-effort: a receiver that went away must not
                    // affect the merge outcome.
                    let _ = progress_events.send(WorkerEvent::Progress(event));
                };
                let callback: &ProgressCallback = &forward;

                let result = service
                    .merge_files(&job.files, &job.spec, Some(callback))
                    .await;

                let outcome = match result {
                    Ok(output) => WorkerEvent::Complete(output),
                    Err(e) => WorkerEvent::Failed {
                        message: e.to_string(),
                    },
                };
                let _ = events.send(outcome);
            }

            tracing::debug!("merge worker drained, exiting");
        });

        Self {
            jobs,
            handle,
            disposed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Queue a job and return the receiver for its event stream.
    ///
    /// The stream yields zero or more `Progress` events followed by
    /// exactly one `Complete` or `Failed`, unless the worker is disposed
    /// first, in which case the stream simply ends.
    pub fn submit(&self, job: MergeJob) -> Result<mpsc::UnboundedReceiver<WorkerEvent>> {
        if self.is_disposed() {
            return Err(MergeError::Cancelled);
        }

        let (events, receiver) = mpsc::unbounded_channel();
        self.jobs
            .send(Job { job, events })
            .map_err(|_| MergeError::Cancelled)?;

        Ok(receiver)
    }

    /// Run one job to completion, forwarding progress to `on_progress`.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::Cancelled`] if the worker is disposed before
    /// the job completes; merge failures arrive as [`MergeError::Other`]
    /// carrying the original message.
    pub async fn merge(
        &self,
        files: Vec<DocumentRef>,
        spec: OutputSpec,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<MergeOutput> {
        let mut events = self.submit(MergeJob { files, spec })?;

        while let Some(event) = events.recv().await {
            // Disposal wins over anything still queued: no callback may
            // fire after dispose() returns.
            if self.is_disposed() {
                return Err(MergeError::Cancelled);
            }

            match event {
                WorkerEvent::Progress(progress) => {
                    if let Some(callback) = on_progress {
                        callback(progress);
                    }
                }
                WorkerEvent::Complete(output) => return Ok(output),
                WorkerEvent::Failed { message } => return Err(MergeError::other(message)),
            }
        }

        Err(MergeError::Cancelled)
    }

    /// Terminate the worker and cancel any in-flight job.
    ///
    /// Safe to call at any point and idempotent. In-flight and queued
    /// jobs resolve to [`MergeError::Cancelled`]; no progress callback
    /// fires after this returns.
    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
        self.handle.abort();
    }

    /// Whether [`dispose`](Self::dispose) has been called.
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }
}
