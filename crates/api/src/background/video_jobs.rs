//! Video generation as background jobs.
//!
//! A job submits the generation, polls the provider operation and
//! downloads the result on its own task. Clients follow it through
//! [`VideoJobManager::get`] instead of holding a request open.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use chrono::Utc;
use serde::Serialize;
use silhouette_core::types::Timestamp;
use silhouette_genai::messages::VideoRequest;
use silhouette_genai::{wait_for_video, GenAiError, MediaGenerator, PollError, PollPolicy};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// How long shutdown waits for each job task to wind down.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Why a job failed, using the HTTP error codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobFailure {
    pub code: &'static str,
    pub message: String,
}

/// Client-visible state of a job.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoJob {
    pub id: String,
    pub prompt: String,
    pub status: JobStatus,
    /// Provider operation name, once submitted.
    pub operation_id: Option<String>,
    /// Status checks made so far.
    pub attempts: u32,
    pub video_uri: Option<String>,
    pub error: Option<JobFailure>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

struct JobEntry {
    job: VideoJob,
    attempts: Arc<AtomicU32>,
    video: Option<Bytes>,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl JobEntry {
    fn snapshot(&self) -> VideoJob {
        VideoJob {
            attempts: self.attempts.load(Ordering::SeqCst),
            ..self.job.clone()
        }
    }
}

/// Registry of video jobs.
///
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc` and
/// shared through `AppState`. Jobs live in memory only.
pub struct VideoJobManager {
    jobs: RwLock<HashMap<String, JobEntry>>,
    shutdown: CancellationToken,
}

impl VideoJobManager {
    /// Every job's token is a child of `shutdown`.
    pub fn new(shutdown: CancellationToken) -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
            shutdown,
        }
    }

    /// Register a job and spawn its task.
    pub async fn submit(
        self: &Arc<Self>,
        media: Arc<dyn MediaGenerator>,
        request: VideoRequest,
        policy: PollPolicy,
    ) -> VideoJob {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();
        let job = VideoJob {
            id: id.clone(),
            prompt: request.prompt.clone(),
            status: JobStatus::Pending,
            operation_id: None,
            attempts: 0,
            video_uri: None,
            error: None,
            created_at: now,
            updated_at: now,
        };
        let cancel = self.shutdown.child_token();
        let attempts = Arc::new(AtomicU32::new(0));

        // The entry exists before the task can look for it.
        let mut jobs = self.jobs.write().await;
        jobs.insert(
            id.clone(),
            JobEntry {
                job: job.clone(),
                attempts: Arc::clone(&attempts),
                video: None,
                cancel: cancel.clone(),
                handle: None,
            },
        );
        let handle = tokio::spawn(Arc::clone(self).run(
            id.clone(),
            media,
            request,
            policy,
            cancel,
            attempts,
        ));
        if let Some(entry) = jobs.get_mut(&id) {
            entry.handle = Some(handle);
        }
        drop(jobs);

        tracing::info!(job_id = %id, "Video job submitted");
        job
    }

    pub async fn get(&self, id: &str) -> Option<VideoJob> {
        self.jobs.read().await.get(id).map(JobEntry::snapshot)
    }

    /// All jobs, newest first.
    pub async fn list(&self) -> Vec<VideoJob> {
        let mut jobs: Vec<VideoJob> = self
            .jobs
            .read()
            .await
            .values()
            .map(JobEntry::snapshot)
            .collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        jobs
    }

    /// The job and its video bytes, when it succeeded.
    pub async fn content(&self, id: &str) -> Option<(VideoJob, Option<Bytes>)> {
        self.jobs
            .read()
            .await
            .get(id)
            .map(|entry| (entry.snapshot(), entry.video.clone()))
    }

    /// Cancel a running job, or discard a finished one.
    ///
    /// Returns the job's final state, or `None` for an unknown ID.
    pub async fn cancel(&self, id: &str) -> Option<VideoJob> {
        let mut jobs = self.jobs.write().await;
        let entry = jobs.get_mut(id)?;

        if entry.job.status.is_terminal() {
            let entry = jobs.remove(id)?;
            tracing::info!(job_id = %id, "Video job discarded");
            return Some(entry.snapshot());
        }

        entry.cancel.cancel();
        entry.job.status = JobStatus::Cancelled;
        entry.job.updated_at = Utc::now();
        tracing::info!(job_id = %id, "Video job cancelled");
        Some(entry.snapshot())
    }

    /// Drop finished jobs whose last update is at least `retention` old.
    ///
    /// Returns how many jobs were removed. Running jobs are never touched.
    pub async fn purge_expired(&self, retention: Duration) -> usize {
        let Some(cutoff) = chrono::Duration::from_std(retention)
            .ok()
            .and_then(|age| Utc::now().checked_sub_signed(age))
        else {
            return 0;
        };

        let mut jobs = self.jobs.write().await;
        let before = jobs.len();
        jobs.retain(|_, entry| {
            !(entry.job.status.is_terminal() && entry.job.updated_at <= cutoff)
        });
        before - jobs.len()
    }

    /// Number of jobs that have not finished.
    pub async fn active_count(&self) -> usize {
        self.jobs
            .read()
            .await
            .values()
            .filter(|e| !e.job.status.is_terminal())
            .count()
    }

    /// Cancel every job and wait briefly for the tasks to exit.
    pub async fn shutdown_all(&self) {
        self.shutdown.cancel();
        let handles: Vec<JoinHandle<()>> = self
            .jobs
            .write()
            .await
            .values_mut()
            .filter_map(|e| e.handle.take())
            .collect();
        for handle in handles {
            let _ = tokio::time::timeout(SHUTDOWN_GRACE, handle).await;
        }
    }

    async fn run(
        self: Arc<Self>,
        id: String,
        media: Arc<dyn MediaGenerator>,
        request: VideoRequest,
        policy: PollPolicy,
        cancel: CancellationToken,
        attempts: Arc<AtomicU32>,
    ) {
        self.modify(&id, |entry| entry.job.status = JobStatus::Running)
            .await;

        let outcome = self
            .generate(&id, media.as_ref(), request, &policy, &cancel, &attempts)
            .await;

        match outcome {
            Ok((bytes, video_uri)) => {
                tracing::info!(job_id = %id, bytes = bytes.len(), "Video job succeeded");
                self.modify(&id, |entry| {
                    entry.job.status = JobStatus::Succeeded;
                    entry.job.video_uri = video_uri;
                    entry.video = Some(Bytes::from(bytes));
                })
                .await;
            }
            Err(PollError::Cancelled) => {
                tracing::info!(job_id = %id, "Video job stopped");
                self.modify(&id, |entry| entry.job.status = JobStatus::Cancelled)
                    .await;
            }
            Err(e) => {
                tracing::warn!(job_id = %id, error = %e, "Video job failed");
                let failure = failure_for(&e);
                self.modify(&id, |entry| {
                    entry.job.status = JobStatus::Failed;
                    entry.job.error = Some(failure);
                })
                .await;
            }
        }
    }

    async fn generate(
        &self,
        id: &str,
        media: &dyn MediaGenerator,
        request: VideoRequest,
        policy: &PollPolicy,
        cancel: &CancellationToken,
        attempts: &AtomicU32,
    ) -> Result<(Vec<u8>, Option<String>), PollError> {
        let operation = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(PollError::Cancelled),
            result = media.start_video(request) => result?,
        };
        let operation_id = operation.name.clone();
        self.modify(id, |entry| entry.job.operation_id = Some(operation_id))
            .await;

        let done = wait_for_video(media, operation, policy, cancel, |n| {
            attempts.store(n, Ordering::SeqCst)
        })
        .await?;
        let file = done.video()?.clone();

        let bytes = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(PollError::Cancelled),
            result = media.download_video(&file) => result?,
        };
        Ok((bytes, file.display_uri().map(str::to_string)))
    }

    /// Apply `f` to a job that has not reached a terminal state.
    async fn modify(&self, id: &str, f: impl FnOnce(&mut JobEntry)) {
        let mut jobs = self.jobs.write().await;
        if let Some(entry) = jobs.get_mut(id) {
            if entry.job.status.is_terminal() {
                return;
            }
            f(entry);
            entry.job.updated_at = Utc::now();
        }
    }
}

fn failure_for(err: &PollError) -> JobFailure {
    let (code, message) = match err {
        PollError::TimedOut { .. } => ("TIMEOUT", err.to_string()),
        PollError::Cancelled => ("CANCELLED", err.to_string()),
        PollError::Provider(provider) => match provider.quota() {
            Some(quota) => ("QUOTA_EXCEEDED", quota.message),
            None => match provider {
                GenAiError::NoVideo => ("NO_VIDEO", provider.to_string()),
                GenAiError::OperationFailed(msg) => ("VIDEO_FAILED", msg.clone()),
                GenAiError::Request(_) => ("PROVIDER_UNAVAILABLE", provider.to_string()),
                _ => ("PROVIDER_ERROR", provider.provider_message()),
            },
        },
    };
    JobFailure { code, message }
}
