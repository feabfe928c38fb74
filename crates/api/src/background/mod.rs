//! Background tasks.
//!
//! Tasks are spawned via `tokio::spawn` and observe a [`CancellationToken`]
//! derived from the server's shutdown token.
//!
//! [`CancellationToken`]: tokio_util::sync::CancellationToken

pub mod job_retention;
pub mod video_jobs;

pub use video_jobs::{JobStatus, VideoJob, VideoJobManager};
