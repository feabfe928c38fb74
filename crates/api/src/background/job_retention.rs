//! Periodic eviction of finished video jobs.
//!
//! Finished jobs hold their MP4 bytes in memory. This task drops jobs that
//! reached a terminal state longer ago than the retention period. Runs on a
//! fixed interval using `tokio::time::interval`.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::VideoJobManager;

/// How often the cleanup job runs.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(600); // 10 minutes

/// Run the video job retention loop.
///
/// The first sweep happens immediately. Runs until `cancel` is triggered.
pub async fn run(manager: Arc<VideoJobManager>, retention: Duration, cancel: CancellationToken) {
    tracing::info!(
        retention_secs = retention.as_secs(),
        interval_secs = CLEANUP_INTERVAL.as_secs(),
        "Video job retention started"
    );

    let mut interval = tokio::time::interval(CLEANUP_INTERVAL);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!("Video job retention stopping");
                break;
            }
            _ = interval.tick() => {
                let purged = manager.purge_expired(retention).await;
                if purged > 0 {
                    tracing::info!(purged, "Video job retention: evicted finished jobs");
                } else {
                    tracing::debug!("Video job retention: nothing to evict");
                }
            }
        }
    }
}
