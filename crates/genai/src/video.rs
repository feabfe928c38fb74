//! Polling a long-running video operation to completion.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::GenAiError;
use crate::generator::MediaGenerator;
use crate::messages::VideoOperation;

/// How often, and how many times, to check a pending operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// Maximum number of status checks.
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            max_attempts: 60,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("Video generation timed out after {attempts} status checks")]
    TimedOut { operation_id: String, attempts: u32 },

    #[error("Video generation cancelled")]
    Cancelled,

    #[error(transparent)]
    Provider(#[from] GenAiError),
}

/// Poll `operation` until it reports `done`.
///
/// Sleeps `policy.interval` before each status check. An operation that is
/// still pending after `policy.max_attempts` checks yields
/// [`PollError::TimedOut`]. `on_attempt` is called with the 1-based attempt
/// number before each check.
pub async fn wait_for_video<F>(
    generator: &dyn MediaGenerator,
    mut operation: VideoOperation,
    policy: &PollPolicy,
    cancel: &CancellationToken,
    mut on_attempt: F,
) -> Result<VideoOperation, PollError>
where
    F: FnMut(u32) + Send,
{
    let mut attempts = 0u32;

    while !operation.done && attempts < policy.max_attempts {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!(operation = %operation.name, attempts, "Video polling cancelled");
                return Err(PollError::Cancelled);
            }
            _ = tokio::time::sleep(policy.interval) => {}
        }

        attempts += 1;
        on_attempt(attempts);
        tracing::debug!(operation = %operation.name, attempt = attempts, "Checking video status");

        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(PollError::Cancelled),
            result = generator.video_status(&operation) => result?,
        };
        operation = next;
    }

    if !operation.done {
        tracing::warn!(operation = %operation.name, attempts, "Video generation timed out");
        return Err(PollError::TimedOut {
            operation_id: operation.name,
            attempts,
        });
    }

    tracing::info!(operation = %operation.name, attempts, "Video generation finished");
    Ok(operation)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use assert_matches::assert_matches;
    use async_trait::async_trait;

    use super::*;
    use crate::messages::{
        GenerateContentResponse, ImageRequest, TextRequest, VideoFile, VideoRequest,
    };

    /// Reports `done` on the status check numbered `done_at` (1-based).
    struct CountingGenerator {
        done_at: Option<u32>,
        checks: AtomicU32,
    }

    impl CountingGenerator {
        fn new(done_at: Option<u32>) -> Self {
            Self {
                done_at,
                checks: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl MediaGenerator for CountingGenerator {
        async fn generate_text(
            &self,
            _req: TextRequest,
        ) -> Result<GenerateContentResponse, GenAiError> {
            unimplemented!()
        }

        async fn generate_image(
            &self,
            _req: ImageRequest,
        ) -> Result<GenerateContentResponse, GenAiError> {
            unimplemented!()
        }

        async fn start_video(&self, _req: VideoRequest) -> Result<VideoOperation, GenAiError> {
            unimplemented!()
        }

        async fn video_status(
            &self,
            operation: &VideoOperation,
        ) -> Result<VideoOperation, GenAiError> {
            let n = self.checks.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(VideoOperation {
                name: operation.name.clone(),
                done: self.done_at == Some(n),
                ..Default::default()
            })
        }

        async fn download_video(&self, _file: &VideoFile) -> Result<Vec<u8>, GenAiError> {
            unimplemented!()
        }
    }

    fn pending() -> VideoOperation {
        VideoOperation {
            name: "operations/abc".into(),
            ..Default::default()
        }
    }

    fn fast() -> PollPolicy {
        PollPolicy {
            interval: Duration::ZERO,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn finishes_after_n_plus_one_checks() {
        for pending_checks in [0u32, 1, 5, 59] {
            let generator = CountingGenerator::new(Some(pending_checks + 1));
            let mut seen = Vec::new();
            let op = wait_for_video(
                &generator,
                pending(),
                &fast(),
                &CancellationToken::new(),
                |n| seen.push(n),
            )
            .await
            .unwrap();

            assert!(op.done);
            assert_eq!(generator.checks.load(Ordering::SeqCst), pending_checks + 1);
            assert_eq!(seen.len() as u32, pending_checks + 1);
        }
    }

    #[tokio::test]
    async fn already_done_operation_is_not_polled() {
        let generator = CountingGenerator::new(None);
        let op = VideoOperation {
            done: true,
            ..pending()
        };
        wait_for_video(&generator, op, &fast(), &CancellationToken::new(), |_| {})
            .await
            .unwrap();
        assert_eq!(generator.checks.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn times_out_after_max_attempts() {
        let generator = CountingGenerator::new(None);
        let result = wait_for_video(
            &generator,
            pending(),
            &fast(),
            &CancellationToken::new(),
            |_| {},
        )
        .await;

        assert_matches!(
            result,
            Err(PollError::TimedOut { operation_id, attempts: 60 }) if operation_id == "operations/abc"
        );
        assert_eq!(generator.checks.load(Ordering::SeqCst), 60);
    }

    #[tokio::test]
    async fn cancellation_stops_polling() {
        let generator = CountingGenerator::new(None);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let policy = PollPolicy {
            interval: Duration::from_secs(3600),
            max_attempts: 60,
        };

        let result = wait_for_video(&generator, pending(), &policy, &cancel, |_| {}).await;
        assert_matches!(result, Err(PollError::Cancelled));
        assert_eq!(generator.checks.load(Ordering::SeqCst), 0);
    }
}
