//! Generative media provider adapter.
//!
//! Text, image (generate and edit) and video generation against the Gemini
//! REST API, behind the [`MediaGenerator`] trait so callers can be tested
//! with fakes.

pub mod api;
pub mod error;
pub mod generator;
pub mod messages;
pub mod video;

pub use api::GeminiApi;
pub use error::{GenAiError, QuotaDetails};
pub use generator::{MediaGenerator, ModelConfig, PHOTO_ASPECT_RATIO, PHOTO_IMAGE_SIZE};
pub use video::{wait_for_video, PollError, PollPolicy};
