//! Realtime style analysis of short video clips.
//!
//! Provides the session frame types, the WebSocket client and the
//! interpretation of free-text results into style verdicts.

pub mod client;
pub mod messages;
pub mod verdict;

pub use client::{OvershootAnalyzer, StyleAnalyzer, VideoClip, VisionError};
pub use verdict::StyleVerdict;
