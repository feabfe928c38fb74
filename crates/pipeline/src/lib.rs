//! Recommendation pipeline: turns the latest capture and preferences into
//! a text recommendation and an outfit photo.

pub mod recommendation;

pub use recommendation::{
    sniff_image_mime, GeneratedPhoto, PipelineError, Recommendation, Recommender,
};
