pub mod analysis;
pub mod capture;
pub mod items;
pub mod media;
pub mod preferences;
pub mod recommendation;
pub mod video_jobs;
