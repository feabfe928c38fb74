//! Route definitions for background video jobs.
//!
//! Mounted at `/api/video-jobs`.
//!
//! ```text
//! GET    /                list_jobs
//! POST   /                submit_job
//! GET    /{id}            get_job
//! DELETE /{id}            cancel_job
//! GET    /{id}/content    job_content
//! ```

use axum::routing::get;
use axum::Router;

use crate::handlers::video_jobs;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(video_jobs::list_jobs).post(video_jobs::submit_job))
        .route(
            "/{id}",
            get(video_jobs::get_job).delete(video_jobs::cancel_job),
        )
        .route("/{id}/content", get(video_jobs::job_content))
}
