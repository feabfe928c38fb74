//! Request extractors with JSON error responses.

use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use silhouette_core::error::CoreError;

use crate::error::AppError;

/// `Json<T>` whose rejection is an [`AppError`], so malformed bodies get the
/// same `{ "error", "code" }` shape as every other failure.
///
/// ```ignore
/// async fn create(AppJson(input): AppJson<CreateItem>) -> AppResult<...>
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::Core(CoreError::Validation(rejection.body_text())))?;
        Ok(Self(value))
    }
}
