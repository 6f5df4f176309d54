use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use kennel_core::errors::{ErrorKind, KennelError};

/// Every REST handler fails through this type, so pipeline errors turn into
/// responses in exactly one place.
///
/// - `NotFound` renders as `204 No Content` with an empty body
/// - other `KennelError`s keep their status with `{message}` or `{errors}`
/// - anything else is a `500` general error
#[derive(Debug)]
pub struct KennelAxumError(pub anyhow::Error);

impl From<anyhow::Error> for KennelAxumError {
    fn from(e: anyhow::Error) -> Self {
        Self(e)
    }
}

impl From<KennelError> for KennelAxumError {
    fn from(e: KennelError) -> Self {
        Self(e.into_anyhow())
    }
}

impl IntoResponse for KennelAxumError {
    fn into_response(self) -> Response {
        let kennel = KennelError::normalize(self.0);

        if kennel.kind == ErrorKind::NotFound {
            return StatusCode::NO_CONTENT.into_response();
        }

        let safe = kennel.sanitize_for_client();
        let status =
            StatusCode::from_u16(safe.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(safe.to_json())).into_response()
    }
}
