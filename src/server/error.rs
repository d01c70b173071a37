use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};

use super::pages;
use crate::service::ServiceError;

/// Errors a handler can end with, and how each one reaches the browser.
///
/// - unauthenticated: redirect to `/login`
/// - forbidden: redirect to `/`, the same as a successful action
/// - missing document: 404 page
/// - anything else: logged, generic 500 page
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// A path that cannot name a document (e.g. a non-numeric id).
    #[error("no such page")]
    NotFound,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Service(ServiceError::Unauthenticated) => {
                Redirect::to("/login").into_response()
            }
            AppError::Service(ServiceError::Forbidden { .. }) => Redirect::to("/").into_response(),
            AppError::Service(ServiceError::NotFound(_)) | AppError::NotFound => {
                (StatusCode::NOT_FOUND, pages::not_found()).into_response()
            }
            AppError::Service(e) => {
                tracing::error!("Request failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, pages::internal_error()).into_response()
            }
        }
    }
}
