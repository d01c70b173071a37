//! Resolving the current actor from the request's session cookie.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use super::error::AppError;
use super::session::token_from_headers;
use super::AppState;
use crate::models::User;
use crate::service::ServiceError;

/// The user bound to the request's session, if any.
///
/// A missing, unknown or expired session and a session whose user has since
/// been deleted all resolve to `None`.
pub async fn resolve_actor(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Option<User>, ServiceError> {
    let Some(token) = token_from_headers(headers) else {
        return Ok(None);
    };
    let Some(user_id) = state.sessions.resolve(token) else {
        return Ok(None);
    };

    let user = state.service.store().users.get_by_id(user_id).await?;
    if user.is_none() {
        tracing::info!("Dropping session for deleted user {}", user_id);
        state.sessions.destroy(token);
    }
    Ok(user)
}

/// Extractor form of [`resolve_actor`]. Never rejects for lack of a session;
/// handlers hand the `Option` to the service layer, which decides.
#[derive(Debug, Clone)]
pub struct CurrentActor(pub Option<User>);

impl CurrentActor {
    pub fn user(&self) -> Option<&User> {
        self.0.as_ref()
    }

    /// The actor, or [`ServiceError::Unauthenticated`] for anonymous requests.
    pub fn require(&self) -> Result<&User, ServiceError> {
        self.0.as_ref().ok_or(ServiceError::Unauthenticated)
    }
}

impl FromRequestParts<AppState> for CurrentActor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(CurrentActor(resolve_actor(state, &parts.headers).await?))
    }
}
