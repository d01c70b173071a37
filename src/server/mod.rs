//! HTTP surface of the editor.
//!
//! # Endpoints
//!
//! - `GET /health`: health check
//! - `GET|POST /login`, `GET|POST /logout`
//! - `GET /`: the actor's own documents
//! - `GET|POST /documents/create`
//! - `GET /documents/{id}`
//! - `GET|POST /documents/{id}/edit`
//! - `GET|POST /documents/{id}/share`
//! - `GET /profile`

pub mod actor;
pub mod error;
pub mod handlers;
pub mod pages;
pub mod session;

pub use actor::{resolve_actor, CurrentActor};
pub use error::AppError;
pub use session::SessionStore;

use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::Store;
use crate::service::DocumentService;

/// Application state shared across handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub service: DocumentService,
    pub sessions: Arc<SessionStore>,
    pub secure_cookies: bool,
}

impl AppState {
    pub fn new(store: Store, sessions: SessionStore, secure_cookies: bool) -> Self {
        Self {
            service: DocumentService::new(store),
            sessions: Arc::new(sessions),
            secure_cookies,
        }
    }

    pub fn from_config(store: Store, config: &Config) -> Self {
        Self::new(
            store,
            SessionStore::new(config.session_ttl_minutes.value),
            config.secure_cookies.value,
        )
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/login", get(handlers::login_form).post(handlers::login))
        .route("/logout", get(handlers::logout).post(handlers::logout))
        .route("/", get(handlers::index))
        .route(
            "/documents/create",
            get(handlers::create_form).post(handlers::create),
        )
        .route("/documents/{id}", get(handlers::view))
        .route(
            "/documents/{id}/edit",
            get(handlers::edit_form).post(handlers::edit),
        )
        .route(
            "/documents/{id}/share",
            get(handlers::share_form).post(handlers::share),
        )
        .route("/profile", get(handlers::profile))
        .fallback(handlers::fallback)
        .with_state(state)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}
