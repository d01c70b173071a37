use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::{Form, Json};
use serde::{Deserialize, Serialize};

use super::actor::CurrentActor;
use super::error::AppError;
use super::pages;
use super::session::{expired_cookie, session_cookie, token_from_headers};
use super::AppState;
use crate::identity;
use crate::models::DocumentDraft;

// ============================================================================
// Forms
// ============================================================================

// Missing fields deserialize as empty strings; nothing is validated.

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DocumentForm {
    pub title: String,
    pub content: String,
}

impl From<DocumentForm> for DocumentDraft {
    fn from(form: DocumentForm) -> Self {
        DocumentDraft::new(form.title, form.content)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ShareForm {
    pub username: String,
}

/// Parses a document id from the path. Anonymous requests are sent to log
/// in before a malformed id is reported as missing.
fn document_id(raw: &str, actor: &CurrentActor) -> Result<i64, AppError> {
    actor.require()?;
    raw.parse().map_err(|_| AppError::NotFound)
}

// ============================================================================
// Health
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============================================================================
// Session
// ============================================================================

pub async fn login_form(actor: CurrentActor) -> Response {
    if actor.user().is_some() {
        return Redirect::to("/").into_response();
    }
    pages::login(false).into_response()
}

pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    actor: CurrentActor,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    if actor.user().is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let users = &state.service.store().users;
    let Some(user) = identity::authenticate(users, &form.username, &form.password).await? else {
        return Ok(pages::login(true).into_response());
    };

    // A leftover token is replaced rather than reused
    if let Some(stale) = token_from_headers(&headers) {
        state.sessions.destroy(stale);
    }
    let expired = state.sessions.cleanup_expired();
    if expired > 0 {
        tracing::debug!("Removed {} expired session(s)", expired);
    }

    let token = state.sessions.create(user.id);
    let cookie = session_cookie(&token, state.sessions.ttl(), state.secure_cookies);
    Ok(([(header::SET_COOKIE, cookie)], Redirect::to("/")).into_response())
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = token_from_headers(&headers) {
        if state.sessions.destroy(token) {
            tracing::info!("Session ended by logout");
        }
    }
    (
        [(header::SET_COOKIE, expired_cookie(state.secure_cookies))],
        Redirect::to("/"),
    )
        .into_response()
}

// ============================================================================
// Documents
// ============================================================================

pub async fn index(
    State(state): State<AppState>,
    actor: CurrentActor,
) -> Result<Html<String>, AppError> {
    let user = actor.require()?;
    let documents = state.service.list_owned(Some(user)).await?;
    Ok(pages::index(user, &documents))
}

pub async fn create_form(actor: CurrentActor) -> Result<Html<String>, AppError> {
    let user = actor.require()?;
    Ok(pages::create_document(user))
}

pub async fn create(
    State(state): State<AppState>,
    actor: CurrentActor,
    Form(form): Form<DocumentForm>,
) -> Result<Redirect, AppError> {
    state.service.create(actor.user(), &form.into()).await?;
    Ok(Redirect::to("/"))
}

pub async fn view(
    State(state): State<AppState>,
    actor: CurrentActor,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let id = document_id(&id, &actor)?;
    let view = state.service.view(actor.user(), id).await?;
    Ok(pages::view_document(actor.require()?, &view))
}

pub async fn edit_form(
    State(state): State<AppState>,
    actor: CurrentActor,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let id = document_id(&id, &actor)?;
    let document = state.service.open_for_edit(actor.user(), id).await?;
    Ok(pages::edit_document(actor.require()?, &document))
}

pub async fn edit(
    State(state): State<AppState>,
    actor: CurrentActor,
    Path(id): Path<String>,
    Form(form): Form<DocumentForm>,
) -> Result<Redirect, AppError> {
    let id = document_id(&id, &actor)?;
    state.service.edit(actor.user(), id, &form.into()).await?;
    Ok(Redirect::to("/"))
}

pub async fn share_form(
    State(state): State<AppState>,
    actor: CurrentActor,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let id = document_id(&id, &actor)?;
    let document = state.service.open_for_share(actor.user(), id).await?;
    Ok(pages::share_document(actor.require()?, &document))
}

pub async fn share(
    State(state): State<AppState>,
    actor: CurrentActor,
    Path(id): Path<String>,
    Form(form): Form<ShareForm>,
) -> Result<Redirect, AppError> {
    let id = document_id(&id, &actor)?;
    // Same redirect whether or not the username existed
    state.service.share(actor.user(), id, &form.username).await?;
    Ok(Redirect::to("/"))
}

// ============================================================================
// Profile
// ============================================================================

pub async fn profile(actor: CurrentActor) -> Result<Html<String>, AppError> {
    let profile = identity::profile(actor.user())?;
    Ok(pages::profile(actor.require()?, &profile))
}

pub async fn fallback() -> (StatusCode, Html<String>) {
    (StatusCode::NOT_FOUND, pages::not_found())
}

#[cfg(test)]
mod tests {
    use crate::db::testing::{register, setup_store, TestStore};
    use crate::models::{DocumentDraft, User};
    use crate::server::{router, AppState, SessionStore};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use axum::Router;
    use tower::ServiceExt;

    struct TestApp {
        app: Router,
        alice: User,
        ctx: TestStore,
    }

    async fn setup() -> TestApp {
        let ctx = setup_store().await;
        let alice = register(&ctx.store, "alice").await;
        register(&ctx.store, "bob").await;
        register(&ctx.store, "carol").await;

        let state = AppState::new(ctx.store.clone(), SessionStore::new(60), false);
        TestApp {
            app: router(state),
            alice,
            ctx,
        }
    }

    impl TestApp {
        async fn send(&self, request: Request<Body>) -> Response {
            self.app.clone().oneshot(request).await.unwrap()
        }

        async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
            let mut builder = Request::builder().method("GET").uri(uri);
            if let Some(cookie) = cookie {
                builder = builder.header(header::COOKIE, cookie);
            }
            self.send(builder.body(Body::empty()).unwrap()).await
        }

        async fn post(&self, uri: &str, cookie: Option<&str>, form: &str) -> Response {
            let mut builder = Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
            if let Some(cookie) = cookie {
                builder = builder.header(header::COOKIE, cookie);
            }
            self.send(builder.body(Body::from(form.to_string())).unwrap())
                .await
        }

        /// Logs in and returns the `Cookie` header value for the session.
        async fn login(&self, username: &str) -> String {
            let form = format!("username={}&password=correct+horse", username);
            let response = self.post("/login", None, &form).await;
            assert_eq!(response.status(), StatusCode::SEE_OTHER);

            let set_cookie = response
                .headers()
                .get(header::SET_COOKIE)
                .unwrap()
                .to_str()
                .unwrap();
            set_cookie.split(';').next().unwrap().to_string()
        }

        async fn create_notes(&self, cookie: &str) -> i64 {
            let response = self
                .post(
                    "/documents/create",
                    Some(cookie),
                    "title=Notes&content=draft+text",
                )
                .await;
            assert_redirect(&response, "/");

            let docs = self
                .ctx
                .store
                .documents
                .list_by_owner(self.alice.id)
                .await
                .unwrap();
            docs.last().unwrap().id
        }
    }

    fn assert_redirect(response: &Response, to: &str) {
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response
                .headers()
                .get(header::LOCATION)
                .and_then(|v| v.to_str().ok()),
            Some(to)
        );
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let t = setup().await;
        let response = t.get("/health", None).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_anonymous_requests_redirect_to_login() {
        let t = setup().await;

        for uri in [
            "/",
            "/profile",
            "/documents/create",
            "/documents/1",
            "/documents/1/edit",
            "/documents/1/share",
            "/documents/999",
            "/documents/not-a-number",
        ] {
            let response = t.get(uri, None).await;
            assert_redirect(&response, "/login");
        }

        let response = t
            .post("/documents/create", None, "title=x&content=y")
            .await;
        assert_redirect(&response, "/login");
        assert!(t
            .ctx
            .store
            .documents
            .list_by_owner(t.alice.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_login_form() {
        let t = setup().await;
        let response = t.get("/login", None).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains(r#"action="/login""#));
    }

    #[tokio::test]
    async fn test_login_failure_rerenders_form() {
        let t = setup().await;

        for form in [
            "username=alice&password=wrong",
            "username=ghost&password=correct+horse",
            "",
        ] {
            let response = t.post("/login", None, form).await;
            assert_eq!(response.status(), StatusCode::OK);
            assert!(response.headers().get(header::SET_COOKIE).is_none());
            assert!(body_text(response)
                .await
                .contains("Invalid username or password."));
        }
    }

    #[tokio::test]
    async fn test_login_then_list_documents() {
        let t = setup().await;
        let cookie = t.login("alice").await;

        let response = t.get("/", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("No documents yet."));

        // Already logged in
        assert_redirect(&t.get("/login", Some(&cookie)).await, "/");
    }

    #[tokio::test]
    async fn test_logout_ends_session() {
        let t = setup().await;
        let cookie = t.login("alice").await;

        let response = t.get("/logout", Some(&cookie)).await;
        assert_redirect(&response, "/");
        let cleared = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(cleared.contains("Max-Age=0"));

        assert_redirect(&t.get("/", Some(&cookie)).await, "/login");

        // Logging out again is harmless
        assert_redirect(&t.post("/logout", Some(&cookie), "").await, "/");
    }

    #[tokio::test]
    async fn test_forged_cookie_is_anonymous() {
        let t = setup().await;
        let response = t.get("/", Some("docshare_session=forged")).await;
        assert_redirect(&response, "/login");
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let t = setup().await;
        let cookie = t.login("alice").await;

        let response = t.get("/documents/create", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let id = t.create_notes(&cookie).await;

        let body = body_text(t.get("/", Some(&cookie)).await).await;
        assert!(body.contains(&format!(r#"<a href="/documents/{}">Notes</a>"#, id)));
    }

    #[tokio::test]
    async fn test_create_accepts_missing_fields() {
        let t = setup().await;
        let cookie = t.login("alice").await;

        let response = t.post("/documents/create", Some(&cookie), "").await;
        assert_redirect(&response, "/");

        let docs = t
            .ctx
            .store
            .documents
            .list_by_owner(t.alice.id)
            .await
            .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].title, "");
        assert_eq!(docs[0].content, "");
    }

    #[tokio::test]
    async fn test_alice_shares_notes_with_bob() {
        let t = setup().await;
        let alice = t.login("alice").await;
        let bob = t.login("bob").await;
        let carol = t.login("carol").await;

        let id = t.create_notes(&alice).await;
        let view = format!("/documents/{}", id);
        let edit = format!("/documents/{}/edit", id);
        let share = format!("/documents/{}/share", id);

        // Before sharing bob is turned away
        assert_redirect(&t.get(&view, Some(&bob)).await, "/");

        assert_eq!(
            t.get(&share, Some(&alice)).await.status(),
            StatusCode::OK
        );
        assert_redirect(&t.post(&share, Some(&alice), "username=bob").await, "/");

        let response = t.get(&view, Some(&bob)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("Notes"));
        assert!(body.contains("draft text"));
        assert!(body.contains("Owner: alice"));

        // bob can neither edit nor reshare
        assert_redirect(&t.get(&edit, Some(&bob)).await, "/");
        assert_redirect(
            &t.post(&edit, Some(&bob), "title=Hijacked&content=gone")
                .await,
            "/",
        );
        assert_redirect(&t.get(&share, Some(&bob)).await, "/");
        assert_redirect(&t.post(&share, Some(&bob), "username=carol").await, "/");
        assert_redirect(&t.get(&view, Some(&carol)).await, "/");

        let doc = t.ctx.store.documents.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(doc.title, "Notes");
        assert_eq!(doc.content, "draft text");

        // bob's list only shows what he owns
        let body = body_text(t.get("/", Some(&bob)).await).await;
        assert!(!body.contains("Notes"));
    }

    #[tokio::test]
    async fn test_owner_edit_round_trip() {
        let t = setup().await;
        let cookie = t.login("alice").await;
        let id = t.create_notes(&cookie).await;
        let edit = format!("/documents/{}/edit", id);

        let body = body_text(t.get(&edit, Some(&cookie)).await).await;
        assert!(body.contains(r#"value="Notes""#));
        assert!(body.contains(">draft text</textarea>"));

        let response = t
            .post(&edit, Some(&cookie), "title=Final&content=final+text")
            .await;
        assert_redirect(&response, "/");

        let body = body_text(t.get(&format!("/documents/{}", id), Some(&cookie)).await).await;
        assert!(body.contains("<h1>Final</h1>"));
        assert!(body.contains("<pre>final text</pre>"));
    }

    #[tokio::test]
    async fn test_share_with_unknown_user() {
        let t = setup().await;
        let cookie = t.login("alice").await;
        let id = t.create_notes(&cookie).await;

        let response = t
            .post(
                &format!("/documents/{}/share", id),
                Some(&cookie),
                "username=ghost",
            )
            .await;
        assert_redirect(&response, "/");

        assert!(t
            .ctx
            .store
            .grants
            .list_for_document(id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_unknown_document_is_not_found() {
        let t = setup().await;
        let cookie = t.login("alice").await;

        for uri in [
            "/documents/999",
            "/documents/999/edit",
            "/documents/999/share",
            "/documents/abc",
            "/documents/abc/edit",
        ] {
            let response = t.get(uri, Some(&cookie)).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
        }

        let response = t
            .post("/documents/999/edit", Some(&cookie), "title=x&content=y")
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let response = t
            .post("/documents/999/share", Some(&cookie), "username=bob")
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_profile() {
        let t = setup().await;
        let cookie = t.login("alice").await;

        let response = t.get("/profile", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("<dd>alice</dd>"));
        assert!(body.contains("<dd>alice@example.com</dd>"));
    }

    #[tokio::test]
    async fn test_titles_are_escaped() {
        let t = setup().await;
        let cookie = t.login("alice").await;
        t.ctx
            .store
            .documents
            .create(
                t.alice.id,
                &DocumentDraft::new("<script>x</script>", "a & b"),
            )
            .await
            .unwrap();

        let body = body_text(t.get("/", Some(&cookie)).await).await;
        assert!(body.contains("&lt;script&gt;x&lt;/script&gt;"));
        assert!(!body.contains("<script>"));
    }

    #[tokio::test]
    async fn test_deleted_user_session_is_dropped() {
        let t = setup().await;
        let cookie = t.login("carol").await;
        let carol = t
            .ctx
            .store
            .users
            .get_by_username("carol")
            .await
            .unwrap()
            .unwrap();

        t.ctx.store.users.delete(carol.id).await.unwrap();

        assert_redirect(&t.get("/", Some(&cookie)).await, "/login");
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let t = setup().await;
        let response = t.get("/nope", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
