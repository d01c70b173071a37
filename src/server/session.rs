//! Login sessions.
//!
//! Sessions are held in memory and expire after a configurable time. A
//! session token travels in the `docshare_session` cookie; the server maps
//! it to a user id. Restarting the server logs everyone out.

use axum::http::{header, HeaderMap};
use rand::Rng;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

pub const SESSION_COOKIE: &str = "docshare_session";

/// Data associated with a session token.
#[derive(Debug, Clone)]
pub struct Session {
    /// User the session was issued to.
    pub user_id: i64,
    /// When the session expires.
    pub expires_at: Instant,
}

/// In-memory session store with expiry.
///
/// Thread-safe via internal RwLock.
#[derive(Debug)]
pub struct SessionStore {
    /// Sessions indexed by token string.
    sessions: RwLock<HashMap<String, Session>>,
    /// Lifetime of a new session.
    ttl: Duration,
}

impl SessionStore {
    /// Creates a new session store with the specified lifetime in minutes.
    ///
    /// Lifetimes too large to represent are clamped.
    pub fn new(ttl_minutes: u64) -> Self {
        Self::with_ttl(Duration::from_secs(ttl_minutes.saturating_mul(60)))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Starts a session for `user_id`.
    ///
    /// Returns the token string (32 bytes, base64url encoded).
    pub fn create(&self, user_id: i64) -> String {
        let token = generate_token();
        let expires_at = Instant::now()
            .checked_add(self.ttl)
            .unwrap_or_else(far_future);

        let session = Session {
            user_id,
            expires_at,
        };

        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(token.clone(), session);

        token
    }

    /// Returns the user bound to `token`.
    ///
    /// An expired session is removed and yields `None`.
    pub fn resolve(&self, token: &str) -> Option<i64> {
        let now = Instant::now();
        {
            let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
            match sessions.get(token) {
                Some(session) if now <= session.expires_at => return Some(session.user_id),
                Some(_) => {}
                None => return None,
            }
        }

        self.destroy(token);
        None
    }

    /// Ends a session. Returns false if the token was unknown.
    pub fn destroy(&self, token: &str) -> bool {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(token)
            .is_some()
    }

    /// Removes all expired sessions.
    ///
    /// Returns the number of sessions removed.
    pub fn cleanup_expired(&self) -> usize {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();

        let before = sessions.len();
        sessions.retain(|_, session| session.expires_at > now);
        before - sessions.len()
    }

    /// Returns the number of sessions currently stored.
    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An instant no session will outlive (about 30 years out).
fn far_future() -> Instant {
    let now = Instant::now();
    now.checked_add(Duration::from_secs(30 * 365 * 24 * 60 * 60))
        .unwrap_or(now)
}

/// Generates a secure random token.
///
/// Returns 32 random bytes encoded as base64url (no padding).
fn generate_token() -> String {
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Finds the session token in the request's `Cookie` headers.
pub fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value)
}

/// `Set-Cookie` value that stores `token` for `max_age`.
pub fn session_cookie(token: &str, max_age: Duration, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        token,
        max_age.as_secs()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that makes the browser drop the session cookie.
pub fn expired_cookie(secure: bool) -> String {
    session_cookie("", Duration::ZERO, secure)
}
