use serde::Serialize;
use std::fmt;

/// A registered account.
///
/// `password_hash` is a bcrypt verifier; the plaintext password is never
/// stored or kept in memory past the call that hashes or checks it.
#[derive(Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

impl User {
    /// Checks a candidate password against the stored verifier.
    ///
    /// A malformed verifier never matches.
    pub fn verify_password(&self, password: &str) -> bool {
        match bcrypt::verify(password, &self.password_hash) {
            Ok(valid) => valid,
            Err(e) => {
                tracing::warn!("Unusable password hash for user {}: {}", self.username, e);
                false
            }
        }
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.username, self.email)
    }
}

/// Fields needed to register a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

impl NewUser {
    /// Hashes `password` with the given bcrypt cost.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: &str,
        cost: u32,
    ) -> Result<Self, PasswordError> {
        Ok(Self {
            username: username.into(),
            email: email.into(),
            password_hash: hash_password(password, cost)?,
        })
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Failed to hash password: {0}")]
pub struct PasswordError(#[from] bcrypt::BcryptError);

pub fn hash_password(password: &str, cost: u32) -> Result<String, PasswordError> {
    Ok(bcrypt::hash(password, cost)?)
}
