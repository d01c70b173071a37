//! Credential checks and the actor's own profile.

use serde::Serialize;

use crate::db::UserRepository;
use crate::models::User;
use crate::service::{require_actor, ServiceError};

/// Looks up `username` exactly and checks `password` against its verifier.
///
/// Returns `None` for an unknown user or a wrong password; the two are not
/// distinguished. There is no lockout or rate limiting.
pub async fn authenticate(
    users: &UserRepository,
    username: &str,
    password: &str,
) -> Result<Option<User>, ServiceError> {
    let Some(user) = users.get_by_username(username).await? else {
        tracing::info!("Login failed for unknown user {:?}", username);
        return Ok(None);
    };

    // bcrypt is deliberately slow; keep it off the async workers
    let password = password.to_owned();
    let (user, valid) = tokio::task::spawn_blocking(move || {
        let valid = user.verify_password(&password);
        (user, valid)
    })
    .await?;

    if valid {
        tracing::info!("User {} logged in", user.username);
        Ok(Some(user))
    } else {
        tracing::info!("Login failed for {}: wrong password", user.username);
        Ok(None)
    }
}

/// Identity fields shown on the profile page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub id: i64,
    pub username: String,
    pub email: String,
}

impl From<&User> for Profile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

pub fn profile(actor: Option<&User>) -> Result<Profile, ServiceError> {
    require_actor(actor).map(Profile::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::{register, setup_store, TEST_PASSWORD};

    #[tokio::test]
    async fn test_authenticate_success() {
        let ctx = setup_store().await;
        let alice = register(&ctx.store, "alice").await;

        let user = authenticate(&ctx.store.users, "alice", TEST_PASSWORD)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.id, alice.id);
    }

    #[tokio::test]
    async fn test_authenticate_wrong_password() {
        let ctx = setup_store().await;
        register(&ctx.store, "alice").await;

        let user = authenticate(&ctx.store.users, "alice", "wrong")
            .await
            .unwrap();
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn test_authenticate_unknown_user() {
        let ctx = setup_store().await;

        let user = authenticate(&ctx.store.users, "ghost", TEST_PASSWORD)
            .await
            .unwrap();
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn test_authenticate_username_is_exact() {
        let ctx = setup_store().await;
        register(&ctx.store, "alice").await;

        let user = authenticate(&ctx.store.users, "ALICE", TEST_PASSWORD)
            .await
            .unwrap();
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn test_profile() {
        let ctx = setup_store().await;
        let alice = register(&ctx.store, "alice").await;

        let profile = profile(Some(&alice)).unwrap();
        assert_eq!(
            profile,
            Profile {
                id: alice.id,
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
            }
        );

        assert!(matches!(
            super::profile(None),
            Err(ServiceError::Unauthenticated)
        ));
    }
}
