use sqlx::SqlitePool;

use crate::models::{CollaborationGrant, User};

/// The collaboration index: which users may view which documents besides
/// their owners.
#[derive(Debug, Clone)]
pub struct GrantRepository {
    pool: SqlitePool,
}

impl GrantRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Records a grant. Granting the same pair twice stores two rows.
    pub async fn create(
        &self,
        document_id: i64,
        user_id: i64,
    ) -> Result<CollaborationGrant, sqlx::Error> {
        sqlx::query_as(
            r#"
            INSERT INTO document_collaborators (document_id, user_id)
            VALUES (?, ?)
            RETURNING id, document_id, user_id
            "#,
        )
        .bind(document_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
    }

    /// True if `user_id` holds at least one grant on `document_id`.
    pub async fn exists(&self, document_id: i64, user_id: i64) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM document_collaborators
                WHERE document_id = ? AND user_id = ?
            )
            "#,
        )
        .bind(document_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn list_for_document(
        &self,
        document_id: i64,
    ) -> Result<Vec<CollaborationGrant>, sqlx::Error> {
        sqlx::query_as(
            "SELECT id, document_id, user_id FROM document_collaborators WHERE document_id = ? ORDER BY id",
        )
        .bind(document_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Distinct users granted access to `document_id`, by username.
    pub async fn collaborators(&self, document_id: i64) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT DISTINCT u.id, u.username, u.email, u.password_hash
            FROM users u
            JOIN document_collaborators dc ON dc.user_id = u.id
            WHERE dc.document_id = ?
            ORDER BY u.username
            "#,
        )
        .bind(document_id)
        .fetch_all(&self.pool)
        .await
    }
}
