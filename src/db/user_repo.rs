use sqlx::SqlitePool;

use crate::models::{NewUser, User};

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts a user. Duplicate usernames or emails fail with a unique
    /// constraint violation from the database.
    pub async fn create(&self, user: &NewUser) -> Result<User, sqlx::Error> {
        sqlx::query_as(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES (?, ?, ?)
            RETURNING id, username, email, password_hash
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as("SELECT id, username, email, password_hash FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Exact, case-sensitive lookup.
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as("SELECT id, username, email, password_hash FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as("SELECT id, username, email, password_hash FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn list(&self) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as("SELECT id, username, email, password_hash FROM users ORDER BY username")
            .fetch_all(&self.pool)
            .await
    }

    /// Deletes a user along with their documents and every grant that
    /// references either. Returns false if no such user existed.
    pub async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        // CASCADE handles documents and document_collaborators
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
