use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::SqlitePool;

use crate::models::{Document, DocumentDraft};

#[derive(Debug, Clone)]
pub struct DocumentRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: i64,
    title: String,
    content: String,
    owner_id: i64,
    created_at: String,
    updated_at: String,
}

impl TryFrom<DocumentRow> for Document {
    type Error = sqlx::Error;

    fn try_from(row: DocumentRow) -> Result<Self, Self::Error> {
        Ok(Document {
            id: row.id,
            title: row.title,
            content: row.content,
            owner_id: row.owner_id,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, sqlx::Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

// Fixed-width so that lexical order in SQL matches chronological order.
fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl DocumentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Stores a new document owned by `owner_id`. Title and content are
    /// taken as given; identical drafts produce distinct documents.
    pub async fn create(
        &self,
        owner_id: i64,
        draft: &DocumentDraft,
    ) -> Result<Document, sqlx::Error> {
        let now = format_timestamp(Utc::now());

        let row: DocumentRow = sqlx::query_as(
            r#"
            INSERT INTO documents (title, content, owner_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, title, content, owner_id, created_at, updated_at
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.content)
        .bind(owner_id)
        .bind(&now)
        .bind(&now)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Document>, sqlx::Error> {
        let row: Option<DocumentRow> = sqlx::query_as("SELECT * FROM documents WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Document::try_from).transpose()
    }

    /// Documents owned by `owner_id`, oldest first.
    pub async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Document>, sqlx::Error> {
        let rows: Vec<DocumentRow> = sqlx::query_as(
            "SELECT * FROM documents WHERE owner_id = ? ORDER BY created_at, id",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Document::try_from).collect()
    }

    /// Replaces title and content in place. Concurrent writers are not
    /// detected: the last update wins.
    ///
    /// Fails with [`sqlx::Error::RowNotFound`] if the document is gone.
    pub async fn update(&self, id: i64, draft: &DocumentDraft) -> Result<Document, sqlx::Error> {
        let updated_at = format_timestamp(Utc::now());

        let row: Option<DocumentRow> = sqlx::query_as(
            r#"
            UPDATE documents
            SET title = ?, content = ?, updated_at = ?
            WHERE id = ?
            RETURNING id, title, content, owner_id, created_at, updated_at
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.content)
        .bind(&updated_at)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(sqlx::Error::RowNotFound)?.try_into()
    }
}
