use serde::Serialize;

/// View access to one document for one user, independent of ownership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct CollaborationGrant {
    pub id: i64,
    pub document_id: i64,
    pub user_id: i64,
}
