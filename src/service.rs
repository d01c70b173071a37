//! Document operations with access control applied.
//!
//! Every operation takes the current actor as `Option<&User>`; `None` means
//! the request carried no valid session. Checks happen in a fixed order:
//! authentication, then existence, then permission.

use crate::access::{permits, Operation, Relationship};
use crate::db::Store;
use crate::models::{CollaborationGrant, Document, DocumentDraft, User};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("document {0} not found")]
    NotFound(i64),

    #[error("not permitted to {operation} document {document_id}")]
    Forbidden {
        operation: Operation,
        document_id: i64,
    },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("password check did not complete: {0}")]
    PasswordCheck(#[from] tokio::task::JoinError),
}

/// Everything a reader of a document gets to see.
#[derive(Debug, Clone)]
pub struct DocumentView {
    pub document: Document,
    pub owner: User,
    pub collaborators: Vec<User>,
}

/// Result of a share request. An unknown username is not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    Granted(CollaborationGrant),
    UnknownUser,
}

#[derive(Debug, Clone)]
pub struct DocumentService {
    store: Store,
}

impl DocumentService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Documents the actor owns. Shared documents are not listed.
    pub async fn list_owned(&self, actor: Option<&User>) -> Result<Vec<Document>, ServiceError> {
        let actor = require_actor(actor)?;
        Ok(self.store.documents.list_by_owner(actor.id).await?)
    }

    pub async fn create(
        &self,
        actor: Option<&User>,
        draft: &DocumentDraft,
    ) -> Result<Document, ServiceError> {
        let actor = require_actor(actor)?;
        let document = self.store.documents.create(actor.id, draft).await?;
        tracing::info!("{} created document {}", actor.username, document.id);
        Ok(document)
    }

    /// Loads a document for the edit form.
    pub async fn open_for_edit(
        &self,
        actor: Option<&User>,
        id: i64,
    ) -> Result<Document, ServiceError> {
        let (_, document) = self.authorized(actor, id, Operation::Edit).await?;
        Ok(document)
    }

    /// Overwrites title and content.
    pub async fn edit(
        &self,
        actor: Option<&User>,
        id: i64,
        draft: &DocumentDraft,
    ) -> Result<Document, ServiceError> {
        let (actor, _) = self.authorized(actor, id, Operation::Edit).await?;

        let document = match self.store.documents.update(id, draft).await {
            Ok(document) => document,
            Err(sqlx::Error::RowNotFound) => return Err(ServiceError::NotFound(id)),
            Err(e) => return Err(e.into()),
        };
        tracing::info!("{} edited document {}", actor.username, id);
        Ok(document)
    }

    /// Loads a document for the share form.
    pub async fn open_for_share(
        &self,
        actor: Option<&User>,
        id: i64,
    ) -> Result<Document, ServiceError> {
        let (_, document) = self.authorized(actor, id, Operation::Share).await?;
        Ok(document)
    }

    /// Grants `username` view access. Sharing with a name nobody has is a
    /// silent no-op; sharing twice with the same user records a second grant.
    pub async fn share(
        &self,
        actor: Option<&User>,
        id: i64,
        username: &str,
    ) -> Result<ShareOutcome, ServiceError> {
        let (actor, document) = self.authorized(actor, id, Operation::Share).await?;

        let Some(grantee) = self.store.users.get_by_username(username).await? else {
            tracing::info!(
                "{} shared document {} with unknown user {:?}; ignoring",
                actor.username,
                id,
                username
            );
            return Ok(ShareOutcome::UnknownUser);
        };

        let grant = self.store.grants.create(document.id, grantee.id).await?;
        tracing::info!(
            "{} shared document {} with {}",
            actor.username,
            id,
            grantee.username
        );
        Ok(ShareOutcome::Granted(grant))
    }

    pub async fn view(&self, actor: Option<&User>, id: i64) -> Result<DocumentView, ServiceError> {
        let (actor, document) = self.authorized(actor, id, Operation::View).await?;

        let owner = if document.is_owned_by(actor.id) {
            actor.clone()
        } else {
            self.store
                .users
                .get_by_id(document.owner_id)
                .await?
                .ok_or(ServiceError::NotFound(id))?
        };
        let collaborators = self.store.grants.collaborators(document.id).await?;

        Ok(DocumentView {
            document,
            owner,
            collaborators,
        })
    }

    async fn authorized<'a>(
        &self,
        actor: Option<&'a User>,
        id: i64,
        operation: Operation,
    ) -> Result<(&'a User, Document), ServiceError> {
        let actor = require_actor(actor)?;

        let document = self
            .store
            .documents
            .get_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound(id))?;

        // Grants are only consulted when they could change the answer
        let is_collaborator = !document.is_owned_by(actor.id)
            && operation.open_to_collaborators()
            && self.store.grants.exists(document.id, actor.id).await?;

        let relationship = Relationship::of(actor.id, &document, is_collaborator);
        if !permits(relationship, operation) {
            tracing::warn!(
                "{} may not {} document {}",
                actor.username,
                operation,
                id
            );
            return Err(ServiceError::Forbidden {
                operation,
                document_id: id,
            });
        }

        Ok((actor, document))
    }
}

pub(crate) fn require_actor(actor: Option<&User>) -> Result<&User, ServiceError> {
    actor.ok_or(ServiceError::Unauthenticated)
}
