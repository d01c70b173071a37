//! Access control for documents.
//!
//! The policy is a pure function of how the actor relates to a document and
//! what they want to do. Collaboration membership is looked up by the caller
//! and passed in, so nothing here touches the store. Anonymous requests never
//! get this far: they are turned away before the document is even loaded.
//!
//! | Operation | Owner | Collaborator | Anyone else |
//! |-----------|-------|--------------|-------------|
//! | view      | yes   | yes          | no          |
//! | edit      | yes   | no           | no          |
//! | share     | yes   | no           | no          |

use crate::models::Document;

/// Something an actor can try to do with a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    View,
    Edit,
    Share,
}

impl Operation {
    /// Whether a collaboration grant is enough for this operation.
    pub fn open_to_collaborators(self) -> bool {
        matches!(self, Operation::View)
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::View => write!(f, "view"),
            Operation::Edit => write!(f, "edit"),
            Operation::Share => write!(f, "share"),
        }
    }
}

/// How the actor relates to the document in question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relationship {
    Owner,
    Collaborator,
    Stranger,
}

impl Relationship {
    /// `is_collaborator` only matters for non-owners.
    pub fn of(actor_id: i64, document: &Document, is_collaborator: bool) -> Self {
        if document.is_owned_by(actor_id) {
            Relationship::Owner
        } else if is_collaborator {
            Relationship::Collaborator
        } else {
            Relationship::Stranger
        }
    }
}

/// Whether `operation` is allowed for an actor with `relationship`.
pub fn permits(relationship: Relationship, operation: Operation) -> bool {
    match relationship {
        Relationship::Owner => true,
        Relationship::Collaborator => operation.open_to_collaborators(),
        Relationship::Stranger => false,
    }
}
