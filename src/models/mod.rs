mod document;
mod grant;
mod user;

pub use document::{Document, DocumentDraft};
pub use grant::CollaborationGrant;
pub use user::{hash_password, NewUser, PasswordError, User};
