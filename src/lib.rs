//! docshare: a small multi-user document editor.
//!
//! Users log in with a username and password, write text documents, and
//! share them read-only with other users. The owner of a document is the
//! only one who can edit or share it.

pub mod access;
pub mod config;
pub mod db;
pub mod identity;
pub mod models;
pub mod server;
pub mod service;
