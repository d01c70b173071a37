mod document_repo;
mod grant_repo;
mod user_repo;

pub use document_repo::DocumentRepository;
pub use grant_repo::GrantRepository;
pub use user_repo::UserRepository;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;

/// The three relations behind the editor, sharing one connection pool.
///
/// Constructed once at startup and handed to whoever needs it; cloning is
/// cheap since every repository only holds the pool handle.
#[derive(Debug, Clone)]
pub struct Store {
    pub users: UserRepository,
    pub documents: DocumentRepository,
    pub grants: GrantRepository,
}

impl Store {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            documents: DocumentRepository::new(pool.clone()),
            grants: GrantRepository::new(pool),
        }
    }

    /// Opens (creating if needed) the database at `path` and migrates it.
    pub async fn open(path: &Path) -> Result<Self, sqlx::Error> {
        init_db(path).await.map(Self::new)
    }
}

/// Initialize the database connection pool and run migrations
pub async fn init_db(path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .foreign_keys(true)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}
