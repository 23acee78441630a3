//! SQLite-backed guild settings storage
//!
//! One file-backed database (`config.sqlite` in the data directory) holds
//! two tables: per-guild command prefixes and per-guild staff role
//! designations. The database is the durable source of truth; the prefix
//! table is additionally mirrored into an in-memory cache at startup.

pub mod prefix;
pub mod staff;

use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info};

pub use prefix::PrefixCache;
pub use staff::{Rank, RankParseError, StaffRoleStore};

/// Errors raised by the storage layer.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Any persistence failure. Callers must treat this as "the write did
    /// not happen" (mutations) or "deny" (permission lookups).
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A prefix that normalized down to nothing.
    #[error("prefix must contain at least one non-space character")]
    EmptyPrefix,
}

/// Open (creating if missing) the settings database and bootstrap its
/// schema.
pub async fn connect(path: &Path) -> Result<SqlitePool, StorageError> {
    info!("Opening settings database at '{}'", path.display());

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    init_schema(&pool).await?;

    Ok(pool)
}

/// Create the settings tables if they do not exist yet.
///
/// `server_prefix` keys on the guild id directly, so upserts are atomic and
/// a guild can never accumulate duplicate rows.
async fn init_schema(pool: &SqlitePool) -> Result<(), StorageError> {
    debug!("Ensuring settings schema exists");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS server_prefix (
            guild_id INTEGER PRIMARY KEY,
            prefix TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS staff_role (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            guild_id INTEGER NOT NULL,
            rank TEXT NOT NULL,
            role_id INTEGER NOT NULL,
            UNIQUE (guild_id, rank, role_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Single-connection in-memory database for tests. A larger pool would hand
/// each connection its own empty in-memory database.
#[cfg(test)]
pub(crate) async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory database should open");
    init_schema(&pool).await.expect("schema bootstrap");
    pool
}
