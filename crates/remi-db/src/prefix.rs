//! Per-guild command prefix storage with an in-memory fast path
//!
//! Reads go through the cache on every message, so they must not touch the
//! database. Writes commit to storage first and only update the cache after
//! the commit succeeds — a failed write leaves the cache exactly as it was.

use dashmap::DashMap;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::StorageError;

/// Maximum stored prefix length, in characters.
pub const MAX_PREFIX_CHARS: usize = 5;

/// Normalize a raw prefix: truncate to [`MAX_PREFIX_CHARS`] characters,
/// then remove space characters. The order matters: `"ab cde"` truncates
/// to `"ab cd"` and then strips to `"abcd"`, not `"abcde"`.
pub fn normalize_prefix(raw: &str) -> String {
    raw.chars()
        .take(MAX_PREFIX_CHARS)
        .filter(|c| *c != ' ')
        .collect()
}

/// Guild → prefix mapping, cache-backed.
#[derive(Debug)]
pub struct PrefixCache {
    pool: SqlitePool,
    default_prefix: String,
    cache: DashMap<u64, String>,
}

impl PrefixCache {
    pub fn new(pool: SqlitePool, default_prefix: impl Into<String>) -> Self {
        Self {
            pool,
            default_prefix: default_prefix.into(),
            cache: DashMap::new(),
        }
    }

    /// Materialize the whole prefix table into the cache. Called once at
    /// startup; replaces any previous cache contents.
    pub async fn load_all(&self) -> Result<usize, StorageError> {
        let rows: Vec<(i64, String)> =
            sqlx::query_as("SELECT guild_id, prefix FROM server_prefix")
                .fetch_all(&self.pool)
                .await?;

        self.cache.clear();
        for (guild_id, prefix) in rows {
            self.cache.insert(guild_id as u64, prefix);
        }

        info!("Loaded {} guild prefix override(s)", self.cache.len());
        Ok(self.cache.len())
    }

    /// The effective prefix for a guild: its override, or the global
    /// default. Cache-only, never touches storage.
    pub fn get(&self, guild_id: u64) -> String {
        self.cache
            .get(&guild_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_else(|| self.default_prefix.clone())
    }

    /// The global default prefix.
    pub fn default_prefix(&self) -> &str {
        &self.default_prefix
    }

    /// Set a guild's prefix override. Returns the normalized prefix that
    /// was stored.
    pub async fn set(&self, guild_id: u64, raw: &str) -> Result<String, StorageError> {
        let prefix = normalize_prefix(raw);
        if prefix.is_empty() {
            return Err(StorageError::EmptyPrefix);
        }

        sqlx::query(
            r#"
            INSERT INTO server_prefix (guild_id, prefix) VALUES (?1, ?2)
            ON CONFLICT (guild_id) DO UPDATE SET prefix = excluded.prefix
            "#,
        )
        .bind(guild_id as i64)
        .bind(&prefix)
        .execute(&self.pool)
        .await?;

        self.cache.insert(guild_id, prefix.clone());
        debug!("Prefix for guild {guild_id} set to {prefix:?}");
        Ok(prefix)
    }

    /// Remove a guild's prefix override. Removing a guild that has no
    /// override is a no-op, not an error.
    pub async fn unset(&self, guild_id: u64) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM server_prefix WHERE guild_id = ?1")
            .bind(guild_id as i64)
            .execute(&self.pool)
            .await?;

        self.cache.remove(&guild_id);
        debug!("Prefix for guild {guild_id} unset");
        Ok(())
    }

    /// Number of cached overrides.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_pool;

    #[test]
    fn normalize_truncates_then_strips() {
        // 6 chars with an internal space: truncate to "ab cd", strip to "abcd"
        assert_eq!(normalize_prefix("ab cde"), "abcd");
        assert_eq!(normalize_prefix("abcdef"), "abcde");
        assert_eq!(normalize_prefix("!"), "!");
        assert_eq!(normalize_prefix("     !"), "");
        assert_eq!(normalize_prefix(""), "");
    }

    #[tokio::test]
    async fn set_then_get_returns_normalized_prefix() {
        let cache = PrefixCache::new(memory_pool().await, "r!");

        let stored = cache.set(1, "ab cde").await.unwrap();
        assert_eq!(stored, "abcd");
        assert_eq!(cache.get(1), "abcd");
    }

    #[tokio::test]
    async fn get_falls_back_to_default() {
        let cache = PrefixCache::new(memory_pool().await, "r!");
        assert_eq!(cache.get(42), "r!");
    }

    #[tokio::test]
    async fn empty_prefix_is_rejected_without_cache_mutation() {
        let cache = PrefixCache::new(memory_pool().await, "r!");

        let result = cache.set(1, "   ").await;
        assert!(matches!(result, Err(StorageError::EmptyPrefix)));
        assert_eq!(cache.cached(), 0);
        assert_eq!(cache.get(1), "r!");
    }

    #[tokio::test]
    async fn unset_absent_guild_is_a_noop() {
        let cache = PrefixCache::new(memory_pool().await, "r!");
        cache.set(1, "x").await.unwrap();

        cache.unset(999).await.unwrap();
        assert_eq!(cache.cached(), 1);
        assert_eq!(cache.get(1), "x");
    }

    #[tokio::test]
    async fn unset_removes_override() {
        let cache = PrefixCache::new(memory_pool().await, "r!");
        cache.set(1, "x").await.unwrap();

        cache.unset(1).await.unwrap();
        assert_eq!(cache.cached(), 0);
        assert_eq!(cache.get(1), "r!");
    }

    #[tokio::test]
    async fn upsert_keeps_one_row_per_guild() {
        let pool = memory_pool().await;
        let cache = PrefixCache::new(pool.clone(), "r!");

        cache.set(1, "a").await.unwrap();
        cache.set(1, "b").await.unwrap();

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM server_prefix")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(rows, 1);
        assert_eq!(cache.get(1), "b");
    }

    #[tokio::test]
    async fn prefixes_survive_a_restart() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("config.sqlite");

        {
            let pool = crate::connect(&db_path).await.unwrap();
            let cache = PrefixCache::new(pool.clone(), "r!");
            cache.set(7, "xy").await.unwrap();
            pool.close().await;
        }

        let pool = crate::connect(&db_path).await.unwrap();
        let cache = PrefixCache::new(pool, "r!");
        cache.load_all().await.unwrap();

        assert_eq!(cache.get(7), "xy");
    }
}
