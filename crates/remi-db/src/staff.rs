//! Per-guild staff role designations
//!
//! Multiple roles per guild and rank are allowed; the table is read on
//! every permission check that falls through the platform-level checks, so
//! there is deliberately no cache in front of it.

use std::fmt;
use std::str::FromStr;

use sqlx::SqlitePool;
use thiserror::Error;
use tracing::debug;

use crate::StorageError;

/// Authorization level assignable to guild roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rank {
    Moderator,
    Administrator,
}

impl Rank {
    /// Canonical form, as stored in the `rank` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Rank::Moderator => "Moderator",
            Rank::Administrator => "Administrator",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An unrecognized rank argument.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown rank '{0}', expected Moderator/Mod or Administrator/Admin")]
pub struct RankParseError(pub String);

impl FromStr for Rank {
    type Err = RankParseError;

    /// Case-insensitive, accepts the shortened forms `mod` and `admin`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "moderator" | "mod" => Ok(Rank::Moderator),
            "administrator" | "admin" => Ok(Rank::Administrator),
            _ => Err(RankParseError(s.to_string())),
        }
    }
}

/// CRUD over the `staff_role` table.
#[derive(Debug, Clone)]
pub struct StaffRoleStore {
    pool: SqlitePool,
}

impl StaffRoleStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Designate a role. Returns `false` when the role already held the
    /// rank (callers surface that as a warning, not an error).
    pub async fn add(&self, guild_id: u64, rank: Rank, role_id: u64) -> Result<bool, StorageError> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO staff_role (guild_id, rank, role_id) VALUES (?1, ?2, ?3)",
        )
        .bind(guild_id as i64)
        .bind(rank.as_str())
        .bind(role_id as i64)
        .execute(&self.pool)
        .await?;

        let inserted = result.rows_affected() > 0;
        debug!("Role {role_id} in guild {guild_id}: add as {rank} (new: {inserted})");
        Ok(inserted)
    }

    /// Withdraw a designation. Returns `false` when the role did not hold
    /// the rank.
    pub async fn remove(
        &self,
        guild_id: u64,
        rank: Rank,
        role_id: u64,
    ) -> Result<bool, StorageError> {
        let result = sqlx::query(
            "DELETE FROM staff_role WHERE guild_id = ?1 AND rank = ?2 AND role_id = ?3",
        )
        .bind(guild_id as i64)
        .bind(rank.as_str())
        .bind(role_id as i64)
        .execute(&self.pool)
        .await?;

        let removed = result.rows_affected() > 0;
        debug!("Role {role_id} in guild {guild_id}: remove from {rank} (held: {removed})");
        Ok(removed)
    }

    /// All role ids holding the given rank in the guild.
    pub async fn roles_for(&self, guild_id: u64, rank: Rank) -> Result<Vec<u64>, StorageError> {
        let rows: Vec<(i64,)> =
            sqlx::query_as("SELECT role_id FROM staff_role WHERE guild_id = ?1 AND rank = ?2")
                .bind(guild_id as i64)
                .bind(rank.as_str())
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(|(id,)| id as u64).collect())
    }

    /// Drop every designation for the guild. Returns the number of rows
    /// removed.
    pub async fn reset(&self, guild_id: u64) -> Result<u64, StorageError> {
        let result = sqlx::query("DELETE FROM staff_role WHERE guild_id = ?1")
            .bind(guild_id as i64)
            .execute(&self.pool)
            .await?;

        debug!(
            "Staff roles reset for guild {guild_id} ({} row(s))",
            result.rows_affected()
        );
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_pool;

    #[test]
    fn rank_parsing_is_case_insensitive() {
        for raw in ["mod", "Mod", "MODERATOR", "moderator"] {
            assert_eq!(raw.parse::<Rank>().unwrap(), Rank::Moderator);
        }
        for raw in ["admin", "ADMIN", "Administrator"] {
            assert_eq!(raw.parse::<Rank>().unwrap(), Rank::Administrator);
        }
    }

    #[test]
    fn unknown_rank_is_a_typed_failure() {
        let err = "janitor".parse::<Rank>().unwrap_err();
        assert_eq!(err, RankParseError("janitor".to_string()));
    }

    #[tokio::test]
    async fn add_detects_duplicates() {
        let store = StaffRoleStore::new(memory_pool().await);

        assert!(store.add(1, Rank::Moderator, 10).await.unwrap());
        assert!(!store.add(1, Rank::Moderator, 10).await.unwrap());

        // Same role under the other rank is a distinct designation
        assert!(store.add(1, Rank::Administrator, 10).await.unwrap());
    }

    #[tokio::test]
    async fn remove_reports_whether_role_was_designated() {
        let store = StaffRoleStore::new(memory_pool().await);
        store.add(1, Rank::Moderator, 10).await.unwrap();

        assert!(store.remove(1, Rank::Moderator, 10).await.unwrap());
        assert!(!store.remove(1, Rank::Moderator, 10).await.unwrap());
    }

    #[tokio::test]
    async fn roles_are_scoped_by_guild_and_rank() {
        let store = StaffRoleStore::new(memory_pool().await);
        store.add(1, Rank::Moderator, 10).await.unwrap();
        store.add(1, Rank::Administrator, 11).await.unwrap();
        store.add(2, Rank::Moderator, 12).await.unwrap();

        assert_eq!(store.roles_for(1, Rank::Moderator).await.unwrap(), vec![10]);
        assert_eq!(
            store.roles_for(1, Rank::Administrator).await.unwrap(),
            vec![11]
        );
        assert_eq!(store.roles_for(2, Rank::Moderator).await.unwrap(), vec![12]);
    }

    #[tokio::test]
    async fn reset_clears_only_the_given_guild() {
        let store = StaffRoleStore::new(memory_pool().await);
        store.add(1, Rank::Moderator, 10).await.unwrap();
        store.add(1, Rank::Administrator, 11).await.unwrap();
        store.add(2, Rank::Moderator, 12).await.unwrap();

        assert_eq!(store.reset(1).await.unwrap(), 2);
        assert!(store.roles_for(1, Rank::Moderator).await.unwrap().is_empty());
        assert_eq!(store.roles_for(2, Rank::Moderator).await.unwrap(), vec![12]);
    }
}
