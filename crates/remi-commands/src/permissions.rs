//! Rank-based permission resolution
//!
//! Checks run cheapest-first: configured owner list, guild ownership,
//! native permission bits, and only then a single staff-role table query.
//! A storage failure denies the action (fail closed) instead of silently
//! granting it.

use poise::serenity_prelude as serenity;
use thiserror::Error;
use tracing::{debug, error};

use remi_db::{Rank, StorageError};

use crate::{CommandError, Context};

#[derive(Debug, Error)]
pub enum PermissionError {
    #[error("this command can only be used in a guild")]
    GuildOnly,

    #[error("could not resolve the invoking member")]
    MemberUnavailable,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Platform-level grant decision: everything that can be answered without
/// touching storage.
fn platform_grant(
    rank: Rank,
    user_id: u64,
    owner_ids: &[u64],
    guild_owner_id: u64,
    native: serenity::Permissions,
) -> bool {
    if owner_ids.contains(&user_id) || user_id == guild_owner_id {
        return true;
    }

    let administrative = native.administrator() || native.manage_guild();
    match rank {
        Rank::Administrator => administrative,
        Rank::Moderator => administrative || native.kick_members() || native.ban_members(),
    }
}

/// Whether the invoking member holds the given rank, checking the staff
/// role table only when every platform-level check fails.
async fn has_rank(ctx: Context<'_>, rank: Rank) -> Result<bool, PermissionError> {
    let guild_id = ctx.guild_id().ok_or(PermissionError::GuildOnly)?;
    let user_id = ctx.author().id.get();

    let member = ctx
        .author_member()
        .await
        .ok_or(PermissionError::MemberUnavailable)?;

    let (guild_owner_id, native, member_roles) = {
        let guild = ctx.guild().ok_or(PermissionError::MemberUnavailable)?;
        (
            guild.owner_id.get(),
            guild.member_permissions(&member),
            member.roles.clone(),
        )
    };

    if platform_grant(
        rank,
        user_id,
        &ctx.data().config.owner_ids,
        guild_owner_id,
        native,
    ) {
        debug!("User {user_id} granted {rank} via platform-level checks");
        return Ok(true);
    }

    let staff_roles = ctx.data().staff.roles_for(guild_id.get(), rank).await?;
    Ok(member_roles
        .iter()
        .any(|role| staff_roles.contains(&role.get())))
}

/// Poise check: the invoking member qualifies as an administrator.
pub async fn is_administrator(ctx: Context<'_>) -> Result<bool, CommandError> {
    has_rank(ctx, Rank::Administrator).await.map_err(|err| {
        error!("Administrator check failed, denying: {err}");
        CommandError::from(err)
    })
}

/// Poise check: the invoking member qualifies as a moderator.
/// Administrators always qualify.
pub async fn is_moderator(ctx: Context<'_>) -> Result<bool, CommandError> {
    let result = async {
        if has_rank(ctx, Rank::Administrator).await? {
            return Ok(true);
        }
        has_rank(ctx, Rank::Moderator).await
    }
    .await;

    result.map_err(|err: PermissionError| {
        error!("Moderator check failed, denying: {err}");
        CommandError::from(err)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use poise::serenity_prelude::Permissions;

    // Owner-list and guild-owner grants must not require a storage handle
    // at all; `platform_grant` has no access to one by construction.
    #[test]
    fn owner_id_grants_both_ranks_without_storage() {
        for rank in [Rank::Moderator, Rank::Administrator] {
            assert!(platform_grant(rank, 1, &[1, 2], 99, Permissions::empty()));
        }
    }

    #[test]
    fn guild_owner_grants_both_ranks() {
        for rank in [Rank::Moderator, Rank::Administrator] {
            assert!(platform_grant(rank, 5, &[], 5, Permissions::empty()));
        }
    }

    #[test]
    fn administrator_bit_grants_administrator() {
        assert!(platform_grant(
            Rank::Administrator,
            5,
            &[],
            99,
            Permissions::ADMINISTRATOR
        ));
        assert!(platform_grant(
            Rank::Administrator,
            5,
            &[],
            99,
            Permissions::MANAGE_GUILD
        ));
    }

    #[test]
    fn kick_or_ban_bits_grant_moderator_only() {
        for bits in [Permissions::KICK_MEMBERS, Permissions::BAN_MEMBERS] {
            assert!(platform_grant(Rank::Moderator, 5, &[], 99, bits));
            assert!(!platform_grant(Rank::Administrator, 5, &[], 99, bits));
        }
    }

    #[test]
    fn no_signal_grants_nothing() {
        for rank in [Rank::Moderator, Rank::Administrator] {
            assert!(!platform_grant(rank, 5, &[], 99, Permissions::empty()));
        }
    }
}
