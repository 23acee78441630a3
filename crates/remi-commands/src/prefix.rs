//! Per-guild prefix configuration commands

use tracing::error;

use remi_db::prefix::MAX_PREFIX_CHARS;
use remi_db::StorageError;

use crate::embeds::{failure_embed, storage_failure_embed, success_embed};
use crate::{CommandError, CommandList, Context};

/// Top-level commands of the Prefix Manager plugin.
pub fn commands() -> CommandList {
    vec![setprefix(), unsetprefix()]
}

/// Set a custom prefix for this server.
///
/// Prefixes longer than 5 characters are truncated to 5, then any space
/// characters are removed.
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    check = "crate::permissions::is_administrator"
)]
pub async fn setprefix(
    ctx: Context<'_>,
    #[description = "The prefix to use for this server (max. 5 characters)."]
    #[rest]
    prefix: String,
) -> Result<(), CommandError> {
    let Some(guild_id) = ctx.guild_id() else {
        return Ok(());
    };

    let embed = match ctx.data().prefixes.set(guild_id.get(), &prefix).await {
        Ok(stored) => success_embed(format!("Prefix for your server has been set to `{stored}`!")),
        Err(StorageError::EmptyPrefix) => failure_embed("Invalid prefix!").description(format!(
            "A prefix needs at least one non-space character \
             (at most {MAX_PREFIX_CHARS} characters are kept)."
        )),
        Err(err) => {
            error!("Failed to set prefix for guild {guild_id}: {err}");
            storage_failure_embed()
        }
    };
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}

/// Remove the custom prefix for this server.
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    check = "crate::permissions::is_administrator"
)]
pub async fn unsetprefix(ctx: Context<'_>) -> Result<(), CommandError> {
    let Some(guild_id) = ctx.guild_id() else {
        return Ok(());
    };

    let embed = match ctx.data().prefixes.unset(guild_id.get()).await {
        Ok(()) => success_embed("Prefix for your server has been unset!"),
        Err(err) => {
            error!("Failed to unset prefix for guild {guild_id}: {err}");
            storage_failure_embed()
        }
    };
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}
