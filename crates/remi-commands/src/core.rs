//! Core commands: liveness check and shutdown

use tracing::info;

use crate::embeds::{success_embed, warning_embed};
use crate::{CommandError, CommandList, Context};

/// Top-level commands of the Core plugin.
pub fn commands() -> CommandList {
    vec![ping(), shutdown()]
}

/// Ping the bot. Dirty way to ensure it's online.
#[poise::command(slash_command, prefix_command)]
pub async fn ping(ctx: Context<'_>) -> Result<(), CommandError> {
    let latency = ctx.ping().await;

    let embed = success_embed("**Success!**")
        .description("Bot is (hopefully) still alive!")
        .field(
            "Heartbeat latency",
            format!("{:.2}ms", latency.as_secs_f64() * 1000.0),
            false,
        );
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}

/// Shut the bot down.
#[poise::command(slash_command, prefix_command, owners_only)]
pub async fn shutdown(ctx: Context<'_>) -> Result<(), CommandError> {
    info!("Shutdown requested by {}", ctx.author().id);

    ctx.send(poise::CreateReply::default().embed(warning_embed("Shutting down...")))
        .await?;
    ctx.framework().shard_manager.shutdown_all().await;

    Ok(())
}
