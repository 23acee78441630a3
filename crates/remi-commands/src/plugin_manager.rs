//! Plugin management commands
//!
//! Owner-only surface over [`crate::plugin::PluginManager`]. Expected
//! lifecycle failures are rendered as failure embeds; they never escape
//! the handler.

use poise::serenity_prelude::CreateEmbedFooter;
use tracing::error;

use crate::embeds::{failure_embed, info_embed, success_embed};
use crate::plugin::{PluginError, PluginOp};
use crate::{CommandError, CommandList, Context};

/// Top-level commands of the Plugin Manager plugin.
pub fn commands() -> CommandList {
    vec![plugin()]
}

/// Manage hot-(un)loading of plugins.
#[poise::command(
    slash_command,
    prefix_command,
    owners_only,
    subcommands("plugin_load", "plugin_unload", "plugin_reload", "plugin_list")
)]
pub async fn plugin(ctx: Context<'_>) -> Result<(), CommandError> {
    let embed = info_embed("Plugin management")
        .description("Use `plugin load`, `plugin unload`, `plugin reload` or `plugin list`.");
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Map an expected lifecycle failure to its user-facing explanation.
fn failure_hint(err: &PluginError) -> &'static str {
    match err {
        PluginError::NotFound(_) => "Please double check your input.",
        PluginError::AlreadyLoaded(_) => "Plugin is already loaded.",
        PluginError::NotLoaded(_) => "Plugin is not loaded.",
        PluginError::Protected(_) => "This plugin is critical to the bot's operation!",
    }
}

/// Shared handler for all lifecycle operations.
async fn lifecycle(ctx: Context<'_>, name: &str, op: PluginOp) -> Result<(), CommandError> {
    let plugins = &ctx.data().plugins;
    let result = match op {
        PluginOp::Load => plugins.load(name),
        PluginOp::Unload => plugins.unload(name),
        PluginOp::Reload => plugins.reload(name),
    };

    let embed = match result {
        Ok(outcome) => success_embed(format!(
            "Successfully {} plugin `{}`",
            outcome.op, outcome.name
        )),
        Err(err) => {
            error!("Plugin operation failed: {err}");
            failure_embed(err.to_string()).description(failure_hint(&err))
        }
    };
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}

/// Load a plugin.
#[poise::command(slash_command, prefix_command, rename = "load")]
pub async fn plugin_load(
    ctx: Context<'_>,
    #[description = "The plugin to load."]
    #[rest]
    name: String,
) -> Result<(), CommandError> {
    lifecycle(ctx, &name, PluginOp::Load).await
}

/// Unload a plugin.
#[poise::command(slash_command, prefix_command, rename = "unload")]
pub async fn plugin_unload(
    ctx: Context<'_>,
    #[description = "The plugin to unload."]
    #[rest]
    name: String,
) -> Result<(), CommandError> {
    lifecycle(ctx, &name, PluginOp::Unload).await
}

/// Reload a plugin.
#[poise::command(slash_command, prefix_command, rename = "reload")]
pub async fn plugin_reload(
    ctx: Context<'_>,
    #[description = "The plugin to reload."]
    #[rest]
    name: String,
) -> Result<(), CommandError> {
    lifecycle(ctx, &name, PluginOp::Reload).await
}

/// List available plugins and their status.
#[poise::command(slash_command, prefix_command, rename = "list")]
pub async fn plugin_list(ctx: Context<'_>) -> Result<(), CommandError> {
    let plugins = &ctx.data().plugins;
    let loaded = plugins.loaded_paths();

    let mut sections = Vec::new();
    for (namespace, mapping) in plugins.registry().get_all() {
        let listing = mapping
            .iter()
            .map(|(name, info)| {
                let status = if loaded.contains(&info.load_path) {
                    "x"
                } else {
                    " "
                };
                format!("`[{status}]` **{name}** - {}", info.description)
            })
            .collect::<Vec<_>>()
            .join("\n");

        let listing = if listing.is_empty() {
            "*(none)*".to_string()
        } else {
            listing
        };
        sections.push(format!("**{namespace}**\n{listing}"));
    }

    let embed = info_embed("Available plugins")
        .description(sections.join("\n\n"))
        .footer(CreateEmbedFooter::new("[x] means loaded, otherwise [ ]"));
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}
