//! Remi Discord bot - main entry point

use std::collections::HashSet;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use poise::serenity_prelude::{self as serenity, GatewayIntents};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use remi_commands::embeds::failure_embed;
use remi_commands::plugin::{PluginManager, PluginRegistry};
use remi_commands::{CommandError, Data};
use remi_config::{Config, ConfigLoader};
use remi_db::{PrefixCache, StaffRoleStore};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "remi", version, about, long_about = None)]
struct Args {
    /// Increase verbosity (can be stacked).
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Map the stacked `-v` flag to a log filter. `RUST_LOG` wins if set.
fn log_filter(verbose: u8) -> EnvFilter {
    let directive = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive))
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(args.verbose))
        .init();

    info!("Starting Remi");

    // Fatal startup configuration errors terminate with a diagnostic and a
    // non-zero exit; nothing is retried.
    let config = match ConfigLoader::load() {
        Ok(config) => config,
        Err(err) => {
            error!("Fatal configuration error: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = run(config).await {
        error!("Bot terminated with error: {err:?}");
        return ExitCode::FAILURE;
    }

    info!("Remi has shut down");
    ExitCode::SUCCESS
}

async fn run(config: Config) -> Result<()> {
    let pool = remi_db::connect(&config.database_path()).await?;

    let prefixes = Arc::new(PrefixCache::new(
        pool.clone(),
        config.default_prefix.clone(),
    ));
    prefixes.load_all().await?;

    let staff = Arc::new(StaffRoleStore::new(pool));
    let plugins = Arc::new(PluginManager::new(
        PluginRegistry::builtin(),
        config.dev_mode,
    ));

    let owners: HashSet<serenity::UserId> = config
        .owner_ids
        .iter()
        .map(|&id| serenity::UserId::new(id))
        .collect();

    let token = config.token.clone();
    let default_prefix = config.default_prefix.clone();

    let data = Data {
        config: Arc::new(config),
        prefixes,
        staff,
        plugins: plugins.clone(),
    };

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: plugins.all_commands(),
            owners,
            on_error: |error| Box::pin(on_error(error)),
            // Commands belonging to unloaded plugins are invisible to
            // dispatch until their plugin is loaded again.
            command_check: Some(|ctx| {
                Box::pin(async move {
                    let root = ctx
                        .command()
                        .qualified_name
                        .split_whitespace()
                        .next()
                        .unwrap_or("")
                        .to_string();
                    Ok(ctx.data().plugins.command_enabled(&root))
                })
            }),
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(default_prefix),
                dynamic_prefix: Some(|ctx| {
                    Box::pin(async move {
                        let prefix = match ctx.guild_id {
                            Some(guild_id) => ctx.data.prefixes.get(guild_id.get()),
                            None => ctx.data.prefixes.default_prefix().to_string(),
                        };
                        Ok(Some(prefix))
                    })
                }),
                mention_as_prefix: true,
                ..Default::default()
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Bot connected as {} ({})", ready.user.name, ready.user.id);
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                info!("Slash commands registered globally");
                Ok(data)
            })
        })
        .build();

    let intents = GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILDS;

    let mut client = serenity::ClientBuilder::new(&token, intents)
        .framework(framework)
        .await?;

    // Graceful shutdown on ctrl-c
    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {err}");
            return;
        }
        info!("Received shutdown signal, shutting down");
        shard_manager.shutdown_all().await;
    });

    client.start().await?;
    Ok(())
}

/// Global error handler. Expected failures were already rendered by their
/// handlers; whatever reaches this point is logged in full server-side and
/// answered with a generic notice only.
async fn on_error(error: poise::FrameworkError<'_, Data, CommandError>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {error:?}");
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!(
                "Unhandled error in command '{}': {error:?}",
                ctx.command().qualified_name
            );
            let embed = failure_embed("Something went wrong!")
                .description("An unexpected error occurred. The details have been logged.");
            if let Err(err) = ctx.send(poise::CreateReply::default().embed(embed)).await {
                error!("Failed to deliver error reply: {err}");
            }
        }
        poise::FrameworkError::CommandCheckFailed { error, ctx, .. } => {
            if let Some(error) = error {
                warn!(
                    "Check failed for command '{}': {error}",
                    ctx.command().qualified_name
                );
            }
            let embed = failure_embed("Permission denied!")
                .description("You are not allowed to use this command here.");
            if let Err(err) = ctx.send(poise::CreateReply::default().embed(embed)).await {
                error!("Failed to deliver check-failure reply: {err}");
            }
        }
        poise::FrameworkError::NotAnOwner { ctx, .. } => {
            let embed = failure_embed("Permission denied!")
                .description("This command is reserved for the bot's owner.");
            if let Err(err) = ctx.send(poise::CreateReply::default().embed(embed)).await {
                error!("Failed to deliver owner-check reply: {err}");
            }
        }
        error => {
            if let Err(err) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {err}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_mapping_is_stackable() {
        let args = Args::parse_from(["remi", "-vv"]);
        assert_eq!(args.verbose, 2);

        let args = Args::parse_from(["remi"]);
        assert_eq!(args.verbose, 0);
    }
}
