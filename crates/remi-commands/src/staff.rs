//! Staff role designation commands
//!
//! `staff set`/`staff remove` operate on several roles at once; roles are
//! given as mentions (`<@&id>`) or raw ids. Per-role outcomes are reported
//! line by line, with duplicates downgraded to warnings.

use std::collections::HashSet;

use thiserror::Error;
use tracing::error;

use remi_db::Rank;

use crate::embeds::{failure_embed, info_embed, storage_failure_embed, success_embed, warning_embed};
use crate::{CommandError, CommandList, Context};

/// Top-level commands of the Staff Role plugin.
pub fn commands() -> CommandList {
    vec![staff()]
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("`{0}` is not a role mention or role id")]
struct RoleTokenError(String);

/// Parse whitespace-separated role tokens: `<@&123>` mentions or bare ids.
fn parse_role_tokens(raw: &str) -> Result<Vec<u64>, RoleTokenError> {
    raw.split_whitespace()
        .map(|token| {
            let digits = token
                .strip_prefix("<@&")
                .and_then(|rest| rest.strip_suffix('>'))
                .unwrap_or(token);
            digits
                .parse::<u64>()
                .map_err(|_| RoleTokenError(token.to_string()))
        })
        .collect()
}

fn role_mention(role_id: u64) -> String {
    format!("<@&{role_id}>")
}

/// Manage this server's staff roles.
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    subcommands("staff_set", "staff_remove", "staff_info", "staff_reset"),
    check = "crate::permissions::is_administrator"
)]
pub async fn staff(ctx: Context<'_>) -> Result<(), CommandError> {
    let embed = info_embed("Staff role management")
        .description("Use `staff set`, `staff remove`, `staff info` or `staff reset`.");
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Shared handler for `staff set` and `staff remove`.
async fn edit_designations(
    ctx: Context<'_>,
    rank: String,
    roles: String,
    remove: bool,
) -> Result<(), CommandError> {
    let Some(guild_id) = ctx.guild_id() else {
        return Ok(());
    };

    let rank: Rank = match rank.parse() {
        Ok(rank) => rank,
        Err(err) => {
            let embed = failure_embed(format!("Unknown rank `{}`!", rank))
                .description(format!("{err}."));
            ctx.send(poise::CreateReply::default().embed(embed)).await?;
            return Ok(());
        }
    };

    let role_ids = match parse_role_tokens(&roles) {
        Ok(ids) if !ids.is_empty() => ids,
        Ok(_) => {
            let embed = failure_embed("No roles supplied!")
                .description("Give at least one role mention or role id.");
            ctx.send(poise::CreateReply::default().embed(embed)).await?;
            return Ok(());
        }
        Err(err) => {
            let embed = failure_embed("Invalid role argument!").description(format!("{err}."));
            ctx.send(poise::CreateReply::default().embed(embed)).await?;
            return Ok(());
        }
    };

    let known_roles: HashSet<u64> = {
        let Some(guild) = ctx.guild() else {
            return Ok(());
        };
        guild.roles.keys().map(|id| id.get()).collect()
    };

    let mut lines = Vec::with_capacity(role_ids.len());
    let mut warned = false;
    for role_id in role_ids {
        let mention = role_mention(role_id);

        if !known_roles.contains(&role_id) {
            warned = true;
            lines.push(format!(
                "\u{26A0} {mention} is not a role in this server"
            ));
            continue;
        }

        let applied = if remove {
            ctx.data().staff.remove(guild_id.get(), rank, role_id).await
        } else {
            ctx.data().staff.add(guild_id.get(), rank, role_id).await
        };

        match applied {
            Ok(true) if remove => {
                lines.push(format!("\u{2705} {mention} removed from `{rank}`"))
            }
            Ok(true) => lines.push(format!("\u{2705} {mention} added as `{rank}`")),
            Ok(false) => {
                warned = true;
                if remove {
                    lines.push(format!("\u{26A0} {mention} is not `{rank}`"));
                } else {
                    lines.push(format!("\u{26A0} {mention} is already `{rank}`"));
                }
            }
            Err(err) => {
                error!("Failed to edit staff roles for guild {guild_id}: {err}");
                ctx.send(poise::CreateReply::default().embed(storage_failure_embed()))
                    .await?;
                return Ok(());
            }
        }
    }

    let description = lines.join("\n");
    let embed = if warned {
        warning_embed("Result").description(description)
    } else {
        success_embed("Result").description(description)
    };
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}

/// Set role(s) to be equivalent to moderator/administrator.
#[poise::command(slash_command, prefix_command, rename = "set")]
pub async fn staff_set(
    ctx: Context<'_>,
    #[description = "The rank to designate the role(s) as (Moderator/Mod or Administrator/Admin)."]
    rank: String,
    #[description = "The role(s) of interest, as mentions or ids."]
    #[rest]
    roles: String,
) -> Result<(), CommandError> {
    edit_designations(ctx, rank, roles, false).await
}

/// Remove role(s) from being equivalent to moderator/administrator.
#[poise::command(slash_command, prefix_command, rename = "remove")]
pub async fn staff_remove(
    ctx: Context<'_>,
    #[description = "The rank to withdraw from the role(s)."] rank: String,
    #[description = "The role(s) of interest, as mentions or ids."]
    #[rest]
    roles: String,
) -> Result<(), CommandError> {
    edit_designations(ctx, rank, roles, true).await
}

fn render_role_list(role_ids: &[u64]) -> String {
    if role_ids.is_empty() {
        return "None".to_string();
    }
    role_ids
        .iter()
        .map(|&id| format!("\u{2022} {}", role_mention(id)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// List this server's rank settings.
#[poise::command(slash_command, prefix_command, rename = "info")]
pub async fn staff_info(ctx: Context<'_>) -> Result<(), CommandError> {
    let Some(guild_id) = ctx.guild_id() else {
        return Ok(());
    };

    let guild_name = ctx
        .guild()
        .map(|guild| guild.name.clone())
        .unwrap_or_else(|| "this server".to_string());

    let staff = &ctx.data().staff;
    let lookup = async {
        let moderators = staff.roles_for(guild_id.get(), Rank::Moderator).await?;
        let administrators = staff.roles_for(guild_id.get(), Rank::Administrator).await?;
        Ok::<_, remi_db::StorageError>((moderators, administrators))
    };

    let embed = match lookup.await {
        Ok((moderators, administrators)) => {
            info_embed(format!("Staff role info for `{guild_name}`"))
                .field("Moderator", render_role_list(&moderators), true)
                .field("Administrator", render_role_list(&administrators), true)
        }
        Err(err) => {
            error!("Failed to list staff roles for guild {guild_id}: {err}");
            storage_failure_embed()
        }
    };
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}

/// Reset this server's staff roles.
#[poise::command(slash_command, prefix_command, rename = "reset")]
pub async fn staff_reset(ctx: Context<'_>) -> Result<(), CommandError> {
    let Some(guild_id) = ctx.guild_id() else {
        return Ok(());
    };

    let embed = match ctx.data().staff.reset(guild_id.get()).await {
        Ok(_) => success_embed("Staff roles have been reset for this server!"),
        Err(err) => {
            error!("Failed to reset staff roles for guild {guild_id}: {err}");
            storage_failure_embed()
        }
    };
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_tokens_accept_mentions_and_ids() {
        assert_eq!(
            parse_role_tokens("<@&314159> 265358"),
            Ok(vec![314159, 265358])
        );
    }

    #[test]
    fn malformed_role_token_is_rejected() {
        assert_eq!(
            parse_role_tokens("314159 @Moderator"),
            Err(RoleTokenError("@Moderator".to_string()))
        );
    }

    #[test]
    fn empty_input_parses_to_no_roles() {
        assert_eq!(parse_role_tokens(""), Ok(vec![]));
    }

    #[test]
    fn role_list_rendering() {
        assert_eq!(render_role_list(&[]), "None");
        assert_eq!(
            render_role_list(&[1, 2]),
            "\u{2022} <@&1>\n\u{2022} <@&2>"
        );
    }
}
