//! About command

use crate::embeds::info_embed;
use crate::{CommandError, CommandList, Context};

const REPOSITORY: &str = "https://github.com/PythonTryHard/remi-rs";
const AUTHOR: &str = "https://github.com/PythonTryHard";
const RED_REPOSITORY: &str = "https://github.com/Cog-Creators/Red-DiscordBot";

/// Top-level commands of the About plugin.
pub fn commands() -> CommandList {
    vec![about()]
}

/// About the bot.
#[poise::command(slash_command, prefix_command)]
pub async fn about(ctx: Context<'_>) -> Result<(), CommandError> {
    let app_info = ctx.http().get_current_application_info().await?;
    let owner = match (&app_info.team, &app_info.owner) {
        (Some(team), _) => format!("Team {}", team.name),
        (None, Some(owner)) => owner.name.clone(),
        (None, None) => "Unknown".to_string(),
    };

    let embed = info_embed("About Remi")
        .field("Instance's owner", owner, true)
        .field(
            "Built on",
            "\u{2022} serenity\n\u{2022} poise\n\u{2022} sqlx",
            true,
        )
        .field(
            "About the bot",
            format!(
                "This bot is an instance of [`remi`]({REPOSITORY}), an open-source bot \
                 made by [PythonTryHard]({AUTHOR}), taking inspiration from \
                 [`Red-DiscordBot`]({RED_REPOSITORY})."
            ),
            false,
        );
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}
