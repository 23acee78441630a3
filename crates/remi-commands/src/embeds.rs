//! Embed templates shared by all command replies

use poise::serenity_prelude::{Colour, CreateEmbed};

/// Green, for completed operations.
pub const SUCCESS_COLOUR: Colour = Colour(0x71F79F);
/// Red, for failed operations.
pub const FAILURE_COLOUR: Colour = Colour(0xED254E);
/// Yellow, for partially-applied operations.
pub const WARNING_COLOUR: Colour = Colour(0xF9DC5C);
/// Blue, for neutral information.
pub const INFO_COLOUR: Colour = Colour(0x7CB7FF);

/// Minimal success embed. Callers chain `.description()` / `.field()` as
/// needed.
pub fn success_embed(title: impl Into<String>) -> CreateEmbed {
    CreateEmbed::new().title(title).colour(SUCCESS_COLOUR)
}

/// Minimal failure embed.
pub fn failure_embed(title: impl Into<String>) -> CreateEmbed {
    CreateEmbed::new().title(title).colour(FAILURE_COLOUR)
}

/// Minimal warning embed.
pub fn warning_embed(title: impl Into<String>) -> CreateEmbed {
    CreateEmbed::new().title(title).colour(WARNING_COLOUR)
}

/// Minimal info embed.
pub fn info_embed(title: impl Into<String>) -> CreateEmbed {
    CreateEmbed::new().title(title).colour(INFO_COLOUR)
}

/// Failure embed for a storage error already logged server-side. No
/// internal detail crosses into the chat surface.
pub fn storage_failure_embed() -> CreateEmbed {
    failure_embed("Something went wrong!")
        .description("Could not reach the settings database. Please try again later.")
}
