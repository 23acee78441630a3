//! Command surface for the Remi Discord bot
//!
//! Command modules are grouped into plugins (see [`plugin`]) so they can be
//! hot-enabled and disabled at runtime. Every handler renders a structured
//! embed reply; expected failures never bubble out of a handler.

pub mod about;
pub mod core;
pub mod embeds;
pub mod permissions;
pub mod plugin;
pub mod plugin_manager;
pub mod prefix;
pub mod staff;

use std::sync::Arc;

use remi_config::Config;
use remi_db::{PrefixCache, StaffRoleStore};

use crate::plugin::PluginManager;

/// Shared application state, injected into every command handler by poise.
pub struct Data {
    /// Application configuration.
    pub config: Arc<Config>,
    /// Per-guild command prefixes (cache-backed).
    pub prefixes: Arc<PrefixCache>,
    /// Per-guild staff role designations.
    pub staff: Arc<StaffRoleStore>,
    /// Plugin lifecycle manager.
    pub plugins: Arc<PluginManager>,
}

impl std::fmt::Debug for Data {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Data")
            .field("config", &"<Config>")
            .field("prefixes", &"<PrefixCache>")
            .field("staff", &"<StaffRoleStore>")
            .field("plugins", &"<PluginManager>")
            .finish()
    }
}

/// Error type for commands.
pub type CommandError = Box<dyn std::error::Error + Send + Sync>;

/// Poise context type alias.
pub type Context<'a> = poise::Context<'a, Data, CommandError>;

/// A plugin's set of top-level commands.
pub type CommandList = Vec<poise::Command<Data, CommandError>>;
