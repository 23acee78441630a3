//! Plugin registry and lifecycle management
//!
//! A plugin is a named bundle of commands with a stable load identifier.
//! The registry is a static table built at startup; the manager tracks the
//! Loaded/Unloaded state of each entry and enforces the protected-plugin
//! guard.

pub mod manager;
pub mod registry;

pub use manager::{PluginError, PluginManager, PluginOp, PluginOutcome};
pub use registry::{Namespace, PluginInfo, PluginRegistry, PluginSpec};
