//! Plugin lifecycle state machine
//!
//! Each registry entry is either Loaded or Unloaded. Transitions resolve
//! the user-supplied display name through the registry first, then apply
//! under one mutex so concurrent operations cannot interleave. Expected
//! failures are typed values rendered back to the caller; nothing here
//! panics.

use std::collections::BTreeSet;
use std::fmt;

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{info, warn};

use crate::CommandList;

use super::registry::{Namespace, PluginRegistry, PluginSpec};

/// Expected plugin-lifecycle failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PluginError {
    #[error("No plugin by the name `{0}` was found!")]
    NotFound(String),

    #[error("Plugin `{0}` is already loaded!")]
    AlreadyLoaded(String),

    #[error("Plugin `{0}` is not loaded!")]
    NotLoaded(String),

    #[error("Cannot unload protected plugin `{0}`!")]
    Protected(String),
}

/// The lifecycle operation that was performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginOp {
    Load,
    Unload,
    Reload,
}

impl PluginOp {
    pub fn past_tense(&self) -> &'static str {
        match self {
            PluginOp::Load => "loaded",
            PluginOp::Unload => "unloaded",
            PluginOp::Reload => "reloaded",
        }
    }
}

impl fmt::Display for PluginOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.past_tense())
    }
}

/// Structured success report for one lifecycle operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginOutcome {
    /// Display name of the affected plugin.
    pub name: String,
    /// Its load identifier.
    pub load_path: String,
    pub op: PluginOp,
}

/// Tracks which plugins are loaded and guards protected ones.
#[derive(Debug)]
pub struct PluginManager {
    registry: PluginRegistry,
    /// Loaded load-identifiers. One lock serializes all transitions.
    loaded: Mutex<BTreeSet<String>>,
    dev_mode: bool,
}

impl PluginManager {
    /// Start with every Core plugin loaded (the boot set always includes
    /// the protected plugins).
    pub fn new(registry: PluginRegistry, dev_mode: bool) -> Self {
        let loaded = registry
            .specs()
            .iter()
            .filter(|spec| spec.namespace == Namespace::Core)
            .map(|spec| spec.load_path.to_string())
            .collect();

        Self {
            registry,
            loaded: Mutex::new(loaded),
            dev_mode,
        }
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    pub fn dev_mode(&self) -> bool {
        self.dev_mode
    }

    /// Resolve a display name to its registry entry.
    fn resolve(&self, name: &str) -> Result<&PluginSpec, PluginError> {
        let load_path = self
            .registry
            .name_to_load_path()
            .remove(name)
            .ok_or_else(|| PluginError::NotFound(name.to_string()))?;

        // The mapping was derived from the table, so the spec must exist.
        self.registry
            .spec(&load_path)
            .ok_or_else(|| PluginError::NotFound(name.to_string()))
    }

    /// Transition Unloaded → Loaded.
    pub fn load(&self, name: &str) -> Result<PluginOutcome, PluginError> {
        let spec = self.resolve(name)?;

        let mut loaded = self.loaded.lock();
        if !loaded.insert(spec.load_path.to_string()) {
            return Err(PluginError::AlreadyLoaded(spec.name.to_string()));
        }

        info!("Plugin `{}` loaded ({})", spec.name, spec.load_path);
        Ok(PluginOutcome {
            name: spec.name.to_string(),
            load_path: spec.load_path.to_string(),
            op: PluginOp::Load,
        })
    }

    /// Transition Loaded → Unloaded. Protected plugins refuse outside
    /// development mode.
    pub fn unload(&self, name: &str) -> Result<PluginOutcome, PluginError> {
        let spec = self.resolve(name)?;

        let mut loaded = self.loaded.lock();
        if spec.protected && !self.dev_mode {
            warn!("Refusing to unload protected plugin `{}`", spec.name);
            return Err(PluginError::Protected(spec.name.to_string()));
        }
        if !loaded.remove(spec.load_path) {
            return Err(PluginError::NotLoaded(spec.name.to_string()));
        }

        info!("Plugin `{}` unloaded ({})", spec.name, spec.load_path);
        Ok(PluginOutcome {
            name: spec.name.to_string(),
            load_path: spec.load_path.to_string(),
            op: PluginOp::Unload,
        })
    }

    /// Unload-then-load on the same identifier. The command set is rebuilt
    /// from the spec's constructor, so no state survives the transition.
    pub fn reload(&self, name: &str) -> Result<PluginOutcome, PluginError> {
        let spec = self.resolve(name)?;

        let mut loaded = self.loaded.lock();
        if spec.protected && !self.dev_mode {
            warn!("Refusing to reload protected plugin `{}`", spec.name);
            return Err(PluginError::Protected(spec.name.to_string()));
        }
        if !loaded.contains(spec.load_path) {
            return Err(PluginError::NotLoaded(spec.name.to_string()));
        }
        loaded.remove(spec.load_path);
        loaded.insert(spec.load_path.to_string());

        info!("Plugin `{}` reloaded ({})", spec.name, spec.load_path);
        Ok(PluginOutcome {
            name: spec.name.to_string(),
            load_path: spec.load_path.to_string(),
            op: PluginOp::Reload,
        })
    }

    /// Whether a plugin is currently loaded, by load identifier.
    pub fn is_loaded(&self, load_path: &str) -> bool {
        self.loaded.lock().contains(load_path)
    }

    /// Snapshot of loaded load-identifiers, for listings.
    pub fn loaded_paths(&self) -> BTreeSet<String> {
        self.loaded.lock().clone()
    }

    /// Whether a top-level command may be dispatched. Commands not owned
    /// by any plugin are always allowed.
    pub fn command_enabled(&self, command_name: &str) -> bool {
        match self.registry.owning_plugin(command_name) {
            Some(spec) => self.is_loaded(spec.load_path),
            None => true,
        }
    }

    /// Every command from every registered plugin, for framework
    /// registration at startup. Dispatch of unloaded plugins' commands is
    /// gated by [`Self::command_enabled`].
    pub fn all_commands(&self) -> CommandList {
        self.registry
            .specs()
            .iter()
            .flat_map(|spec| (spec.commands)())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::registry::no_commands;

    fn test_registry() -> PluginRegistry {
        PluginRegistry::with_specs(vec![
            PluginSpec {
                name: "Core",
                load_path: "core.core",
                description: "core commands",
                namespace: Namespace::Core,
                protected: true,
                commands: no_commands,
                command_names: &["ping", "shutdown"],
            },
            PluginSpec {
                name: "About",
                load_path: "core.about",
                description: "about the bot",
                namespace: Namespace::Core,
                protected: false,
                commands: no_commands,
                command_names: &["about"],
            },
            PluginSpec {
                name: "Greeter",
                load_path: "ext.greeter",
                description: "bundled extension",
                namespace: Namespace::Bundled,
                protected: false,
                commands: no_commands,
                command_names: &["greet"],
            },
        ])
    }

    fn manager(dev_mode: bool) -> PluginManager {
        PluginManager::new(test_registry(), dev_mode)
    }

    #[test]
    fn core_plugins_start_loaded_and_bundled_do_not() {
        let manager = manager(false);

        assert!(manager.is_loaded("core.core"));
        assert!(manager.is_loaded("core.about"));
        assert!(!manager.is_loaded("ext.greeter"));
    }

    #[test]
    fn load_twice_yields_already_loaded() {
        let manager = manager(false);

        let outcome = manager.load("Greeter").unwrap();
        assert_eq!(outcome.op, PluginOp::Load);
        assert_eq!(outcome.load_path, "ext.greeter");

        assert_eq!(
            manager.load("Greeter"),
            Err(PluginError::AlreadyLoaded("Greeter".to_string()))
        );
    }

    #[test]
    fn unload_twice_yields_not_loaded() {
        let manager = manager(false);

        let outcome = manager.unload("About").unwrap();
        assert_eq!(outcome.op, PluginOp::Unload);

        assert_eq!(
            manager.unload("About"),
            Err(PluginError::NotLoaded("About".to_string()))
        );
    }

    #[test]
    fn unknown_name_yields_not_found() {
        let manager = manager(false);

        assert_eq!(
            manager.load("Nonexistent"),
            Err(PluginError::NotFound("Nonexistent".to_string()))
        );
        assert_eq!(
            manager.unload("Nonexistent"),
            Err(PluginError::NotFound("Nonexistent".to_string()))
        );
    }

    #[test]
    fn protected_plugin_stays_loaded_outside_dev_mode() {
        let manager = manager(false);

        assert_eq!(
            manager.unload("Core"),
            Err(PluginError::Protected("Core".to_string()))
        );
        assert!(manager.is_loaded("core.core"));
    }

    #[test]
    fn dev_mode_lifts_the_protected_guard() {
        let manager = manager(true);

        let outcome = manager.unload("Core").unwrap();
        assert_eq!(outcome.op, PluginOp::Unload);
        assert!(!manager.is_loaded("core.core"));
    }

    #[test]
    fn reload_requires_loaded_state() {
        let manager = manager(false);

        assert_eq!(manager.reload("About").unwrap().op, PluginOp::Reload);
        assert!(manager.is_loaded("core.about"));

        manager.unload("About").unwrap();
        assert_eq!(
            manager.reload("About"),
            Err(PluginError::NotLoaded("About".to_string()))
        );
    }

    #[test]
    fn command_gating_follows_plugin_state() {
        let manager = manager(false);

        assert!(manager.command_enabled("about"));
        manager.unload("About").unwrap();
        assert!(!manager.command_enabled("about"));

        // Commands owned by no plugin are never gated
        assert!(manager.command_enabled("help"));
    }
}
