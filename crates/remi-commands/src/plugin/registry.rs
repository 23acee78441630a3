//! Static plugin registry
//!
//! Plugins are registered in an explicit table mapping display name to
//! load identifier, description, and a command-set constructor. Scanning
//! the table is a pure query: repeated scans return equal results and
//! nothing is mutated, so the dynamic loader can treat any entry as
//! not-yet-imported.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::CommandList;

/// Plugin partitions: built-in command sets and optional extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Namespace {
    Core,
    Bundled,
}

impl Namespace {
    /// Fixed namespace set, in merge order (later entries win on name
    /// collision).
    pub const ALL: [Namespace; 2] = [Namespace::Core, Namespace::Bundled];

    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Core => "Core",
            Namespace::Bundled => "Bundled",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Queryable metadata for one plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginInfo {
    /// Stable load identifier, distinct from the display name.
    pub load_path: String,
    /// Human-readable description.
    pub description: String,
    /// Whether the plugin refuses unload outside development mode.
    pub protected: bool,
}

/// One registry row: everything needed to describe and (re)construct a
/// plugin.
pub struct PluginSpec {
    /// Human-readable display name, the key users address plugins by.
    pub name: &'static str,
    /// Stable load identifier.
    pub load_path: &'static str,
    /// Short description shown in listings.
    pub description: &'static str,
    pub namespace: Namespace,
    /// Protected plugins provide operation-critical commands and cannot be
    /// unloaded outside development mode.
    pub protected: bool,
    /// Constructor for the plugin's command set. Called on every load, so
    /// a reload never observes stale command state.
    pub commands: fn() -> CommandList,
    /// Top-level command names owned by this plugin, used to gate dispatch
    /// while the plugin is unloaded.
    pub command_names: &'static [&'static str],
}

impl fmt::Debug for PluginSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginSpec")
            .field("name", &self.name)
            .field("load_path", &self.load_path)
            .field("namespace", &self.namespace)
            .field("protected", &self.protected)
            .finish()
    }
}

impl PluginSpec {
    fn info(&self) -> PluginInfo {
        PluginInfo {
            load_path: self.load_path.to_string(),
            description: self.description.to_string(),
            protected: self.protected,
        }
    }
}

/// The name-keyed plugin table.
#[derive(Debug)]
pub struct PluginRegistry {
    specs: Vec<PluginSpec>,
}

impl PluginRegistry {
    /// The plugins shipped with the bot. The Bundled namespace is empty by
    /// default; extensions register alongside these rows.
    pub fn builtin() -> Self {
        Self::with_specs(vec![
            PluginSpec {
                name: "Core",
                load_path: "core.core",
                description: "Remi's core commands.",
                namespace: Namespace::Core,
                protected: true,
                commands: crate::core::commands,
                command_names: &["ping", "shutdown"],
            },
            PluginSpec {
                name: "Plugin Manager",
                load_path: "core.plugin_manager",
                description: "Manage hot-(un)loading of Remi's plugins.",
                namespace: Namespace::Core,
                protected: true,
                commands: crate::plugin_manager::commands,
                command_names: &["plugin"],
            },
            PluginSpec {
                name: "About",
                load_path: "core.about",
                description: "Information about Remi.",
                namespace: Namespace::Core,
                protected: false,
                commands: crate::about::commands,
                command_names: &["about"],
            },
            PluginSpec {
                name: "Prefix Manager",
                load_path: "core.prefix",
                description: "Manage this server's prefix.",
                namespace: Namespace::Core,
                protected: false,
                commands: crate::prefix::commands,
                command_names: &["setprefix", "unsetprefix"],
            },
            PluginSpec {
                name: "Staff Role",
                load_path: "core.staff_role",
                description: "Manage this server's designated staff roles.",
                namespace: Namespace::Core,
                protected: false,
                commands: crate::staff::commands,
                command_names: &["staff"],
            },
        ])
    }

    /// Build a registry from an explicit spec table.
    pub fn with_specs(specs: Vec<PluginSpec>) -> Self {
        Self { specs }
    }

    pub fn specs(&self) -> &[PluginSpec] {
        &self.specs
    }

    /// All qualifying plugins in one namespace, keyed by display name.
    pub fn scan(&self, namespace: Namespace) -> BTreeMap<String, PluginInfo> {
        self.specs
            .iter()
            .filter(|spec| spec.namespace == namespace)
            .map(|spec| (spec.name.to_string(), spec.info()))
            .collect()
    }

    /// Every plugin, partitioned by namespace.
    pub fn get_all(&self) -> BTreeMap<Namespace, BTreeMap<String, PluginInfo>> {
        Namespace::ALL
            .iter()
            .map(|&namespace| (namespace, self.scan(namespace)))
            .collect()
    }

    /// Flattened display-name → load-identifier mapping. Merged in
    /// [`Namespace::ALL`] order, so a Bundled plugin shadows a Core plugin
    /// with the same name.
    pub fn name_to_load_path(&self) -> HashMap<String, String> {
        let mut mapping = HashMap::new();
        for namespace in Namespace::ALL {
            for (name, info) in self.scan(namespace) {
                mapping.insert(name, info.load_path);
            }
        }
        mapping
    }

    /// Look up a spec by its load identifier.
    pub fn spec(&self, load_path: &str) -> Option<&PluginSpec> {
        self.specs.iter().find(|spec| spec.load_path == load_path)
    }

    /// The plugin owning a given top-level command, if any.
    pub fn owning_plugin(&self, command_name: &str) -> Option<&PluginSpec> {
        self.specs
            .iter()
            .find(|spec| spec.command_names.contains(&command_name))
    }
}

#[cfg(test)]
pub(crate) fn no_commands() -> CommandList {
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(
        name: &'static str,
        load_path: &'static str,
        namespace: Namespace,
    ) -> PluginSpec {
        PluginSpec {
            name,
            load_path,
            description: "test plugin",
            namespace,
            protected: false,
            commands: no_commands,
            command_names: &[],
        }
    }

    #[test]
    fn scanning_is_a_pure_query() {
        let registry = PluginRegistry::builtin();

        let first = registry.scan(Namespace::Core);
        let second = registry.scan(Namespace::Core);
        assert_eq!(first, second);
        assert!(!first.is_empty());

        assert_eq!(registry.get_all(), registry.get_all());
    }

    #[test]
    fn builtin_table_has_expected_entries() {
        let registry = PluginRegistry::builtin();
        let core = registry.scan(Namespace::Core);

        assert!(core.contains_key("Core"));
        assert!(core.contains_key("Plugin Manager"));
        assert!(core["Core"].protected);
        assert!(!core["About"].protected);
        assert!(registry.scan(Namespace::Bundled).is_empty());
    }

    #[test]
    fn bundled_overrides_core_on_name_collision() {
        let registry = PluginRegistry::with_specs(vec![
            spec("Greeter", "core.greeter", Namespace::Core),
            spec("Greeter", "ext.greeter", Namespace::Bundled),
            spec("Uptime", "core.uptime", Namespace::Core),
        ]);

        let mapping = registry.name_to_load_path();
        assert_eq!(mapping["Greeter"], "ext.greeter");
        assert_eq!(mapping["Uptime"], "core.uptime");
    }

    #[test]
    fn command_ownership_lookup() {
        let registry = PluginRegistry::builtin();

        assert_eq!(registry.owning_plugin("ping").unwrap().name, "Core");
        assert_eq!(
            registry.owning_plugin("setprefix").unwrap().name,
            "Prefix Manager"
        );
        assert!(registry.owning_plugin("help").is_none());
    }
}
