//! Application configuration structure

use std::path::{Path, PathBuf};

/// Name of the settings database inside the data directory.
const CONFIG_DB_FILENAME: &str = "config.sqlite";

/// Runtime configuration assembled from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Discord bot token.
    pub token: String,

    /// Global default command prefix, used when a guild has no override.
    pub default_prefix: String,

    /// User ids treated as bot owners regardless of guild permissions.
    pub owner_ids: Vec<u64>,

    /// Directory holding the bot's persisted state.
    pub data_path: PathBuf,

    /// Development mode lifts the protected-plugin unload guard.
    pub dev_mode: bool,
}

impl Config {
    /// Path of the settings database (`config.sqlite` inside the data
    /// directory).
    pub fn database_path(&self) -> PathBuf {
        self.data_path.join(CONFIG_DB_FILENAME)
    }

    /// Whether the given user id is a configured bot owner.
    pub fn is_owner(&self, user_id: u64) -> bool {
        self.owner_ids.contains(&user_id)
    }

    /// Test helper: a config rooted at the given data directory.
    #[doc(hidden)]
    pub fn for_tests(data_path: &Path) -> Self {
        Self {
            token: "test-token".to_string(),
            default_prefix: "r!".to_string(),
            owner_ids: vec![],
            data_path: data_path.to_path_buf(),
            dev_mode: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_path_is_inside_data_dir() {
        let config = Config::for_tests(Path::new("/var/lib/remi"));
        assert_eq!(
            config.database_path(),
            PathBuf::from("/var/lib/remi/config.sqlite")
        );
    }

    #[test]
    fn owner_lookup() {
        let mut config = Config::for_tests(Path::new("/tmp"));
        config.owner_ids = vec![123, 456];

        assert!(config.is_owner(123));
        assert!(!config.is_owner(789));
    }
}
