//! Environment-based configuration loading
//!
//! Recognized variables:
//! - `TOKEN` — Discord bot token (required).
//! - `BOT_PREFIX` — global default command prefix (default: `r!`).
//! - `OWNER_IDS` — comma-separated user ids; malformed values fall back to
//!   an empty list with a warning, never a startup failure.
//! - `DATA_PATH` — directory for persisted state. Unset defaults to the
//!   current directory; a relative path is absolutized and confirmed
//!   interactively before use.
//! - `REMI_DEVMODE` — presence disables the protected-plugin guard.

use std::env;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::settings::Config;

/// Default command prefix when `BOT_PREFIX` is not set.
const DEFAULT_PREFIX: &str = "r!";

/// Errors that abort startup. Everything else degrades with a warning.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable TOKEN is not set")]
    MissingToken,

    #[error("declined to use '{}' as the data directory", .0.display())]
    DataPathDeclined(PathBuf),

    #[error("failed to create data directory '{}': {source}", .path.display())]
    DataPathCreate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read confirmation prompt: {0}")]
    Prompt(#[from] io::Error),
}

/// Loads [`Config`] from the process environment.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Assemble the configuration, prompting on stdin if `DATA_PATH` is
    /// relative.
    pub fn load() -> Result<Config, ConfigError> {
        let token = env::var("TOKEN").map_err(|_| ConfigError::MissingToken)?;

        let default_prefix = env::var("BOT_PREFIX").unwrap_or_else(|_| {
            info!("BOT_PREFIX not set, using default prefix {DEFAULT_PREFIX:?}");
            DEFAULT_PREFIX.to_string()
        });

        let owner_ids = parse_owner_ids(env::var("OWNER_IDS").ok().as_deref());

        let data_path = resolve_data_path(env::var("DATA_PATH").ok().as_deref())?;

        let dev_mode = env::var_os("REMI_DEVMODE").is_some();
        if dev_mode {
            warn!("REMI_DEVMODE is set, protected plugins may be unloaded");
        }

        Ok(Config {
            token,
            default_prefix,
            owner_ids,
            data_path,
            dev_mode,
        })
    }
}

/// Parse `OWNER_IDS`. Any malformed entry discards the whole list: owners
/// gate destructive commands, so a partially-applied list is worse than an
/// empty one.
fn parse_owner_ids(raw: Option<&str>) -> Vec<u64> {
    let Some(raw) = raw else {
        warn!("OWNER_IDS not set, no bot owners configured");
        return Vec::new();
    };

    match raw
        .split(',')
        .map(|id| id.trim().parse::<u64>())
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(ids) => ids,
        Err(_) => {
            warn!("Could not parse OWNER_IDS {raw:?}, no bot owners configured");
            Vec::new()
        }
    }
}

/// Resolve and create the data directory.
fn resolve_data_path(raw: Option<&str>) -> Result<PathBuf, ConfigError> {
    let data_path = match raw {
        None => {
            warn!("DATA_PATH not set, defaulting to the current directory");
            PathBuf::from(".")
        }
        Some(raw) => PathBuf::from(raw),
    };

    let data_path = if data_path.is_absolute() {
        data_path
    } else {
        let absolute = data_path
            .canonicalize()
            .unwrap_or_else(|_| env::current_dir().unwrap_or_default().join(&data_path));

        if !confirm_data_path(&absolute)? {
            return Err(ConfigError::DataPathDeclined(absolute));
        }
        info!(
            "Using '{}' as the data directory. Set DATA_PATH to suppress this prompt.",
            absolute.display()
        );
        absolute
    };

    if !data_path.exists() {
        info!("Creating data directory '{}'", data_path.display());
        std::fs::create_dir_all(&data_path).map_err(|source| ConfigError::DataPathCreate {
            path: data_path.clone(),
            source,
        })?;
    }

    Ok(data_path)
}

/// Ask on stdin whether the absolutized data path is acceptable.
fn confirm_data_path(path: &Path) -> Result<bool, ConfigError> {
    print!(
        "Do you want to use '{}' to store the bot's data? (y/N): ",
        path.display()
    );
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;

    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_ids_parse_valid_list() {
        assert_eq!(
            parse_owner_ids(Some("123,456, 789")),
            vec![123, 456, 789]
        );
    }

    #[test]
    fn owner_ids_malformed_falls_back_to_empty() {
        assert!(parse_owner_ids(Some("123,abc")).is_empty());
        assert!(parse_owner_ids(Some("")).is_empty());
    }

    #[test]
    fn owner_ids_absent_falls_back_to_empty() {
        assert!(parse_owner_ids(None).is_empty());
    }

    #[test]
    fn absolute_data_path_is_created_without_prompting() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("remi-data");

        let resolved = resolve_data_path(Some(target.to_str().unwrap())).unwrap();
        assert_eq!(resolved, target);
        assert!(target.is_dir());
    }
}
