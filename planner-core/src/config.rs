//! Planner configuration.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, PlannerResult};
use crate::store::Store;

static DEFAULT_DATA_DIR: &str = "~/planner";
static DEFAULT_BIND: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 4097;

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

/// Configuration at ~/.config/planner/config.toml
///
/// Every key can be overridden with a `PLANNER_` environment variable,
/// e.g. `PLANNER_DATA_DIR=/srv/planner`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PlannerConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_bind")]
    pub bind: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        PlannerConfig {
            data_dir: default_data_dir(),
            bind: default_bind(),
            port: default_port(),
        }
    }
}

impl PlannerConfig {
    pub fn config_path() -> PlannerResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| PlannerError::Config("Could not determine config directory".into()))?
            .join("planner");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the user's config file, writing a commented default first
    /// if there is none.
    pub fn load() -> PlannerResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load from `path` (optional) layered under `PLANNER_*` variables.
    pub fn load_from(path: &Path) -> PlannerResult<Self> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("PLANNER"))
            .build()
            .map_err(|e| PlannerError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| PlannerError::Config(e.to_string()))
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> PlannerResult<()> {
        let contents = format!(
            "\
# planner configuration

# Where logins, users and calendars are stored:
# data_dir = \"{DEFAULT_DATA_DIR}\"

# Address and port the server listens on:
# bind = \"{DEFAULT_BIND}\"
# port = {DEFAULT_PORT}
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                PlannerError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| PlannerError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// The data directory with `~` expanded.
    pub fn data_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.data_dir.to_string_lossy()).into_owned();

        PathBuf::from(full_path_str)
    }

    /// `bind:port`, ready for a socket listener.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    /// Open the store living in the configured data directory, holding
    /// the directory lock for as long as the store lives.
    pub fn open_store(&self) -> PlannerResult<Store> {
        Store::open_exclusive(self.data_path())
    }
}
