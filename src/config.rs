use std::path::{Path, PathBuf};
use std::time::Duration;

use ::config::{File, FileFormat};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::relays::DEFAULT_RELAYS;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Relays to connect to, also announced in zap requests.
    pub default_relays: Vec<String>,
    pub http_timeout_secs: u64,
    /// How long to wait for relays to return stored events.
    pub relay_timeout_secs: u64,
    /// Tracing filter directives.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            default_relays: DEFAULT_RELAYS.iter().map(|r| r.to_string()).collect(),
            http_timeout_secs: 30,
            relay_timeout_secs: 10,
            log_filter: "info,hyper=info".to_string(),
        }
    }
}

impl Config {
    /// Default location of the configuration file.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com.stemstr", "", "Stemstr").map(|d| d.config_dir().join("config.toml"))
    }

    /// Reads configuration from a TOML file at `path`. Values missing from
    /// the file, or the whole file, fall back to defaults.
    pub fn load(path: &Path) -> Result<Config> {
        let config = ::config::Config::builder()
            .add_source(::config::Config::try_from(&Config::default())?)
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ::config::ConfigError::Message(e.to_string()))?;

        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, toml)?;
        Ok(())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn relay_timeout(&self) -> Duration {
        Duration::from_secs(self.relay_timeout_secs)
    }
}
