use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::SourceKind;
use crate::error::{Result, XgrabError};

pub const CONFIG_ENV: &str = "XGRAB_CONFIG";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 60,
            connect_timeout_secs: 20,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub sources: Vec<SourceKind>,
    pub http: HttpConfig,
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sources: SourceKind::defaults(),
            http: HttpConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        if config.sources.is_empty() {
            return Err(XgrabError::ConfigError(
                "`sources` must name at least one source".to_string(),
            ));
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            XgrabError::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// Load the config from an explicit path or the first file found by `find_config_path`.
    /// No file at all yields the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit.map(Path::to_path_buf).or_else(find_config_path) {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }
}

/// Locate a config file: `XGRAB_CONFIG`, then `$XDG_CONFIG_HOME/xgrab`, then `~/.config/xgrab`
pub fn find_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }

    if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
        let config_path = Path::new(&xdg_config_home).join("xgrab").join("config.toml");
        if config_path.exists() {
            return Some(config_path);
        }
    }

    if let Some(home) = dirs::home_dir() {
        let config_path = home.join(".config").join("xgrab").join("config.toml");
        if config_path.exists() {
            return Some(config_path);
        }
    }

    None
}
