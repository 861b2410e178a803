//! Configuration for the feedsync command line.
//!
//! Configuration is read from `~/.config/feedsync/config.toml` unless a path
//! is given explicitly. If the file doesn't exist, a default configuration
//! with comments is created.

use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub session: SessionConfig,
    pub http: HttpConfig,
}

/// Where the backend lives and how the app identifies itself to it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub base_url: String,
    pub app_token: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/".to_string(),
            app_token: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Token from a previous login, restored at startup.
    pub auth_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!("feedsync/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path. The file must exist.
    /// Missing fields use default values.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/feedsync/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("feedsync").join("config.toml"))
    }

    pub fn base_url(&self) -> Result<Url, ConfigError> {
        Ok(Url::parse(&self.server.base_url)?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs)
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        tracing::info!(path = %path.display(), "Created default config");
        Ok(())
    }

    fn default_config_content() -> String {
        format!(
            r##"# feedsync configuration

[server]
# Root of the sync backend. API paths are resolved against it.
base_url = "http://localhost:3000/"

# Token identifying this application, sent as X-APP-TOKEN.
app_token = ""

[session]
# Set after `feedsync login` to use the commands that need an account.
# auth_token = ""

[http]
# Request timeout in seconds
timeout_secs = 30

user_agent = "feedsync/{}"
"##,
            env!("CARGO_PKG_VERSION")
        )
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid server base_url: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
}
