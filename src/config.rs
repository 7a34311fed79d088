//! Service configuration
//!
//! Layered configuration: `config/default.toml` (optional), then a file named
//! by `KNOWLEDGE_CONFIG` (optional), then `KNOWLEDGE__*` environment
//! variables. The backend password never appears in logs or serialized
//! output.

use crate::error::Result;
use secrecy::SecretString;
use serde::Deserialize;

/// Top-level configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Maximum accepted request body, in bytes
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8082,
            max_body_size: 1024 * 1024,
        }
    }
}

/// External graph-memory engine settings; `uri = None` selects the
/// in-memory fallback store
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    pub uri: Option<String>,
    pub user: Option<String>,
    pub password: Option<SecretString>,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            uri: None,
            user: None,
            password: None,
            database: default_database(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_database() -> String {
    "knowledge".to_string()
}

fn default_timeout_ms() -> u64 {
    5000
}

/// Knowledge core settings
#[derive(Debug, Clone, Deserialize)]
pub struct KnowledgeConfig {
    /// Graph consulted when a request names no graph (or an unregistered one)
    pub default_graph: String,
    /// Hard cap applied on top of per-request `max_results`
    pub max_results_limit: usize,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            default_graph: "platform-kg".to_string(),
            max_results_limit: 100,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            backend: BackendConfig::default(),
            knowledge: KnowledgeConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false));

        if let Ok(path) = std::env::var("KNOWLEDGE_CONFIG") {
            builder = builder.add_source(config::File::with_name(&path).required(false));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix("KNOWLEDGE").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
