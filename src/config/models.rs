//! Configuration data structures for the infradash proxy.
//!
//! The proxy is environment-driven: `PORT`, `TOKEN`, and `HOST` are the
//! only knobs a deployment needs, and the variable names are identical
//! across every host runtime. There are no config files.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use serde::{Deserialize, Serialize};

/// The root configuration object, sourced once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Address to bind. Env: `HOST`.
    /// Default: `0.0.0.0`
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on. Env: `PORT`. Unset means the adapter default
    /// applies (8000 standalone, 3000 socket server); the edge worker
    /// serves on an inherited listener and ignores it.
    #[serde(default)]
    pub port: Option<u16>,

    /// Bearer secret clients must present. Env: `TOKEN`.
    /// Unset disables authentication entirely.
    #[serde(default)]
    pub token: Option<String>,

    /// Upstream inference API settings.
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Logging and output format settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings for the upstream inference API connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Chat-completions endpoint every proxied POST is forwarded to.
    #[serde(default = "default_chat_completions_url")]
    pub chat_completions_url: String,
}

/// Settings for application logging and output format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum log level (`trace`, `debug`, `info`, `warn`, `error`).
    /// `RUST_LOG` overrides. Default: `info`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format for logs (`pretty` or `json`).
    /// Default: `pretty`
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: None,
            token: None,
            upstream: UpstreamConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            chat_completions_url: default_chat_completions_url(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Helper functions for serde defaults

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_chat_completions_url() -> String {
    "https://api.deepinfra.com/v1/openai/chat/completions".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}
