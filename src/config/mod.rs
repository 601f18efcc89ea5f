//! Configuration management
//!
//! This module handles loading and parsing configuration for the admin application.
//! Configuration can be loaded from:
//! - config.yml file
//! - Environment variables (override file settings)
//!
//! Missing optional values are filled with sensible defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Upstream content service configuration
    #[serde(default)]
    pub upstream: UpstreamConfig,
    /// Session configuration
    #[serde(default)]
    pub session: SessionConfig,
    /// Template configuration
    #[serde(default)]
    pub templates: TemplateConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory served for unknown paths (stylesheets, scripts, images)
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_dir: default_public_dir(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("public")
}

/// Upstream content service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the content service
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Application access token sent with every call
    #[serde(default)]
    pub access_token: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            access_token: String::new(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.jp-fan-app.de".to_string()
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Lifetime of a session in seconds
    #[serde(default = "default_session_ttl")]
    pub ttl_seconds: u64,
    /// Mark the session cookie `Secure`
    #[serde(default)]
    pub secure_cookie: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_session_ttl(),
            secure_cookie: false,
        }
    }
}

fn default_session_ttl() -> u64 {
    86400
}

/// Template configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// Directory whose `.html` files replace the embedded templates of the same name
    #[serde(default)]
    pub override_dir: Option<PathBuf>,
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path} {message}")]
    ParseError { path: String, message: String },
}

impl Config {
    /// Load configuration from file
    ///
    /// If the file doesn't exist, returns default configuration.
    /// If the file exists but is invalid YAML, returns an error with details.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: format_yaml_error(&e),
        })?;

        Ok(config)
    }

    /// Load configuration from file with environment variable overrides
    ///
    /// Environment variables follow the pattern:
    /// - JPFAN_ADMIN_SERVER_HOST
    /// - JPFAN_ADMIN_SERVER_PORT
    /// - JPFAN_ADMIN_PUBLIC_DIR
    /// - JPFAN_ADMIN_UPSTREAM_URL
    /// - JPFAN_ADMIN_ACCESS_TOKEN (falls back to ACCESS_TOKEN)
    /// - JPFAN_ADMIN_SESSION_TTL_SECONDS
    /// - JPFAN_ADMIN_SESSION_SECURE_COOKIE
    /// - JPFAN_ADMIN_TEMPLATES_DIR
    pub fn load_with_env(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("JPFAN_ADMIN_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("JPFAN_ADMIN_SERVER_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.server.port = port;
            }
        }
        if let Ok(dir) = std::env::var("JPFAN_ADMIN_PUBLIC_DIR") {
            self.server.public_dir = PathBuf::from(dir);
        }

        if let Ok(url) = std::env::var("JPFAN_ADMIN_UPSTREAM_URL") {
            self.upstream.base_url = url;
        }
        if let Ok(token) =
            std::env::var("JPFAN_ADMIN_ACCESS_TOKEN").or_else(|_| std::env::var("ACCESS_TOKEN"))
        {
            self.upstream.access_token = token;
        }

        if let Ok(ttl) = std::env::var("JPFAN_ADMIN_SESSION_TTL_SECONDS") {
            if let Ok(ttl) = ttl.parse::<u64>() {
                self.session.ttl_seconds = ttl;
            }
        }
        if let Ok(secure) = std::env::var("JPFAN_ADMIN_SESSION_SECURE_COOKIE") {
            match secure.to_lowercase().as_str() {
                "1" | "true" | "yes" => self.session.secure_cookie = true,
                "0" | "false" | "no" => self.session.secure_cookie = false,
                _ => {} // Ignore invalid values
            }
        }

        if let Ok(dir) = std::env::var("JPFAN_ADMIN_TEMPLATES_DIR") {
            self.templates.override_dir = Some(PathBuf::from(dir));
        }
    }

    /// Socket address string the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Format YAML parsing error with location and context
fn format_yaml_error(e: &serde_yaml::Error) -> String {
    if let Some(location) = e.location() {
        format!(
            "at line {}, column {}: {}",
            location.line(),
            location.column(),
            e
        )
    } else {
        e.to_string()
    }
}

// Shared mutex for all config tests that modify environment variables.
#[cfg(test)]
static CONFIG_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());
