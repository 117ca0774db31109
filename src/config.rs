use crate::constants::{
    DEFAULT_CONFIG_PATH, DEFAULT_HOST, DEFAULT_MAX_BODY_BYTES, DEFAULT_PORT,
    DEFAULT_PREVIEW_CHARS, ENV_HOST, ENV_PORT, ENV_POLICY,
};
use crate::error::{IngestError, Result};
use crate::types::PayloadPolicy;
use serde::Deserialize;
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub ingest: IngestConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub non_json_policy: PayloadPolicy,
    pub preview_chars: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            non_json_policy: PayloadPolicy::default(),
            preview_chars: DEFAULT_PREVIEW_CHARS,
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from `config.toml` when present.
    ///
    /// An explicit path must exist; the implicit default file is optional.
    /// Environment overrides are applied on top.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            IngestError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `WEBHOOK_SINK_*` overrides using `lookup` to read variables.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(ENV_HOST) {
            self.server.host = host;
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| {
                    IngestError::Config(format!("{ENV_PORT} is not a valid port: '{port}'"))
                })?;
        }
        if let Some(policy) = lookup(ENV_POLICY) {
            self.ingest.non_json_policy = policy
                .parse()
                .map_err(|e| IngestError::Config(format!("{ENV_POLICY}: {e}")))?;
        }
        Ok(())
    }

    /// Command line flags win over every other source.
    pub fn apply_overrides(
        &mut self,
        host: Option<String>,
        port: Option<u16>,
        policy: Option<PayloadPolicy>,
    ) {
        if let Some(host) = host {
            self.server.host = host;
        }
        if let Some(port) = port {
            self.server.port = port;
        }
        if let Some(policy) = policy {
            self.ingest.non_json_policy = policy;
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self.server.host.parse().map_err(|_| {
            IngestError::Config(format!("Invalid host address '{}'", self.server.host))
        })?;
        Ok(SocketAddr::new(ip, self.server.port))
    }
}
