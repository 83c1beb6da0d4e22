use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_PORT: u16 = 3456;
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_BASE_URL: &str = "https://api.airtop.ai/api/v1";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_MAX_CONNECTIONS: usize = 64;
pub const DEFAULT_KEEP_ALIVE_SECS: u64 = 15;

/// Main Conduit configuration
///
/// Configuration is loaded from (in priority order):
/// 1. `conduit.jsonc` - JSON with comments
/// 2. `conduit.json` - Standard JSON
/// 3. `conduit.yml` / `conduit.yaml` - YAML format
///
/// Also checks hidden variants (`.conduit.*`) and `~/.config/conduit/` for global config.
///
/// # Example
///
/// ```yaml
/// backend:
///   api_key: ${BROWSER_API_KEY}
///   request_timeout_secs: 60
/// server:
///   transport: sse
///   port: 3456
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConduitConfig {
    #[serde(default)]
    pub backend: BackendSettings,

    #[serde(default)]
    pub server: ServerSettings,
}

/// Settings for the browser-automation backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendSettings {
    /// API credential; required at startup
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Transport binding the gateway serves
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Newline-delimited JSON-RPC over stdin/stdout
    #[default]
    Stdio,
    /// HTTP event stream with a correlated message endpoint
    Sse,
}

impl FromStr for TransportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stdio" | "pipe" => Ok(Self::Stdio),
            "sse" | "http" => Ok(Self::Sse),
            other => Err(format!("unknown transport '{}' (expected stdio or sse)", other)),
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdio => write!(f, "stdio"),
            Self::Sse => write!(f, "sse"),
        }
    }
}

/// Settings for the transport gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default)]
    pub transport: TransportKind,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// When set, SSE clients must send `Authorization: Bearer <token>`
    #[serde(default)]
    pub auth_token: Option<String>,

    #[serde(default = "default_max_connections")]
    pub max_connections: usize,

    #[serde(default = "default_keep_alive")]
    pub keep_alive_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            transport: TransportKind::default(),
            host: default_host(),
            port: default_port(),
            auth_token: None,
            max_connections: default_max_connections(),
            keep_alive_secs: default_keep_alive(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_max_connections() -> usize {
    DEFAULT_MAX_CONNECTIONS
}

fn default_keep_alive() -> u64 {
    DEFAULT_KEEP_ALIVE_SECS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConduitConfig::default();
        assert_eq!(config.server.port, 3456);
        assert_eq!(config.server.transport, TransportKind::Stdio);
        assert!(config.backend.api_key.is_none());
        assert_eq!(config.backend.request_timeout_secs, 120);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config: ConduitConfig = serde_yaml_ng::from_str("server:\n  transport: sse\n").unwrap();
        assert_eq!(config.server.transport, TransportKind::Sse);
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.backend.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_transport_from_str() {
        assert_eq!("SSE".parse::<TransportKind>().unwrap(), TransportKind::Sse);
        assert_eq!("stdio".parse::<TransportKind>().unwrap(), TransportKind::Stdio);
        assert!("carrier-pigeon".parse::<TransportKind>().is_err());
    }
}
