//! Command-line arguments

use clap::Parser;
use conduit_config::{ConduitConfig, TransportKind};
use std::path::PathBuf;

/// Conduit - browser automation tools over the Model Context Protocol
#[derive(Parser, Debug)]
#[command(name = "conduit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Transport to serve (stdio, sse)
    #[arg(short, long)]
    pub transport: Option<TransportKind>,

    /// Port for the SSE transport
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Interface the SSE transport binds to
    #[arg(long)]
    pub host: Option<String>,

    /// Configuration file (defaults to conduit.{jsonc,json,yml,yaml})
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Backend API key (overrides BROWSER_API_KEY)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Backend base URL (overrides BROWSER_API_URL)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Bearer token SSE clients must present
    #[arg(long)]
    pub auth_token: Option<String>,
}

impl Cli {
    /// Flags take precedence over file and environment settings.
    pub fn apply(&self, config: &mut ConduitConfig) {
        if let Some(transport) = self.transport {
            config.server.transport = transport;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(key) = &self.api_key {
            config.backend.api_key = Some(key.clone());
        }
        if let Some(url) = &self.base_url {
            config.backend.base_url = url.clone();
        }
        if let Some(token) = &self.auth_token {
            config.server.auth_token = Some(token.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "conduit",
            "--transport",
            "sse",
            "--port",
            "4000",
            "--api-key",
            "from-flag",
        ]);
        let mut config = ConduitConfig::default();
        config.backend.api_key = Some("from-env".to_string());

        cli.apply(&mut config);

        assert_eq!(config.server.transport, TransportKind::Sse);
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.backend.api_key.as_deref(), Some("from-flag"));
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_unknown_transport_rejected() {
        assert!(Cli::try_parse_from(["conduit", "--transport", "carrier-pigeon"]).is_err());
    }
}
