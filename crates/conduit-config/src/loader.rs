use crate::schema::ConduitConfig;
use anyhow::{anyhow, Context, Result};
use secrecy::SecretString;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const API_KEY_ENV: &str = "BROWSER_API_KEY";
pub const BASE_URL_ENV: &str = "BROWSER_API_URL";
pub const PORT_ENV: &str = "CONDUIT_PORT";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Jsonc,
    Json,
    Yaml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;

        match ext {
            "jsonc" => Some(Self::Jsonc),
            "json" => Some(Self::Json),
            "yml" | "yaml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: ConduitConfig,
    /// `None` when no file was found and defaults were used.
    pub path: Option<PathBuf>,
}

/// Load the configuration, falling back to defaults when no file exists.
///
/// An explicit `config_path` must exist. Environment overrides are applied last.
pub fn load_config(config_path: Option<&Path>) -> Result<ResolvedConfig> {
    let mut resolved = match config_path.map(Path::to_path_buf).or_else(find_config_file) {
        Some(path) => load_config_from_file(&path)?,
        None => ResolvedConfig {
            config: ConduitConfig::default(),
            path: None,
        },
    };

    apply_env_overrides(&mut resolved.config, |key| env::var(key).ok())?;
    Ok(resolved)
}

pub fn load_config_from_file(path: &Path) -> Result<ResolvedConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let format = ConfigFormat::from_path(path)
        .ok_or_else(|| anyhow!("Unknown config format for: {}", path.display()))?;

    let config = parse_config_content(&content, format)?;

    Ok(ResolvedConfig {
        config: expand_env_vars(config),
        path: Some(path.to_path_buf()),
    })
}

fn parse_config_content(content: &str, format: ConfigFormat) -> Result<ConduitConfig> {
    match format {
        ConfigFormat::Jsonc => json5::from_str(content).context("Failed to parse JSONC"),
        ConfigFormat::Json => serde_json::from_str(content).context("Failed to parse JSON"),
        ConfigFormat::Yaml => serde_yaml_ng::from_str(content).context("Failed to parse YAML"),
    }
}

/// Overlay environment variables on top of file configuration.
pub fn apply_env_overrides<F>(config: &mut ConduitConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = lookup(API_KEY_ENV).filter(|v| !v.trim().is_empty()) {
        config.backend.api_key = Some(key);
    }
    if let Some(url) = lookup(BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
        config.backend.base_url = url;
    }
    if let Some(port) = lookup(PORT_ENV) {
        config.server.port = port
            .trim()
            .parse()
            .with_context(|| format!("{} must be a port number, got '{}'", PORT_ENV, port))?;
    }
    Ok(())
}

/// The backend credential, or an error naming how to supply it.
pub fn require_api_key(config: &ConduitConfig) -> Result<SecretString> {
    config
        .backend
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|key| !key.is_empty() && !key.starts_with('$'))
        .map(SecretString::from)
        .ok_or_else(|| {
            anyhow!(
                "Missing backend API key: set {} or backend.api_key in the config file",
                API_KEY_ENV
            )
        })
}

const CONFIG_CANDIDATES: &[&str] = &[
    "conduit.jsonc",
    "conduit.json",
    "conduit.yml",
    "conduit.yaml",
    ".conduit.jsonc",
    ".conduit.json",
    ".conduit.yml",
    ".conduit.yaml",
];

fn find_config_file() -> Option<PathBuf> {
    for candidate in CONFIG_CANDIDATES {
        let path = PathBuf::from(candidate);
        if path.exists() {
            return Some(path);
        }
    }

    let global_dir = dirs::home_dir()?.join(".config").join("conduit");
    CONFIG_CANDIDATES
        .iter()
        .map(|candidate| global_dir.join(candidate))
        .find(|path| path.exists())
}

fn expand_env_vars(mut config: ConduitConfig) -> ConduitConfig {
    config.backend.api_key = config.backend.api_key.map(|key| expand_env_string(&key));
    config.backend.base_url = expand_env_string(&config.backend.base_url);
    config.server.host = expand_env_string(&config.server.host);
    config.server.auth_token = config
        .server
        .auth_token
        .map(|token| expand_env_string(&token));
    config
}

/// Substitute `${VAR}` and `$VAR` references. Unset variables stay literal.
fn expand_env_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos + 1..];
        let (name, token_len) = match tail.strip_prefix('{') {
            Some(inner) => {
                let end = inner.find('}').map_or(inner.len(), |i| i + 1);
                (inner[..end].trim_end_matches('}'), end + 2)
            }
            None => {
                let end = tail
                    .find(|c: char| !(c.is_alphanumeric() || c == '_'))
                    .unwrap_or(tail.len());
                (&tail[..end], end + 1)
            }
        };

        match env::var(name) {
            Ok(value) if !name.is_empty() => out.push_str(&value),
            _ => out.push_str(&rest[pos..pos + token_len]),
        }
        rest = &rest[pos + token_len..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TransportKind;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_expand_env_string_with_braces() {
        env::set_var("CONDUIT_TEST_VAR", "test_value");
        let result = expand_env_string("prefix_${CONDUIT_TEST_VAR}_suffix");
        assert_eq!(result, "prefix_test_value_suffix");
    }

    #[test]
    fn test_expand_env_string_without_braces() {
        env::set_var("CONDUIT_TEST_VAR2", "value");
        let result = expand_env_string("hello $CONDUIT_TEST_VAR2 world");
        assert_eq!(result, "hello value world");
    }

    #[test]
    fn test_expand_env_string_missing_var() {
        let result = expand_env_string("prefix_${CONDUIT_NONEXISTENT_VAR}_suffix");
        assert_eq!(result, "prefix_${CONDUIT_NONEXISTENT_VAR}_suffix");
    }

    #[test]
    fn test_expand_env_string_keeps_stray_dollars() {
        assert_eq!(expand_env_string("cost: $ 5"), "cost: $ 5");
        assert_eq!(expand_env_string("tail $"), "tail $");
        assert_eq!(
            expand_env_string("open ${CONDUIT_UNTERMINATED"),
            "open ${CONDUIT_UNTERMINATED"
        );
    }

    #[test]
    fn test_config_format_from_path() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("conduit.jsonc")),
            Some(ConfigFormat::Jsonc)
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("conduit.yaml")),
            Some(ConfigFormat::Yaml)
        );
        assert_eq!(ConfigFormat::from_path(Path::new("conduit.toml")), None);
    }

    #[test]
    fn test_load_jsonc_with_comments() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("conduit.jsonc");
        fs::write(
            &path,
            r#"{
  // backend credential
  "backend": { "api_key": "file-key" },
  "server": { "transport": "sse", "port": 4000 } /* trailing */
}"#,
        )
        .unwrap();

        let resolved = load_config_from_file(&path).unwrap();
        assert_eq!(resolved.path.as_deref(), Some(path.as_path()));
        assert_eq!(resolved.config.server.transport, TransportKind::Sse);
        assert_eq!(resolved.config.server.port, 4000);
        assert_eq!(resolved.config.backend.api_key.as_deref(), Some("file-key"));
    }

    #[test]
    fn test_load_yaml_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("conduit.yml");
        fs::write(&path, "backend:\n  request_timeout_secs: 30\n").unwrap();

        let resolved = load_config_from_file(&path).unwrap();
        assert_eq!(resolved.config.backend.request_timeout_secs, 30);
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("conduit.json");
        assert!(load_config(Some(&path)).is_err());
    }

    #[test]
    fn test_env_overrides_take_precedence() {
        let mut config = ConduitConfig::default();
        config.backend.api_key = Some("from-file".to_string());

        apply_env_overrides(
            &mut config,
            lookup_from(&[
                (API_KEY_ENV, "from-env"),
                (BASE_URL_ENV, "http://localhost:9999"),
                (PORT_ENV, "8080"),
            ]),
        )
        .unwrap();

        assert_eq!(config.backend.api_key.as_deref(), Some("from-env"));
        assert_eq!(config.backend.base_url, "http://localhost:9999");
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_invalid_port_override_is_rejected() {
        let mut config = ConduitConfig::default();
        let result = apply_env_overrides(&mut config, lookup_from(&[(PORT_ENV, "eighty")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_require_api_key() {
        let mut config = ConduitConfig::default();
        assert!(require_api_key(&config).is_err());

        config.backend.api_key = Some("   ".to_string());
        assert!(require_api_key(&config).is_err());

        config.backend.api_key = Some("${UNSET_CONDUIT_KEY}".to_string());
        assert!(require_api_key(&config).is_err());

        config.backend.api_key = Some("secret".to_string());
        assert_eq!(require_api_key(&config).unwrap().expose_secret(), "secret");
    }
}
