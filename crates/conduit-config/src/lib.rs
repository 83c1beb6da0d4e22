pub mod loader;
pub mod schema;

pub use loader::{
    apply_env_overrides, load_config, load_config_from_file, require_api_key, ConfigFormat,
    ResolvedConfig, API_KEY_ENV, BASE_URL_ENV, PORT_ENV,
};
pub use schema::{
    BackendSettings, ConduitConfig, ServerSettings, TransportKind, DEFAULT_BASE_URL,
    DEFAULT_HOST, DEFAULT_KEEP_ALIVE_SECS, DEFAULT_MAX_CONNECTIONS, DEFAULT_PORT,
    DEFAULT_REQUEST_TIMEOUT_SECS,
};
