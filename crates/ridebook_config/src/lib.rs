use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use std::env;
use std::path::PathBuf;
use tracing::info;

pub mod env_vars;
pub mod models;

pub use models::*;

/// Directory holding `default.toml` and `{RUN_ENV}.toml`, relative to the working directory.
const DEFAULT_CONFIG_DIR: &str = "config";

/// Loads the application configuration.
///
/// Sources, later ones winning:
/// 1. `config/default.{toml,yaml,json}` (optional)
/// 2. `config/{RUN_ENV}.*` (optional, `RUN_ENV` defaults to `debug`)
/// 3. `RIDEBOOK__SECTION__KEY` environment variables
///
/// Afterwards every `"secret_from_env"` marker is resolved through [`env_vars::inject_env_vars`].
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());
    let prefix = env_vars::get_config_prefix();
    let config_dir =
        PathBuf::from(env::var("CONFIG_DIR").unwrap_or_else(|_| DEFAULT_CONFIG_DIR.to_string()));

    let default_path = config_dir.join("default");
    let env_path = config_dir.join(&run_env);

    info!(
        "Loading config: default={}, env={}, prefix={}",
        default_path.display(),
        env_path.display(),
        prefix
    );

    let builder = Config::builder()
        .add_source(File::with_name(&default_path.to_string_lossy()).required(false))
        .add_source(File::with_name(&env_path.to_string_lossy()).required(false))
        .add_source(environment(&prefix));

    let raw: serde_json::Value = builder.build()?.try_deserialize()?;
    config_from_value(raw)
}

/// `PREFIX__SECTION__KEY` variables, kept as text. Typed fields parse their
/// text themselves, so all-digit secrets and ids are never turned into numbers.
fn environment(prefix: &str) -> Environment {
    Environment::with_prefix(prefix).separator(env_vars::CONFIG_SEPARATOR)
}

/// Resolves secret markers in an already merged configuration tree and deserializes it.
pub fn config_from_value(mut raw: serde_json::Value) -> Result<AppConfig, ConfigError> {
    let missing = env_vars::inject_env_vars(&mut raw);
    if !missing.is_empty() {
        info!("Unresolved secrets left empty: {:?}", missing);
    }
    serde_json::from_value(raw)
        .map_err(|err| ConfigError::Message(format!("invalid configuration: {err}")))
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Loads the dotenv file once per process and returns the path that was used.
///
/// `DOTENV_OVERRIDE` wins over a first CLI argument starting with `.env`,
/// which wins over the default `.env`.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path_override = env::var("DOTENV_OVERRIDE").ok();
    let dotenv_path_arg = env::args().nth(1).filter(|s| s.starts_with(".env"));

    let dotenv_path = dotenv_path_override
        .or(dotenv_path_arg)
        .unwrap_or_else(|| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_config_from_value_minimal() {
        let config = config_from_value(json!({
            "server": { "host": "127.0.0.1", "port": 8080 },
            "platform": {
                "base_url": "https://platform.example",
                "client_id": "client-abc"
            }
        }))
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.platform.timeout_secs, 30);
        assert!(config.platform.api_key.is_none());
        assert!(config.checkout.is_none());
        assert_eq!(config.session.cookie_name, "ridebook_session");
    }

    #[test]
    fn test_config_from_value_resolves_only_exact_markers() {
        let config = config_from_value(json!({
            "server": { "host": "127.0.0.1", "port": 8080 },
            "platform": {
                "base_url": "https://platform.example",
                "client_id": "client-abc",
                "api_key": "secret_from_env_never_set_marker_is_literal",
                "account_id": "secret_from_env"
            }
        }))
        .unwrap();

        // Only the exact marker is replaced.
        assert_eq!(
            config.platform.api_key.as_deref(),
            Some("secret_from_env_never_set_marker_is_literal")
        );
        assert!(config.platform.account_id.is_none());
    }

    #[test]
    fn test_all_digit_account_id_from_environment() {
        let vars: config::Map<String, String> = [
            ("RIDEBOOK__SERVER__HOST", "127.0.0.1"),
            ("RIDEBOOK__SERVER__PORT", "8080"),
            ("RIDEBOOK__PLATFORM__BASE_URL", "https://platform.example"),
            ("RIDEBOOK__PLATFORM__CLIENT_ID", "client-abc"),
            ("RIDEBOOK__PLATFORM__ACCOUNT_ID", "000123456"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let raw: serde_json::Value = Config::builder()
            .add_source(environment("RIDEBOOK").source(Some(vars)))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        let config = config_from_value(raw).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.platform.account_id.as_deref(), Some("000123456"));
    }

    #[test]
    fn test_config_from_value_missing_platform_fails() {
        let result = config_from_value(json!({
            "server": { "host": "127.0.0.1", "port": 8080 }
        }));
        assert!(result.is_err());
    }
}
