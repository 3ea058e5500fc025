//! Environment variable handling for the Ridebook application.
//!
//! Configuration values come from `RIDEBOOK__SECTION__KEY` variables (handled by
//! the `config` crate in `load_config`). Secrets are referenced from the config
//! files with the `"secret_from_env"` marker and resolved here, first from
//! `RIDEBOOK_SECRET_SECTION_KEY`, then from the plain `SECTION_KEY` name.

use std::env;
use tracing::warn;

/// The default prefix for configuration environment variables
pub const DEFAULT_PREFIX: &str = "RIDEBOOK";

/// The prefix for secret environment variables
pub const SECRET_PREFIX: &str = "RIDEBOOK_SECRET";

/// The separator for configuration environment variables
pub const CONFIG_SEPARATOR: &str = "__";

/// The separator for secret environment variables
pub const SECRET_SEPARATOR: &str = "_";

/// Marker value replaced by an environment variable at load time.
pub const SECRET_MARKER: &str = "secret_from_env";

/// Get the prefix for configuration environment variables
pub fn get_config_prefix() -> String {
    env::var("PREFIX").unwrap_or_else(|_| DEFAULT_PREFIX.to_string())
}

/// Convert a configuration path to an environment variable name
///
/// `"server.host"` becomes `"RIDEBOOK__SERVER__HOST"`.
pub fn config_path_to_env_var(path: &str) -> String {
    let prefix = get_config_prefix();
    let path = path.replace('.', CONFIG_SEPARATOR);
    format!("{}{}{}", prefix, CONFIG_SEPARATOR, path).to_uppercase()
}

/// Convert a secret path to an environment variable name
///
/// `"platform.api_key"` becomes `"RIDEBOOK_SECRET_PLATFORM_API_KEY"`.
pub fn secret_path_to_env_var(path: &str) -> String {
    let path = path.replace('.', SECRET_SEPARATOR);
    format!("{}{}{}", SECRET_PREFIX, SECRET_SEPARATOR, path).to_uppercase()
}

/// Convert a secret path to its unprefixed environment variable name
///
/// `"platform.api_key"` becomes `"PLATFORM_API_KEY"`.
pub fn plain_secret_path_to_env_var(path: &str) -> String {
    path.replace('.', SECRET_SEPARATOR).to_uppercase()
}

/// Get an environment variable for a secret path, prefixed name first.
pub fn get_secret_env_var(path: &str) -> Option<String> {
    if let Ok(value) = env::var(secret_path_to_env_var(path)) {
        return Some(value);
    }
    env::var(plain_secret_path_to_env_var(path)).ok()
}

/// Replace every `"secret_from_env"` string in a JSON tree with its environment value.
///
/// Unresolved markers become `null`, so optional secrets deserialize to `None`
/// and required ones fail deserialization. Returns the unresolved dotted paths.
pub fn inject_env_vars(value: &mut serde_json::Value) -> Vec<String> {
    use serde_json::Value;

    fn walk(path: &mut Vec<String>, obj: &mut Value, missing: &mut Vec<String>) {
        match obj {
            Value::Object(map) => {
                for (k, v) in map.iter_mut() {
                    path.push(k.to_string());
                    walk(path, v, missing);
                    path.pop();
                }
            }
            Value::String(s) if s == SECRET_MARKER => {
                let path_str = path.join(".");
                match get_secret_env_var(&path_str) {
                    Some(env_val) => *obj = Value::String(env_val),
                    None => {
                        warn!("Secret for {} not found in environment", path_str);
                        *obj = Value::Null;
                        missing.push(path_str);
                    }
                }
            }
            _ => {}
        }
    }

    let mut missing = Vec::new();
    walk(&mut Vec::new(), value, &mut missing);
    missing
}
