//! Configuration loader.
//!
//! Reads `herald.toml` and deserializes it into [`HeraldConfig`]. A missing
//! file yields the defaults; a malformed file logs a warning and also yields
//! the defaults, so a bad edit never takes the service down. Secrets are
//! resolved from the environment variables the config names.

use std::path::Path;

use secrecy::SecretString;

use herald_types::config::HeraldConfig;

/// Load configuration from the given TOML file.
pub async fn load_config(path: &Path) -> HeraldConfig {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("no config at {}, using defaults", path.display());
            return HeraldConfig::default();
        }
        Err(err) => {
            tracing::warn!("failed to read {}: {err}, using defaults", path.display());
            return HeraldConfig::default();
        }
    };

    match toml::from_str::<HeraldConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("failed to parse {}: {err}, using defaults", path.display());
            HeraldConfig::default()
        }
    }
}

/// Resolve a secret from the environment variable a config section names.
///
/// Returns `None` (with a warning) when the variable is unset, so the caller
/// can decide whether the collaborator is required.
pub fn secret_from_env(var: &str) -> Option<SecretString> {
    match std::env::var(var) {
        Ok(value) if !value.is_empty() => Some(SecretString::from(value)),
        _ => {
            tracing::warn!(%var, "environment variable not set");
            None
        }
    }
}
