//! Configuration loading from disk and environment.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Selects the upstream origin.
pub const BACKEND_URL_ENV: &str = "BACKEND_URL";

/// Optional path to a TOML config file.
pub const CONFIG_PATH_ENV: &str = "RELAY_CONFIG";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse a TOML file without applying overrides or validation.
pub fn read_config_file(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

/// The config file to read: the explicit path, else `RELAY_CONFIG`.
pub fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from))
}

/// Build the effective configuration: defaults, then the optional file,
/// then environment overrides. The result is validated.
pub fn load_config(path: Option<&Path>) -> Result<ProxyConfig, ConfigError> {
    let mut config = match config_path(path) {
        Some(p) => read_config_file(&p)?,
        None => ProxyConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply environment overrides using `lookup` to read variables.
///
/// An unset or blank `BACKEND_URL` leaves the configured origin in place.
pub fn apply_env_overrides<F>(config: &mut ProxyConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(BACKEND_URL_ENV).filter(|v| !v.trim().is_empty()) {
        config.upstream.base_url = url.trim().to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::DEFAULT_BACKEND_URL;
    use std::io::Write;

    #[test]
    fn missing_backend_url_falls_back_to_default() {
        let mut config = ProxyConfig::default();
        apply_env_overrides(&mut config, |_| None);
        assert_eq!(config.upstream.base_url, DEFAULT_BACKEND_URL);
    }

    #[test]
    fn blank_backend_url_falls_back_to_default() {
        let mut config = ProxyConfig::default();
        apply_env_overrides(&mut config, |_| Some("  ".to_string()));
        assert_eq!(config.upstream.base_url, DEFAULT_BACKEND_URL);
    }

    #[test]
    fn backend_url_overrides_file_value() {
        let mut config = ProxyConfig::default();
        config.upstream.base_url = "http://from-file:8000".into();
        apply_env_overrides(&mut config, |key| {
            (key == BACKEND_URL_ENV).then(|| "http://from-env:9000".to_string())
        });
        assert_eq!(config.upstream.base_url, "http://from-env:9000");
    }

    #[test]
    fn reads_toml_file() {
        let path = std::env::temp_dir().join(format!("session-relay-{}.toml", std::process::id()));
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "[listener]\nbind_address = \"127.0.0.1:4000\"").unwrap();

        let config = read_config_file(&path).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:4000");
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn explicit_path_wins_over_env() {
        let explicit = Path::new("/etc/relay/explicit.toml");
        assert_eq!(config_path(Some(explicit)), Some(explicit.to_path_buf()));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_config_file(Path::new("/nonexistent/relay.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
