//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

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

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse configuration from TOML text without semantic validation.
pub fn parse_config(content: &str) -> Result<ProxyConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Read a TOML file without semantic validation.
///
/// Startup uses this so command-line overrides can be applied before
/// [`validate_config`] runs.
pub fn read_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let config = read_config(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("s3-proxy-{}.toml", uuid::Uuid::new_v4()));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn loads_valid_file() {
        let path = write_temp(
            r#"
            [listener]
            bind_address = "127.0.0.1:9999"

            [storage]
            region = "ap-northeast-1"
            "#,
        );

        let config = load_config(&path).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9999");
        assert_eq!(config.storage.region.as_deref(), Some("ap-northeast-1"));

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn rejects_invalid_values() {
        let path = write_temp(
            r#"
            [timeouts]
            request_secs = 0
            "#,
        );

        match load_config(&path) {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(errors, vec![ValidationError::ZeroValue("timeouts.request_secs")]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn reports_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn reports_syntax_errors() {
        let err = parse_config("[listener\nbind_address = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
