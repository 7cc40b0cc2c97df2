//! Server configuration read from `CLASSIFIER_*` environment variables.

use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ConfigError;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_MODEL_PATH: &str = "model/animal.onnx";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub model_path: PathBuf,
    /// Labels file, one per line. The built-in set is used when unset.
    pub labels_path: Option<PathBuf>,
    pub max_upload_bytes: usize,
    /// Worker threads; actix picks one per core when unset.
    pub workers: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            labels_path: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            workers: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, falling back to defaults for
    /// missing keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            host: lookup("CLASSIFIER_HOST").unwrap_or(defaults.host),
            port: parse(&lookup, "CLASSIFIER_PORT", "a port number")?.unwrap_or(defaults.port),
            model_path: lookup("CLASSIFIER_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            labels_path: lookup("CLASSIFIER_LABELS_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            max_upload_bytes: parse(&lookup, "CLASSIFIER_MAX_UPLOAD_BYTES", "a byte count")?
                .unwrap_or(defaults.max_upload_bytes),
            workers: parse(&lookup, "CLASSIFIER_WORKERS", "a positive worker count")?
                .filter(|w| *w > 0),
        })
    }

    pub fn bind_addr(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

fn parse<T, F>(lookup: &F, key: &'static str, expected: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid {
                key,
                value,
                expected,
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind_addr(), ("127.0.0.1", 8080));
    }

    #[test]
    fn overrides_are_applied() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("CLASSIFIER_HOST", "0.0.0.0"),
            ("CLASSIFIER_PORT", " 9000 "),
            ("CLASSIFIER_MODEL_PATH", "/srv/model.onnx"),
            ("CLASSIFIER_LABELS_PATH", "/srv/labels.txt"),
            ("CLASSIFIER_MAX_UPLOAD_BYTES", "2048"),
            ("CLASSIFIER_WORKERS", "4"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr(), ("0.0.0.0", 9000));
        assert_eq!(config.model_path, PathBuf::from("/srv/model.onnx"));
        assert_eq!(config.labels_path, Some(PathBuf::from("/srv/labels.txt")));
        assert_eq!(config.max_upload_bytes, 2048);
        assert_eq!(config.workers, Some(4));
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = ServerConfig::from_lookup(lookup(&[("CLASSIFIER_PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("CLASSIFIER_PORT"));
    }

    #[test]
    fn zero_workers_means_default() {
        let config = ServerConfig::from_lookup(lookup(&[("CLASSIFIER_WORKERS", "0")])).unwrap();
        assert_eq!(config.workers, None);
    }
}
