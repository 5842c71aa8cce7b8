use log::*;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:5000";
pub const DEFAULT_DIRECTIONS_URL: &str = "https://serpapi.com/search";
const DEFAULT_TIMEOUT_SECS: u64 = 5;
const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/**
 * Runtime settings, read once at startup
 */
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: String,
    /**
     * Where uploaded images are written, and served from under `/uploads`
     */
    pub upload_dir: PathBuf,
    /**
     * The built UI bundle
     */
    pub static_dir: PathBuf,
    pub directions_url: String,
    /**
     * Credential for the directions search service, never compiled in
     */
    pub serpapi_key: Option<String>,
    pub directions_timeout: Duration,
    /**
     * Upper bound on the size of an upload request body
     */
    pub max_upload_bytes: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            upload_dir: PathBuf::from("uploads"),
            static_dir: PathBuf::from("dist"),
            directions_url: DEFAULT_DIRECTIONS_URL.to_string(),
            serpapi_key: None,
            directions_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl Config {
    /**
     * Load from the process environment (callers are expected to have run `dotenv()` first)
     */
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /**
     * Load from an arbitrary key lookup, unset or empty keys fall back to the defaults
     */
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let directions_timeout = match get("DIRECTIONS_TIMEOUT_SECS") {
            None => defaults.directions_timeout,
            Some(raw) => Duration::from_secs(parse_positive("DIRECTIONS_TIMEOUT_SECS", &raw)?),
        };
        let max_upload_bytes = match get("UPLOAD_MAX_BYTES") {
            None => defaults.max_upload_bytes,
            Some(raw) => parse_positive("UPLOAD_MAX_BYTES", &raw)?,
        };

        let config = Self {
            bind_address: get("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            upload_dir: get("UPLOAD_DIR").map(PathBuf::from).unwrap_or(defaults.upload_dir),
            static_dir: get("STATIC_DIR").map(PathBuf::from).unwrap_or(defaults.static_dir),
            directions_url: get("DIRECTIONS_URL").unwrap_or(defaults.directions_url),
            serpapi_key: get("SERPAPI_KEY"),
            directions_timeout,
            max_upload_bytes,
        };

        if config.serpapi_key.is_none() {
            warn!("SERPAPI_KEY is not set, directions lookups will be sent without a key");
        }
        Ok(config)
    }
}

fn parse_positive(key: &'static str, raw: &str) -> Result<u64, ConfigError> {
    let invalid = |reason: &str| ConfigError::Invalid {
        key,
        value: raw.to_string(),
        reason: reason.to_string(),
    };

    match raw.trim().parse::<u64>() {
        Ok(0) => Err(invalid("must be greater than zero")),
        Ok(n) => Ok(n),
        Err(err) => Err(invalid(&err.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = load(&[]).unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:5000");
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.static_dir, PathBuf::from("dist"));
        assert_eq!(config.directions_url, DEFAULT_DIRECTIONS_URL);
        assert!(config.serpapi_key.is_none());
        assert_eq!(config.directions_timeout, Duration::from_secs(5));
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn overrides_are_honoured() {
        let config = load(&[
            ("BIND_ADDRESS", "127.0.0.1:8080"),
            ("UPLOAD_DIR", "/var/lib/townsquare/uploads"),
            ("SERPAPI_KEY", "secret"),
            ("DIRECTIONS_TIMEOUT_SECS", "12"),
            ("UPLOAD_MAX_BYTES", "2048"),
        ])
        .unwrap();
        assert_eq!(config.bind_address, "127.0.0.1:8080");
        assert_eq!(config.upload_dir, PathBuf::from("/var/lib/townsquare/uploads"));
        assert_eq!(config.serpapi_key.as_deref(), Some("secret"));
        assert_eq!(config.directions_timeout, Duration::from_secs(12));
        assert_eq!(config.max_upload_bytes, 2048);
    }

    #[test]
    fn blank_key_counts_as_unset() {
        let config = load(&[("SERPAPI_KEY", "  ")]).unwrap();
        assert!(config.serpapi_key.is_none());
    }

    #[test]
    fn rejects_bad_timeouts() {
        assert!(load(&[("DIRECTIONS_TIMEOUT_SECS", "soon")]).is_err());
        assert!(load(&[("DIRECTIONS_TIMEOUT_SECS", "0")]).is_err());
    }

    #[test]
    fn rejects_bad_upload_limits() {
        match load(&[("UPLOAD_MAX_BYTES", "0")]) {
            Err(ConfigError::Invalid { key, .. }) => assert_eq!(key, "UPLOAD_MAX_BYTES"),
            other => panic!("expected an invalid upload limit, got {:?}", other),
        }
        assert!(load(&[("UPLOAD_MAX_BYTES", "-1")]).is_err());
    }
}
