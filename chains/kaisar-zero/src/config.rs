use anyhow::Result;
use chrono_tz::Tz;
use config::{Config, Environment, File};
use core_logic::{ConfigError, RetryPolicy};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://zero-api.kaisar.io";

#[derive(Debug, Deserialize, Clone)]
pub struct KaisarConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_accounts_file")]
    pub accounts_file: String,
    #[serde(default = "default_proxy_file")]
    pub proxy_file: String,
    /// Optional `proxies.txt` list; takes precedence over `proxy_file`.
    #[serde(default)]
    pub proxy_list_file: Option<String>,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_session_interval_secs")]
    pub session_interval_secs: u64,
    #[serde(default = "default_display_timezone")]
    pub display_timezone: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_accounts_file() -> String {
    "config/accounts.json".to_string()
}

fn default_proxy_file() -> String {
    "config/proxy.json".to_string()
}

fn default_max_attempts() -> u32 {
    5
}

fn default_retry_delay_ms() -> u64 {
    2500
}

fn default_session_interval_secs() -> u64 {
    3600
}

fn default_display_timezone() -> String {
    "Asia/Jakarta".to_string()
}

impl Default for KaisarConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            accounts_file: default_accounts_file(),
            proxy_file: default_proxy_file(),
            proxy_list_file: None,
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            session_interval_secs: default_session_interval_secs(),
            display_timezone: default_display_timezone(),
        }
    }
}

impl KaisarConfig {
    /// Loads `path` (optional) layered under `KAISAR_*` environment variables.
    pub fn load(path: &str) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("KAISAR").try_parsing(true))
            .build()?;

        let config: Self = settings
            .try_deserialize()
            .map_err(|e| anyhow::anyhow!(e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if url::Url::parse(&self.base_url).is_err() {
            return Err(ConfigError::InvalidUrl {
                url: self.base_url.clone(),
            });
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_attempts".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        self.timezone()?;
        Ok(())
    }

    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        self.display_timezone
            .parse::<Tz>()
            .map_err(|_| ConfigError::InvalidValue {
                field: "display_timezone".to_string(),
                reason: format!("unknown timezone '{}'", self.display_timezone),
            })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, self.retry_delay_ms)
    }

    pub fn session_interval(&self) -> Duration {
        Duration::from_secs(self.session_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_service_cadence() {
        let config = KaisarConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.retry_policy(), RetryPolicy::default());
        assert_eq!(config.session_interval(), Duration::from_secs(3600));
        assert_eq!(config.timezone().unwrap(), chrono_tz::Asia::Jakarta);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_zero_attempts() {
        let config = KaisarConfig {
            max_attempts: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn rejects_unknown_timezone() {
        let config = KaisarConfig {
            display_timezone: "Mars/Olympus".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_bad_base_url() {
        let config = KaisarConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn loads_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "base_url = \"http://127.0.0.1:9999\"\nmax_attempts = 3\nretry_delay_ms = 10\n",
        )
        .unwrap();

        let config = KaisarConfig::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:9999");
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.retry_delay_ms, 10);
        assert_eq!(config.session_interval_secs, 3600);
    }
}
