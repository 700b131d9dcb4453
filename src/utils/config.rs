// src/utils/config.rs
//! Configuration loading
//!
//! Values are fixed at deploy time: built-in defaults, then an optional
//! `config/origin-redirect` file, then `ORIGIN_REDIRECT__SECTION__KEY`
//! environment variables. Once loaded the config is shared read-only.

use crate::utils::errors::{RedirectError, Result};
use ::config::{Config, Environment, File};
use hyper::Uri;
use serde::Deserialize;
use tracing::debug;

pub const DEFAULT_PROTECTED_PREFIX: &str = "https://generativelanguage.googleapis.com/";
pub const DEFAULT_PROXY_URL: &str = "https://gemini-proxy.xlebovichxleb140.workers.dev/";
pub const DEFAULT_STORAGE_KEY: &str = "enableCloudflareRedirect_v1";
pub const DEFAULT_CONTROL_ID: &str = "enableCloudflareRedirect";
pub const DEFAULT_ANCHOR_ID: &str = "enableGoogleApi";
pub const DEFAULT_LABEL: &str = "Cloudflare: proxy Gemini requests";
pub const DEFAULT_DB_PATH: &str = "origin-redirect.db";
pub const DEFAULT_INIT_GRACE_MS: u64 = 1000;

const CONFIG_FILE: &str = "config/origin-redirect";
const ENV_PREFIX: &str = "ORIGIN_REDIRECT";

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RedirectConfig {
    pub intercept: InterceptConfig,
    pub toggle: ToggleConfig,
    pub bootstrap: BootstrapConfig,
    pub observability: ObservabilityConfig,
}

/// Which calls are redirected and where to
#[derive(Debug, Clone, Deserialize)]
pub struct InterceptConfig {
    /// Calls whose URL starts with this string are eligible
    pub protected_prefix: String,

    /// Every eligible call is sent here instead
    pub proxy_url: String,

    /// Retry against the original URL once when the proxy is unreachable
    pub fallback_on_error: bool,
}

/// Persistence and UI settings for the on/off switch
#[derive(Debug, Clone, Deserialize)]
pub struct ToggleConfig {
    pub storage_key: String,
    pub control_id: String,

    /// Id of the existing control the switch is placed beside
    pub anchor_id: String,
    pub label: String,
    pub db_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapConfig {
    /// Run the first init pass after this long even if the ready signal never fires
    pub init_grace_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub json_logs: bool,
}

impl Default for InterceptConfig {
    fn default() -> Self {
        Self {
            protected_prefix: DEFAULT_PROTECTED_PREFIX.to_string(),
            proxy_url: DEFAULT_PROXY_URL.to_string(),
            fallback_on_error: false,
        }
    }
}

impl Default for ToggleConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            control_id: DEFAULT_CONTROL_ID.to_string(),
            anchor_id: DEFAULT_ANCHOR_ID.to_string(),
            label: DEFAULT_LABEL.to_string(),
            db_path: DEFAULT_DB_PATH.to_string(),
        }
    }
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            init_grace_ms: DEFAULT_INIT_GRACE_MS,
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl RedirectConfig {
    /// Load from the default file location and the environment
    pub fn load() -> Result<Self> {
        Self::load_from(CONFIG_FILE)
    }

    /// Load using `path` (without extension) as the optional config file
    pub fn load_from(path: &str) -> Result<Self> {
        let settings = Config::builder()
            .set_default("intercept.protected_prefix", DEFAULT_PROTECTED_PREFIX)?
            .set_default("intercept.proxy_url", DEFAULT_PROXY_URL)?
            .set_default("intercept.fallback_on_error", false)?
            .set_default("toggle.storage_key", DEFAULT_STORAGE_KEY)?
            .set_default("toggle.control_id", DEFAULT_CONTROL_ID)?
            .set_default("toggle.anchor_id", DEFAULT_ANCHOR_ID)?
            .set_default("toggle.label", DEFAULT_LABEL)?
            .set_default("toggle.db_path", DEFAULT_DB_PATH)?
            .set_default("bootstrap.init_grace_ms", DEFAULT_INIT_GRACE_MS as i64)?
            .set_default("observability.log_level", "info")?
            .set_default("observability.json_logs", false)?
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: RedirectConfig = settings.try_deserialize()?;
        config.validate()?;

        debug!(
            prefix = %config.intercept.protected_prefix,
            proxy = %config.intercept.proxy_url,
            fallback = config.intercept.fallback_on_error,
            "configuration loaded"
        );

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.intercept.validate()?;

        if self.toggle.storage_key.is_empty() {
            return Err(RedirectError::ConfigError(
                "toggle.storage_key must not be empty".to_string(),
            ));
        }
        if self.toggle.control_id.is_empty() {
            return Err(RedirectError::ConfigError(
                "toggle.control_id must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

impl InterceptConfig {
    pub fn validate(&self) -> Result<()> {
        if self.protected_prefix.is_empty() {
            return Err(RedirectError::ConfigError(
                "intercept.protected_prefix must not be empty".to_string(),
            ));
        }

        let uri: Uri = self.proxy_url.parse().map_err(|e| {
            RedirectError::ConfigError(format!(
                "Invalid intercept.proxy_url '{}': {}",
                self.proxy_url, e
            ))
        })?;

        if uri.scheme().is_none() || uri.authority().is_none() {
            return Err(RedirectError::ConfigError(format!(
                "intercept.proxy_url '{}' must be an absolute URL",
                self.proxy_url
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = RedirectConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.intercept.fallback_on_error);
        assert_eq!(config.bootstrap.init_grace_ms, 1000);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("redirect.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[intercept]\nprotected_prefix = \"http://api.test/\"\nproxy_url = \"http://127.0.0.1:9000/\"\nfallback_on_error = true"
        )
        .unwrap();

        let stem = dir.path().join("redirect");
        let config = RedirectConfig::load_from(stem.to_str().unwrap()).unwrap();

        assert_eq!(config.intercept.protected_prefix, "http://api.test/");
        assert_eq!(config.intercept.proxy_url, "http://127.0.0.1:9000/");
        assert!(config.intercept.fallback_on_error);
        assert_eq!(config.toggle.storage_key, DEFAULT_STORAGE_KEY);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = RedirectConfig::load_from("does/not/exist").unwrap();
        assert_eq!(config.intercept.proxy_url, DEFAULT_PROXY_URL);
    }

    #[test]
    fn test_relative_proxy_url_rejected() {
        let config = InterceptConfig {
            proxy_url: "/relative/path".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(RedirectError::ConfigError(_))
        ));
    }

    #[test]
    fn test_empty_prefix_rejected() {
        let config = InterceptConfig {
            protected_prefix: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
