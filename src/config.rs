//! Configuration loading
//!
//! Settings come from a TOML file or from environment variables and are validated once
//! at process start.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.redgifs.com";
pub const DEFAULT_SECRET_ID: &str = "s4r-redgifs-accesstoken";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub media_api: MediaApiConfig,
    #[serde(default)]
    pub secret_store: SecretStoreConfig,
    #[serde(default)]
    pub rotation: RotationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaApiConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Resource looked up only to prove a new token is accepted
    pub probe_id: String,
    /// Forwarded as the customer address on the probe lookup; empty to omit
    #[serde(default)]
    pub probe_host: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretStoreConfig {
    #[serde(default = "default_secret_id")]
    pub secret_id: String,
    #[serde(default)]
    pub region: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationConfig {
    #[serde(default = "default_backoff_seconds")]
    pub backoff_seconds: Vec<u64>,
    #[serde(default = "default_activation_delay")]
    pub activation_delay_seconds: u64,
}

fn default_user_agent() -> String {
    format!("media-token-rotator/{}", env!("CARGO_PKG_VERSION"))
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_secret_id() -> String {
    DEFAULT_SECRET_ID.to_string()
}

fn default_backoff_seconds() -> Vec<u64> {
    vec![3, 5, 10]
}

fn default_activation_delay() -> u64 {
    3
}

impl Default for SecretStoreConfig {
    fn default() -> Self {
        Self {
            secret_id: default_secret_id(),
            region: None,
        }
    }
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            backoff_seconds: default_backoff_seconds(),
            activation_delay_seconds: default_activation_delay(),
        }
    }
}

impl RotationConfig {
    pub fn backoff(&self) -> Vec<Duration> {
        self.backoff_seconds
            .iter()
            .map(|s| Duration::from_secs(*s))
            .collect()
    }

    pub fn activation_delay(&self) -> Duration {
        Duration::from_secs(self.activation_delay_seconds)
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        toml::from_str(&contents).context("Failed to parse config file")
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key).with_context(|| format!("{} environment variable not set", key))
        };

        let media_api = MediaApiConfig {
            client_id: required("MEDIA_API_CLIENT_ID")?,
            client_secret: required("MEDIA_API_CLIENT_SECRET")?,
            probe_id: required("MEDIA_API_PROBE_ID")?,
            probe_host: lookup("MEDIA_API_PROBE_HOST").unwrap_or_default(),
            user_agent: lookup("MEDIA_API_USER_AGENT").unwrap_or_else(default_user_agent),
            base_url: lookup("MEDIA_API_BASE_URL").unwrap_or_else(default_base_url),
            timeout_seconds: parse_seconds(&lookup, "MEDIA_API_TIMEOUT_SECONDS")?
                .unwrap_or_else(default_timeout),
        };

        let secret_store = SecretStoreConfig {
            secret_id: lookup("ROTATOR_SECRET_ID").unwrap_or_else(default_secret_id),
            region: lookup("AWS_REGION"),
        };

        let backoff_seconds = match lookup("ROTATION_BACKOFF_SECONDS") {
            Some(raw) => parse_backoff(&raw)?,
            None => default_backoff_seconds(),
        };

        let rotation = RotationConfig {
            backoff_seconds,
            activation_delay_seconds: parse_seconds(&lookup, "ROTATION_ACTIVATION_DELAY_SECONDS")?
                .unwrap_or_else(default_activation_delay),
        };

        Ok(Self {
            media_api,
            secret_store,
            rotation,
        })
    }

    /// Reject configurations that could never produce a usable rotation
    pub fn validate(&self) -> Result<()> {
        if self.media_api.client_id.trim().is_empty() {
            bail!("media_api.client_id must not be empty");
        }
        if self.media_api.client_secret.trim().is_empty() {
            bail!("media_api.client_secret must not be empty");
        }
        if self.media_api.probe_id.trim().is_empty() {
            bail!("media_api.probe_id must not be empty");
        }
        if self.media_api.timeout_seconds == 0 {
            bail!("media_api.timeout_seconds must be greater than zero");
        }
        if self.secret_store.secret_id.trim().is_empty() {
            bail!("secret_store.secret_id must not be empty");
        }
        if self.rotation.backoff_seconds.is_empty() {
            bail!("rotation.backoff_seconds must contain at least one entry");
        }
        Ok(())
    }

    /// Create a sample configuration file
    pub fn create_sample<P: AsRef<Path>>(path: P) -> Result<()> {
        let sample = Self {
            media_api: MediaApiConfig {
                client_id: "your-client-id".to_string(),
                client_secret: "your-client-secret".to_string(),
                probe_id: "known-resource-id".to_string(),
                probe_host: String::new(),
                user_agent: default_user_agent(),
                base_url: default_base_url(),
                timeout_seconds: default_timeout(),
            },
            secret_store: SecretStoreConfig::default(),
            rotation: RotationConfig::default(),
        };

        let toml_string =
            toml::to_string_pretty(&sample).context("Failed to serialize sample config")?;
        fs::write(path.as_ref(), toml_string)
            .with_context(|| format!("Failed to write sample config to {:?}", path.as_ref()))?;

        Ok(())
    }
}

fn parse_seconds<F>(lookup: &F, key: &str) -> Result<Option<u64>>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .with_context(|| format!("Invalid value for {}: {:?}", key, raw))
        })
        .transpose()
}

fn parse_backoff(raw: &str) -> Result<Vec<u64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u64>()
                .with_context(|| format!("Invalid backoff entry: {:?}", s))
        })
        .collect()
}
