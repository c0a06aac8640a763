//! Central module for application-wide configuration settings.
//!
//! Values come from environment variables with sensible defaults. Secrets
//! (`SUPABASE_KEY`, `JWT_SECRET`) may also be mounted as files under
//! `/run/secrets/<NAME>`, which is how the container deployment provides them.

use std::{env, fmt::Display, fs::read_to_string, str::FromStr, time::Duration};

use thiserror::Error;
use tracing::{info, warn};

const SECRETS_DIR: &str = "/run/secrets";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Required setting {0} is missing")]
    Missing(&'static str),

    #[error("Invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Which backing services the server talks to.
pub enum StoreConfig {
    Supabase { url: String, key: String },
    /// Process-local tables and buckets; nothing survives a restart.
    Memory,
}

pub struct Config {
    pub host: String,
    pub port: u16,
    pub store: StoreConfig,
    pub jwt_secret: String,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    pub food_bucket: String,
    pub profile_bucket: String,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Secrets fall back to
    /// the secrets directory when the lookup has no value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let source = Source { lookup };

        let store = match source.try_load::<String>("STORE", "supabase")?.as_str() {
            "supabase" => StoreConfig::Supabase {
                url: source.required("SUPABASE_URL")?,
                key: source.secret("SUPABASE_KEY")?,
            },
            "memory" => {
                warn!("STORE=memory, data will not be persisted");
                StoreConfig::Memory
            }
            other => {
                return Err(ConfigError::Invalid {
                    key: "STORE",
                    value: other.to_string(),
                    reason: "expected `supabase` or `memory`".to_string(),
                })
            }
        };

        Ok(Self {
            host: source.try_load("HOST", "0.0.0.0")?,
            port: source.try_load("PORT", "8080")?,
            store,
            jwt_secret: source.secret("JWT_SECRET")?,
            access_token_ttl: Duration::from_secs(source.try_load("ACCESS_TOKEN_TTL_SECS", "3600")?),
            refresh_token_ttl: Duration::from_secs(
                source.try_load("REFRESH_TOKEN_TTL_SECS", "604800")?,
            ),
            food_bucket: source.try_load("FOOD_BUCKET", "food")?,
            profile_bucket: source.try_load("PROFILE_BUCKET", "profile_image")?,
        })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

struct Source<F> {
    lookup: F,
}

impl<F> Source<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn var(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|value| !value.trim().is_empty())
    }

    fn try_load<T>(&self, key: &'static str, default: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        let value = self.var(key).unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        });

        value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        })
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.var(key).ok_or(ConfigError::Missing(key))
    }

    fn secret(&self, key: &'static str) -> Result<String, ConfigError> {
        self.var(key)
            .or_else(|| read_secret(key))
            .ok_or(ConfigError::Missing(key))
    }
}

fn read_secret(secret_name: &str) -> Option<String> {
    let path = format!("{SECRETS_DIR}/{secret_name}");

    read_to_string(&path)
        .map(|s| s.trim().to_string())
        .map_err(|e| {
            warn!("Failed to read {secret_name} from {path}: {e}");
        })
        .ok()
        .filter(|s| !s.is_empty())
}
