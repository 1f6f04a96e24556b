use std::{env, fmt, str::FromStr};

use serde::Deserialize;
use thiserror::Error;

const MIN_JWT_SECRET_LEN: usize = 32;
const MIN_COOKIE_SECRET_LEN: usize = 64;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
    #[error("invalid Facebook configuration: {0}")]
    Facebook(#[from] envy::Error),
}

/// Deployment environment, selected with `ENV`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub const fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }

    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!("unknown environment '{other}'")),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => f.write_str("development"),
            Self::Production => f.write_str("production"),
        }
    }
}

/// Facebook Graph API settings, read from `FACEBOOK_*` variables.
#[derive(Clone, Debug, Deserialize)]
pub struct FacebookConfig {
    #[serde(default = "default_graph_url")]
    pub graph_url: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Long-lived user token used to list the managed pages
    pub user_access_token: Option<String>,
    /// Enables the periodic sync job when set
    pub sync_interval_minutes: Option<u64>,
    /// Maximum number of `paging.next` links followed per listing
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
}

fn default_graph_url() -> String {
    "https://graph.facebook.com".to_string()
}

fn default_api_version() -> String {
    "v19.0".to_string()
}

const fn default_max_pages() -> usize {
    10
}

impl Default for FacebookConfig {
    fn default() -> Self {
        Self {
            graph_url: default_graph_url(),
            api_version: default_api_version(),
            user_access_token: None,
            sync_interval_minutes: None,
            max_pages: default_max_pages(),
        }
    }
}

impl FacebookConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::prefixed("FACEBOOK_").from_env()
    }
}

#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub cookie_secret: String,
    pub env: Environment,
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub jwt_expiry_hours: i64,
    pub refresh_token_expiry_days: i64,
    pub db_max_connections: u32,
    pub bcrypt_cost: u32,
    pub cookie_domain: String,
    pub low_stock_threshold: i32,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub facebook: FacebookConfig,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = required("JWT_SECRET")?;
        if jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::Invalid {
                var: "JWT_SECRET",
                reason: format!("must be at least {MIN_JWT_SECRET_LEN} characters"),
            });
        }

        let cookie_secret = required("COOKIE_SECRET")?;
        if cookie_secret.len() < MIN_COOKIE_SECRET_LEN {
            return Err(ConfigError::Invalid {
                var: "COOKIE_SECRET",
                reason: format!("must be at least {MIN_COOKIE_SECRET_LEN} bytes"),
            });
        }

        let allowed_origins = optional("ALLOWED_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3001".to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret,
            cookie_secret,
            env: parsed("ENV", Environment::Development)?,
            host: optional("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parsed("PORT", 3000)?,
            allowed_origins,
            jwt_expiry_hours: parsed("JWT_EXPIRY_HOURS", 24)?,
            refresh_token_expiry_days: parsed("REFRESH_TOKEN_EXPIRY_DAYS", 30)?,
            db_max_connections: parsed("DB_MAX_CONNECTIONS", 10)?,
            bcrypt_cost: parsed("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            cookie_domain: optional("COOKIE_DOMAIN").unwrap_or_else(|| "localhost".to_string()),
            low_stock_threshold: parsed("LOW_STOCK_THRESHOLD", 10)?,
            admin_email: optional("ADMIN_EMAIL"),
            admin_password: optional("ADMIN_PASSWORD"),
            facebook: FacebookConfig::from_env()?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn required(var: &'static str) -> Result<String, ConfigError> {
    optional(var).ok_or(ConfigError::Missing(var))
}

fn optional(var: &str) -> Option<String> {
    env::var(var).ok().filter(|value| !value.trim().is_empty())
}

fn parsed<T>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match optional(var) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parsing() {
        assert_eq!("production".parse(), Ok(Environment::Production));
        assert_eq!("DEV".parse(), Ok(Environment::Development));
        assert!("staging".parse::<Environment>().is_err());
        assert!(Environment::default().is_development());
    }

    #[test]
    fn test_facebook_defaults() {
        let config = FacebookConfig::default();

        assert_eq!(config.graph_url, "https://graph.facebook.com");
        assert_eq!(config.api_version, "v19.0");
        assert_eq!(config.max_pages, 10);
        assert!(config.sync_interval_minutes.is_none());
    }

    #[test]
    fn test_facebook_config_from_prefixed_vars() {
        let vars = vec![
            ("FACEBOOK_API_VERSION".to_string(), "v20.0".to_string()),
            ("FACEBOOK_SYNC_INTERVAL_MINUTES".to_string(), "15".to_string()),
        ];

        let config: FacebookConfig = envy::prefixed("FACEBOOK_")
            .from_iter(vars)
            .expect("valid config");

        assert_eq!(config.api_version, "v20.0");
        assert_eq!(config.sync_interval_minutes, Some(15));
        assert_eq!(config.graph_url, "https://graph.facebook.com");
    }
}
