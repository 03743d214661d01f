use std::env;
use std::fmt;

/// Deployment environment. Controls the `secure` flag on the credential cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
    Test,
}

impl Environment {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            "test" => Ok(Environment::Test),
            other => Err(ConfigError::Invalid("APP_ENV", other.to_string())),
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str, String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid(key, value) => write!(f, "{} has an invalid value: {}", key, value),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Process-wide settings, read once at startup and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub environment: Environment,
    pub server_host: String,
    pub server_port: u16,
    /// `None` runs the API on the in-memory store.
    pub database_url: Option<String>,
    pub cors_origin: String,
    pub bcrypt_cost: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|secret| !secret.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let environment = match lookup("APP_ENV").or_else(|| lookup("NODE_ENV")) {
            Some(value) => Environment::parse(&value)?,
            None => Environment::Development,
        };

        let server_port = match lookup("SERVER_PORT").or_else(|| lookup("PORT")) {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::Invalid("SERVER_PORT", value))?,
            None => 8080,
        };

        let bcrypt_cost = match lookup("BCRYPT_COST") {
            Some(value) => match value.parse::<u32>() {
                Ok(cost) if (4..=31).contains(&cost) => cost,
                _ => return Err(ConfigError::Invalid("BCRYPT_COST", value)),
            },
            None => bcrypt::DEFAULT_COST,
        };

        Ok(Self {
            jwt_secret,
            environment,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            server_port,
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            cors_origin: lookup("CORS_ORIGIN")
                .unwrap_or_else(|| "http://localhost:3000".to_string()),
            bcrypt_cost,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(lookup_from(&[("JWT_SECRET", "secret")])).unwrap();

        assert_eq!(config.jwt_secret, "secret");
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.server_host, "127.0.0.1");
        assert_eq!(config.database_url, None);
        assert_eq!(config.bcrypt_cost, bcrypt::DEFAULT_COST);
        assert_eq!(config.server_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_config_custom_values() {
        let config = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", "secret"),
            ("APP_ENV", "production"),
            ("PORT", "3000"),
            ("SERVER_HOST", "0.0.0.0"),
            ("DATABASE_URL", "postgres://test"),
            ("BCRYPT_COST", "4"),
        ]))
        .unwrap();

        assert!(config.environment.is_production());
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.server_host, "0.0.0.0");
        assert_eq!(config.database_url.as_deref(), Some("postgres://test"));
        assert_eq!(config.bcrypt_cost, 4);
    }

    #[test]
    fn test_config_errors() {
        assert_eq!(
            Config::from_lookup(lookup_from(&[])).unwrap_err(),
            ConfigError::Missing("JWT_SECRET")
        );
        assert!(matches!(
            Config::from_lookup(lookup_from(&[("JWT_SECRET", "s"), ("SERVER_PORT", "http")])),
            Err(ConfigError::Invalid("SERVER_PORT", _))
        ));
        assert!(matches!(
            Config::from_lookup(lookup_from(&[("JWT_SECRET", "s"), ("NODE_ENV", "staging")])),
            Err(ConfigError::Invalid("APP_ENV", _))
        ));
        assert!(matches!(
            Config::from_lookup(lookup_from(&[("JWT_SECRET", "s"), ("BCRYPT_COST", "2")])),
            Err(ConfigError::Invalid("BCRYPT_COST", _))
        ));
    }
}
