use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::Duration;

const DEFAULT_PORT: u16 = 9000;
const DEFAULT_TOKEN_TTL_HOURS: i64 = 6;

/// Placeholder secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me", "dev-secret-change-me", "secret"];

/// Startup configuration. Read once in `main` and handed to whatever needs it.
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub secret: String,
    pub token_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = get("API_SECRET").unwrap_or_default();
        if secret.is_empty() || PLACEHOLDER_SECRETS.contains(&secret.as_str()) {
            bail!("API_SECRET is unset or still a placeholder; set it in .env and restart");
        }

        // A missing or garbled port is not fatal
        let port = get("API_PORT")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let token_ttl_hours = match get("TOKEN_TTL_HOURS") {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .with_context(|| format!("TOKEN_TTL_HOURS is not a number: {raw:?}"))?,
            None => DEFAULT_TOKEN_TTL_HOURS,
        };
        if token_ttl_hours <= 0 {
            bail!("TOKEN_TTL_HOURS must be positive, got {token_ttl_hours}");
        }

        Ok(Self {
            host: get("API_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            db_path: get("DB_PATH").unwrap_or_else(|| "circulo.db".into()).into(),
            secret,
            token_ttl: Duration::hours(token_ttl_hours),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = load(&[("API_SECRET", "s3cr3t-value")]).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.db_path, PathBuf::from("circulo.db"));
        assert_eq!(config.token_ttl, Duration::hours(6));
    }

    #[test]
    fn garbled_port_falls_back() {
        let config = load(&[("API_SECRET", "s3cr3t-value"), ("API_PORT", "nine")]).unwrap();
        assert_eq!(config.port, 9000);

        let config = load(&[("API_SECRET", "s3cr3t-value"), ("API_PORT", "8080")]).unwrap();
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn secret_is_required() {
        assert!(load(&[]).is_err());
        assert!(load(&[("API_SECRET", "")]).is_err());
        assert!(load(&[("API_SECRET", "dev-secret-change-me")]).is_err());
    }

    #[test]
    fn token_ttl() {
        let config = load(&[("API_SECRET", "s3cr3t-value"), ("TOKEN_TTL_HOURS", "24")]).unwrap();
        assert_eq!(config.token_ttl, Duration::hours(24));

        assert!(load(&[("API_SECRET", "s3cr3t-value"), ("TOKEN_TTL_HOURS", "soon")]).is_err());
        assert!(load(&[("API_SECRET", "s3cr3t-value"), ("TOKEN_TTL_HOURS", "0")]).is_err());
    }
}
