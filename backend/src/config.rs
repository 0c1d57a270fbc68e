use std::env;
use std::time::Duration;

use crate::types::snowflake::{DEFAULT_EPOCH_MS, MAX_SHARD_ID};
use crate::utils::cookies::{CookieOptions, SameSite};

/// Upper bound for every day-valued session setting.
pub const MAX_SESSION_DAYS: i64 = 3650;
const SECS_PER_DAY: u64 = 24 * 60 * 60;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// HMAC key for session secrets.
    pub session_secret: String,
    /// Salt for the session ID text encoding.
    pub session_id_salt: String,
    pub session_lifetime_days: i64,
    pub session_rotation_threshold_days: i64,
    pub session_cookie_max_age_days: u64,
    pub snowflake_shard_id: u16,
    pub snowflake_epoch_ms: i64,
    pub cookie_secure: bool,
    pub cookie_same_site: SameSite,
    pub cors_allow_origins: Vec<String>,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Ok(Self::from_lookup(|key| env::var(key).ok())?)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .unwrap_or_else(|| "postgres://localhost:5432/jobboard".to_string());
        let session_secret = required(&lookup, "SESSION_SECRET")?;
        let session_id_salt = required(&lookup, "SESSION_ID_SALT")?;

        let port = parsed(&lookup, "PORT", 5000)?;
        let session_lifetime_days = parsed(&lookup, "SESSION_LIFETIME_DAYS", 30)?;
        let session_rotation_threshold_days =
            parsed(&lookup, "SESSION_ROTATION_THRESHOLD_DAYS", 15)?;
        let session_cookie_max_age_days = parsed(&lookup, "SESSION_COOKIE_MAX_AGE_DAYS", 365)?;
        if !(1..=MAX_SESSION_DAYS).contains(&session_lifetime_days) {
            return Err(invalid("SESSION_LIFETIME_DAYS", session_lifetime_days));
        }
        if !(0..session_lifetime_days).contains(&session_rotation_threshold_days) {
            return Err(invalid(
                "SESSION_ROTATION_THRESHOLD_DAYS",
                session_rotation_threshold_days,
            ));
        }
        if session_cookie_max_age_days > MAX_SESSION_DAYS as u64 {
            return Err(invalid(
                "SESSION_COOKIE_MAX_AGE_DAYS",
                session_cookie_max_age_days,
            ));
        }

        let snowflake_shard_id: u16 = parsed(&lookup, "SNOWFLAKE_SHARD_ID", 0)?;
        if snowflake_shard_id > MAX_SHARD_ID {
            return Err(invalid("SNOWFLAKE_SHARD_ID", snowflake_shard_id));
        }
        let snowflake_epoch_ms = parsed(&lookup, "SNOWFLAKE_EPOCH_MS", DEFAULT_EPOCH_MS)?;

        let cookie_secure = match lookup("COOKIE_SECURE") {
            None => false,
            Some(raw) => parse_bool(&raw).ok_or_else(|| invalid("COOKIE_SECURE", raw))?,
        };
        let cookie_same_site = match lookup("COOKIE_SAME_SITE").as_deref() {
            None => SameSite::Lax,
            Some(raw) => match raw.to_ascii_lowercase().as_str() {
                "lax" => SameSite::Lax,
                "strict" => SameSite::Strict,
                "none" => SameSite::None,
                _ => return Err(invalid("COOKIE_SAME_SITE", raw)),
            },
        };

        let cors_allow_origins = lookup("CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".to_string())
            .split(',')
            .map(|origin| origin.trim().trim_end_matches('/').to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Config {
            database_url,
            port,
            session_secret,
            session_id_salt,
            session_lifetime_days,
            session_rotation_threshold_days,
            session_cookie_max_age_days,
            snowflake_shard_id,
            snowflake_epoch_ms,
            cookie_secure,
            cookie_same_site,
            cors_allow_origins,
        })
    }

    pub fn cookie_options(&self) -> CookieOptions {
        CookieOptions {
            secure: self.cookie_secure,
            same_site: self.cookie_same_site,
        }
    }

    pub fn cookie_max_age(&self) -> Duration {
        Duration::from_secs(self.session_cookie_max_age_days.saturating_mul(SECS_PER_DAY))
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|value| !value.trim().is_empty())
        .ok_or(ConfigError::Missing(key))
}

fn parsed<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| invalid(key, raw)),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn invalid(key: &'static str, value: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 2] = [("SESSION_SECRET", "k"), ("SESSION_ID_SALT", "s")];

    #[test]
    fn defaults_apply_when_only_secrets_are_set() {
        let config = Config::from_lookup(lookup_from(&REQUIRED)).expect("config");
        assert_eq!(config.port, 5000);
        assert_eq!(config.session_lifetime_days, 30);
        assert_eq!(config.session_rotation_threshold_days, 15);
        assert_eq!(config.session_cookie_max_age_days, 365);
        assert_eq!(config.snowflake_shard_id, 0);
        assert_eq!(config.snowflake_epoch_ms, DEFAULT_EPOCH_MS);
        assert!(!config.cookie_secure);
        assert_eq!(config.cookie_same_site, SameSite::Lax);
        assert_eq!(config.cors_allow_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.cookie_max_age(), Duration::from_secs(31_536_000));
    }

    #[test]
    fn missing_or_blank_secrets_are_errors() {
        let err = Config::from_lookup(lookup_from(&[("SESSION_ID_SALT", "s")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("SESSION_SECRET"));

        let err = Config::from_lookup(lookup_from(&[
            ("SESSION_SECRET", "k"),
            ("SESSION_ID_SALT", "  "),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::Missing("SESSION_ID_SALT"));
    }

    #[test]
    fn rejects_out_of_range_values() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("SNOWFLAKE_SHARD_ID", "2048"));
        assert!(matches!(
            Config::from_lookup(lookup_from(&pairs)),
            Err(ConfigError::Invalid { key: "SNOWFLAKE_SHARD_ID", .. })
        ));

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("SESSION_ROTATION_THRESHOLD_DAYS", "30"));
        assert!(Config::from_lookup(lookup_from(&pairs)).is_err());

        for (key, value) in [
            ("SESSION_LIFETIME_DAYS", "0"),
            ("SESSION_LIFETIME_DAYS", "100000000"),
            ("SESSION_COOKIE_MAX_AGE_DAYS", "3651"),
            ("SESSION_COOKIE_MAX_AGE_DAYS", "18446744073709551615"),
        ] {
            let mut pairs = REQUIRED.to_vec();
            pairs.push((key, value));
            assert_eq!(
                Config::from_lookup(lookup_from(&pairs)).unwrap_err(),
                ConfigError::Invalid {
                    key,
                    value: value.to_string()
                },
                "{key}={value}"
            );
        }

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("SESSION_LIFETIME_DAYS", "3650"));
        pairs.push(("SESSION_COOKIE_MAX_AGE_DAYS", "3650"));
        let config = Config::from_lookup(lookup_from(&pairs)).expect("upper bound is accepted");
        assert_eq!(
            config.cookie_max_age(),
            Duration::from_secs(3650 * SECS_PER_DAY)
        );

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("PORT", "http"));
        assert!(Config::from_lookup(lookup_from(&pairs)).is_err());
    }

    #[test]
    fn parses_cookie_and_cors_settings() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("COOKIE_SECURE", "true"));
        pairs.push(("COOKIE_SAME_SITE", "Strict"));
        pairs.push(("CORS_ALLOW_ORIGINS", "https://a.example/, https://b.example"));
        let config = Config::from_lookup(lookup_from(&pairs)).expect("config");
        assert!(config.cookie_secure);
        assert_eq!(config.cookie_same_site, SameSite::Strict);
        assert_eq!(
            config.cors_allow_origins,
            vec!["https://a.example", "https://b.example"]
        );
    }
}
