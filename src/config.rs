//! Runtime configuration loaded from the environment (and `.env` via dotenvy).

use chrono::FixedOffset;
use std::env;
use thiserror::Error;

const DEFAULT_JWT_SECRET: &str = "exam-remuneration-jwt-secret-change-in-production";
const DEFAULT_ORIGINS: &str = "http://localhost:5173";
const DEFAULT_UTC_OFFSET_MINUTES: i32 = 330;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

/// SMTP relay settings used by the mail transport.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_address: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub smtp: SmtpConfig,
    pub chrome_bin: String,
    /// Offset applied when printing exam dates on documents.
    pub document_utc_offset: FixedOffset,
    pub otp_sweep_interval_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup. `from_env` passes the
    /// process environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| {
            log::warn!("JWT_SECRET not set, using default secret. SET THIS IN PRODUCTION!");
            DEFAULT_JWT_SECRET.to_string()
        });

        let port = parse_or("PORT", get("PORT"), 8080u16)?;
        let smtp_port = parse_or("SMTP_PORT", get("SMTP_PORT"), 587u16)?;
        let offset_minutes = parse_or(
            "DOCUMENT_UTC_OFFSET_MINUTES",
            get("DOCUMENT_UTC_OFFSET_MINUTES"),
            DEFAULT_UTC_OFFSET_MINUTES,
        )?;
        let document_utc_offset = offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| ConfigError::Invalid {
                key: "DOCUMENT_UTC_OFFSET_MINUTES",
                value: offset_minutes.to_string(),
            })?;
        let otp_sweep_interval_secs =
            parse_or("OTP_SWEEP_INTERVAL_SECS", get("OTP_SWEEP_INTERVAL_SECS"), 60u64)?;
        if otp_sweep_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "OTP_SWEEP_INTERVAL_SECS",
                value: otp_sweep_interval_secs.to_string(),
            });
        }

        let allowed_origins = get("ALLOWED_ORIGINS")
            .unwrap_or_else(|| DEFAULT_ORIGINS.to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let smtp = SmtpConfig {
            host: get("SMTP_HOST").unwrap_or_else(|| "smtp.gmail.com".to_string()),
            port: smtp_port,
            username: get("SMTP_USERNAME"),
            password: get("SMTP_PASSWORD"),
            from: get("MAIL_FROM")
                .or_else(|| get("SMTP_USERNAME"))
                .ok_or(ConfigError::Missing("MAIL_FROM"))?,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            bind_address: get("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            allowed_origins,
            smtp,
            chrome_bin: get("CHROME_BIN").unwrap_or_else(|| "chromium".to_string()),
            document_utc_offset,
            otp_sweep_interval_secs,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    key: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}
