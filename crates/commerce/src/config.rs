//! Configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `ORCHARD_SMTP_HOST` - SMTP relay host; email is disabled when unset
//! - `ORCHARD_SMTP_PORT` - SMTP relay port (default: 587)
//! - `ORCHARD_SMTP_USERNAME` - SMTP username (required once a host is set)
//! - `ORCHARD_SMTP_PASSWORD` - SMTP password (required once a host is set)
//! - `ORCHARD_EMAIL_FROM` - Sender address (required once a host is set)
//! - `ORCHARD_REMINDER_INTERVAL_SECS` - Seconds between reminder scans (default: 21600)
//! - `ORCHARD_REMINDER_INITIAL_DELAY_SECS` - Seconds before the first scan (default: 30)
//! - `ORCHARD_CART_ABANDONED_AFTER_HOURS` - Idle hours before a cart counts as abandoned (default: 24)
//! - `ORCHARD_REMINDER_COOLDOWN_HOURS` - Hours between reminders for the same cart (default: 48)

use std::time::Duration as StdDuration;

use chrono::Duration;
use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct CommerceConfig {
    /// SMTP settings; `None` runs the system without outbound email.
    pub email: Option<EmailConfig>,
    /// Abandoned-cart reminder cadence.
    pub reminders: ReminderConfig,
}

/// SMTP relay settings.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct EmailConfig {
    /// SMTP relay host
    pub smtp_host: String,
    /// SMTP relay port
    pub smtp_port: u16,
    /// SMTP username
    pub smtp_username: String,
    /// SMTP password
    pub smtp_password: SecretString,
    /// Sender address for all outbound mail
    pub from_address: String,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &"[REDACTED]")
            .field("from_address", &self.from_address)
            .finish()
    }
}

/// Abandoned-cart reminder cadence.
#[derive(Debug, Clone)]
pub struct ReminderConfig {
    /// How often the scheduler scans for abandoned carts
    pub interval: StdDuration,
    /// Delay before the first scan after startup
    pub initial_delay: StdDuration,
    /// Idle time after which a non-empty cart counts as abandoned
    pub abandoned_after: Duration,
    /// Minimum gap between two reminders for the same cart
    pub cooldown: Duration,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            interval: StdDuration::from_secs(6 * 60 * 60),
            initial_delay: StdDuration::from_secs(30),
            abandoned_after: Duration::hours(24),
            cooldown: Duration::hours(48),
        }
    }
}

impl CommerceConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable fails to parse, or if an SMTP host
    /// is set without its companion credentials.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            email: EmailConfig::from_env()?,
            reminders: ReminderConfig::from_env()?,
        })
    }
}

impl EmailConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(smtp_host) = get_optional_env("ORCHARD_SMTP_HOST") else {
            return Ok(None);
        };
        Ok(Some(Self {
            smtp_host,
            smtp_port: get_parsed_or_default("ORCHARD_SMTP_PORT", 587)?,
            smtp_username: get_required_env("ORCHARD_SMTP_USERNAME")?,
            smtp_password: get_required_secret("ORCHARD_SMTP_PASSWORD")?,
            from_address: get_required_env("ORCHARD_EMAIL_FROM")?,
        }))
    }
}

impl ReminderConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            interval: StdDuration::from_secs(get_parsed_or_default(
                "ORCHARD_REMINDER_INTERVAL_SECS",
                defaults.interval.as_secs(),
            )?),
            initial_delay: StdDuration::from_secs(get_parsed_or_default(
                "ORCHARD_REMINDER_INITIAL_DELAY_SECS",
                defaults.initial_delay.as_secs(),
            )?),
            abandoned_after: Duration::hours(get_parsed_or_default(
                "ORCHARD_CART_ABANDONED_AFTER_HOURS",
                defaults.abandoned_after.num_hours(),
            )?),
            cooldown: Duration::hours(get_parsed_or_default(
                "ORCHARD_REMINDER_COOLDOWN_HOURS",
                defaults.cooldown.num_hours(),
            )?),
        })
    }
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Parse an environment variable, falling back to a default when unset.
fn get_parsed_or_default<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}
