//! Configuration resolved once from the environment.
//!
//! Nothing below the binary reads environment variables; everything the
//! runtime needs is collected here and handed down by value.

use std::time::Duration;

use asc_client::{ApiClientConfig, RetryPolicy};
use asc_transfer::UploadConfig;
use thiserror::Error;

use crate::error::CliError;

/// Default timeout for chunk uploads and downloads.
pub const DEFAULT_TRANSFER_TIMEOUT: Duration = Duration::from_secs(300);

/// Everything the commands need, resolved before any of them runs.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// API client settings.
    pub api: ApiClientConfig,
    /// Retry policy applied to every API read.
    pub retry: RetryPolicy,
    /// Upload executor settings.
    pub upload: UploadConfig,
    /// Per-request timeout for pre-signed uploads and downloads.
    pub transfer_timeout: Duration,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            api: ApiClientConfig::default(),
            retry: RetryPolicy::default(),
            upload: UploadConfig::default(),
            transfer_timeout: DEFAULT_TRANSFER_TIMEOUT,
        }
    }
}

impl CliConfig {
    /// Resolve configuration from the process environment.
    pub fn from_env() -> Result<Self, CliError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration from an arbitrary key lookup.
    ///
    /// Unset and blank variables fall back to defaults. Values that are set
    /// but do not parse are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CliError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();

        config.api = config.api.with_optional_token(get("ASC_BEARER_TOKEN"));
        if let Some(base_url) = get("ASC_BASE_URL") {
            config.api = config.api.with_base_url(base_url);
        }

        let timeout = match get("ASC_TIMEOUT") {
            Some(value) => Some(positive_duration("ASC_TIMEOUT", &value)?),
            None => get("ASC_TIMEOUT_SECONDS")
                .map(|value| positive_duration("ASC_TIMEOUT_SECONDS", &value))
                .transpose()?,
        };
        if let Some(timeout) = timeout {
            config.api = config.api.with_timeout(timeout);
        }

        if let Some(value) = get("ASC_UPLOAD_TIMEOUT") {
            config.transfer_timeout = positive_duration("ASC_UPLOAD_TIMEOUT", &value)?;
        }

        if let Some(value) = get("ASC_MAX_RETRIES") {
            let retries: u32 = value
                .parse()
                .map_err(|_| invalid("ASC_MAX_RETRIES", &value, "a non-negative integer"))?;
            config.retry = config.retry.with_max_attempts(retries.saturating_add(1));
        }
        if let Some(value) = get("ASC_BASE_DELAY") {
            config.retry = config.retry.with_base_delay(duration("ASC_BASE_DELAY", &value)?);
        }
        if let Some(value) = get("ASC_MAX_DELAY") {
            config.retry = config.retry.with_max_delay(duration("ASC_MAX_DELAY", &value)?);
        }
        config
            .retry
            .validate()
            .map_err(|e| CliError::Config(format!("retry settings: {e}")))?;

        if let Some(value) = get("ASC_UPLOAD_CONCURRENCY") {
            let concurrency: usize = value
                .parse()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| invalid("ASC_UPLOAD_CONCURRENCY", &value, "a positive integer"))?;
            config.upload = UploadConfig::new(concurrency);
        }

        Ok(config)
    }
}

fn invalid(key: &str, value: &str, expected: &str) -> CliError {
    CliError::Config(format!("{key}={value:?} is not {expected}"))
}

fn duration(key: &str, value: &str) -> Result<Duration, CliError> {
    parse_duration(value).map_err(|e| CliError::Config(format!("{key}: {e}")))
}

fn positive_duration(key: &str, value: &str) -> Result<Duration, CliError> {
    let parsed = duration(key, value)?;
    if parsed.is_zero() {
        return Err(invalid(key, value, "a positive duration"));
    }
    Ok(parsed)
}

/// A duration string that could not be parsed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid duration '{0}' (expected e.g. 500ms, 30s, 1m30s or bare seconds)")]
pub struct InvalidDuration(pub String);

/// Parse `500ms`, `30s`, `1m30s`, `1.5h` or a bare number of seconds.
pub fn parse_duration(input: &str) -> Result<Duration, InvalidDuration> {
    let invalid = || InvalidDuration(input.to_string());
    let text = input.trim();
    if text.is_empty() {
        return Err(invalid());
    }
    if let Ok(seconds) = text.parse::<u64>() {
        return Ok(Duration::from_secs(seconds));
    }

    let mut total = Duration::ZERO;
    let mut rest = text;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(invalid)?;
        if number_len == 0 {
            return Err(invalid());
        }
        let (number, tail) = rest.split_at(number_len);
        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, next) = tail.split_at(unit_len);

        let unit_millis = match unit {
            "ms" => 1u32,
            "s" => 1_000,
            "m" => 60_000,
            "h" => 3_600_000,
            _ => return Err(invalid()),
        };
        let component = if number.contains('.') {
            let value: f64 = number.parse().map_err(|_| invalid())?;
            Duration::try_from_secs_f64(value * f64::from(unit_millis) / 1_000.0)
                .map_err(|_| invalid())?
        } else {
            let value: u64 = number.parse().map_err(|_| invalid())?;
            value
                .checked_mul(u64::from(unit_millis))
                .map(Duration::from_millis)
                .ok_or_else(invalid)?
        };

        total = total.checked_add(component).ok_or_else(invalid)?;
        rest = next;
    }
    Ok(total)
}
