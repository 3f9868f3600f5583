// SPDX-FileCopyrightText: 2026 Tagtimer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks the semantic constraints serde attributes cannot express and
//! reports every violation at once.

use crate::diagnostic::ConfigError;
use crate::model::TagTimerConfig;

/// Minimum session secret length in bytes (HMAC-SHA256 key).
pub const MIN_SESSION_SECRET_LEN: usize = 32;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration.
///
/// Returns all collected errors rather than failing on the first one.
pub fn validate_config(config: &TagTimerConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let host = config.server.host.trim();
    if host.is_empty() {
        fail("server.host must not be empty".to_string());
    } else {
        let is_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-');
        if !is_ip && !is_hostname {
            fail(format!(
                "server.host `{host}` is not a valid IP address or hostname"
            ));
        }
    }

    if config.server.port == 0 {
        fail("server.port must be between 1 and 65535".to_string());
    }

    if !LOG_LEVELS.contains(&config.server.log_level.as_str()) {
        fail(format!(
            "server.log_level `{}` must be one of {}",
            config.server.log_level,
            LOG_LEVELS.join(", ")
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    if let Some(secret) = &config.auth.session_secret
        && secret.len() < MIN_SESSION_SECRET_LEN
    {
        fail(format!(
            "auth.session_secret must be at least {MIN_SESSION_SECRET_LEN} bytes, got {}",
            secret.len()
        ));
    }

    if config.auth.session_max_age_secs == 0 {
        fail("auth.session_max_age_secs must be positive".to_string());
    }

    let cookie = config.auth.cookie_name.trim();
    if cookie.is_empty()
        || !cookie
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        fail(format!(
            "auth.cookie_name `{cookie}` must be non-empty and contain only [A-Za-z0-9_-]"
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
