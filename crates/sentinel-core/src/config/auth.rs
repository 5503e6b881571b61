//! Token signing and lifetime configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Authentication and token configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared secret for HMAC-SHA256 token signing.
    pub jwt_secret: String,
    /// Access token TTL in minutes.
    #[serde(default = "default_access_ttl")]
    pub access_ttl_minutes: u64,
    /// Refresh token TTL in days.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_days: u64,
    /// Issue a new refresh token on every refresh and revoke the old one.
    #[serde(default = "default_true")]
    pub rotate_refresh_tokens: bool,
    /// Seconds a token stays acceptable past its `exp` claim.
    #[serde(default)]
    pub leeway_seconds: u64,
}

impl AuthConfig {
    /// Creates a configuration with the given secret and default lifetimes.
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: secret.into(),
            access_ttl_minutes: default_access_ttl(),
            refresh_ttl_days: default_refresh_ttl(),
            rotate_refresh_tokens: true,
            leeway_seconds: 0,
        }
    }

    /// Access token lifetime.
    pub fn access_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.access_ttl_minutes.saturating_mul(60))
    }

    /// Refresh token lifetime.
    pub fn refresh_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.refresh_ttl_days.saturating_mul(SECONDS_PER_DAY))
    }

    pub(crate) fn validate(&self) -> Result<(), AppError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(AppError::configuration("auth.jwt_secret must be set"));
        }
        if self.access_ttl_minutes == 0 || self.refresh_ttl_days == 0 {
            return Err(AppError::configuration(
                "auth token lifetimes must be greater than zero",
            ));
        }
        if self.access_ttl_minutes > MAX_ACCESS_TTL_MINUTES {
            return Err(AppError::configuration(format!(
                "auth.access_ttl_minutes must be at most {MAX_ACCESS_TTL_MINUTES}"
            )));
        }
        if self.refresh_ttl_days > MAX_REFRESH_TTL_DAYS {
            return Err(AppError::configuration(format!(
                "auth.refresh_ttl_days must be at most {MAX_REFRESH_TTL_DAYS}"
            )));
        }
        if self.access_ttl() >= self.refresh_ttl() {
            return Err(AppError::configuration(
                "auth.access_ttl_minutes must be shorter than auth.refresh_ttl_days",
            ));
        }
        Ok(())
    }
}

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// One day.
const MAX_ACCESS_TTL_MINUTES: u64 = 24 * 60;

const MAX_REFRESH_TTL_DAYS: u64 = 365;

fn default_access_ttl() -> u64 {
    30
}

fn default_refresh_ttl() -> u64 {
    7
}

fn default_true() -> bool {
    true
}
