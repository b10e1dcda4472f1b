//! Credential configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for credential issuance and verification.
///
/// # Example (TOML)
///
/// ```toml
/// [auth]
/// secret = "change-me"
/// token_ttl = "24h"
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Symmetric signing secret shared by the gateway and the issuing service.
    pub secret: String,

    /// Lifetime of an issued access credential.
    #[serde(with = "humantime_serde")]
    pub token_ttl: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            token_ttl: Duration::from_secs(24 * 60 * 60),
        }
    }
}

impl AuthConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns a description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.secret.is_empty() {
            return Err("auth.secret must not be empty".into());
        }
        if self.token_ttl.is_zero() {
            return Err("auth.token_ttl must be > 0".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_invalid_until_secret_set() {
        let cfg = AuthConfig::default();
        assert!(cfg.validate().is_err());

        let cfg = AuthConfig {
            secret: "s3cret".into(),
            ..AuthConfig::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn token_ttl_parses_humantime() {
        let cfg: AuthConfig = toml::from_str(
            r#"
            secret = "s3cret"
            token_ttl = "1h"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.token_ttl, Duration::from_secs(3600));
    }
}
