//! User service configuration.
//!
//! Loaded from a TOML file plus `PORTICO_USERS__*` environment overrides.
//! The `[auth]` and `[redis]` sections must match the gateway's: both sides
//! share the signing secret and the revocation store.

use std::net::SocketAddr;

use portico_auth::AuthConfig;
use portico_auth_redis::RedisConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("server.port must be > 0".into());
        }
        self.auth
            .validate()
            .map_err(|e| format!("auth config error: {e}"))?;
        self.redis.validate()?;
        Ok(())
    }

    pub fn addr(&self) -> SocketAddr {
        use std::net::{IpAddr, Ipv4Addr};
        let host: IpAddr = self
            .server
            .host
            .parse()
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
        SocketAddr::from((host, self.server.port))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Loads configuration from an optional TOML file plus `PORTICO_USERS__*`
/// env overrides, then validates it.
///
/// # Errors
/// Returns a description of the first parse or validation problem.
pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::with_name(path).required(true));
    }
    builder = builder.add_source(
        config::Environment::with_prefix("PORTICO_USERS")
            .prefix_separator("__")
            .separator("__"),
    );

    let cfg: AppConfig = builder
        .build()
        .map_err(|e| format!("failed to read configuration: {e}"))?
        .try_deserialize()
        .map_err(|e| format!("failed to parse configuration: {e}"))?;

    cfg.validate()?;
    Ok(cfg)
}
