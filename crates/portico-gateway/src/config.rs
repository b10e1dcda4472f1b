//! Gateway configuration: structures, defaults, validation and loading.
//!
//! Configuration is layered: a TOML file (resolved by `main`) plus
//! `PORTICO__*` environment overrides with `__` as the nesting separator,
//! e.g. `PORTICO__SERVER__PORT=9000`.

use std::time::Duration;

use portico_auth::AuthConfig;
pub use portico_auth_redis::RedisConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    /// Route table and public paths
    #[serde(default)]
    pub gateway: GatewayConfig,
    /// Credential verification configuration
    #[serde(default)]
    pub auth: AuthConfig,
    /// Revocation store (Redis) configuration
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
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        self.auth
            .validate()
            .map_err(|e| format!("auth config error: {e}"))?;
        self.gateway.validate()?;
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
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8000
}
fn default_body_limit() -> usize {
    10 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

/// Route table and admission settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Paths admitted without a credential (exact match).
    #[serde(default = "default_public_paths")]
    pub public_paths: Vec<String>,

    /// Ordered set of (prefix, upstream) pairs. Longest prefix wins.
    #[serde(default)]
    pub routes: Vec<RouteConfig>,

    /// Per-request timeout for upstream calls.
    #[serde(default = "default_upstream_timeout", with = "humantime_serde")]
    pub upstream_timeout: Duration,
}

fn default_public_paths() -> Vec<String> {
    vec![
        "/api/v1/users/register".to_string(),
        "/api/v1/users/login".to_string(),
        "/health".to_string(),
    ]
}

fn default_upstream_timeout() -> Duration {
    Duration::from_secs(30)
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            public_paths: default_public_paths(),
            routes: Vec::new(),
            upstream_timeout: default_upstream_timeout(),
        }
    }
}

impl GatewayConfig {
    fn validate(&self) -> Result<(), String> {
        if self.routes.is_empty() {
            return Err("gateway.routes must not be empty".into());
        }
        for route in &self.routes {
            if !route.prefix.starts_with('/') {
                return Err(format!(
                    "gateway route prefix {:?} must start with '/'",
                    route.prefix
                ));
            }
            if !(route.upstream.starts_with("http://") || route.upstream.starts_with("https://")) {
                return Err(format!(
                    "gateway route upstream {:?} must be an http(s) URL",
                    route.upstream
                ));
            }
        }
        for (i, a) in self.routes.iter().enumerate() {
            for b in self.routes.iter().skip(i + 1) {
                if a.prefix == b.prefix {
                    return Err(format!("duplicate gateway route prefix {:?}", a.prefix));
                }
            }
        }
        if self.upstream_timeout.is_zero() {
            return Err("gateway.upstream_timeout must be > 0".into());
        }
        Ok(())
    }
}

/// One route table entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Path prefix, e.g. `/api/v1/`.
    pub prefix: String,
    /// Upstream base URL, e.g. `http://127.0.0.1:8080`.
    pub upstream: String,
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

/// Loads configuration from an optional TOML file plus `PORTICO__*` env
/// overrides, then validates it.
///
/// # Errors
/// Returns a description of the first parse or validation problem.
pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::with_name(path).required(true));
    }
    builder = builder.add_source(
        config::Environment::with_prefix("PORTICO")
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
