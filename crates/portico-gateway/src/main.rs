use std::{env, sync::Arc};

use portico_auth::{MemoryRevocationStore, RevocationStore};
use portico_auth_redis::RedisRevocationStore;
use portico_gateway::config::load_config;
use portico_gateway::observability;
use portico_gateway::server::ServerBuilder;

/// How the configuration path was determined.
#[derive(Debug, Clone, Copy)]
enum ConfigSource {
    /// From --config CLI argument
    CliArgument,
    /// From PORTICO_CONFIG environment variable
    EnvironmentVariable,
    /// Default path (portico.toml)
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CliArgument => write!(f, "CLI argument (--config)"),
            Self::EnvironmentVariable => write!(f, "environment variable (PORTICO_CONFIG)"),
            Self::Default => write!(f, "default"),
        }
    }
}

#[tokio::main]
async fn main() {
    // Load .env file if present (before anything else)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist - it's optional
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            eprintln!("Warning: Failed to load .env file: {e}");
        }
    }

    // Initialize tracing early with the default level
    observability::init_tracing();

    let (config_path, source) = resolve_config_path();

    let cfg = match load_config(Some(&config_path)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    tracing::info!(
        path = %config_path,
        source = %source,
        "Configuration loaded"
    );

    observability::apply_logging_level(&cfg.logging.level);

    // Pick the revocation store. A gateway whose configured store cannot be
    // reached does not start: admitting requests without a working revocation
    // check would defeat logout guarantees.
    let revocations: Arc<dyn RevocationStore> = if cfg.redis.enabled {
        match RedisRevocationStore::from_config(&cfg.redis).await {
            Ok(store) => Arc::new(store),
            Err(e) => {
                eprintln!("Revocation store initialization failed: {e}");
                std::process::exit(2);
            }
        }
    } else {
        tracing::warn!(
            "redis disabled; using in-process revocation store (logout only holds for this instance)"
        );
        Arc::new(MemoryRevocationStore::new())
    };

    tracing::info!(
        routes = cfg.gateway.routes.len(),
        public_paths = cfg.gateway.public_paths.len(),
        "Starting portico gateway"
    );

    let server = match ServerBuilder::new(cfg)
        .with_revocation_store(revocations)
        .build()
    {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Server initialization failed: {e}");
            std::process::exit(2);
        }
    };

    if let Err(err) = server.run().await {
        eprintln!("Server error: {err}");
    }
}

/// Resolve the configuration file path.
///
/// Priority order:
/// 1. CLI argument: --config <path>
/// 2. Environment variable: PORTICO_CONFIG
/// 3. Default: portico.toml
fn resolve_config_path() -> (String, ConfigSource) {
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            if let Some(path) = args.next() {
                return (path, ConfigSource::CliArgument);
            }
        }
    }

    if let Ok(path) = env::var("PORTICO_CONFIG") {
        if !path.is_empty() {
            return (path, ConfigSource::EnvironmentVariable);
        }
    }

    ("portico.toml".to_string(), ConfigSource::Default)
}
