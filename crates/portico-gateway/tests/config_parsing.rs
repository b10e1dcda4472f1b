use std::{env, fs};

use portico_gateway::config::load_config;

#[test]
fn config_parsing_and_env_overrides_and_validation() {
    // Create a temporary TOML configuration file
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("portico.toml");

    let toml_content = r#"
[server]
host = "127.0.0.1"
port = 8001
body_limit_bytes = 1024

[auth]
secret = "test-secret"
token_ttl = "1h"

[gateway]
public_paths = ["/api/v1/users/register", "/api/v1/users/login"]
upstream_timeout = "10s"

[[gateway.routes]]
prefix = "/api/v1/"
upstream = "http://127.0.0.1:8080"

[[gateway.routes]]
prefix = "/ai/"
upstream = "http://127.0.0.1:8000"

[redis]
enabled = false

[logging]
level = "debug"
"#;
    fs::write(&path, toml_content).expect("write toml");

    // 1) Valid config parses
    let cfg = load_config(path.to_str()).expect("should parse config");
    assert_eq!(cfg.server.port, 8001);
    assert_eq!(cfg.gateway.routes.len(), 2);
    assert_eq!(cfg.gateway.routes[0].prefix, "/api/v1/");
    assert_eq!(cfg.auth.token_ttl.as_secs(), 3600);
    assert_eq!(cfg.gateway.upstream_timeout.as_secs(), 10);
    assert!(!cfg.redis.enabled);
    assert_eq!(cfg.logging.level.to_ascii_lowercase(), "debug");

    // 2) Env override should win over file
    unsafe {
        env::set_var("PORTICO__SERVER__PORT", "9001");
    }
    let cfg_env = load_config(path.to_str()).expect("should parse config with env overrides");
    assert_eq!(cfg_env.server.port, 9001);
    // cleanup env var
    unsafe {
        env::remove_var("PORTICO__SERVER__PORT");
    }

    // 3) Invalid config (duplicate route prefixes) should error
    let invalid_path = dir.path().join("invalid.toml");
    let invalid_toml = r#"
[auth]
secret = "test-secret"

[[gateway.routes]]
prefix = "/api/v1/"
upstream = "http://127.0.0.1:8080"

[[gateway.routes]]
prefix = "/api/v1/"
upstream = "http://127.0.0.1:8081"
"#;
    fs::write(&invalid_path, invalid_toml).expect("write invalid toml");
    let err = load_config(invalid_path.to_str()).expect_err("expected validation error");
    assert!(err.contains("duplicate"));

    // 4) Missing signing secret should error
    let no_secret_path = dir.path().join("no_secret.toml");
    let no_secret_toml = r#"
[[gateway.routes]]
prefix = "/api/v1/"
upstream = "http://127.0.0.1:8080"
"#;
    fs::write(&no_secret_path, no_secret_toml).expect("write toml");
    let err = load_config(no_secret_path.to_str()).expect_err("expected validation error");
    assert!(err.contains("auth.secret"));
}
