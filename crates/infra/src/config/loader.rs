//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `CLINICA_DB_PATH`: Database file path
//! - `CLINICA_DB_POOL_SIZE`: Connection pool size
//! - `CLINICA_BIND_ADDR`: Server bind address (default `127.0.0.1:8700`)
//! - `CLINICA_PUBLIC_BASE_URL`: Public site URL used in acceptance links
//! - `CLINICA_IDENTITY_ISSUER_URL`: Identity provider base URL
//! - `CLINICA_EMAIL_API_URL`: Email provider base URL
//! - `CLINICA_EMAIL_API_KEY`: Email provider API key
//! - `CLINICA_EMAIL_SENDER`: Sender address for outbound mail
//! - `CLINICA_EMAIL_SENDER_NAME`: Optional sender display name
//! - `CLINICA_MATCHING_GATEWAY_URL`: Model gateway base URL
//! - `CLINICA_MATCHING_API_KEY`: Model gateway API key
//! - `CLINICA_MATCHING_MODEL`: Model identifier (default `match-1`)
//!
//! ## File Locations
//! The loader probes `./config.{json,toml}` and `./clinica.{json,toml}`
//! in the working directory and up to two parent directories.

use std::path::{Path, PathBuf};

use clinica_domain::{
    ClinicaError, Config, DatabaseConfig, EmailConfig, IdentityConfig, MatchingConfig, Result,
    ServerConfig,
};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `ClinicaError::Config` if configuration cannot be loaded from
/// either source.
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// All required environment variables must be present. Returns an error
/// if any are missing.
///
/// # Errors
/// Returns `ClinicaError::Config` if required variables are missing or
/// have invalid values.
pub fn load_from_env() -> Result<Config> {
    let db_path = env_var("CLINICA_DB_PATH")?;
    let db_pool_size = env_var("CLINICA_DB_POOL_SIZE").and_then(|s| {
        s.parse::<u32>().map_err(|e| ClinicaError::Config(format!("Invalid pool size: {e}")))
    })?;

    let bind_addr =
        std::env::var("CLINICA_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8700".to_string());
    let public_base_url = env_var("CLINICA_PUBLIC_BASE_URL")?;

    let issuer_url = env_var("CLINICA_IDENTITY_ISSUER_URL")?;

    let email_api_url = env_var("CLINICA_EMAIL_API_URL")?;
    let email_api_key = env_var("CLINICA_EMAIL_API_KEY")?;
    let sender_email = env_var("CLINICA_EMAIL_SENDER")?;
    let sender_name = std::env::var("CLINICA_EMAIL_SENDER_NAME").ok();

    let gateway_url = env_var("CLINICA_MATCHING_GATEWAY_URL")?;
    let matching_api_key = env_var("CLINICA_MATCHING_API_KEY")?;
    let model = std::env::var("CLINICA_MATCHING_MODEL").unwrap_or_else(|_| "match-1".to_string());

    Ok(Config {
        database: DatabaseConfig { path: db_path, pool_size: db_pool_size },
        server: ServerConfig { bind_addr, public_base_url },
        identity: IdentityConfig { issuer_url },
        email: EmailConfig {
            api_url: email_api_url,
            api_key: email_api_key,
            sender_email,
            sender_name,
        },
        matching: MatchingConfig { gateway_url, api_key: matching_api_key, model },
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `ClinicaError::Config` if no file is found or parsing fails.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ClinicaError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ClinicaError::Config("No config file found in any of the standard locations".into())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ClinicaError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| ClinicaError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ClinicaError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(ClinicaError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe the working directory and up to two parents for config files.
fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        for dir in [cwd.clone(), cwd.join(".."), cwd.join("../..")] {
            candidates.extend([
                dir.join("config.json"),
                dir.join("config.toml"),
                dir.join("clinica.json"),
                dir.join("clinica.toml"),
            ]);
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| ClinicaError::Config(format!("Missing required environment variable: {key}")))
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use once_cell::sync::Lazy;
    use tempfile::NamedTempFile;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const REQUIRED_VARS: &[(&str, &str)] = &[
        ("CLINICA_DB_PATH", "/tmp/clinica-test.db"),
        ("CLINICA_DB_POOL_SIZE", "5"),
        ("CLINICA_PUBLIC_BASE_URL", "https://portal.example.com"),
        ("CLINICA_IDENTITY_ISSUER_URL", "https://id.example.com"),
        ("CLINICA_EMAIL_API_URL", "https://mail.example.com"),
        ("CLINICA_EMAIL_API_KEY", "mail-key"),
        ("CLINICA_EMAIL_SENDER", "no-reply@clinica.example"),
        ("CLINICA_MATCHING_GATEWAY_URL", "https://models.example.com"),
        ("CLINICA_MATCHING_API_KEY", "gw-key"),
    ];

    fn clear_env() {
        for (key, _) in REQUIRED_VARS {
            std::env::remove_var(key);
        }
        std::env::remove_var("CLINICA_BIND_ADDR");
        std::env::remove_var("CLINICA_EMAIL_SENDER_NAME");
        std::env::remove_var("CLINICA_MATCHING_MODEL");
    }

    #[test]
    fn test_load_from_env_all_vars_set() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        for (key, value) in REQUIRED_VARS {
            std::env::set_var(key, value);
        }

        let config = load_from_env().expect("config loads from env");
        assert_eq!(config.database.path, "/tmp/clinica-test.db");
        assert_eq!(config.database.pool_size, 5);
        assert_eq!(config.server.bind_addr, "127.0.0.1:8700");
        assert_eq!(config.matching.model, "match-1");

        clear_env();
    }

    #[test]
    fn test_load_from_env_missing_var() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        let result = load_from_env();
        assert!(result.is_err(), "Should fail with missing env var");
        assert!(matches!(result.unwrap_err(), ClinicaError::Config(_)));
    }

    #[test]
    fn test_load_from_env_invalid_pool_size() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        for (key, value) in REQUIRED_VARS {
            std::env::set_var(key, value);
        }
        std::env::set_var("CLINICA_DB_POOL_SIZE", "not-a-number");

        let result = load_from_env();
        assert!(matches!(result.unwrap_err(), ClinicaError::Config(_)));

        clear_env();
    }

    #[test]
    fn test_load_from_file_toml() {
        let toml_content = r#"
[database]
path = "clinica.db"
pool_size = 6

[server]
bind_addr = "127.0.0.1:9000"
public_base_url = "https://portal.example.com"

[identity]
issuer_url = "https://id.example.com"

[email]
api_url = "https://mail.example.com"
api_key = "mail-key"
sender_email = "no-reply@clinica.example"

[matching]
gateway_url = "https://models.example.com"
api_key = "gw-key"
model = "match-1"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        let path = temp_file.path().with_extension("toml");
        std::fs::copy(temp_file.path(), &path).unwrap();

        let config = load_from_file(Some(path.clone())).expect("config loads from TOML");
        assert_eq!(config.database.pool_size, 6);
        assert_eq!(config.server.bind_addr, "127.0.0.1:9000");

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_from_file_not_found() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/config.json")));
        assert!(matches!(result.unwrap_err(), ClinicaError::Config(_)));
    }

    #[test]
    fn test_parse_config_rejects_unknown_extension() {
        let result = parse_config("whatever", &PathBuf::from("config.yaml"));
        assert!(matches!(result.unwrap_err(), ClinicaError::Config(_)));
    }
}
