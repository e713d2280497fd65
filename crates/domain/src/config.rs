//! Application configuration structures
//!
//! Populated by the infra config loader from environment variables or a
//! config file. External secrets (email API key, model gateway key) live
//! here at runtime only and are never serialized back out in responses.

use serde::{Deserialize, Serialize};

/// Top-level application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub identity: IdentityConfig,
    pub email: EmailConfig,
    pub matching: MatchingConfig,
}

/// SQLite database settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database file path
    pub path: String,
    /// Connection pool size
    pub pool_size: u32,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address the server binds to, e.g. `127.0.0.1:8700`
    pub bind_addr: String,
    /// Public site URL used when building acceptance links,
    /// e.g. `https://portal.example.com`
    pub public_base_url: String,
}

/// External identity provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Base URL of the identity provider (userinfo endpoint lives under it)
    pub issuer_url: String,
}

/// Transactional email provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// Base URL of the email provider API
    pub api_url: String,
    /// Provider API key
    pub api_key: String,
    /// Sender address for outbound mail
    pub sender_email: String,
    /// Optional display name for the sender
    pub sender_name: Option<String>,
}

/// Model gateway settings for the physician matching proxy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Base URL of the model gateway
    pub gateway_url: String,
    /// Gateway API key
    pub api_key: String,
    /// Model identifier forwarded with each request
    pub model: String,
}
