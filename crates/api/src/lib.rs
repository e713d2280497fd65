//! # Clinica API
//!
//! HTTP surface of the portal: route handlers, session extraction,
//! error-to-status mapping, and the application context that wires core
//! services over infra adapters.

pub mod auth;
pub mod context;
pub mod error;
pub mod routes;

pub use context::AppContext;
pub use error::ApiError;
