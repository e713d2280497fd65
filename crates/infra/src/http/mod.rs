//! HTTP client plumbing shared by the outbound integrations

pub mod client;

pub use client::{HttpClient, HttpClientBuilder};
