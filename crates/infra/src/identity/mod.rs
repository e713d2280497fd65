//! External identity provider integration

pub mod client;

pub use client::{IdentityClient, IdentityClientConfig};
