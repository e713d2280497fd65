//! Model gateway integration for physician matching

pub mod gateway;

pub use gateway::{ModelGatewayClient, ModelGatewayConfig};
