//! Physician matching proxy

pub mod ports;
pub mod service;

pub use service::MatchingService;
