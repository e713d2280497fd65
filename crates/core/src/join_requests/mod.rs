//! Practice join-request lifecycle

pub mod ports;
pub mod service;

pub use service::JoinRequestService;
