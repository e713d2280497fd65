//! Practice invitation lifecycle

pub mod ports;
pub mod service;

pub use service::InvitationService;
