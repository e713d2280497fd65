//! Practice management

pub mod ports;
pub mod service;

pub use service::{require_admin, require_member, PracticeService};
