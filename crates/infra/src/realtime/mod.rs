//! Realtime change-notification transport

pub mod hub;

pub use hub::ChangeHub;
