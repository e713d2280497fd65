//! Generic typed change-listener abstraction
//!
//! One subscribe/publish pair replaces the original per-feature realtime
//! subscription code. Streams deregister themselves on drop; that is the
//! one resource-lifetime discipline the portal requires.

pub mod ports;

pub use ports::{ChangeFeed, ChangePublisher, ChangeStream, SubscriptionGuard};
