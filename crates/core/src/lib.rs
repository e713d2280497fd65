//! # Clinica Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits)
//! - Use cases and services for every portal flow
//!
//! ## Architecture Principles
//! - Only depends on `clinica-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod identity;
pub mod invitations;
pub mod join_requests;
pub mod matching;
pub mod notifications;
pub mod practices;
pub mod presence;
pub mod realtime;
pub mod utils;

// Re-export specific items to avoid ambiguity
pub use identity::ports::SessionVerifier;
pub use invitations::ports::{InvitationMailer, InvitationRepository};
pub use invitations::InvitationService;
pub use join_requests::ports::JoinRequestRepository;
pub use join_requests::JoinRequestService;
pub use matching::ports::MatchProvider;
pub use matching::MatchingService;
pub use notifications::ports::NotificationRepository;
pub use notifications::NotificationService;
pub use practices::ports::{PracticeRepository, StaffRepository};
pub use practices::PracticeService;
pub use presence::ports::DoctorProfileRepository;
pub use presence::PresenceService;
pub use realtime::ports::{ChangeFeed, ChangePublisher, ChangeStream, SubscriptionGuard};
