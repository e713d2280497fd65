//! Port interface for the external session/identity provider

use async_trait::async_trait;
use clinica_domain::{CurrentUser, Result};

/// Validates bearer credentials against the external identity provider.
///
/// The portal never mints or stores credentials itself; it only asks the
/// provider who the caller is.
#[async_trait]
pub trait SessionVerifier: Send + Sync {
    /// Resolve a bearer token to the authenticated user.
    ///
    /// # Errors
    /// Returns `ClinicaError::Auth` for missing, invalid, or expired
    /// sessions.
    async fn verify(&self, bearer_token: &str) -> Result<CurrentUser>;
}
