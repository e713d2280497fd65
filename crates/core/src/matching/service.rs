//! Matching proxy service - core business logic

use std::sync::Arc;

use clinica_domain::{ClinicaError, CurrentUser, MatchQuery, MatchResponse, Result};
use tracing::{info, warn};

use super::ports::MatchProvider;

/// Physician matching proxy
///
/// Validation happens before the provider is touched; provider failures
/// come back as `Upstream` so the API layer can degrade to an empty
/// candidate list instead of crashing the caller.
pub struct MatchingService {
    provider: Arc<dyn MatchProvider>,
}

impl MatchingService {
    /// Create a new matching service
    pub fn new(provider: Arc<dyn MatchProvider>) -> Self {
        Self { provider }
    }

    /// Forward a validated query to the provider.
    ///
    /// No caching, retry, or local ranking is applied; the candidate list
    /// is whatever the provider returned.
    pub async fn find_matches(
        &self,
        user: &CurrentUser,
        query: &MatchQuery,
    ) -> Result<MatchResponse> {
        query.validate()?;

        match self.provider.find_candidates(query).await {
            Ok(response) => {
                info!(
                    user_id = %user.id,
                    urgency = query.urgency.as_str(),
                    candidates = response.physicians.len(),
                    "matching query served"
                );
                Ok(response)
            }
            Err(err) => {
                warn!(user_id = %user.id, error = %err, "matching provider failed");
                Err(ClinicaError::Upstream(err.to_string()))
            }
        }
    }
}
