//! Port interface for the external matching provider

use async_trait::async_trait;
use clinica_domain::{MatchQuery, MatchResponse, Result};

/// Produces physician candidates for a validated patient query.
///
/// The production implementation forwards the query to a hosted language
/// model; the output is non-deterministic between calls and is rendered
/// as-is.
#[async_trait]
pub trait MatchProvider: Send + Sync {
    async fn find_candidates(&self, query: &MatchQuery) -> Result<MatchResponse>;
}
