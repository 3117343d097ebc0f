use async_trait::async_trait;

use super::import_model::TradeCandidate;
use crate::errors::Result;

/// Reads trade candidates out of an image. Recognition itself is opaque to
/// the ledger engine.
#[async_trait]
pub trait TradeCandidateExtractor: Send + Sync {
    async fn extract(&self, image: &[u8]) -> Result<Vec<TradeCandidate>>;
}
