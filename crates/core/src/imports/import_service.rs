use log::{debug, info, warn};

use super::import_model::{ImportOutcome, ImportStatus, TradeCandidate};
use super::import_traits::TradeCandidateExtractor;
use crate::errors::{Error, Result};
use crate::ledger::{HoldingRecord, LedgerMutator};

/// Appends each candidate as a holding. Duplicates and invalid candidates are
/// reported per candidate; ledger failures abort the import.
pub async fn import_trade_candidates(
    candidates: Vec<TradeCandidate>,
    holdings: &LedgerMutator<HoldingRecord>,
) -> Result<Vec<ImportOutcome>> {
    let mut outcomes = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        let status = match holdings.append(candidate.to_holding()).await {
            Ok(outcome) => ImportStatus::Imported { row: outcome.row },
            Err(Error::DuplicateKey(key)) => {
                debug!("Skipping {}: already held", key);
                ImportStatus::Duplicate
            }
            Err(Error::Validation(e)) => {
                warn!("Rejected candidate {}: {}", candidate.symbol, e);
                ImportStatus::Invalid {
                    message: e.to_string(),
                }
            }
            Err(e) => return Err(e),
        };
        outcomes.push(ImportOutcome { candidate, status });
    }

    let imported = outcomes.iter().filter(|o| o.is_imported()).count();
    info!("Imported {} of {} trade candidate(s)", imported, outcomes.len());
    Ok(outcomes)
}

/// Extracts candidates from `image` and imports them.
pub async fn extract_and_import(
    extractor: &dyn TradeCandidateExtractor,
    image: &[u8],
    holdings: &LedgerMutator<HoldingRecord>,
) -> Result<Vec<ImportOutcome>> {
    let candidates = extractor.extract(image).await?;
    import_trade_candidates(candidates, holdings).await
}
