//! Overwrite a mapping's alignment difference
//!
//! No history is kept; the last write wins.

use crate::db::DbError;
use crate::features::mappings::assembler::{self, MappingBlock};
use crate::features::FeatureState;

#[derive(Debug, thiserror::Error)]
pub enum AlignmentDifferenceError {
    #[error("Alignment difference cannot be negative")]
    Negative,
    #[error("Mapping '{0}' not found")]
    NotFound(i64),
    #[error(transparent)]
    Database(#[from] DbError),
}

#[tracing::instrument(skip(state))]
pub async fn handle(
    state: &FeatureState,
    mapping_id: i64,
    difference: i64,
) -> Result<MappingBlock, AlignmentDifferenceError> {
    if difference < 0 {
        return Err(AlignmentDifferenceError::Negative);
    }

    state.store.set_alignment_difference(mapping_id, difference).await?;

    let record = state
        .store
        .mapping(mapping_id)
        .await?
        .ok_or(AlignmentDifferenceError::NotFound(mapping_id))?;

    Ok(assembler::mapping(&record, &state.vocabulary, None))
}
