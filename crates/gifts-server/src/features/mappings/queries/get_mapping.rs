//! Mapping detail: taxonomy, the mapping itself and its related entries
//!
//! The Ensembl translation is fetched for the detail view unless the
//! caller passes `sequence=false`. Related mapped entries never carry a
//! sequence.

use serde::{Deserialize, Serialize};

use crate::db::DbError;
use crate::external::ExternalError;
use crate::features::mappings::assembler::{self, MappingBlock, RelatedBlock, TaxonomyBlock};
use crate::features::mappings::grouping::{self, GroupingError};
use crate::features::FeatureState;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetMappingQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetMappingResponse {
    pub taxonomy: TaxonomyBlock,
    pub mapping: MappingBlock,
    pub related_entries: RelatedBlock,
}

#[derive(Debug, thiserror::Error)]
pub enum GetMappingError {
    #[error("Mapping '{0}' not found")]
    NotFound(i64),
    #[error("Couldn't find an Ensembl species history associated to mapping {0}")]
    NoSpeciesHistory(i64),
    #[error(transparent)]
    Grouping(#[from] GroupingError),
    #[error(transparent)]
    External(#[from] ExternalError),
    #[error(transparent)]
    Database(#[from] DbError),
}

#[tracing::instrument(skip(state))]
pub async fn handle(
    state: &FeatureState,
    mapping_id: i64,
    query: GetMappingQuery,
) -> Result<GetMappingResponse, GetMappingError> {
    let record = state
        .store
        .mapping(mapping_id)
        .await?
        .ok_or(GetMappingError::NotFound(mapping_id))?;

    let species = state
        .store
        .latest_species_history(record.transcript.transcript_id)
        .await?;
    let taxonomy = assembler::taxonomy(&record, species.as_ref())
        .ok_or(GetMappingError::NoSpeciesHistory(mapping_id))?;

    let related = grouping::related(state.store.as_ref(), &record).await?;

    let sequence = if query.sequence.unwrap_or(true) {
        Some(state.sequences.ensembl_protein(&record.transcript.enst_id).await?)
    } else {
        None
    };

    Ok(GetMappingResponse {
        taxonomy,
        mapping: assembler::mapping(&record, &state.vocabulary, sequence),
        related_entries: assembler::related(&related, &state.vocabulary),
    })
}
