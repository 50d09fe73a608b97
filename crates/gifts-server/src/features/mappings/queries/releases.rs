//! Release mapping runs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::DbError;
use crate::features::mappings::assembler::{self, MappingBlock};
use crate::features::shared::{PaginationError, PaginationMetadata, PaginationParams};
use crate::features::FeatureState;
use crate::models::ReleaseMappingHistory;

#[derive(Debug, thiserror::Error)]
pub enum ReleaseError {
    #[error("No release mapping history for assembly '{0}'")]
    NoReleaseForAssembly(String),
    #[error("No release mapping history for taxonomy id {0}")]
    NoReleaseForTaxon(i64),
    #[error(transparent)]
    Pagination(#[from] PaginationError),
    #[error(transparent)]
    Database(#[from] DbError),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseMappingHistoryResponse {
    pub release_mapping_history_id: i64,
    pub ensembl_species_history_id: i64,
    pub uniprot_release: Option<String>,
    pub uniprot_taxid: Option<i64>,
    pub time_mapped: Option<DateTime<Utc>>,
    pub status: Option<String>,
}

impl From<ReleaseMappingHistory> for ReleaseMappingHistoryResponse {
    fn from(r: ReleaseMappingHistory) -> Self {
        Self {
            release_mapping_history_id: r.release_mapping_history_id,
            ensembl_species_history_id: r.ensembl_species_history_id,
            uniprot_release: r.uniprot_release,
            uniprot_taxid: r.uniprot_taxid,
            time_mapped: r.time_mapped,
            status: r.status,
        }
    }
}

/// Release labels of a taxon's latest run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReleasePerSpecies {
    pub ensembl: Option<i64>,
    pub uniprot: Option<String>,
}

#[tracing::instrument(skip(state))]
pub async fn latest_for_assembly(
    state: &FeatureState,
    assembly_accession: &str,
) -> Result<ReleaseMappingHistoryResponse, ReleaseError> {
    state
        .store
        .latest_release_for_assembly(assembly_accession)
        .await?
        .map(Into::into)
        .ok_or_else(|| ReleaseError::NoReleaseForAssembly(assembly_accession.to_string()))
}

#[tracing::instrument(skip(state))]
pub async fn release_per_species(
    state: &FeatureState,
    tax_id: i64,
) -> Result<ReleasePerSpecies, ReleaseError> {
    let summary = state
        .store
        .latest_release_for_taxon(tax_id)
        .await?
        .ok_or(ReleaseError::NoReleaseForTaxon(tax_id))?;

    Ok(ReleasePerSpecies {
        ensembl: summary.species.and_then(|s| s.ensembl_release),
        uniprot: summary.release.uniprot_release,
    })
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReleaseMappingsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReleaseMappingsResponse {
    pub items: Vec<MappingBlock>,
    pub pagination: PaginationMetadata,
}

/// Mappings computed in one release run, by mapping id
#[tracing::instrument(skip(state))]
pub async fn mappings_in_release(
    state: &FeatureState,
    release_mapping_history_id: i64,
    query: ReleaseMappingsQuery,
) -> Result<ReleaseMappingsResponse, ReleaseError> {
    let params = PaginationParams::new(query.limit, query.offset);
    params.validate()?;

    let page = state
        .store
        .mappings_in_release(release_mapping_history_id, params.page_request())
        .await?;

    Ok(ReleaseMappingsResponse {
        items: page
            .items
            .iter()
            .map(|r| assembler::mapping(r, &state.vocabulary, None))
            .collect(),
        pagination: PaginationMetadata::from_params(&params, page.total),
    })
}
