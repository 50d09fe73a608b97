//! Search canonical mappings
//!
//! A numeric search term names exactly one mapping: an unknown id is
//! `NotFound` rather than an empty page. Every other term yields a
//! (possibly empty) page of groups.

use serde::{Deserialize, Serialize};

use super::facet_filter;
use crate::db::DbError;
use crate::features::mappings::assembler::{self, MappingBlock};
use crate::features::search::classifier::classify;
use crate::features::search::facets::FacetError;
use crate::features::search::predicate::{Field, Predicate};
use crate::features::search::resolver::{resolve, Resolution, SearchTarget};
use crate::features::shared::{PaginationError, PaginationMetadata, PaginationParams};
use crate::features::FeatureState;
use crate::store::Group;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMappingsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_term: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facets: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchMappingsResponse {
    pub groups: Vec<Group<MappingBlock>>,
    pub pagination: PaginationMetadata,
}

#[derive(Debug, thiserror::Error)]
pub enum SearchMappingsError {
    #[error(transparent)]
    Pagination(#[from] PaginationError),
    #[error(transparent)]
    Facet(#[from] FacetError),
    #[error("Mapping '{0}' not found")]
    MappingNotFound(String),
    #[error(transparent)]
    Database(#[from] DbError),
}

impl SearchMappingsQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams::new(self.limit, self.offset)
    }

    pub fn validate(&self) -> Result<(), SearchMappingsError> {
        self.pagination().validate()?;
        Ok(())
    }
}

#[tracing::instrument(skip(state))]
pub async fn handle(
    state: &FeatureState,
    query: SearchMappingsQuery,
) -> Result<SearchMappingsResponse, SearchMappingsError> {
    query.validate()?;
    let params = query.pagination();

    let term = classify(query.search_term.as_deref());
    tracing::debug!(kind = term.kind(), "Search term classified");

    let facets = facet_filter(query.facets.as_deref(), SearchTarget::Mappings, &state.vocabulary)?;

    let base = match resolve(&term, SearchTarget::Mappings) {
        Resolution::Single(id) => {
            let digits = query.search_term.as_deref().unwrap_or_default().trim();
            let id = id.ok_or_else(|| SearchMappingsError::MappingNotFound(digits.to_string()))?;
            if state.store.mapping(id).await?.is_none() {
                return Err(SearchMappingsError::MappingNotFound(digits.to_string()));
            }
            Predicate::equals(Field::MappingId, id)
        },
        Resolution::Matching(predicate) => predicate,
    };

    let page = state
        .store
        .search_mappings(&base.and(facets), params.page_request())
        .await?;
    let pagination = PaginationMetadata::from_params(&params, page.total);
    let page = page.map(|record| assembler::mapping(&record, &state.vocabulary, None));

    Ok(SearchMappingsResponse {
        groups: page.groups,
        pagination,
    })
}
