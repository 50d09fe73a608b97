//! Search the denormalized mapping view
//!
//! The view is a search index, so a numeric id that matches nothing yields
//! an empty page instead of `NotFound`.

use serde::{Deserialize, Serialize};

use super::facet_filter;
use crate::db::DbError;
use crate::features::mappings::assembler::{self, MappingViewBlock};
use crate::features::search::classifier::classify;
use crate::features::search::facets::FacetError;
use crate::features::search::predicate::Predicate;
use crate::features::search::resolver::{resolve, Resolution, SearchTarget};
use crate::features::shared::{PaginationError, PaginationMetadata, PaginationParams};
use crate::features::FeatureState;
use crate::store::Group;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchViewsQuery {
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
pub struct SearchViewsResponse {
    pub groups: Vec<Group<MappingViewBlock>>,
    pub pagination: PaginationMetadata,
}

#[derive(Debug, thiserror::Error)]
pub enum SearchViewsError {
    #[error(transparent)]
    Pagination(#[from] PaginationError),
    #[error(transparent)]
    Facet(#[from] FacetError),
    #[error(transparent)]
    Database(#[from] DbError),
}

impl SearchViewsQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams::new(self.limit, self.offset)
    }
}

#[tracing::instrument(skip(state))]
pub async fn handle(
    state: &FeatureState,
    query: SearchViewsQuery,
) -> Result<SearchViewsResponse, SearchViewsError> {
    let params = query.pagination();
    params.validate()?;

    let term = classify(query.search_term.as_deref());
    let facets =
        facet_filter(query.facets.as_deref(), SearchTarget::MappingViews, &state.vocabulary)?;

    let base = match resolve(&term, SearchTarget::MappingViews) {
        Resolution::Matching(predicate) => predicate,
        // Views resolve ids to an equality predicate
        Resolution::Single(_) => Predicate::Or(vec![]),
    };

    let page = state
        .store
        .search_mapping_views(&base.and(facets), params.page_request())
        .await?;
    let pagination = PaginationMetadata::from_params(&params, page.total);
    let page = page.map(|row| assembler::view(&row, &state.vocabulary));

    tracing::debug!(
        kind = term.kind(),
        groups = page.groups.len(),
        total = pagination.total,
        "View search completed"
    );

    Ok(SearchViewsResponse {
        groups: page.groups,
        pagination,
    })
}
