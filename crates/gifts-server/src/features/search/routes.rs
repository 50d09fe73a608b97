use crate::api::response::ApiResponse;
use crate::error::AppError;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;

use super::queries::{
    search_mappings, search_views, SearchMappingsError, SearchMappingsQuery, SearchViewsError,
    SearchViewsQuery,
};
use crate::features::FeatureState;

pub fn search_routes() -> Router<FeatureState> {
    Router::new()
        .route("/", get(search_mappings_route))
        .route("/views", get(search_views_route))
}

#[tracing::instrument(
    skip(state, query),
    fields(
        search_term = ?query.search_term,
        facets = ?query.facets,
        limit = ?query.limit,
        offset = ?query.offset
    )
)]
async fn search_mappings_route(
    State(state): State<FeatureState>,
    Query(query): Query<SearchMappingsQuery>,
) -> Result<Response, AppError> {
    let response = search_mappings::handle(&state, query).await?;

    tracing::debug!(
        groups = response.groups.len(),
        total = response.pagination.total,
        "Mapping search completed"
    );

    let meta = json!({ "pagination": response.pagination });
    Ok((StatusCode::OK, Json(ApiResponse::success_with_meta(response.groups, meta))).into_response())
}

#[tracing::instrument(
    skip(state, query),
    fields(search_term = ?query.search_term, facets = ?query.facets)
)]
async fn search_views_route(
    State(state): State<FeatureState>,
    Query(query): Query<SearchViewsQuery>,
) -> Result<Response, AppError> {
    let response = search_views::handle(&state, query).await?;

    let meta = json!({ "pagination": response.pagination });
    Ok((StatusCode::OK, Json(ApiResponse::success_with_meta(response.groups, meta))).into_response())
}

impl From<SearchMappingsError> for AppError {
    fn from(err: SearchMappingsError) -> Self {
        match err {
            SearchMappingsError::Pagination(e) => AppError::BadRequest(e.to_string()),
            SearchMappingsError::Facet(e) => e.into(),
            SearchMappingsError::MappingNotFound(_) => AppError::NotFound(err.to_string()),
            SearchMappingsError::Database(e) => e.into(),
        }
    }
}

impl From<SearchViewsError> for AppError {
    fn from(err: SearchViewsError) -> Self {
        match err {
            SearchViewsError::Pagination(e) => AppError::BadRequest(e.to_string()),
            SearchViewsError::Facet(e) => e.into(),
            SearchViewsError::Database(e) => e.into(),
        }
    }
}
