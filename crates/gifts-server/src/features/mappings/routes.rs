use crate::api::response::ApiResponse;
use crate::error::AppError;
use crate::middleware::CurrentUser;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;

use super::commands::{
    alignment_difference, change_status, AlignmentDifferenceError, ChangeStatusCommand,
    ChangeStatusError, ChangeStatusOutcome,
};
use super::grouping::GroupingError;
use super::queries::{
    get_mapping, pairwise, releases, statuses, GetMappingError, GetMappingQuery, PairwiseError,
    ReleaseError, ReleaseMappingsQuery, StatusHistoryError,
};
use crate::features::FeatureState;

/// Routes under `/mappings` besides search
pub fn collection_routes() -> Router<FeatureState> {
    Router::new()
        .route("/statuses", get(list_statuses))
        .route("/release/:assembly_accession/latest", get(latest_release))
        .route("/release-history/:id", get(mappings_in_release))
        .route("/species/:taxid/release", get(release_per_species))
}

/// Routes under `/mapping/:id`
pub fn mapping_routes() -> Router<FeatureState> {
    Router::new()
        .route("/:id", get(get_mapping_route))
        .route("/:id/pairwise", get(pairwise_route))
        .route("/:id/status", put(change_status_route))
        .route("/:id/status-history", get(status_history_route))
        .route("/:id/alignment_difference/:difference", post(alignment_difference_route))
}

async fn list_statuses(State(state): State<FeatureState>) -> Response {
    (StatusCode::OK, Json(ApiResponse::success(statuses::list_statuses(&state)))).into_response()
}

#[tracing::instrument(skip(state))]
async fn latest_release(
    State(state): State<FeatureState>,
    Path(assembly_accession): Path<String>,
) -> Result<Response, AppError> {
    let release = releases::latest_for_assembly(&state, &assembly_accession).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(release))).into_response())
}

#[tracing::instrument(skip(state, query))]
async fn mappings_in_release(
    State(state): State<FeatureState>,
    Path(id): Path<i64>,
    Query(query): Query<ReleaseMappingsQuery>,
) -> Result<Response, AppError> {
    let response = releases::mappings_in_release(&state, id, query).await?;
    let meta = json!({ "pagination": response.pagination });
    Ok((StatusCode::OK, Json(ApiResponse::success_with_meta(response.items, meta))).into_response())
}

#[tracing::instrument(skip(state))]
async fn release_per_species(
    State(state): State<FeatureState>,
    Path(taxid): Path<i64>,
) -> Result<Response, AppError> {
    let release = releases::release_per_species(&state, taxid).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(release))).into_response())
}

#[tracing::instrument(skip(state, query))]
async fn get_mapping_route(
    State(state): State<FeatureState>,
    Path(id): Path<i64>,
    Query(query): Query<GetMappingQuery>,
) -> Result<Response, AppError> {
    let response = get_mapping::handle(&state, id, query).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

#[tracing::instrument(skip(state))]
async fn pairwise_route(
    State(state): State<FeatureState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let response = pairwise::handle(&state, id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

#[tracing::instrument(skip(state, user, command), fields(user = %user.id()))]
async fn change_status_route(
    State(state): State<FeatureState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(command): Json<ChangeStatusCommand>,
) -> Result<Response, AppError> {
    match change_status::handle(&state, id, user.id(), command).await? {
        ChangeStatusOutcome::Unchanged => Ok(StatusCode::NO_CONTENT.into_response()),
        ChangeStatusOutcome::Changed(change) => {
            Ok((StatusCode::CREATED, Json(ApiResponse::success(change))).into_response())
        },
    }
}

#[tracing::instrument(skip(state))]
async fn status_history_route(
    State(state): State<FeatureState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let history = statuses::status_history(&state, id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(history))).into_response())
}

#[tracing::instrument(skip(state, user), fields(user = %user.id()))]
async fn alignment_difference_route(
    State(state): State<FeatureState>,
    user: CurrentUser,
    Path((id, difference)): Path<(i64, i64)>,
) -> Result<Response, AppError> {
    let mapping = alignment_difference::handle(&state, id, difference).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(mapping))).into_response())
}

impl From<GroupingError> for AppError {
    fn from(err: GroupingError) -> Self {
        match err {
            GroupingError::NoHistory(_) => AppError::NotFound(err.to_string()),
            GroupingError::Database(e) => e.into(),
        }
    }
}

impl From<GetMappingError> for AppError {
    fn from(err: GetMappingError) -> Self {
        match err {
            GetMappingError::NotFound(_) | GetMappingError::NoSpeciesHistory(_) => {
                AppError::NotFound(err.to_string())
            },
            GetMappingError::Grouping(e) => e.into(),
            GetMappingError::External(e) => e.into(),
            GetMappingError::Database(e) => e.into(),
        }
    }
}

impl From<PairwiseError> for AppError {
    fn from(err: PairwiseError) -> Self {
        match err {
            PairwiseError::NotFound(_) => AppError::NotFound(err.to_string()),
            PairwiseError::External(e) => e.into(),
            PairwiseError::Database(e) => e.into(),
        }
    }
}

impl From<ReleaseError> for AppError {
    fn from(err: ReleaseError) -> Self {
        match err {
            ReleaseError::NoReleaseForAssembly(_) | ReleaseError::NoReleaseForTaxon(_) => {
                AppError::NotFound(err.to_string())
            },
            ReleaseError::Pagination(e) => AppError::BadRequest(e.to_string()),
            ReleaseError::Database(e) => e.into(),
        }
    }
}

impl From<StatusHistoryError> for AppError {
    fn from(err: StatusHistoryError) -> Self {
        match err {
            StatusHistoryError::NotFound(_) => AppError::NotFound(err.to_string()),
            StatusHistoryError::Database(e) => e.into(),
        }
    }
}

impl From<ChangeStatusError> for AppError {
    fn from(err: ChangeStatusError) -> Self {
        match err {
            ChangeStatusError::StatusRequired => AppError::BadRequest(err.to_string()),
            ChangeStatusError::Vocabulary(e) => e.into(),
            ChangeStatusError::Database(e) => e.into(),
        }
    }
}

impl From<AlignmentDifferenceError> for AppError {
    fn from(err: AlignmentDifferenceError) -> Self {
        match err {
            AlignmentDifferenceError::Negative => AppError::BadRequest(err.to_string()),
            AlignmentDifferenceError::NotFound(_) => AppError::NotFound(err.to_string()),
            AlignmentDifferenceError::Database(e) => e.into(),
        }
    }
}
