use crate::api::response::ApiResponse;
use crate::error::AppError;
use crate::middleware::CurrentUser;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use super::commands::{self, CommentCommand, CommentCommandError};
use super::queries::{self, CommentQueryError};
use crate::features::FeatureState;

/// Routes under `/mapping/:id/comments`; all require a principal
pub fn comment_routes() -> Router<FeatureState> {
    Router::new()
        .route("/:id/comments", get(list_comments).post(add_comment))
        .route(
            "/:id/comments/:comment_id",
            get(get_comment).put(edit_comment).delete(delete_comment),
        )
}

#[tracing::instrument(skip(state, user))]
async fn list_comments(
    State(state): State<FeatureState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let comments = queries::list(&state, id, user.id()).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(comments))).into_response())
}

#[tracing::instrument(skip(state, user, command))]
async fn add_comment(
    State(state): State<FeatureState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(command): Json<CommentCommand>,
) -> Result<Response, AppError> {
    let comment = commands::add(&state, id, user.id(), command).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(comment))).into_response())
}

#[tracing::instrument(skip(state, user))]
async fn get_comment(
    State(state): State<FeatureState>,
    user: CurrentUser,
    Path((id, comment_id)): Path<(i64, i64)>,
) -> Result<Response, AppError> {
    let comment = queries::get(&state, id, comment_id, user.id()).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(comment))).into_response())
}

#[tracing::instrument(skip(state, user, command))]
async fn edit_comment(
    State(state): State<FeatureState>,
    user: CurrentUser,
    Path((id, comment_id)): Path<(i64, i64)>,
    Json(command): Json<CommentCommand>,
) -> Result<Response, AppError> {
    let comment = commands::edit(&state, id, comment_id, user.id(), command).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(comment))).into_response())
}

#[tracing::instrument(skip(state, _user))]
async fn delete_comment(
    State(state): State<FeatureState>,
    _user: CurrentUser,
    Path((id, comment_id)): Path<(i64, i64)>,
) -> Result<Response, AppError> {
    commands::delete(&state, id, comment_id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

impl From<CommentQueryError> for AppError {
    fn from(err: CommentQueryError) -> Self {
        match err {
            CommentQueryError::MappingNotFound(_) | CommentQueryError::CommentNotFound(_) => {
                AppError::NotFound(err.to_string())
            },
            CommentQueryError::Database(e) => e.into(),
        }
    }
}

impl From<CommentCommandError> for AppError {
    fn from(err: CommentCommandError) -> Self {
        match err {
            CommentCommandError::TextRequired | CommentCommandError::Deleted(_) => {
                AppError::BadRequest(err.to_string())
            },
            CommentCommandError::Query(e) => e.into(),
            CommentCommandError::Database(e) => e.into(),
        }
    }
}
