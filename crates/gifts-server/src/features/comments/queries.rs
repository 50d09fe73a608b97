//! Reading curator comments

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::DbError;
use crate::features::FeatureState;
use crate::models::Comment;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub comment_id: i64,
    pub text: String,
    pub time_added: DateTime<Utc>,
    pub user: String,
    /// The requesting curator wrote it
    pub editable: bool,
    pub deleted: bool,
}

impl CommentView {
    pub fn new(comment: Comment, principal: &str) -> Self {
        Self {
            comment_id: comment.id,
            editable: comment.user_stamp == principal,
            text: comment.comment,
            time_added: comment.time_stamp,
            user: comment.user_stamp,
            deleted: comment.deleted,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingComments {
    pub mapping_id: i64,
    pub comments: Vec<CommentView>,
}

#[derive(Debug, thiserror::Error)]
pub enum CommentQueryError {
    #[error("Mapping '{0}' not found")]
    MappingNotFound(i64),
    #[error("Comment '{0}' not found")]
    CommentNotFound(i64),
    #[error(transparent)]
    Database(#[from] DbError),
}

/// Live comments on a mapping, newest first
#[tracing::instrument(skip(state))]
pub async fn list(
    state: &FeatureState,
    mapping_id: i64,
    principal: &str,
) -> Result<MappingComments, CommentQueryError> {
    if state.store.mapping(mapping_id).await?.is_none() {
        return Err(CommentQueryError::MappingNotFound(mapping_id));
    }

    let comments = state
        .store
        .comments(mapping_id)
        .await?
        .into_iter()
        .map(|c| CommentView::new(c, principal))
        .collect();

    Ok(MappingComments {
        mapping_id,
        comments,
    })
}

/// Fetch a comment of a mapping, including deleted ones
pub(crate) async fn find(
    state: &FeatureState,
    mapping_id: i64,
    comment_id: i64,
) -> Result<Comment, CommentQueryError> {
    state
        .store
        .comment(comment_id)
        .await?
        .filter(|c| c.mapping_id == mapping_id)
        .ok_or(CommentQueryError::CommentNotFound(comment_id))
}

#[tracing::instrument(skip(state))]
pub async fn get(
    state: &FeatureState,
    mapping_id: i64,
    comment_id: i64,
    principal: &str,
) -> Result<CommentView, CommentQueryError> {
    let comment = find(state, mapping_id, comment_id).await?;
    Ok(CommentView::new(comment, principal))
}
