//! Adding, editing and deleting curator comments
//!
//! Deleting only flags the row; it stays reachable by id.

use serde::{Deserialize, Serialize};

use super::queries::{find, CommentQueryError, CommentView};
use crate::db::DbError;
use crate::features::FeatureState;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentCommand {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum CommentCommandError {
    #[error("Payload should have a non-empty 'text'")]
    TextRequired,
    #[error("Comment '{0}' has been deleted")]
    Deleted(i64),
    #[error(transparent)]
    Query(#[from] CommentQueryError),
    #[error(transparent)]
    Database(#[from] DbError),
}

impl CommentCommand {
    /// Text with surrounding spaces and tabs stripped
    pub fn validate(&self) -> Result<&str, CommentCommandError> {
        self.text
            .as_deref()
            .map(|t| t.trim_matches([' ', '\t']))
            .filter(|t| !t.is_empty())
            .ok_or(CommentCommandError::TextRequired)
    }
}

#[tracing::instrument(skip(state, command))]
pub async fn add(
    state: &FeatureState,
    mapping_id: i64,
    principal: &str,
    command: CommentCommand,
) -> Result<CommentView, CommentCommandError> {
    let text = command.validate()?;
    if state.store.mapping(mapping_id).await?.is_none() {
        return Err(CommentQueryError::MappingNotFound(mapping_id).into());
    }

    let comment = state.store.add_comment(mapping_id, principal, text).await?;
    tracing::info!(comment_id = comment.id, "Comment added");
    Ok(CommentView::new(comment, principal))
}

#[tracing::instrument(skip(state, command))]
pub async fn edit(
    state: &FeatureState,
    mapping_id: i64,
    comment_id: i64,
    principal: &str,
    command: CommentCommand,
) -> Result<CommentView, CommentCommandError> {
    let text = command.validate()?;
    let existing = find(state, mapping_id, comment_id).await?;
    if existing.deleted {
        return Err(CommentCommandError::Deleted(comment_id));
    }

    let comment = state.store.edit_comment(comment_id, text).await?;
    Ok(CommentView::new(comment, principal))
}

#[tracing::instrument(skip(state))]
pub async fn delete(
    state: &FeatureState,
    mapping_id: i64,
    comment_id: i64,
) -> Result<(), CommentCommandError> {
    find(state, mapping_id, comment_id).await?;
    state.store.delete_comment(comment_id).await?;
    tracing::info!("Comment flagged deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_validation_strips_spaces_and_tabs() {
        let command = CommentCommand {
            text: Some(" \tlooks right\t ".into()),
        };
        assert_eq!(command.validate().unwrap(), "looks right");

        for blank in [None, Some(String::new()), Some(" \t \t".into())] {
            let command = CommentCommand { text: blank };
            assert!(matches!(command.validate(), Err(CommentCommandError::TextRequired)));
        }
    }
}
