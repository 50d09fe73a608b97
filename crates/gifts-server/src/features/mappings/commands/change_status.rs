//! Change the curation status of a mapping
//!
//! Requesting the status the mapping already has is a no-op reported as
//! [`ChangeStatusOutcome::Unchanged`]. Otherwise the store appends a
//! history row and mirrors the status onto the mapping and its view row in
//! one transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::DbError;
use crate::features::FeatureState;
use crate::store::StatusOutcome;
use crate::vocabulary::VocabularyError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChangeStatusCommand {
    /// Status label, e.g. `REVIEWED`
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangeResponse {
    pub id: i64,
    pub mapping_id: i64,
    pub status: String,
    pub time_stamp: DateTime<Utc>,
    pub user: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChangeStatusOutcome {
    Unchanged,
    Changed(StatusChangeResponse),
}

#[derive(Debug, thiserror::Error)]
pub enum ChangeStatusError {
    #[error("Payload should have 'status'")]
    StatusRequired,
    #[error(transparent)]
    Vocabulary(#[from] VocabularyError),
    #[error(transparent)]
    Database(#[from] DbError),
}

impl ChangeStatusCommand {
    pub fn validate(&self) -> Result<&str, ChangeStatusError> {
        self.status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(ChangeStatusError::StatusRequired)
    }
}

#[tracing::instrument(skip(state))]
pub async fn handle(
    state: &FeatureState,
    mapping_id: i64,
    user: &str,
    command: ChangeStatusCommand,
) -> Result<ChangeStatusOutcome, ChangeStatusError> {
    let label = command.validate()?;
    let status_id = state.vocabulary.status_id(label)?;

    match state.store.change_status(mapping_id, status_id, user).await? {
        StatusOutcome::Unchanged => {
            tracing::debug!(status_id, "Mapping already has the requested status");
            Ok(ChangeStatusOutcome::Unchanged)
        },
        StatusOutcome::Changed(change) => {
            tracing::info!(status_id, history_id = change.id, "Mapping status changed");
            Ok(ChangeStatusOutcome::Changed(StatusChangeResponse {
                id: change.id,
                mapping_id: change.mapping_id,
                status: state
                    .vocabulary
                    .status_label(change.status)
                    .unwrap_or(label)
                    .to_string(),
                time_stamp: change.time_stamp,
                user: change.user_stamp,
            }))
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_is_required() {
        assert!(matches!(
            ChangeStatusCommand { status: None }.validate(),
            Err(ChangeStatusError::StatusRequired)
        ));
        assert!(matches!(
            ChangeStatusCommand { status: Some("  ".into()) }.validate(),
            Err(ChangeStatusError::StatusRequired)
        ));
        assert_eq!(
            ChangeStatusCommand { status: Some(" REVIEWED ".into()) }.validate().unwrap(),
            "REVIEWED"
        );
    }
}
