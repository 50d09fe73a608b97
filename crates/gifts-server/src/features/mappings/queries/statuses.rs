//! Status vocabulary and per-mapping status history

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::DbError;
use crate::features::FeatureState;
use crate::models::VocabularyEntry;

/// The status vocabulary as loaded at startup
pub fn list_statuses(state: &FeatureState) -> Vec<VocabularyEntry> {
    state.vocabulary.statuses().to_vec()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusHistoryEntry {
    pub id: i64,
    pub status: Option<String>,
    pub time_stamp: DateTime<Utc>,
    pub user: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum StatusHistoryError {
    #[error("Mapping '{0}' not found")]
    NotFound(i64),
    #[error(transparent)]
    Database(#[from] DbError),
}

/// Status changes of a mapping, newest first
#[tracing::instrument(skip(state))]
pub async fn status_history(
    state: &FeatureState,
    mapping_id: i64,
) -> Result<Vec<StatusHistoryEntry>, StatusHistoryError> {
    if state.store.mapping(mapping_id).await?.is_none() {
        return Err(StatusHistoryError::NotFound(mapping_id));
    }

    let history = state.store.status_history(mapping_id).await?;
    Ok(history
        .into_iter()
        .map(|change| StatusHistoryEntry {
            id: change.id,
            status: state.vocabulary.status_label(change.status).map(str::to_string),
            time_stamp: change.time_stamp,
            user: change.user_stamp,
        })
        .collect())
}
