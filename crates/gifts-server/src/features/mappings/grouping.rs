//! Related entries of a mapping
//!
//! The mapping's current history row (latest `time_mapped`) fixes a release
//! run R and a grouping id G. Related entries are everything else that R
//! places under G: other mappings, and the transcripts and UniProt entries
//! R left unmapped.

use crate::db::DbError;
use crate::models::{MappingRecord, TranscriptWithGene, UniprotEntry};
use crate::store::MappingStore;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Related {
    pub mapped: Vec<MappingRecord>,
    pub unmapped_transcripts: Vec<TranscriptWithGene>,
    pub unmapped_uniprot: Vec<UniprotEntry>,
}

#[derive(Debug, thiserror::Error)]
pub enum GroupingError {
    #[error("Mapping {0} has no mapping history")]
    NoHistory(i64),
    #[error(transparent)]
    Database(#[from] DbError),
}

#[tracing::instrument(skip_all, fields(mapping_id = record.mapping_id()))]
pub async fn related(
    store: &dyn MappingStore,
    record: &MappingRecord,
) -> Result<Related, GroupingError> {
    let current = record
        .current
        .as_ref()
        .ok_or(GroupingError::NoHistory(record.mapping_id()))?;

    let Some(grouping_id) = current.grouping_id else {
        tracing::debug!("Current history row has no grouping id");
        return Ok(Related::default());
    };
    let release = &current.release;

    let mapped = store
        .grouped_mappings(release.release_mapping_history_id, grouping_id)
        .await?
        .into_iter()
        .filter(|m| m.mapping_id() != record.mapping_id())
        .collect::<Vec<_>>();
    let unmapped_uniprot = store.unmapped_uniprot_entries(release, grouping_id).await?;
    let unmapped_transcripts = store.unmapped_transcripts(release, grouping_id).await?;

    tracing::debug!(
        grouping_id,
        mapped = mapped.len(),
        unmapped_uniprot = unmapped_uniprot.len(),
        unmapped_transcripts = unmapped_transcripts.len(),
        "Related entries collected"
    );

    Ok(Related {
        mapped,
        unmapped_transcripts,
        unmapped_uniprot,
    })
}
