//! Mapping store abstraction
//!
//! Every feature talks to persistence through [`MappingStore`]. Two
//! implementations exist:
//!
//! - [`PgMappingStore`]: the production Postgres schema, via sqlx
//! - [`InMemoryStore`]: a JSON fixture held in memory, for tests and demos
//!
//! Search methods take a [`Predicate`] and return a page of groups. A group
//! collects the hits that share a current grouping id; hits without one
//! form singleton groups. Groups are ordered by their key (grouping id, or
//! the negated mapping id for singletons) and entries within a group by
//! mapping id. `limit`/`offset` count groups, not rows.

pub mod memory;
pub mod postgres;
pub mod sql;

pub use memory::InMemoryStore;
pub use postgres::PgMappingStore;

use async_trait::async_trait;
use serde::Serialize;

use crate::db::DbResult;
use crate::features::search::predicate::Predicate;
use crate::models::{
    Comment, MappingRecord, MappingView, ReleaseMappingHistory, SpeciesHistory, StatusChange,
    TranscriptWithGene, UniprotEntry, VocabularyEntry,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: i64,
    pub offset: i64,
}

/// Hits sharing one grouping id
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Group<T> {
    pub grouping_id: Option<i64>,
    pub entries: Vec<T>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupPage<T> {
    /// Number of groups across all pages
    pub total: i64,
    pub groups: Vec<Group<T>>,
}

impl<T> GroupPage<T> {
    pub fn map<U, F: FnMut(T) -> U>(self, mut f: F) -> GroupPage<U> {
        GroupPage {
            total: self.total,
            groups: self
                .groups
                .into_iter()
                .map(|g| Group {
                    grouping_id: g.grouping_id,
                    entries: g.entries.into_iter().map(&mut f).collect(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub total: i64,
    pub items: Vec<T>,
}

/// Result of a status change request
#[derive(Debug, Clone, PartialEq)]
pub enum StatusOutcome {
    /// The mapping already carried the requested status
    Unchanged,
    Changed(StatusChange),
}

/// Latest release mapping run for a taxon
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseSummary {
    pub release: ReleaseMappingHistory,
    pub species: Option<SpeciesHistory>,
}

/// Sort key used to order and page groups
pub fn group_key(grouping_id: Option<i64>, mapping_id: i64) -> i64 {
    grouping_id.unwrap_or(-mapping_id)
}

/// Fold rows already sorted by group key into groups
pub(crate) fn collect_groups<T>(
    rows: impl IntoIterator<Item = T>,
    key: impl Fn(&T) -> (Option<i64>, i64),
) -> Vec<Group<T>> {
    let mut groups: Vec<(i64, Group<T>)> = Vec::new();
    for row in rows {
        let (grouping_id, mapping_id) = key(&row);
        let k = group_key(grouping_id, mapping_id);
        match groups.last_mut() {
            Some((last, group)) if *last == k => group.entries.push(row),
            _ => groups.push((
                k,
                Group {
                    grouping_id,
                    entries: vec![row],
                },
            )),
        }
    }
    groups.into_iter().map(|(_, g)| g).collect()
}

#[async_trait]
pub trait MappingStore: Send + Sync {
    async fn health_check(&self) -> DbResult<()>;

    async fn statuses(&self) -> DbResult<Vec<VocabularyEntry>>;

    async fn entry_types(&self) -> DbResult<Vec<VocabularyEntry>>;

    async fn mapping(&self, mapping_id: i64) -> DbResult<Option<MappingRecord>>;

    async fn search_mappings(
        &self,
        filter: &Predicate,
        page: PageRequest,
    ) -> DbResult<GroupPage<MappingRecord>>;

    async fn search_mapping_views(
        &self,
        filter: &Predicate,
        page: PageRequest,
    ) -> DbResult<GroupPage<MappingView>>;

    /// Mappings whose history ties them to `release` under `grouping_id`
    async fn grouped_mappings(
        &self,
        release_mapping_history_id: i64,
        grouping_id: i64,
    ) -> DbResult<Vec<MappingRecord>>;

    /// UniProt entries of the release's UniProt version in the group that no mapping of the release links
    async fn unmapped_uniprot_entries(
        &self,
        release: &ReleaseMappingHistory,
        grouping_id: i64,
    ) -> DbResult<Vec<UniprotEntry>>;

    /// Transcripts of the release's species load in the group that no mapping of the release links
    async fn unmapped_transcripts(
        &self,
        release: &ReleaseMappingHistory,
        grouping_id: i64,
    ) -> DbResult<Vec<TranscriptWithGene>>;

    /// Most recently loaded species snapshot containing the transcript
    async fn latest_species_history(&self, transcript_id: i64) -> DbResult<Option<SpeciesHistory>>;

    /// Latest run by `time_mapped` over fully loaded species snapshots of an assembly
    async fn latest_release_for_assembly(
        &self,
        assembly_accession: &str,
    ) -> DbResult<Option<ReleaseMappingHistory>>;

    /// Latest run (highest id) for a UniProt taxonomy id
    async fn latest_release_for_taxon(&self, tax_id: i64) -> DbResult<Option<ReleaseSummary>>;

    async fn mappings_in_release(
        &self,
        release_mapping_history_id: i64,
        page: PageRequest,
    ) -> DbResult<Page<MappingRecord>>;

    /// Record a status change atomically across history, mapping and view
    async fn change_status(
        &self,
        mapping_id: i64,
        status_id: i64,
        user: &str,
    ) -> DbResult<StatusOutcome>;

    /// Status history, newest first
    async fn status_history(&self, mapping_id: i64) -> DbResult<Vec<StatusChange>>;

    async fn set_alignment_difference(&self, mapping_id: i64, difference: i64) -> DbResult<()>;

    /// Live comments on a mapping, newest first
    async fn comments(&self, mapping_id: i64) -> DbResult<Vec<Comment>>;

    /// Any comment by id, deleted or not
    async fn comment(&self, comment_id: i64) -> DbResult<Option<Comment>>;

    async fn add_comment(&self, mapping_id: i64, user: &str, text: &str) -> DbResult<Comment>;

    /// Replace the text and restamp the comment with the edit time
    async fn edit_comment(&self, comment_id: i64, text: &str) -> DbResult<Comment>;

    /// Flag a comment deleted; the row is kept
    async fn delete_comment(&self, comment_id: i64) -> DbResult<Comment>;
}
