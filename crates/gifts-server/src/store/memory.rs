//! In-memory mapping store
//!
//! Holds a JSON fixture with one array per relation and answers the same
//! queries as the Postgres store by evaluating predicates directly. Writes
//! take the single write lock, so a status change is all-or-nothing.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tokio::sync::RwLock;

use super::{
    collect_groups, group_key, GroupPage, MappingStore, Page, PageRequest, ReleaseSummary,
    StatusOutcome,
};
use crate::db::{DbError, DbResult};
use crate::features::search::predicate::{Field, FieldSource, Predicate, Value};
use crate::models::{
    Comment, CurrentRelease, Gene, Mapping, MappingHistory, MappingRecord, MappingView,
    ReleaseMappingHistory, SpeciesHistory, StatusChange, Transcript, TranscriptHistory,
    TranscriptWithGene, UniprotEntry, UniprotEntryHistory, VocabularyEntry,
};

/// Contents of a fixture file, one array per relation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Fixture {
    pub statuses: Vec<VocabularyEntry>,
    pub entry_types: Vec<VocabularyEntry>,
    pub genes: Vec<Gene>,
    pub transcripts: Vec<Transcript>,
    pub species_histories: Vec<SpeciesHistory>,
    pub transcript_histories: Vec<TranscriptHistory>,
    pub uniprot_entries: Vec<UniprotEntry>,
    pub uniprot_entry_histories: Vec<UniprotEntryHistory>,
    pub mappings: Vec<Mapping>,
    pub mapping_histories: Vec<MappingHistory>,
    pub release_mapping_histories: Vec<ReleaseMappingHistory>,
    pub mapping_views: Vec<MappingView>,
    pub status_history: Vec<StatusChange>,
    pub comments: Vec<Comment>,
}

impl Fixture {
    fn release(&self, id: i64) -> Option<&ReleaseMappingHistory> {
        self.release_mapping_histories
            .iter()
            .find(|r| r.release_mapping_history_id == id)
    }

    fn species(&self, id: i64) -> Option<&SpeciesHistory> {
        self.species_histories
            .iter()
            .find(|s| s.ensembl_species_history_id == id)
    }

    fn gene(&self, id: i64) -> Option<&Gene> {
        self.genes.iter().find(|g| g.gene_id == id)
    }

    fn current_release(&self, mapping_id: i64) -> Option<CurrentRelease> {
        self.mapping_histories
            .iter()
            .filter(|mh| mh.mapping_id == mapping_id)
            .filter_map(|mh| self.release(mh.release_mapping_history_id).map(|r| (mh, r)))
            .max_by_key(|(mh, r)| (r.time_mapped, mh.mapping_history_id))
            .map(|(mh, release)| CurrentRelease {
                grouping_id: mh.grouping_id,
                release: release.clone(),
                species: self.species(release.ensembl_species_history_id).cloned(),
            })
    }

    fn record(&self, mapping: &Mapping) -> Option<MappingRecord> {
        let transcript = self
            .transcripts
            .iter()
            .find(|t| t.transcript_id == mapping.transcript_id)?;
        let gene = self.gene(transcript.gene_id)?;
        let uniprot = self
            .uniprot_entries
            .iter()
            .find(|u| u.uniprot_id == mapping.uniprot_id)?;

        let mut ensembl_tax_ids: Vec<i64> = self
            .transcript_histories
            .iter()
            .filter(|th| th.transcript_id == transcript.transcript_id)
            .filter_map(|th| self.species(th.ensembl_species_history_id))
            .filter_map(|s| s.ensembl_tax_id)
            .collect();
        ensembl_tax_ids.sort_unstable();
        ensembl_tax_ids.dedup();

        Some(MappingRecord {
            mapping: mapping.clone(),
            transcript: transcript.clone(),
            gene: gene.clone(),
            uniprot: uniprot.clone(),
            current: self.current_release(mapping.mapping_id),
            ensembl_tax_ids,
        })
    }

    fn records_where(&self, keep: impl Fn(&Mapping) -> bool) -> Vec<MappingRecord> {
        let mut records: Vec<MappingRecord> = self
            .mappings
            .iter()
            .filter(|m| keep(m))
            .filter_map(|m| self.record(m))
            .collect();
        records.sort_by_key(|r| r.mapping_id());
        records
    }

    fn mapped_in_release(&self, release_mapping_history_id: i64) -> Vec<&Mapping> {
        let ids: HashSet<i64> = self
            .mapping_histories
            .iter()
            .filter(|mh| mh.release_mapping_history_id == release_mapping_history_id)
            .map(|mh| mh.mapping_id)
            .collect();
        self.mappings
            .iter()
            .filter(|m| ids.contains(&m.mapping_id))
            .collect()
    }
}

fn text(value: &Option<String>) -> Vec<Value> {
    value.iter().cloned().map(Value::Text).collect()
}

fn int(value: Option<i64>) -> Vec<Value> {
    value.into_iter().map(Value::Int).collect()
}

impl FieldSource for MappingRecord {
    fn field_values(&self, field: Field) -> Vec<Value> {
        match field {
            Field::MappingId => vec![Value::Int(self.mapping.mapping_id)],
            Field::GeneAccession => vec![Value::Text(self.gene.ensg_id.clone())],
            Field::TranscriptAccession => vec![Value::Text(self.transcript.enst_id.clone())],
            Field::ProteinAccession => vec![Value::Text(self.uniprot.uniprot_acc.clone())],
            Field::GeneSymbol => text(&self.gene.gene_symbol),
            Field::UniprotGeneSymbol => text(&self.uniprot.gene_symbol),
            Field::GeneName => text(&self.gene.gene_name),
            Field::TaxId => self.ensembl_tax_ids.iter().copied().map(Value::Int).collect(),
            Field::AlignmentDifference => int(self.mapping.alignment_difference),
            Field::Status => int(self.mapping.status),
            Field::Chromosome => text(&self.gene.chromosome),
            Field::RegionAccession => text(&self.gene.region_accession),
            Field::MappingType => Vec::new(),
        }
    }
}

impl FieldSource for MappingView {
    fn field_values(&self, field: Field) -> Vec<Value> {
        match field {
            Field::MappingId => vec![Value::Int(self.mapping_id)],
            Field::GeneAccession => text(&self.ensg_id),
            Field::TranscriptAccession => text(&self.enst_id),
            Field::ProteinAccession => text(&self.uniprot_acc),
            Field::GeneSymbol => text(&self.gene_symbol_eg),
            Field::UniprotGeneSymbol => text(&self.gene_symbol_up),
            Field::GeneName => text(&self.gene_name),
            Field::TaxId => int(self.uniprot_tax_id),
            Field::AlignmentDifference => int(self.alignment_difference),
            Field::Status => int(self.status),
            Field::Chromosome => text(&self.chromosome),
            Field::RegionAccession => text(&self.region_accession),
            Field::MappingType => text(&self.uniprot_mapping_status),
        }
    }
}

fn window<T>(groups: Vec<T>, page: PageRequest) -> Vec<T> {
    let offset = usize::try_from(page.offset).unwrap_or(0);
    let limit = usize::try_from(page.limit).unwrap_or(0);
    groups.into_iter().skip(offset).take(limit).collect()
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    data: RwLock<Fixture>,
}

impl InMemoryStore {
    pub fn new(fixture: Fixture) -> Self {
        Self {
            data: RwLock::new(fixture),
        }
    }

    pub fn from_json(json: &str) -> DbResult<Self> {
        let fixture: Fixture =
            serde_json::from_str(json).map_err(|e| DbError::Fixture(e.to_string()))?;
        Ok(Self::new(fixture))
    }

    pub async fn load(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| DbError::Fixture(format!("{}: {e}", path.display())))?;
        let store = Self::from_json(&json)?;
        tracing::info!(path = %path.display(), "Loaded mapping fixture");
        Ok(store)
    }

    /// Copy of the current contents
    pub async fn snapshot(&self) -> Fixture {
        self.data.read().await.clone()
    }
}

#[async_trait]
impl MappingStore for InMemoryStore {
    async fn health_check(&self) -> DbResult<()> {
        Ok(())
    }

    async fn statuses(&self) -> DbResult<Vec<VocabularyEntry>> {
        Ok(self.data.read().await.statuses.clone())
    }

    async fn entry_types(&self) -> DbResult<Vec<VocabularyEntry>> {
        Ok(self.data.read().await.entry_types.clone())
    }

    async fn mapping(&self, mapping_id: i64) -> DbResult<Option<MappingRecord>> {
        let data = self.data.read().await;
        Ok(data
            .mappings
            .iter()
            .find(|m| m.mapping_id == mapping_id)
            .and_then(|m| data.record(m)))
    }

    async fn search_mappings(
        &self,
        filter: &Predicate,
        page: PageRequest,
    ) -> DbResult<GroupPage<MappingRecord>> {
        let data = self.data.read().await;
        let mut hits: Vec<MappingRecord> = data
            .records_where(|_| true)
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect();
        hits.sort_by_key(|r| (group_key(r.grouping_id(), r.mapping_id()), r.mapping_id()));

        let groups = collect_groups(hits, |r| (r.grouping_id(), r.mapping_id()));
        Ok(GroupPage {
            total: groups.len() as i64,
            groups: window(groups, page),
        })
    }

    async fn search_mapping_views(
        &self,
        filter: &Predicate,
        page: PageRequest,
    ) -> DbResult<GroupPage<MappingView>> {
        let data = self.data.read().await;
        let mut hits: Vec<MappingView> = data
            .mapping_views
            .iter()
            .filter(|v| filter.matches(*v))
            .cloned()
            .collect();
        hits.sort_by_key(|v| (group_key(v.grouping_id, v.mapping_id), v.mapping_id, v.id));

        let groups = collect_groups(hits, |v| (v.grouping_id, v.mapping_id));
        Ok(GroupPage {
            total: groups.len() as i64,
            groups: window(groups, page),
        })
    }

    async fn grouped_mappings(
        &self,
        release_mapping_history_id: i64,
        grouping_id: i64,
    ) -> DbResult<Vec<MappingRecord>> {
        let data = self.data.read().await;
        let ids: HashSet<i64> = data
            .mapping_histories
            .iter()
            .filter(|mh| {
                mh.release_mapping_history_id == release_mapping_history_id
                    && mh.grouping_id == Some(grouping_id)
            })
            .map(|mh| mh.mapping_id)
            .collect();
        Ok(data.records_where(|m| ids.contains(&m.mapping_id)))
    }

    async fn unmapped_uniprot_entries(
        &self,
        release: &ReleaseMappingHistory,
        grouping_id: i64,
    ) -> DbResult<Vec<UniprotEntry>> {
        let Some(ref uniprot_release) = release.uniprot_release else {
            return Ok(Vec::new());
        };
        let data = self.data.read().await;
        let mapped: HashSet<i64> = data
            .mapped_in_release(release.release_mapping_history_id)
            .iter()
            .map(|m| m.uniprot_id)
            .collect();

        let mut entries: Vec<UniprotEntry> = data
            .uniprot_entry_histories
            .iter()
            .filter(|h| {
                h.release_version == *uniprot_release
                    && h.grouping_id == Some(grouping_id)
                    && !mapped.contains(&h.uniprot_id)
            })
            .filter_map(|h| data.uniprot_entries.iter().find(|u| u.uniprot_id == h.uniprot_id))
            .cloned()
            .collect();
        entries.sort_by(|a, b| a.uniprot_acc.cmp(&b.uniprot_acc));
        Ok(entries)
    }

    async fn unmapped_transcripts(
        &self,
        release: &ReleaseMappingHistory,
        grouping_id: i64,
    ) -> DbResult<Vec<TranscriptWithGene>> {
        let data = self.data.read().await;
        let mapped: HashSet<i64> = data
            .mapped_in_release(release.release_mapping_history_id)
            .iter()
            .map(|m| m.transcript_id)
            .collect();

        let mut transcripts: Vec<TranscriptWithGene> = data
            .transcript_histories
            .iter()
            .filter(|th| {
                th.ensembl_species_history_id == release.ensembl_species_history_id
                    && th.grouping_id == Some(grouping_id)
                    && !mapped.contains(&th.transcript_id)
            })
            .filter_map(|th| {
                let transcript = data
                    .transcripts
                    .iter()
                    .find(|t| t.transcript_id == th.transcript_id)?;
                let gene = data.gene(transcript.gene_id)?;
                Some(TranscriptWithGene {
                    transcript: transcript.clone(),
                    gene: gene.clone(),
                })
            })
            .collect();
        transcripts.sort_by(|a, b| a.transcript.enst_id.cmp(&b.transcript.enst_id));
        Ok(transcripts)
    }

    async fn latest_species_history(&self, transcript_id: i64) -> DbResult<Option<SpeciesHistory>> {
        let data = self.data.read().await;
        Ok(data
            .transcript_histories
            .iter()
            .filter(|th| th.transcript_id == transcript_id)
            .filter_map(|th| data.species(th.ensembl_species_history_id))
            .max_by_key(|s| (s.time_loaded, s.ensembl_species_history_id))
            .cloned())
    }

    async fn latest_release_for_assembly(
        &self,
        assembly_accession: &str,
    ) -> DbResult<Option<ReleaseMappingHistory>> {
        let data = self.data.read().await;
        Ok(data
            .release_mapping_histories
            .iter()
            .filter(|r| {
                data.species(r.ensembl_species_history_id).is_some_and(|s| {
                    s.status.as_deref() == Some("LOAD_COMPLETE")
                        && s.assembly_accession
                            .as_deref()
                            .is_some_and(|a| a.eq_ignore_ascii_case(assembly_accession))
                })
            })
            .max_by_key(|r| (r.time_mapped, r.release_mapping_history_id))
            .cloned())
    }

    async fn latest_release_for_taxon(&self, tax_id: i64) -> DbResult<Option<ReleaseSummary>> {
        let data = self.data.read().await;
        Ok(data
            .release_mapping_histories
            .iter()
            .filter(|r| r.uniprot_taxid == Some(tax_id))
            .max_by_key(|r| r.release_mapping_history_id)
            .map(|release| ReleaseSummary {
                release: release.clone(),
                species: data.species(release.ensembl_species_history_id).cloned(),
            }))
    }

    async fn mappings_in_release(
        &self,
        release_mapping_history_id: i64,
        page: PageRequest,
    ) -> DbResult<Page<MappingRecord>> {
        let data = self.data.read().await;
        let ids: HashSet<i64> = data
            .mapped_in_release(release_mapping_history_id)
            .iter()
            .map(|m| m.mapping_id)
            .collect();
        let records = data.records_where(|m| ids.contains(&m.mapping_id));
        Ok(Page {
            total: records.len() as i64,
            items: window(records, page),
        })
    }

    async fn change_status(
        &self,
        mapping_id: i64,
        status_id: i64,
        user: &str,
    ) -> DbResult<StatusOutcome> {
        let mut data = self.data.write().await;

        let mapping_status = data
            .mappings
            .iter()
            .find(|m| m.mapping_id == mapping_id)
            .ok_or_else(|| DbError::not_found("Mapping", mapping_id))?
            .status;
        let latest = data
            .status_history
            .iter()
            .filter(|s| s.mapping_id == mapping_id)
            .max_by_key(|s| (s.time_stamp, s.id))
            .map(|s| s.status);

        if latest.or(mapping_status) == Some(status_id) {
            return Ok(StatusOutcome::Unchanged);
        }

        if !data.mapping_views.iter().any(|v| v.mapping_id == mapping_id) {
            return Err(DbError::NotFound(format!(
                "Mapping '{mapping_id}' is missing from the search table"
            )));
        }

        let change = StatusChange {
            id: data.status_history.iter().map(|s| s.id).max().unwrap_or(0) + 1,
            time_stamp: Utc::now(),
            user_stamp: Some(user.to_string()),
            status: status_id,
            mapping_id,
        };
        data.status_history.push(change.clone());
        for mapping in data.mappings.iter_mut().filter(|m| m.mapping_id == mapping_id) {
            mapping.status = Some(status_id);
        }
        for view in data.mapping_views.iter_mut().filter(|v| v.mapping_id == mapping_id) {
            view.status = Some(status_id);
        }

        Ok(StatusOutcome::Changed(change))
    }

    async fn status_history(&self, mapping_id: i64) -> DbResult<Vec<StatusChange>> {
        let data = self.data.read().await;
        let mut history: Vec<StatusChange> = data
            .status_history
            .iter()
            .filter(|s| s.mapping_id == mapping_id)
            .cloned()
            .collect();
        history.sort_by_key(|s| std::cmp::Reverse((s.time_stamp, s.id)));
        Ok(history)
    }

    async fn set_alignment_difference(&self, mapping_id: i64, difference: i64) -> DbResult<()> {
        let mut data = self.data.write().await;
        let mapping = data
            .mappings
            .iter_mut()
            .find(|m| m.mapping_id == mapping_id)
            .ok_or_else(|| DbError::not_found("Mapping", mapping_id))?;
        mapping.alignment_difference = Some(difference);
        Ok(())
    }

    async fn comments(&self, mapping_id: i64) -> DbResult<Vec<Comment>> {
        let data = self.data.read().await;
        let mut comments: Vec<Comment> = data
            .comments
            .iter()
            .filter(|c| c.mapping_id == mapping_id && !c.deleted)
            .cloned()
            .collect();
        comments.sort_by_key(|c| std::cmp::Reverse((c.time_stamp, c.id)));
        Ok(comments)
    }

    async fn comment(&self, comment_id: i64) -> DbResult<Option<Comment>> {
        let data = self.data.read().await;
        Ok(data.comments.iter().find(|c| c.id == comment_id).cloned())
    }

    async fn add_comment(&self, mapping_id: i64, user: &str, text: &str) -> DbResult<Comment> {
        let mut data = self.data.write().await;
        let comment = Comment {
            id: data.comments.iter().map(|c| c.id).max().unwrap_or(0) + 1,
            time_stamp: Utc::now(),
            user_stamp: user.to_string(),
            comment: text.to_string(),
            mapping_id,
            deleted: false,
        };
        data.comments.push(comment.clone());
        Ok(comment)
    }

    async fn edit_comment(&self, comment_id: i64, text: &str) -> DbResult<Comment> {
        let mut data = self.data.write().await;
        let comment = data
            .comments
            .iter_mut()
            .find(|c| c.id == comment_id)
            .ok_or_else(|| DbError::not_found("Comment", comment_id))?;
        comment.comment = text.to_string();
        comment.time_stamp = Utc::now();
        Ok(comment.clone())
    }

    async fn delete_comment(&self, comment_id: i64) -> DbResult<Comment> {
        let mut data = self.data.write().await;
        let comment = data
            .comments
            .iter_mut()
            .find(|c| c.id == comment_id)
            .ok_or_else(|| DbError::not_found("Comment", comment_id))?;
        comment.deleted = true;
        Ok(comment.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixture() -> Fixture {
        let json = serde_json::json!({
            "statuses": [{"id": 1, "description": "NOT_REVIEWED"}, {"id": 2, "description": "REVIEWED"}],
            "genes": [{"gene_id": 1, "ensg_id": "ENSG1", "gene_symbol": "TP53"}],
            "transcripts": [
                {"transcript_id": 10, "gene_id": 1, "enst_id": "ENST10"},
                {"transcript_id": 11, "gene_id": 1, "enst_id": "ENST11"}
            ],
            "species_histories": [{"ensembl_species_history_id": 1, "ensembl_tax_id": 9606}],
            "transcript_histories": [
                {"ensembl_species_history_id": 1, "transcript_id": 10, "grouping_id": 5},
                {"ensembl_species_history_id": 1, "transcript_id": 11, "grouping_id": 5}
            ],
            "uniprot_entries": [{"uniprot_id": 100, "uniprot_acc": "P04637"}],
            "mappings": [{"mapping_id": 1, "transcript_id": 10, "uniprot_id": 100, "status": 1}],
            "release_mapping_histories": [
                {"release_mapping_history_id": 1, "ensembl_species_history_id": 1,
                 "uniprot_release": "2019_01", "time_mapped": "2019-01-01T00:00:00Z"},
                {"release_mapping_history_id": 2, "ensembl_species_history_id": 1,
                 "uniprot_release": "2019_02", "time_mapped": "2019-02-01T00:00:00Z"}
            ],
            "mapping_histories": [
                {"mapping_history_id": 7, "mapping_id": 1, "release_mapping_history_id": 2, "grouping_id": 5},
                {"mapping_history_id": 8, "mapping_id": 1, "release_mapping_history_id": 1, "grouping_id": 3}
            ]
        });
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_current_release_is_latest_by_time_mapped() {
        let data = fixture();
        let current = data.current_release(1).unwrap();
        assert_eq!(current.grouping_id, Some(5));
        assert_eq!(current.release.release_mapping_history_id, 2);
        assert_eq!(
            current.release.time_mapped,
            Some(Utc.with_ymd_and_hms(2019, 2, 1, 0, 0, 0).unwrap())
        );
    }

    #[tokio::test]
    async fn test_unmapped_transcripts_exclude_mapped_ones() {
        let store = InMemoryStore::new(fixture());
        let release = store.snapshot().await.release_mapping_histories[1].clone();
        let unmapped = store.unmapped_transcripts(&release, 5).await.unwrap();
        let ids: Vec<&str> = unmapped.iter().map(|t| t.transcript.enst_id.as_str()).collect();
        assert_eq!(ids, vec!["ENST11"]);
    }

    #[tokio::test]
    async fn test_change_status_without_view_row_writes_nothing() {
        let store = InMemoryStore::new(fixture());
        let result = store.change_status(1, 2, "curator").await;
        assert!(matches!(result, Err(DbError::NotFound(_))));

        let data = store.snapshot().await;
        assert!(data.status_history.is_empty());
        assert_eq!(data.mappings[0].status, Some(1));
    }

    #[test]
    fn test_bad_fixture_is_reported() {
        assert!(matches!(
            InMemoryStore::from_json("{\"mappings\": 3}"),
            Err(DbError::Fixture(_))
        ));
    }
}
