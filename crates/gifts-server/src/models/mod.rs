//! Row types for the GIFTS mapping schema
//!
//! Each struct mirrors one relation (or a fixed projection of one). They
//! derive `sqlx::FromRow` for the Postgres store and `Deserialize` so the
//! same shapes can be loaded from a JSON fixture. Integer columns are read
//! as `i64`; the Postgres queries cast to `BIGINT` where the schema uses a
//! narrower type.
//!
//! Response payloads are built from these in the feature modules and never
//! serialize rows directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Gene {
    pub gene_id: i64,
    pub ensg_id: String,
    #[serde(default)]
    pub gene_name: Option<String>,
    #[serde(default)]
    pub gene_symbol: Option<String>,
    #[serde(default)]
    pub chromosome: Option<String>,
    #[serde(default)]
    pub region_accession: Option<String>,
    #[serde(default)]
    pub seq_region_start: Option<i64>,
    #[serde(default)]
    pub seq_region_end: Option<i64>,
    #[serde(default)]
    pub seq_region_strand: Option<i64>,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Transcript {
    pub transcript_id: i64,
    pub gene_id: i64,
    pub enst_id: String,
    #[serde(default)]
    pub enst_version: Option<i64>,
    #[serde(default)]
    pub ensp_id: Option<String>,
    #[serde(default)]
    pub ensp_len: Option<i64>,
    /// UniParc accession of the translation
    #[serde(default)]
    pub uniparc_accession: Option<String>,
    #[serde(default)]
    pub biotype: Option<String>,
    #[serde(default)]
    pub deleted: Option<bool>,
    #[serde(default)]
    pub seq_region_start: Option<i64>,
    #[serde(default)]
    pub seq_region_end: Option<i64>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub select: Option<bool>,
}

/// One load of an Ensembl release for a species/assembly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SpeciesHistory {
    pub ensembl_species_history_id: i64,
    #[serde(default)]
    pub species: Option<String>,
    #[serde(default)]
    pub assembly_accession: Option<String>,
    #[serde(default)]
    pub ensembl_tax_id: Option<i64>,
    #[serde(default)]
    pub ensembl_release: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub time_loaded: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TranscriptHistory {
    pub ensembl_species_history_id: i64,
    pub transcript_id: i64,
    #[serde(default)]
    pub grouping_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UniprotEntry {
    pub uniprot_id: i64,
    pub uniprot_acc: String,
    #[serde(default)]
    pub uniprot_tax_id: Option<i64>,
    /// Id into the entry-type vocabulary
    #[serde(default)]
    pub entry_type: Option<i64>,
    #[serde(default)]
    pub entry_version: Option<i64>,
    #[serde(default)]
    pub sequence_version: Option<i64>,
    #[serde(default)]
    pub upi: Option<String>,
    #[serde(default)]
    pub md5: Option<String>,
    /// Set on isoforms; `None` means the entry is canonical
    #[serde(default)]
    pub canonical_uniprot_id: Option<i64>,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub ensembl_derived: Option<bool>,
    #[serde(default)]
    pub gene_symbol: Option<String>,
    #[serde(default)]
    pub chromosome_line: Option<String>,
    #[serde(default)]
    pub length: Option<i64>,
    #[serde(default)]
    pub protein_existence_id: Option<i64>,
}

impl UniprotEntry {
    pub fn is_canonical(&self) -> bool {
        self.canonical_uniprot_id.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UniprotEntryHistory {
    pub uniprot_id: i64,
    pub release_version: String,
    #[serde(default)]
    pub grouping_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Mapping {
    pub mapping_id: i64,
    pub transcript_id: i64,
    pub uniprot_id: i64,
    /// Id into the status vocabulary, mirrors the latest status history row
    #[serde(default)]
    pub status: Option<i64>,
    /// `None` when the pair has not been aligned
    #[serde(default)]
    pub alignment_difference: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MappingHistory {
    pub mapping_history_id: i64,
    pub mapping_id: i64,
    pub release_mapping_history_id: i64,
    #[serde(default)]
    pub grouping_id: Option<i64>,
}

/// One mapping run pairing an Ensembl species load with a UniProt release
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReleaseMappingHistory {
    pub release_mapping_history_id: i64,
    pub ensembl_species_history_id: i64,
    #[serde(default)]
    pub uniprot_release: Option<String>,
    #[serde(default)]
    pub uniprot_taxid: Option<i64>,
    #[serde(default)]
    pub time_mapped: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Denormalized search row, one per mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MappingView {
    pub id: i64,
    pub mapping_id: i64,
    #[serde(default)]
    pub grouping_id: Option<i64>,
    #[serde(default)]
    pub ensg_id: Option<String>,
    #[serde(default)]
    pub enst_id: Option<String>,
    #[serde(default)]
    pub uniprot_acc: Option<String>,
    #[serde(default)]
    pub gene_symbol_up: Option<String>,
    #[serde(default)]
    pub gene_symbol_eg: Option<String>,
    #[serde(default)]
    pub gene_name: Option<String>,
    #[serde(default)]
    pub uniprot_tax_id: Option<i64>,
    #[serde(default)]
    pub chromosome: Option<String>,
    #[serde(default)]
    pub region_accession: Option<String>,
    #[serde(default)]
    pub alignment_difference: Option<i64>,
    #[serde(default)]
    pub status: Option<i64>,
    #[serde(default)]
    pub uniprot_mapping_status: Option<String>,
}

/// Row of the status or entry-type vocabulary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct VocabularyEntry {
    pub id: i64,
    pub description: String,
}

/// Append-only status history row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct StatusChange {
    pub id: i64,
    pub time_stamp: DateTime<Utc>,
    #[serde(default)]
    pub user_stamp: Option<String>,
    pub status: i64,
    pub mapping_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub time_stamp: DateTime<Utc>,
    pub user_stamp: String,
    pub comment: String,
    pub mapping_id: i64,
    #[serde(default)]
    pub deleted: bool,
}

// ============================================================================
// Hydrated records
// ============================================================================

/// The current release context of a mapping
///
/// Taken from the mapping history row whose release has the latest
/// `time_mapped`.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentRelease {
    pub grouping_id: Option<i64>,
    pub release: ReleaseMappingHistory,
    pub species: Option<SpeciesHistory>,
}

/// A mapping joined with both sides of the link
#[derive(Debug, Clone, PartialEq)]
pub struct MappingRecord {
    pub mapping: Mapping,
    pub transcript: Transcript,
    pub gene: Gene,
    pub uniprot: UniprotEntry,
    pub current: Option<CurrentRelease>,
    /// Ensembl taxonomy ids of every species load the transcript appears in
    pub ensembl_tax_ids: Vec<i64>,
}

impl MappingRecord {
    pub fn mapping_id(&self) -> i64 {
        self.mapping.mapping_id
    }

    pub fn grouping_id(&self) -> Option<i64> {
        self.current.as_ref().and_then(|c| c.grouping_id)
    }
}

/// A transcript with its gene, as listed among unmapped entries
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptWithGene {
    pub transcript: Transcript,
    pub gene: Gene,
}
