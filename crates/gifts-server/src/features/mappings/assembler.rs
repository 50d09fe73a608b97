//! Response shapes built from store records
//!
//! Mapped entries share one flattened [`MappingBlock`]. Unmapped entries
//! have no mapping to curate, so their projections carry no status,
//! alignment or release fields.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::grouping::Related;
use crate::models::{MappingRecord, MappingView, SpeciesHistory, TranscriptWithGene, UniprotEntry};
use crate::vocabulary::Vocabulary;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomyBlock {
    pub species: Option<String>,
    pub ensembl_tax_id: Option<i64>,
    pub uniprot_tax_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UniprotEntryBlock {
    pub uniprot_accession: String,
    pub entry_type: Option<String>,
    pub entry_version: Option<i64>,
    pub sequence_version: Option<i64>,
    pub upi: Option<String>,
    pub md5: Option<String>,
    pub ensembl_derived: Option<bool>,
    pub isoform: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnsemblTranscriptBlock {
    pub enst_id: String,
    pub enst_version: Option<i64>,
    pub upi: Option<String>,
    pub biotype: Option<String>,
    pub deleted: Option<bool>,
    pub seq_region_start: Option<i64>,
    pub seq_region_end: Option<i64>,
    pub ensg_id: String,
    /// Only present when the caller asked for the sequence
    pub sequence: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingBlock {
    pub mapping_id: i64,
    pub grouping_id: Option<i64>,
    pub time_mapped: Option<DateTime<Utc>>,
    pub uniprot_release: Option<String>,
    pub ensembl_release: Option<i64>,
    pub alignment_difference: Option<i64>,
    pub uniprot_entry: UniprotEntryBlock,
    pub ensembl_transcript: EnsemblTranscriptBlock,
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingViewBlock {
    pub mapping_view_id: i64,
    pub mapping_id: i64,
    pub grouping_id: Option<i64>,
    pub ensg_id: Option<String>,
    pub enst_id: Option<String>,
    pub uniprot_accession: Option<String>,
    pub gene_symbol_up: Option<String>,
    pub gene_symbol_eg: Option<String>,
    pub gene_name: Option<String>,
    pub uniprot_tax_id: Option<i64>,
    pub chromosome: Option<String>,
    pub region_accession: Option<String>,
    pub alignment_difference: Option<i64>,
    pub status: Option<String>,
    pub uniprot_mapping_status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnmappedUniprotBlock {
    pub uniprot_id: i64,
    pub uniprot_accession: String,
    pub entry_type: Option<String>,
    pub sequence_version: Option<i64>,
    pub upi: Option<String>,
    pub md5: Option<String>,
    pub is_canonical: bool,
    pub alias: Option<String>,
    pub ensembl_derived: Option<bool>,
    pub gene_symbol: Option<String>,
    pub chromosome_line: Option<String>,
    pub length: Option<i64>,
    pub protein_existence_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnmappedTranscriptBlock {
    pub transcript_id: i64,
    pub enst_id: String,
    pub enst_version: Option<i64>,
    pub upi: Option<String>,
    pub biotype: Option<String>,
    pub deleted: Option<bool>,
    pub chromosome: Option<String>,
    pub region_accession: Option<String>,
    pub seq_region_start: Option<i64>,
    pub seq_region_end: Option<i64>,
    pub seq_region_strand: Option<i64>,
    pub ensg_id: String,
    pub ensg_name: Option<String>,
    pub ensg_symbol: Option<String>,
    pub ensp_id: Option<String>,
    pub ensp_len: Option<i64>,
    pub source: Option<String>,
    pub select: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnmappedBlock {
    pub ensembl: Vec<UnmappedTranscriptBlock>,
    pub uniprot: Vec<UnmappedUniprotBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelatedBlock {
    pub mapped: Vec<MappingBlock>,
    pub unmapped: UnmappedBlock,
}

/// Species and both taxonomy ids, `None` without a species snapshot
pub fn taxonomy(record: &MappingRecord, species: Option<&SpeciesHistory>) -> Option<TaxonomyBlock> {
    species.map(|s| TaxonomyBlock {
        species: s.species.clone(),
        ensembl_tax_id: s.ensembl_tax_id,
        uniprot_tax_id: record.uniprot.uniprot_tax_id,
    })
}

pub fn mapping(
    record: &MappingRecord,
    vocabulary: &Vocabulary,
    sequence: Option<String>,
) -> MappingBlock {
    let release = record.current.as_ref().map(|c| &c.release);
    let uniprot = &record.uniprot;
    let transcript = &record.transcript;

    MappingBlock {
        mapping_id: record.mapping_id(),
        grouping_id: record.grouping_id(),
        time_mapped: release.and_then(|r| r.time_mapped),
        uniprot_release: release.and_then(|r| r.uniprot_release.clone()),
        ensembl_release: record
            .current
            .as_ref()
            .and_then(|c| c.species.as_ref())
            .and_then(|s| s.ensembl_release),
        alignment_difference: record.mapping.alignment_difference,
        uniprot_entry: UniprotEntryBlock {
            uniprot_accession: uniprot.uniprot_acc.clone(),
            entry_type: entry_type(uniprot, vocabulary),
            entry_version: uniprot.entry_version,
            sequence_version: uniprot.sequence_version,
            upi: uniprot.upi.clone(),
            md5: uniprot.md5.clone(),
            ensembl_derived: uniprot.ensembl_derived,
            isoform: !uniprot.is_canonical(),
        },
        ensembl_transcript: EnsemblTranscriptBlock {
            enst_id: transcript.enst_id.clone(),
            enst_version: transcript.enst_version,
            upi: transcript.uniparc_accession.clone(),
            biotype: transcript.biotype.clone(),
            deleted: transcript.deleted,
            seq_region_start: transcript.seq_region_start,
            seq_region_end: transcript.seq_region_end,
            ensg_id: record.gene.ensg_id.clone(),
            sequence,
        },
        status: status(record.mapping.status, vocabulary),
    }
}

pub fn view(row: &MappingView, vocabulary: &Vocabulary) -> MappingViewBlock {
    MappingViewBlock {
        mapping_view_id: row.id,
        mapping_id: row.mapping_id,
        grouping_id: row.grouping_id,
        ensg_id: row.ensg_id.clone(),
        enst_id: row.enst_id.clone(),
        uniprot_accession: row.uniprot_acc.clone(),
        gene_symbol_up: row.gene_symbol_up.clone(),
        gene_symbol_eg: row.gene_symbol_eg.clone(),
        gene_name: row.gene_name.clone(),
        uniprot_tax_id: row.uniprot_tax_id,
        chromosome: row.chromosome.clone(),
        region_accession: row.region_accession.clone(),
        alignment_difference: row.alignment_difference,
        status: status(row.status, vocabulary),
        uniprot_mapping_status: row.uniprot_mapping_status.clone(),
    }
}

pub fn unmapped_uniprot(entry: &UniprotEntry, vocabulary: &Vocabulary) -> UnmappedUniprotBlock {
    UnmappedUniprotBlock {
        uniprot_id: entry.uniprot_id,
        uniprot_accession: entry.uniprot_acc.clone(),
        entry_type: entry_type(entry, vocabulary),
        sequence_version: entry.sequence_version,
        upi: entry.upi.clone(),
        md5: entry.md5.clone(),
        is_canonical: entry.is_canonical(),
        alias: entry.alias.clone(),
        ensembl_derived: entry.ensembl_derived,
        gene_symbol: entry.gene_symbol.clone(),
        chromosome_line: entry.chromosome_line.clone(),
        length: entry.length,
        protein_existence_id: entry.protein_existence_id,
    }
}

pub fn unmapped_transcript(entry: &TranscriptWithGene) -> UnmappedTranscriptBlock {
    let TranscriptWithGene { transcript, gene } = entry;
    UnmappedTranscriptBlock {
        transcript_id: transcript.transcript_id,
        enst_id: transcript.enst_id.clone(),
        enst_version: transcript.enst_version,
        upi: transcript.uniparc_accession.clone(),
        biotype: transcript.biotype.clone(),
        deleted: transcript.deleted,
        chromosome: gene.chromosome.clone(),
        region_accession: gene.region_accession.clone(),
        seq_region_start: transcript.seq_region_start,
        seq_region_end: transcript.seq_region_end,
        seq_region_strand: gene.seq_region_strand,
        ensg_id: gene.ensg_id.clone(),
        ensg_name: gene.gene_name.clone(),
        ensg_symbol: gene.gene_symbol.clone(),
        ensp_id: transcript.ensp_id.clone(),
        ensp_len: transcript.ensp_len,
        source: transcript.source.clone(),
        select: transcript.select,
    }
}

pub fn related(related: &Related, vocabulary: &Vocabulary) -> RelatedBlock {
    RelatedBlock {
        mapped: related
            .mapped
            .iter()
            .map(|r| mapping(r, vocabulary, None))
            .collect(),
        unmapped: UnmappedBlock {
            ensembl: related.unmapped_transcripts.iter().map(unmapped_transcript).collect(),
            uniprot: related
                .unmapped_uniprot
                .iter()
                .map(|u| unmapped_uniprot(u, vocabulary))
                .collect(),
        },
    }
}

fn status(id: Option<i64>, vocabulary: &Vocabulary) -> Option<String> {
    id.and_then(|id| vocabulary.status_label(id)).map(str::to_string)
}

fn entry_type(entry: &UniprotEntry, vocabulary: &Vocabulary) -> Option<String> {
    entry
        .entry_type
        .and_then(|id| vocabulary.entry_type_label(id))
        .map(str::to_string)
}
