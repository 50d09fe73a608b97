//! Search-term classification
//!
//! Decides what kind of identifier a curator typed. Rules are tried in a
//! fixed order and the first match wins:
//!
//! 1. only decimal digits: a mapping id
//! 2. `ENS` + optional letters + `G` + digits: an Ensembl gene accession
//! 3. `ENS` + optional letters + `T` + digits: an Ensembl transcript accession
//! 4. the UniProt accession grammar, optionally with `-<digits>` isoform suffixes
//! 5. anything else: free text (gene symbol or name)
//!
//! A blank or absent term matches everything.

use regex::Regex;
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static ENSEMBL_GENE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^ENS[A-Z]*G[0-9]+$").expect("gene pattern is valid")
});

#[allow(clippy::expect_used)]
static ENSEMBL_TRANSCRIPT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^ENS[A-Z]*T[0-9]+$").expect("transcript pattern is valid")
});

#[allow(clippy::expect_used)]
static UNIPROT_ACCESSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^([OPQ][0-9][A-Z0-9]{3}[0-9]|[A-NR-Z]([0-9][A-Z][A-Z0-9]{2}){1,2}[0-9])(-[0-9]+)*$",
    )
    .expect("accession pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchTerm {
    All,
    /// Digits as typed; may not fit an `i64`
    MappingId(String),
    EnsemblGeneAccession(String),
    EnsemblTranscriptAccession(String),
    UniprotAccession(String),
    FreeText(String),
}

impl SearchTerm {
    /// Numeric mapping id, `None` when the digits overflow
    pub fn mapping_id(&self) -> Option<i64> {
        match self {
            SearchTerm::MappingId(digits) => digits.parse().ok(),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SearchTerm::All => "all",
            SearchTerm::MappingId(_) => "mapping_id",
            SearchTerm::EnsemblGeneAccession(_) => "ensembl_gene",
            SearchTerm::EnsemblTranscriptAccession(_) => "ensembl_transcript",
            SearchTerm::UniprotAccession(_) => "uniprot_accession",
            SearchTerm::FreeText(_) => "free_text",
        }
    }
}

pub fn classify(term: Option<&str>) -> SearchTerm {
    let term = match term.map(str::trim) {
        None | Some("") => return SearchTerm::All,
        Some(t) => t,
    };

    if term.bytes().all(|b| b.is_ascii_digit()) {
        SearchTerm::MappingId(term.to_string())
    } else if ENSEMBL_GENE.is_match(term) {
        SearchTerm::EnsemblGeneAccession(term.to_string())
    } else if ENSEMBL_TRANSCRIPT.is_match(term) {
        SearchTerm::EnsemblTranscriptAccession(term.to_string())
    } else if UNIPROT_ACCESSION.is_match(term) {
        SearchTerm::UniprotAccession(term.to_string())
    } else {
        SearchTerm::FreeText(term.to_string())
    }
}
