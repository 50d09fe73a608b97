//! Global pairwise alignment of two protein sequences
//!
//! BLOSUM62 with gap open -10 and gap extend -1. Residues outside the
//! BLOSUM alphabet are replaced by `X` before scoring.

use bio::alignment::pairwise::Aligner;
use bio::alignment::AlignmentOperation;
use bio::scores::blosum62;
use serde::Serialize;

const GAP_OPEN: i32 = -10;
const GAP_EXTEND: i32 = -1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairwiseAlignment {
    /// Ensembl translation with `-` for gaps
    pub ensembl: String,
    /// UniProt sequence with `-` for gaps
    pub uniprot: String,
    /// `|` identity, `.` substitution, space for a gap
    pub match_line: String,
    pub score: i32,
    /// Number of aligned columns that are not identities
    pub differences: usize,
}

fn sanitize(seq: &str) -> Vec<u8> {
    seq.bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .map(|b| match b.to_ascii_uppercase() {
            c @ (b'A'..=b'Z' | b'*') => c,
            _ => b'X',
        })
        .collect()
}

pub fn align_proteins(ensembl: &str, uniprot: &str) -> PairwiseAlignment {
    let x = sanitize(ensembl);
    let y = sanitize(uniprot);

    let mut aligner = Aligner::with_capacity(x.len(), y.len(), GAP_OPEN, GAP_EXTEND, &blosum62);
    let alignment = aligner.global(&x, &y);

    let mut top = Vec::with_capacity(alignment.operations.len());
    let mut bottom = Vec::with_capacity(alignment.operations.len());
    let mut middle = Vec::with_capacity(alignment.operations.len());
    let (mut i, mut j) = (alignment.xstart, alignment.ystart);
    let mut differences = 0;

    for op in &alignment.operations {
        match op {
            AlignmentOperation::Match => {
                top.push(x[i]);
                bottom.push(y[j]);
                middle.push(b'|');
                i += 1;
                j += 1;
            },
            AlignmentOperation::Subst => {
                top.push(x[i]);
                bottom.push(y[j]);
                middle.push(b'.');
                differences += 1;
                i += 1;
                j += 1;
            },
            AlignmentOperation::Ins => {
                top.push(x[i]);
                bottom.push(b'-');
                middle.push(b' ');
                differences += 1;
                i += 1;
            },
            AlignmentOperation::Del => {
                top.push(b'-');
                bottom.push(y[j]);
                middle.push(b' ');
                differences += 1;
                j += 1;
            },
            // Global alignments never clip
            AlignmentOperation::Xclip(_) | AlignmentOperation::Yclip(_) => {},
        }
    }

    PairwiseAlignment {
        ensembl: String::from_utf8_lossy(&top).into_owned(),
        uniprot: String::from_utf8_lossy(&bottom).into_owned(),
        match_line: String::from_utf8_lossy(&middle).into_owned(),
        score: alignment.score,
        differences,
    }
}
