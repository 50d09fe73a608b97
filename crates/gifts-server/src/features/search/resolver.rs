//! Search-term resolution
//!
//! Turns a classified [`SearchTerm`] into the base candidate set for one of
//! the two searchable collections.

use super::classifier::SearchTerm;
use super::predicate::{Field, Predicate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchTarget {
    /// Canonical mappings joined with transcript, gene and UniProt entry
    Mappings,
    /// The denormalized `mapping_view` search rows
    MappingViews,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Exactly one mapping; absent ids are `NotFound`
    Single(Option<i64>),
    Matching(Predicate),
}

pub fn resolve(term: &SearchTerm, target: SearchTarget) -> Resolution {
    let predicate = match term {
        SearchTerm::All => Predicate::All,
        SearchTerm::MappingId(_) => match (target, term.mapping_id()) {
            (SearchTarget::Mappings, id) => return Resolution::Single(id),
            (SearchTarget::MappingViews, Some(id)) => Predicate::equals(Field::MappingId, id),
            // Digits too large for an id cannot match a row
            (SearchTarget::MappingViews, None) => Predicate::Or(vec![]),
        },
        SearchTerm::EnsemblGeneAccession(acc) => {
            Predicate::EqualsIgnoreCase(Field::GeneAccession, acc.clone())
        },
        SearchTerm::EnsemblTranscriptAccession(acc) => {
            Predicate::EqualsIgnoreCase(Field::TranscriptAccession, acc.clone())
        },
        SearchTerm::UniprotAccession(acc) => {
            Predicate::StartsWithIgnoreCase(Field::ProteinAccession, acc.clone())
        },
        SearchTerm::FreeText(text) => {
            let mut fields = vec![Field::GeneSymbol, Field::GeneName];
            if target == SearchTarget::MappingViews {
                fields.insert(0, Field::UniprotGeneSymbol);
            }
            Predicate::Or(
                fields
                    .into_iter()
                    .map(|f| Predicate::StartsWithIgnoreCase(f, text.clone()))
                    .collect(),
            )
        },
    };

    Resolution::Matching(predicate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::search::classifier::classify;

    #[test]
    fn test_mapping_id_is_single_for_mappings() {
        let term = classify(Some("17"));
        assert_eq!(resolve(&term, SearchTarget::Mappings), Resolution::Single(Some(17)));
        assert_eq!(
            resolve(&term, SearchTarget::MappingViews),
            Resolution::Matching(Predicate::equals(Field::MappingId, 17))
        );
    }

    #[test]
    fn test_accessions() {
        assert_eq!(
            resolve(&classify(Some("ENSG00000141510")), SearchTarget::Mappings),
            Resolution::Matching(Predicate::EqualsIgnoreCase(
                Field::GeneAccession,
                "ENSG00000141510".into()
            ))
        );
        assert_eq!(
            resolve(&classify(Some("P04637-2")), SearchTarget::MappingViews),
            Resolution::Matching(Predicate::StartsWithIgnoreCase(
                Field::ProteinAccession,
                "P04637-2".into()
            ))
        );
    }

    #[test]
    fn test_free_text_fields_per_target() {
        let term = classify(Some("TP53"));
        let Resolution::Matching(Predicate::Or(mapping_parts)) =
            resolve(&term, SearchTarget::Mappings)
        else {
            panic!("expected a disjunction");
        };
        assert_eq!(mapping_parts.len(), 2);

        let Resolution::Matching(Predicate::Or(view_parts)) =
            resolve(&term, SearchTarget::MappingViews)
        else {
            panic!("expected a disjunction");
        };
        assert_eq!(view_parts.len(), 3);
        assert!(view_parts.contains(&Predicate::StartsWithIgnoreCase(
            Field::UniprotGeneSymbol,
            "TP53".into()
        )));
    }

    #[test]
    fn test_no_term_matches_everything() {
        assert_eq!(
            resolve(&SearchTerm::All, SearchTarget::Mappings),
            Resolution::Matching(Predicate::All)
        );
    }
}
