//! Facet filter parsing and compilation
//!
//! A facet string narrows a search:
//!
//! ```text
//! facets  := token ( (';' | ',') token )*
//! token   := key ':' value    starts a key (repeated keys merge)
//!          | value            another value for the most recent key
//! ```
//!
//! So `organism:9606,status:reviewed,unreviewed` and
//! `organism:9606;status:reviewed;status:unreviewed` are the same filter.
//! Values of one key are OR'd, distinct keys are AND'd.
//!
//! | key | values | keeps |
//! |---|---|---|
//! | `organism` | taxonomy ids | records of those taxa |
//! | `sequence`, `alignment` | `identical`, `small`, `large` | difference `0`, `1..=5`, `>5` |
//! | `status` | status labels | records carrying one of those statuses |
//! | `chromosomes` | chromosome names | genes on those chromosomes |
//! | `type` | mapping-status codes | view rows with that classification |
//! | `patches` | `exclude`, `only` | view rows off / on `CHR*` regions |
//!
//! Unknown keys are ignored. Malformed tokens and unknown statuses are
//! errors.

use super::predicate::{Field, Predicate, Value};
use super::resolver::SearchTarget;
use crate::vocabulary::{Vocabulary, VocabularyError};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FacetError {
    #[error("Malformed facet token '{0}', expected key:value")]
    Malformed(String),
    #[error("Facet value '{0}' appears before any facet key")]
    ValueWithoutKey(String),
    #[error("Invalid organism taxonomy id '{0}'")]
    InvalidOrganism(String),
    #[error("Unknown status '{0}'")]
    UnknownStatus(String),
    #[error("Status '{0}' is ambiguous")]
    AmbiguousStatus(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FacetKey {
    Organism,
    Alignment,
    Status,
    Chromosomes,
    Type,
    Patches,
    Unknown(String),
}

impl FacetKey {
    fn parse(key: &str) -> Self {
        match key.to_ascii_lowercase().as_str() {
            "organism" => FacetKey::Organism,
            "sequence" | "alignment" => FacetKey::Alignment,
            "status" => FacetKey::Status,
            "chromosomes" => FacetKey::Chromosomes,
            "type" => FacetKey::Type,
            "patches" => FacetKey::Patches,
            _ => FacetKey::Unknown(key.to_string()),
        }
    }
}

/// Parsed facets, keys in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacetSet {
    entries: Vec<(FacetKey, Vec<String>)>,
}

impl FacetSet {
    pub fn parse(input: &str) -> Result<Self, FacetError> {
        let mut set = FacetSet::default();
        if input.trim().is_empty() {
            return Ok(set);
        }

        let mut current: Option<usize> = None;
        for raw in input.split([';', ',']) {
            let token = raw.trim();
            if token.is_empty() {
                return Err(FacetError::Malformed(raw.to_string()));
            }

            let mut parts = token.split(':');
            match (parts.next(), parts.next(), parts.next()) {
                (Some(key), Some(value), None) => {
                    let (key, value) = (key.trim(), value.trim());
                    if key.is_empty() || value.is_empty() {
                        return Err(FacetError::Malformed(token.to_string()));
                    }
                    let index = set.slot(FacetKey::parse(key));
                    set.entries[index].1.push(value.to_string());
                    current = Some(index);
                },
                (Some(value), None, None) => match current {
                    Some(index) => set.entries[index].1.push(value.to_string()),
                    None => return Err(FacetError::ValueWithoutKey(value.to_string())),
                },
                _ => return Err(FacetError::Malformed(token.to_string())),
            }
        }

        Ok(set)
    }

    fn slot(&mut self, key: FacetKey) -> usize {
        match self.entries.iter().position(|(k, _)| *k == key) {
            Some(index) => index,
            None => {
                self.entries.push((key, Vec::new()));
                self.entries.len() - 1
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn values(&self, key: &FacetKey) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_slice())
    }

    /// Build the conjunction of every recognised facet
    pub fn compile(
        &self,
        target: SearchTarget,
        vocabulary: &Vocabulary,
    ) -> Result<Predicate, FacetError> {
        let mut parts = Vec::with_capacity(self.entries.len());

        for (key, values) in &self.entries {
            let part = match key {
                FacetKey::Organism => Some(organism(values)?),
                FacetKey::Alignment => alignment(values),
                FacetKey::Status => Some(status(values, vocabulary)?),
                FacetKey::Chromosomes => Some(Predicate::AnyOf(
                    Field::Chromosome,
                    values.iter().cloned().map(Value::Text).collect(),
                )),
                FacetKey::Type if target == SearchTarget::MappingViews => Some(Predicate::AnyOf(
                    Field::MappingType,
                    values.iter().cloned().map(Value::Text).collect(),
                )),
                FacetKey::Patches if target == SearchTarget::MappingViews => patches(values),
                FacetKey::Type | FacetKey::Patches => {
                    tracing::debug!(?key, "Facet only applies to mapping views, ignored");
                    None
                },
                FacetKey::Unknown(name) => {
                    tracing::debug!(facet = %name, "Unknown facet ignored");
                    None
                },
            };
            parts.extend(part);
        }

        Ok(Predicate::all_of(parts))
    }
}

fn organism(values: &[String]) -> Result<Predicate, FacetError> {
    let ids = values
        .iter()
        .map(|v| {
            v.parse::<i64>()
                .map(Value::Int)
                .map_err(|_| FacetError::InvalidOrganism(v.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Predicate::AnyOf(Field::TaxId, ids))
}

fn alignment(values: &[String]) -> Option<Predicate> {
    let bands: Vec<Predicate> = values
        .iter()
        .filter_map(|v| match v.to_ascii_lowercase().as_str() {
            "identical" => Some(Predicate::equals(Field::AlignmentDifference, 0)),
            "small" => Some(Predicate::Range {
                field: Field::AlignmentDifference,
                above: Some(0),
                up_to: Some(5),
            }),
            "large" => Some(Predicate::Range {
                field: Field::AlignmentDifference,
                above: Some(5),
                up_to: None,
            }),
            other => {
                tracing::debug!(value = other, "Unknown alignment facet value ignored");
                None
            },
        })
        .collect();

    (!bands.is_empty()).then_some(Predicate::Or(bands))
}

fn status(values: &[String], vocabulary: &Vocabulary) -> Result<Predicate, FacetError> {
    let ids = values
        .iter()
        .map(|label| match vocabulary.status_id(label) {
            Ok(id) => Ok(Value::Int(id)),
            Err(VocabularyError::Unknown(l)) => Err(FacetError::UnknownStatus(l)),
            Err(VocabularyError::Ambiguous(l)) => Err(FacetError::AmbiguousStatus(l)),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Predicate::AnyOf(Field::Status, ids))
}

fn patches(values: &[String]) -> Option<Predicate> {
    let on_chromosome = || Predicate::StartsWithIgnoreCase(Field::RegionAccession, "CHR".into());
    let rules: Vec<Predicate> = values
        .iter()
        .filter_map(|v| match v.to_ascii_lowercase().as_str() {
            "exclude" => Some(Predicate::not(on_chromosome())),
            "only" => Some(on_chromosome()),
            other => {
                tracing::debug!(value = other, "Unknown patches facet value ignored");
                None
            },
        })
        .collect();

    (!rules.is_empty()).then_some(Predicate::Or(rules))
}
