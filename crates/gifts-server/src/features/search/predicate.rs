//! Filter predicates over mapping records
//!
//! The resolver and the facet compiler both produce a [`Predicate`]. The
//! in-memory store evaluates it with [`Predicate::matches`]; the Postgres
//! store renders it to SQL (see `store::sql`).
//!
//! Fields are logical. A record may expose several values for one field
//! (a transcript loaded in more than one species snapshot has several
//! taxonomy ids) and a leaf matches when any of them does. A missing value
//! matches nothing.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    MappingId,
    GeneAccession,
    TranscriptAccession,
    ProteinAccession,
    GeneSymbol,
    UniprotGeneSymbol,
    GeneName,
    TaxId,
    AlignmentDifference,
    Status,
    Chromosome,
    /// Stored mapping-status classification of a view row
    MappingType,
    RegionAccession,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Text(String),
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Matches every record
    All,
    Equals(Field, Value),
    EqualsIgnoreCase(Field, String),
    /// Literal, case-insensitive prefix
    StartsWithIgnoreCase(Field, String),
    /// Membership; an empty set matches nothing
    AnyOf(Field, Vec<Value>),
    /// Integer range `(above, up_to]`; an open bound is unbounded
    Range {
        field: Field,
        above: Option<i64>,
        up_to: Option<i64>,
    },
    Not(Box<Predicate>),
    /// Conjunction; empty is true
    And(Vec<Predicate>),
    /// Disjunction; empty is false
    Or(Vec<Predicate>),
}

/// Something a predicate can be evaluated against
pub trait FieldSource {
    fn field_values(&self, field: Field) -> Vec<Value>;
}

impl Predicate {
    pub fn equals(field: Field, value: impl Into<Value>) -> Self {
        Predicate::Equals(field, value.into())
    }

    pub fn not(inner: Predicate) -> Self {
        Predicate::Not(Box::new(inner))
    }

    /// Conjunction that drops `All` operands
    pub fn all_of(parts: Vec<Predicate>) -> Self {
        let mut parts: Vec<Predicate> =
            parts.into_iter().filter(|p| *p != Predicate::All).collect();
        match parts.len() {
            0 => Predicate::All,
            1 => parts.remove(0),
            _ => Predicate::And(parts),
        }
    }

    pub fn and(self, other: Predicate) -> Self {
        Predicate::all_of(vec![self, other])
    }

    pub fn matches<S: FieldSource + ?Sized>(&self, source: &S) -> bool {
        match self {
            Predicate::All => true,
            Predicate::Equals(field, expected) => {
                source.field_values(*field).iter().any(|v| v == expected)
            },
            Predicate::EqualsIgnoreCase(field, expected) => {
                let expected = expected.to_lowercase();
                texts(source, *field).any(|v| v.to_lowercase() == expected)
            },
            Predicate::StartsWithIgnoreCase(field, prefix) => {
                let prefix = prefix.to_lowercase();
                texts(source, *field).any(|v| v.to_lowercase().starts_with(&prefix))
            },
            Predicate::AnyOf(field, set) => {
                source.field_values(*field).iter().any(|v| set.contains(v))
            },
            Predicate::Range { field, above, up_to } => {
                source.field_values(*field).iter().any(|v| match v {
                    Value::Int(n) => {
                        above.is_none_or(|lo| *n > lo) && up_to.is_none_or(|hi| *n <= hi)
                    },
                    Value::Text(_) => false,
                })
            },
            Predicate::Not(inner) => !inner.matches(source),
            Predicate::And(parts) => parts.iter().all(|p| p.matches(source)),
            Predicate::Or(parts) => parts.iter().any(|p| p.matches(source)),
        }
    }
}

fn texts<S: FieldSource + ?Sized>(source: &S, field: Field) -> impl Iterator<Item = String> {
    source.field_values(field).into_iter().filter_map(|v| match v {
        Value::Text(s) => Some(s),
        Value::Int(_) => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct Row(HashMap<Field, Vec<Value>>);

    impl Row {
        fn with(mut self, field: Field, value: impl Into<Value>) -> Self {
            self.0.entry(field).or_default().push(value.into());
            self
        }
    }

    impl FieldSource for Row {
        fn field_values(&self, field: Field) -> Vec<Value> {
            self.0.get(&field).cloned().unwrap_or_default()
        }
    }

    #[test]
    fn test_prefix_is_case_insensitive() {
        let row = Row::default().with(Field::ProteinAccession, "P04637-2");
        assert!(Predicate::StartsWithIgnoreCase(Field::ProteinAccession, "p04637".into())
            .matches(&row));
        assert!(!Predicate::StartsWithIgnoreCase(Field::ProteinAccession, "P04637-3".into())
            .matches(&row));
    }

    #[test]
    fn test_missing_value_matches_nothing_but_negation_keeps_it() {
        let row = Row::default();
        let chr = Predicate::StartsWithIgnoreCase(Field::RegionAccession, "CHR".into());
        assert!(!chr.matches(&row));
        assert!(Predicate::not(chr).matches(&row));
    }

    #[test]
    fn test_range_bounds() {
        let small = Predicate::Range {
            field: Field::AlignmentDifference,
            above: Some(0),
            up_to: Some(5),
        };
        for (diff, expected) in [(0, false), (1, true), (5, true), (6, false)] {
            let row = Row::default().with(Field::AlignmentDifference, diff);
            assert_eq!(small.matches(&row), expected, "diff {diff}");
        }
    }

    #[test]
    fn test_any_value_of_multi_valued_field() {
        let row = Row::default().with(Field::TaxId, 10090).with(Field::TaxId, 9606);
        assert!(Predicate::AnyOf(Field::TaxId, vec![Value::Int(9606)]).matches(&row));
        assert!(!Predicate::AnyOf(Field::TaxId, vec![]).matches(&row));
    }

    #[test]
    fn test_empty_combinators() {
        let row = Row::default();
        assert!(Predicate::And(vec![]).matches(&row));
        assert!(!Predicate::Or(vec![]).matches(&row));
    }

    #[test]
    fn test_all_of_flattens_trivial_parts() {
        let eq = Predicate::equals(Field::MappingId, 3);
        assert_eq!(Predicate::all_of(vec![Predicate::All, eq.clone()]), eq);
        assert_eq!(Predicate::All.and(Predicate::All), Predicate::All);
    }
}
