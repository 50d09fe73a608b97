//! Rendering predicates as Postgres `WHERE` clauses
//!
//! Values are always bound, never interpolated. Column references assume
//! the aliases used by the Postgres store:
//!
//! - mappings: `m` mapping, `t` ensembl_transcript, `g` ensembl_gene, `u` uniprot_entry
//! - views: `mv` mapping_view

use sqlx::{Postgres, QueryBuilder};

use crate::features::search::predicate::{Field, Predicate, Value};
use crate::features::search::resolver::SearchTarget;

/// `FROM` clause matching the column aliases for a target
pub fn from_clause(target: SearchTarget) -> &'static str {
    match target {
        SearchTarget::Mappings => {
            " FROM mapping m \
             JOIN ensembl_transcript t ON t.transcript_id = m.transcript_id \
             JOIN ensembl_gene g ON g.gene_id = t.gene_id \
             JOIN uniprot_entry u ON u.uniprot_id = m.uniprot_id "
        },
        SearchTarget::MappingViews => " FROM mapping_view mv ",
    }
}

enum Column {
    Scalar(&'static str),
    /// Ensembl taxonomy id through the transcript's species snapshots
    SpeciesTaxId,
}

fn column(target: SearchTarget, field: Field) -> Option<Column> {
    use Column::Scalar;

    let col = match (target, field) {
        (SearchTarget::Mappings, Field::MappingId) => Scalar("m.mapping_id"),
        (SearchTarget::Mappings, Field::GeneAccession) => Scalar("g.ensg_id"),
        (SearchTarget::Mappings, Field::TranscriptAccession) => Scalar("t.enst_id"),
        (SearchTarget::Mappings, Field::ProteinAccession) => Scalar("u.uniprot_acc"),
        (SearchTarget::Mappings, Field::GeneSymbol) => Scalar("g.gene_symbol"),
        (SearchTarget::Mappings, Field::UniprotGeneSymbol) => Scalar("u.gene_symbol"),
        (SearchTarget::Mappings, Field::GeneName) => Scalar("g.gene_name"),
        (SearchTarget::Mappings, Field::TaxId) => Column::SpeciesTaxId,
        (SearchTarget::Mappings, Field::AlignmentDifference) => Scalar("m.alignment_difference"),
        (SearchTarget::Mappings, Field::Status) => Scalar("m.status"),
        (SearchTarget::Mappings, Field::Chromosome) => Scalar("g.chromosome"),
        (SearchTarget::Mappings, Field::RegionAccession) => Scalar("g.region_accession"),
        (SearchTarget::Mappings, Field::MappingType) => return None,

        (SearchTarget::MappingViews, Field::MappingId) => Scalar("mv.mapping_id"),
        (SearchTarget::MappingViews, Field::GeneAccession) => Scalar("mv.ensg_id"),
        (SearchTarget::MappingViews, Field::TranscriptAccession) => Scalar("mv.enst_id"),
        (SearchTarget::MappingViews, Field::ProteinAccession) => Scalar("mv.uniprot_acc"),
        (SearchTarget::MappingViews, Field::GeneSymbol) => Scalar("mv.gene_symbol_eg"),
        (SearchTarget::MappingViews, Field::UniprotGeneSymbol) => Scalar("mv.gene_symbol_up"),
        (SearchTarget::MappingViews, Field::GeneName) => Scalar("mv.gene_name"),
        (SearchTarget::MappingViews, Field::TaxId) => Scalar("mv.uniprot_tax_id"),
        (SearchTarget::MappingViews, Field::AlignmentDifference) => {
            Scalar("mv.alignment_difference")
        },
        (SearchTarget::MappingViews, Field::Status) => Scalar("mv.status"),
        (SearchTarget::MappingViews, Field::Chromosome) => Scalar("mv.chromosome"),
        (SearchTarget::MappingViews, Field::RegionAccession) => Scalar("mv.region_accession"),
        (SearchTarget::MappingViews, Field::MappingType) => Scalar("mv.uniprot_mapping_status"),
    };
    Some(col)
}

/// Escape LIKE metacharacters so user input matches literally
pub fn like_prefix(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn push_value(qb: &mut QueryBuilder<'_, Postgres>, value: &Value) {
    match value {
        Value::Int(v) => qb.push_bind(*v),
        Value::Text(v) => qb.push_bind(v.clone()),
    };
}

fn push_leaf<'a>(
    qb: &mut QueryBuilder<'a, Postgres>,
    target: SearchTarget,
    field: Field,
    render: impl FnOnce(&mut QueryBuilder<'a, Postgres>, &str),
) {
    match column(target, field) {
        Some(Column::Scalar(col)) => render(qb, col),
        Some(Column::SpeciesTaxId) => {
            qb.push(
                "EXISTS (SELECT 1 FROM transcript_history th \
                 JOIN ensembl_species_history esh \
                 ON esh.ensembl_species_history_id = th.ensembl_species_history_id \
                 WHERE th.transcript_id = m.transcript_id AND ",
            );
            render(qb, "esh.ensembl_tax_id");
            qb.push(")");
        },
        None => {
            qb.push("FALSE");
        },
    }
}

/// Append `predicate` as a boolean SQL expression
pub fn push_predicate(
    qb: &mut QueryBuilder<'_, Postgres>,
    target: SearchTarget,
    predicate: &Predicate,
) {
    match predicate {
        Predicate::All => {
            qb.push("TRUE");
        },
        Predicate::Equals(field, value) => push_leaf(qb, target, *field, |qb, col| {
            qb.push(col).push(" = ");
            push_value(qb, value);
        }),
        Predicate::EqualsIgnoreCase(field, text) => push_leaf(qb, target, *field, |qb, col| {
            qb.push("LOWER(")
                .push(col)
                .push(") = LOWER(")
                .push_bind(text.clone())
                .push(")");
        }),
        Predicate::StartsWithIgnoreCase(field, prefix) => {
            push_leaf(qb, target, *field, |qb, col| {
                qb.push(col).push(" ILIKE ").push_bind(like_prefix(prefix));
            })
        },
        Predicate::AnyOf(_, values) if values.is_empty() => {
            qb.push("FALSE");
        },
        Predicate::AnyOf(field, values) => push_leaf(qb, target, *field, |qb, col| {
            qb.push(col).push(" IN (");
            for (i, value) in values.iter().enumerate() {
                if i > 0 {
                    qb.push(", ");
                }
                push_value(qb, value);
            }
            qb.push(")");
        }),
        Predicate::Range { field, above, up_to } => push_leaf(qb, target, *field, |qb, col| {
            qb.push("(").push(col).push(" IS NOT NULL");
            if let Some(lo) = above {
                qb.push(" AND ").push(col).push(" > ").push_bind(*lo);
            }
            if let Some(hi) = up_to {
                qb.push(" AND ").push(col).push(" <= ").push_bind(*hi);
            }
            qb.push(")");
        }),
        Predicate::Not(inner) => {
            qb.push("NOT COALESCE((");
            push_predicate(qb, target, inner);
            qb.push("), FALSE)");
        },
        Predicate::And(parts) => push_joined(qb, target, parts, " AND ", "TRUE"),
        Predicate::Or(parts) => push_joined(qb, target, parts, " OR ", "FALSE"),
    }
}

fn push_joined(
    qb: &mut QueryBuilder<'_, Postgres>,
    target: SearchTarget,
    parts: &[Predicate],
    separator: &str,
    empty: &str,
) {
    if parts.is_empty() {
        qb.push(empty);
        return;
    }
    qb.push("(");
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            qb.push(separator);
        }
        push_predicate(qb, target, part);
    }
    qb.push(")");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(target: SearchTarget, predicate: &Predicate) -> String {
        let mut qb = QueryBuilder::<Postgres>::new("");
        push_predicate(&mut qb, target, predicate);
        qb.sql().to_string()
    }

    #[test]
    fn test_like_prefix_escapes_wildcards() {
        assert_eq!(like_prefix("P04637"), "P04637%");
        assert_eq!(like_prefix("50%_a\\b"), "50\\%\\_a\\\\b%");
    }

    #[test]
    fn test_case_insensitive_equality() {
        let sql = render(
            SearchTarget::Mappings,
            &Predicate::EqualsIgnoreCase(Field::TranscriptAccession, "enst1".into()),
        );
        assert_eq!(sql, "LOWER(t.enst_id) = LOWER($1)");
    }

    #[test]
    fn test_tax_id_goes_through_species_history_for_mappings() {
        let predicate = Predicate::AnyOf(Field::TaxId, vec![Value::Int(9606)]);
        let sql = render(SearchTarget::Mappings, &predicate);
        assert!(sql.starts_with("EXISTS (SELECT 1 FROM transcript_history th"));
        assert!(sql.ends_with("esh.ensembl_tax_id IN ($1))"));

        let sql = render(SearchTarget::MappingViews, &predicate);
        assert_eq!(sql, "mv.uniprot_tax_id IN ($1)");
    }

    #[test]
    fn test_combinators_and_negation() {
        let predicate = Predicate::And(vec![
            Predicate::Or(vec![
                Predicate::equals(Field::AlignmentDifference, 0),
                Predicate::Range {
                    field: Field::AlignmentDifference,
                    above: Some(5),
                    up_to: None,
                },
            ]),
            Predicate::not(Predicate::StartsWithIgnoreCase(
                Field::RegionAccession,
                "CHR".into(),
            )),
        ]);
        let sql = render(SearchTarget::MappingViews, &predicate);
        assert_eq!(
            sql,
            "((mv.alignment_difference = $1 OR (mv.alignment_difference IS NOT NULL \
             AND mv.alignment_difference > $2)) AND NOT COALESCE((mv.region_accession ILIKE $3), FALSE))"
        );
    }

    #[test]
    fn test_degenerate_predicates() {
        assert_eq!(render(SearchTarget::Mappings, &Predicate::All), "TRUE");
        assert_eq!(render(SearchTarget::Mappings, &Predicate::Or(vec![])), "FALSE");
        assert_eq!(render(SearchTarget::Mappings, &Predicate::AnyOf(Field::Status, vec![])), "FALSE");
        assert_eq!(
            render(
                SearchTarget::Mappings,
                &Predicate::AnyOf(Field::MappingType, vec![Value::Text("x".into())])
            ),
            "FALSE"
        );
    }
}
