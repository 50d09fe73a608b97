//! Postgres-backed mapping store
//!
//! The schema is owned by the GIFTS loaders and is never migrated here.
//! Queries use the runtime `query_as` API and cast integer columns to
//! `BIGINT` so rows decode into the `i64` fields of `crate::models`.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::collections::HashMap;

use super::sql::{from_clause, push_predicate};
use super::{
    collect_groups, GroupPage, MappingStore, Page, PageRequest, ReleaseSummary, StatusOutcome,
};
use crate::db::{DbError, DbResult};
use crate::features::search::predicate::Predicate;
use crate::features::search::resolver::SearchTarget;
use crate::models::{
    Comment, CurrentRelease, Gene, Mapping, MappingRecord, MappingView, ReleaseMappingHistory,
    SpeciesHistory, StatusChange, Transcript, TranscriptWithGene, UniprotEntry, VocabularyEntry,
};

const MAPPING_COLUMNS: &str = "m.mapping_id::BIGINT AS mapping_id, \
    m.transcript_id::BIGINT AS transcript_id, m.uniprot_id::BIGINT AS uniprot_id, \
    m.status::BIGINT AS status, m.alignment_difference::BIGINT AS alignment_difference";

const TRANSCRIPT_COLUMNS: &str = "t.transcript_id::BIGINT AS transcript_id, \
    t.gene_id::BIGINT AS gene_id, t.enst_id, t.enst_version::BIGINT AS enst_version, \
    t.ensp_id, t.ensp_len::BIGINT AS ensp_len, t.uniparc_accession, t.biotype, t.deleted, \
    t.seq_region_start::BIGINT AS seq_region_start, t.seq_region_end::BIGINT AS seq_region_end, \
    t.source, t.\"select\" AS \"select\"";

const GENE_COLUMNS: &str = "g.gene_id::BIGINT AS gene_id, g.ensg_id, g.gene_name, \
    g.gene_symbol, g.chromosome, g.region_accession, \
    g.seq_region_start::BIGINT AS seq_region_start, g.seq_region_end::BIGINT AS seq_region_end, \
    g.seq_region_strand::BIGINT AS seq_region_strand, g.source";

const UNIPROT_COLUMNS: &str = "u.uniprot_id::BIGINT AS uniprot_id, u.uniprot_acc, \
    u.uniprot_tax_id::BIGINT AS uniprot_tax_id, u.entry_type::BIGINT AS entry_type, \
    u.entry_version::BIGINT AS entry_version, \
    u.sequence_version::BIGINT AS sequence_version, u.upi, u.md5, \
    u.canonical_uniprot_id::BIGINT AS canonical_uniprot_id, u.alias, u.ensembl_derived, \
    u.gene_symbol, u.chromosome_line, u.length::BIGINT AS length, \
    u.protein_existence_id::BIGINT AS protein_existence_id";

const SPECIES_COLUMNS: &str = "esh.ensembl_species_history_id::BIGINT AS ensembl_species_history_id, \
    esh.species, esh.assembly_accession, esh.ensembl_tax_id::BIGINT AS ensembl_tax_id, \
    esh.ensembl_release::BIGINT AS ensembl_release, esh.status, esh.time_loaded";

const RELEASE_COLUMNS: &str = "rmh.release_mapping_history_id::BIGINT AS release_mapping_history_id, \
    rmh.ensembl_species_history_id::BIGINT AS ensembl_species_history_id, rmh.uniprot_release, \
    rmh.uniprot_taxid::BIGINT AS uniprot_taxid, rmh.time_mapped, rmh.status";

const VIEW_COLUMNS: &str = "mv.id::BIGINT AS id, mv.mapping_id::BIGINT AS mapping_id, \
    mv.grouping_id::BIGINT AS grouping_id, mv.ensg_id, mv.enst_id, mv.uniprot_acc, \
    mv.gene_symbol_up, mv.gene_symbol_eg, mv.gene_name, \
    mv.uniprot_tax_id::BIGINT AS uniprot_tax_id, mv.chromosome, mv.region_accession, \
    mv.alignment_difference::BIGINT AS alignment_difference, mv.status::BIGINT AS status, \
    mv.uniprot_mapping_status";

const STATUS_CHANGE_COLUMNS: &str = "id::BIGINT AS id, time_stamp, user_stamp::TEXT AS user_stamp, \
    status::BIGINT AS status, mapping_id::BIGINT AS mapping_id";

const COMMENT_COLUMNS: &str = "id::BIGINT AS id, time_stamp, user_stamp::TEXT AS user_stamp, \
    comment, mapping_id::BIGINT AS mapping_id, deleted";

/// Latest history of the mapping aliased `m`, by release `time_mapped`
const CURRENT_HISTORY_JOIN: &str = "LEFT JOIN LATERAL (\
    SELECT mh.grouping_id FROM mapping_history mh \
    JOIN release_mapping_history rmh \
    ON rmh.release_mapping_history_id = mh.release_mapping_history_id \
    WHERE mh.mapping_id = m.mapping_id \
    ORDER BY rmh.time_mapped DESC NULLS LAST, mh.mapping_history_id DESC LIMIT 1\
    ) cur ON TRUE";

#[derive(Debug, sqlx::FromRow)]
struct CurrentHistoryRow {
    mapping_id: i64,
    grouping_id: Option<i64>,
    #[sqlx(flatten)]
    release: ReleaseMappingHistory,
}

#[derive(Clone)]
pub struct PgMappingStore {
    pool: PgPool,
}

impl PgMappingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Hydrate mappings, keeping the order of `ids`
    async fn load_records(&self, ids: &[i64]) -> DbResult<Vec<MappingRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mappings: Vec<Mapping> = sqlx::query_as(&format!(
            "SELECT {MAPPING_COLUMNS} FROM mapping m WHERE m.mapping_id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        let transcript_ids: Vec<i64> = mappings.iter().map(|m| m.transcript_id).collect();
        let uniprot_ids: Vec<i64> = mappings.iter().map(|m| m.uniprot_id).collect();

        let transcripts: HashMap<i64, Transcript> = sqlx::query_as::<_, Transcript>(&format!(
            "SELECT {TRANSCRIPT_COLUMNS} FROM ensembl_transcript t WHERE t.transcript_id = ANY($1)"
        ))
        .bind(&transcript_ids)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|t| (t.transcript_id, t))
        .collect();

        let gene_ids: Vec<i64> = transcripts.values().map(|t| t.gene_id).collect();
        let genes = self.genes(&gene_ids).await?;

        let uniprots: HashMap<i64, UniprotEntry> = sqlx::query_as::<_, UniprotEntry>(&format!(
            "SELECT {UNIPROT_COLUMNS} FROM uniprot_entry u WHERE u.uniprot_id = ANY($1)"
        ))
        .bind(&uniprot_ids)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|u| (u.uniprot_id, u))
        .collect();

        let current: Vec<CurrentHistoryRow> = sqlx::query_as(&format!(
            "SELECT DISTINCT ON (mh.mapping_id) mh.mapping_id::BIGINT AS mapping_id, \
             mh.grouping_id::BIGINT AS grouping_id, {RELEASE_COLUMNS} \
             FROM mapping_history mh \
             JOIN release_mapping_history rmh \
             ON rmh.release_mapping_history_id = mh.release_mapping_history_id \
             WHERE mh.mapping_id = ANY($1) \
             ORDER BY mh.mapping_id, rmh.time_mapped DESC NULLS LAST, mh.mapping_history_id DESC"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        let species_ids: Vec<i64> =
            current.iter().map(|c| c.release.ensembl_species_history_id).collect();
        let species = self.species_histories(&species_ids).await?;

        let mut current: HashMap<i64, CurrentRelease> = current
            .into_iter()
            .map(|row| {
                let species = species.get(&row.release.ensembl_species_history_id).cloned();
                (
                    row.mapping_id,
                    CurrentRelease {
                        grouping_id: row.grouping_id,
                        release: row.release,
                        species,
                    },
                )
            })
            .collect();

        let tax_rows: Vec<(i64, i64)> = sqlx::query_as(
            "SELECT DISTINCT th.transcript_id::BIGINT, esh.ensembl_tax_id::BIGINT \
             FROM transcript_history th \
             JOIN ensembl_species_history esh \
             ON esh.ensembl_species_history_id = th.ensembl_species_history_id \
             WHERE th.transcript_id = ANY($1) AND esh.ensembl_tax_id IS NOT NULL",
        )
        .bind(&transcript_ids)
        .fetch_all(&self.pool)
        .await?;
        let mut tax_ids: HashMap<i64, Vec<i64>> = HashMap::new();
        for (transcript_id, tax_id) in tax_rows {
            tax_ids.entry(transcript_id).or_default().push(tax_id);
        }

        let mut by_id: HashMap<i64, MappingRecord> = HashMap::with_capacity(mappings.len());
        for mapping in mappings {
            let transcript = transcripts.get(&mapping.transcript_id);
            let gene = transcript.and_then(|t| genes.get(&t.gene_id));
            let uniprot = uniprots.get(&mapping.uniprot_id);
            let (Some(transcript), Some(gene), Some(uniprot)) = (transcript, gene, uniprot) else {
                tracing::warn!(
                    mapping_id = mapping.mapping_id,
                    "Mapping references a missing transcript, gene or UniProt entry, skipped"
                );
                continue;
            };
            by_id.insert(
                mapping.mapping_id,
                MappingRecord {
                    transcript: transcript.clone(),
                    gene: gene.clone(),
                    uniprot: uniprot.clone(),
                    current: current.remove(&mapping.mapping_id),
                    ensembl_tax_ids: tax_ids.get(&mapping.transcript_id).cloned().unwrap_or_default(),
                    mapping,
                },
            );
        }

        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    async fn genes(&self, ids: &[i64]) -> DbResult<HashMap<i64, Gene>> {
        let genes: Vec<Gene> = sqlx::query_as(&format!(
            "SELECT {GENE_COLUMNS} FROM ensembl_gene g WHERE g.gene_id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(genes.into_iter().map(|g| (g.gene_id, g)).collect())
    }

    async fn species_histories(&self, ids: &[i64]) -> DbResult<HashMap<i64, SpeciesHistory>> {
        let rows: Vec<SpeciesHistory> = sqlx::query_as(&format!(
            "SELECT {SPECIES_COLUMNS} FROM ensembl_species_history esh \
             WHERE esh.ensembl_species_history_id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|s| (s.ensembl_species_history_id, s)).collect())
    }

    /// `WITH hits AS (...)` selecting `row_id`, `mapping_id` and `group_key`
    fn push_hits(qb: &mut QueryBuilder<'_, Postgres>, target: SearchTarget, filter: &Predicate) {
        match target {
            SearchTarget::Mappings => {
                qb.push(
                    "WITH hits AS (SELECT m.mapping_id::BIGINT AS row_id, \
                     m.mapping_id::BIGINT AS mapping_id, \
                     COALESCE(cur.grouping_id::BIGINT, -m.mapping_id::BIGINT) AS group_key",
                );
                qb.push(from_clause(target));
                qb.push(CURRENT_HISTORY_JOIN);
            },
            SearchTarget::MappingViews => {
                qb.push(
                    "WITH hits AS (SELECT mv.id::BIGINT AS row_id, \
                     mv.mapping_id::BIGINT AS mapping_id, \
                     COALESCE(mv.grouping_id::BIGINT, -mv.mapping_id::BIGINT) AS group_key",
                );
                qb.push(from_clause(target));
            },
        }
        qb.push(" WHERE ");
        push_predicate(qb, target, filter);
        qb.push(")");
    }

    async fn count_groups(&self, target: SearchTarget, filter: &Predicate) -> DbResult<i64> {
        let mut qb = QueryBuilder::<Postgres>::new("");
        Self::push_hits(&mut qb, target, filter);
        qb.push(" SELECT COUNT(DISTINCT group_key) FROM hits");
        let (total,): (i64,) = qb.build_query_as().fetch_one(&self.pool).await?;
        Ok(total)
    }

    fn push_paged_hits(
        qb: &mut QueryBuilder<'_, Postgres>,
        target: SearchTarget,
        filter: &Predicate,
        page: PageRequest,
    ) {
        Self::push_hits(qb, target, filter);
        qb.push(", paged AS (SELECT DISTINCT group_key FROM hits ORDER BY group_key LIMIT ");
        qb.push_bind(page.limit);
        qb.push(" OFFSET ");
        qb.push_bind(page.offset);
        qb.push(")");
    }
}

#[async_trait]
impl MappingStore for PgMappingStore {
    async fn health_check(&self) -> DbResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn statuses(&self) -> DbResult<Vec<VocabularyEntry>> {
        let rows = sqlx::query_as(
            "SELECT id::BIGINT AS id, description FROM cv_ue_status ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn entry_types(&self) -> DbResult<Vec<VocabularyEntry>> {
        let rows = sqlx::query_as(
            "SELECT id::BIGINT AS id, COALESCE(description, '') AS description \
             FROM cv_entry_type ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn mapping(&self, mapping_id: i64) -> DbResult<Option<MappingRecord>> {
        Ok(self.load_records(&[mapping_id]).await?.pop())
    }

    #[tracing::instrument(skip(self, filter))]
    async fn search_mappings(
        &self,
        filter: &Predicate,
        page: PageRequest,
    ) -> DbResult<GroupPage<MappingRecord>> {
        let total = self.count_groups(SearchTarget::Mappings, filter).await?;

        let mut qb = QueryBuilder::<Postgres>::new("");
        Self::push_paged_hits(&mut qb, SearchTarget::Mappings, filter, page);
        qb.push(
            " SELECT h.mapping_id FROM hits h JOIN paged p ON p.group_key = h.group_key \
             ORDER BY h.group_key, h.mapping_id",
        );
        let ids: Vec<(i64,)> = qb.build_query_as().fetch_all(&self.pool).await?;
        let ids: Vec<i64> = ids.into_iter().map(|(id,)| id).collect();

        let records = self.load_records(&ids).await?;
        let groups = collect_groups(records, |r| (r.grouping_id(), r.mapping_id()));

        Ok(GroupPage { total, groups })
    }

    #[tracing::instrument(skip(self, filter))]
    async fn search_mapping_views(
        &self,
        filter: &Predicate,
        page: PageRequest,
    ) -> DbResult<GroupPage<MappingView>> {
        let total = self.count_groups(SearchTarget::MappingViews, filter).await?;

        let mut qb = QueryBuilder::<Postgres>::new("");
        Self::push_paged_hits(&mut qb, SearchTarget::MappingViews, filter, page);
        qb.push(" SELECT ");
        qb.push(VIEW_COLUMNS);
        qb.push(
            " FROM hits h JOIN paged p ON p.group_key = h.group_key \
             JOIN mapping_view mv ON mv.id = h.row_id \
             ORDER BY h.group_key, mv.mapping_id, mv.id",
        );
        let views: Vec<MappingView> = qb.build_query_as().fetch_all(&self.pool).await?;
        let groups = collect_groups(views, |v| (v.grouping_id, v.mapping_id));

        Ok(GroupPage { total, groups })
    }

    async fn grouped_mappings(
        &self,
        release_mapping_history_id: i64,
        grouping_id: i64,
    ) -> DbResult<Vec<MappingRecord>> {
        let ids: Vec<(i64,)> = sqlx::query_as(
            "SELECT DISTINCT mh.mapping_id::BIGINT FROM mapping_history mh \
             WHERE mh.release_mapping_history_id = $1 AND mh.grouping_id = $2 \
             ORDER BY 1",
        )
        .bind(release_mapping_history_id)
        .bind(grouping_id)
        .fetch_all(&self.pool)
        .await?;
        let ids: Vec<i64> = ids.into_iter().map(|(id,)| id).collect();
        self.load_records(&ids).await
    }

    async fn unmapped_uniprot_entries(
        &self,
        release: &ReleaseMappingHistory,
        grouping_id: i64,
    ) -> DbResult<Vec<UniprotEntry>> {
        let Some(ref uniprot_release) = release.uniprot_release else {
            return Ok(Vec::new());
        };
        let rows = sqlx::query_as(&format!(
            "SELECT {UNIPROT_COLUMNS} FROM uniprot_entry_history ueh \
             JOIN uniprot_entry u ON u.uniprot_id = ueh.uniprot_id \
             WHERE ueh.release_version = $1 AND ueh.grouping_id = $2 \
             AND NOT EXISTS (SELECT 1 FROM mapping_history mh \
                 JOIN mapping lm ON lm.mapping_id = mh.mapping_id \
                 WHERE mh.release_mapping_history_id = $3 AND lm.uniprot_id = ueh.uniprot_id) \
             ORDER BY u.uniprot_acc"
        ))
        .bind(uniprot_release)
        .bind(grouping_id)
        .bind(release.release_mapping_history_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn unmapped_transcripts(
        &self,
        release: &ReleaseMappingHistory,
        grouping_id: i64,
    ) -> DbResult<Vec<TranscriptWithGene>> {
        let transcripts: Vec<Transcript> = sqlx::query_as(&format!(
            "SELECT {TRANSCRIPT_COLUMNS} FROM transcript_history th \
             JOIN ensembl_transcript t ON t.transcript_id = th.transcript_id \
             WHERE th.ensembl_species_history_id = $1 AND th.grouping_id = $2 \
             AND NOT EXISTS (SELECT 1 FROM mapping_history mh \
                 JOIN mapping lm ON lm.mapping_id = mh.mapping_id \
                 WHERE mh.release_mapping_history_id = $3 AND lm.transcript_id = th.transcript_id) \
             ORDER BY t.enst_id"
        ))
        .bind(release.ensembl_species_history_id)
        .bind(grouping_id)
        .bind(release.release_mapping_history_id)
        .fetch_all(&self.pool)
        .await?;

        let gene_ids: Vec<i64> = transcripts.iter().map(|t| t.gene_id).collect();
        let genes = self.genes(&gene_ids).await?;

        Ok(transcripts
            .into_iter()
            .filter_map(|transcript| {
                let gene = genes.get(&transcript.gene_id)?.clone();
                Some(TranscriptWithGene { transcript, gene })
            })
            .collect())
    }

    async fn latest_species_history(&self, transcript_id: i64) -> DbResult<Option<SpeciesHistory>> {
        let row = sqlx::query_as(&format!(
            "SELECT {SPECIES_COLUMNS} FROM ensembl_species_history esh \
             JOIN transcript_history th \
             ON th.ensembl_species_history_id = esh.ensembl_species_history_id \
             WHERE th.transcript_id = $1 \
             ORDER BY esh.time_loaded DESC NULLS LAST, esh.ensembl_species_history_id DESC \
             LIMIT 1"
        ))
        .bind(transcript_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn latest_release_for_assembly(
        &self,
        assembly_accession: &str,
    ) -> DbResult<Option<ReleaseMappingHistory>> {
        let row = sqlx::query_as(&format!(
            "SELECT {RELEASE_COLUMNS} FROM release_mapping_history rmh \
             JOIN ensembl_species_history esh \
             ON esh.ensembl_species_history_id = rmh.ensembl_species_history_id \
             WHERE LOWER(esh.assembly_accession) = LOWER($1) AND esh.status = 'LOAD_COMPLETE' \
             ORDER BY rmh.time_mapped DESC NULLS LAST, rmh.release_mapping_history_id DESC \
             LIMIT 1"
        ))
        .bind(assembly_accession)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn latest_release_for_taxon(&self, tax_id: i64) -> DbResult<Option<ReleaseSummary>> {
        let release: Option<ReleaseMappingHistory> = sqlx::query_as(&format!(
            "SELECT {RELEASE_COLUMNS} FROM release_mapping_history rmh \
             WHERE rmh.uniprot_taxid = $1 \
             ORDER BY rmh.release_mapping_history_id DESC LIMIT 1"
        ))
        .bind(tax_id)
        .fetch_optional(&self.pool)
        .await?;

        match release {
            None => Ok(None),
            Some(release) => {
                let species = self
                    .species_histories(&[release.ensembl_species_history_id])
                    .await?
                    .remove(&release.ensembl_species_history_id);
                Ok(Some(ReleaseSummary { release, species }))
            },
        }
    }

    async fn mappings_in_release(
        &self,
        release_mapping_history_id: i64,
        page: PageRequest,
    ) -> DbResult<Page<MappingRecord>> {
        let (total,): (i64,) = sqlx::query_as(
            "SELECT COUNT(DISTINCT mh.mapping_id) FROM mapping_history mh \
             WHERE mh.release_mapping_history_id = $1",
        )
        .bind(release_mapping_history_id)
        .fetch_one(&self.pool)
        .await?;

        let ids: Vec<(i64,)> = sqlx::query_as(
            "SELECT DISTINCT mh.mapping_id::BIGINT FROM mapping_history mh \
             WHERE mh.release_mapping_history_id = $1 ORDER BY 1 LIMIT $2 OFFSET $3",
        )
        .bind(release_mapping_history_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;
        let ids: Vec<i64> = ids.into_iter().map(|(id,)| id).collect();

        Ok(Page {
            total,
            items: self.load_records(&ids).await?,
        })
    }

    #[tracing::instrument(skip(self))]
    async fn change_status(
        &self,
        mapping_id: i64,
        status_id: i64,
        user: &str,
    ) -> DbResult<StatusOutcome> {
        let mut tx = self.pool.begin().await?;

        let locked: Option<(Option<i64>,)> =
            sqlx::query_as("SELECT status::BIGINT FROM mapping WHERE mapping_id = $1 FOR UPDATE")
                .bind(mapping_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some((mapping_status,)) = locked else {
            return Err(DbError::not_found("Mapping", mapping_id));
        };

        let latest: Option<(i64,)> = sqlx::query_as(
            "SELECT status::BIGINT FROM ue_mapping_status WHERE mapping_id = $1 \
             ORDER BY time_stamp DESC, id DESC LIMIT 1",
        )
        .bind(mapping_id)
        .fetch_optional(&mut *tx)
        .await?;

        if latest.map(|(s,)| s).or(mapping_status) == Some(status_id) {
            tx.rollback().await?;
            return Ok(StatusOutcome::Unchanged);
        }

        let change: StatusChange = sqlx::query_as(&format!(
            "INSERT INTO ue_mapping_status (time_stamp, user_stamp, status, mapping_id) \
             VALUES (NOW(), $1, $2, $3) RETURNING {STATUS_CHANGE_COLUMNS}"
        ))
        .bind(user)
        .bind(status_id)
        .bind(mapping_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE mapping SET status = $1 WHERE mapping_id = $2")
            .bind(status_id)
            .bind(mapping_id)
            .execute(&mut *tx)
            .await?;

        let view = sqlx::query("UPDATE mapping_view SET status = $1 WHERE mapping_id = $2")
            .bind(status_id)
            .bind(mapping_id)
            .execute(&mut *tx)
            .await?;
        if view.rows_affected() == 0 {
            // Dropping the transaction rolls back the history row and mapping update
            return Err(DbError::NotFound(format!(
                "Mapping '{mapping_id}' is missing from the search table"
            )));
        }

        tx.commit().await?;
        Ok(StatusOutcome::Changed(change))
    }

    async fn status_history(&self, mapping_id: i64) -> DbResult<Vec<StatusChange>> {
        let rows = sqlx::query_as(&format!(
            "SELECT {STATUS_CHANGE_COLUMNS} FROM ue_mapping_status WHERE mapping_id = $1 \
             ORDER BY time_stamp DESC, id DESC"
        ))
        .bind(mapping_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn set_alignment_difference(&self, mapping_id: i64, difference: i64) -> DbResult<()> {
        let result =
            sqlx::query("UPDATE mapping SET alignment_difference = $1 WHERE mapping_id = $2")
                .bind(difference)
                .bind(mapping_id)
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Mapping", mapping_id));
        }
        Ok(())
    }

    async fn comments(&self, mapping_id: i64) -> DbResult<Vec<Comment>> {
        let rows = sqlx::query_as(&format!(
            "SELECT {COMMENT_COLUMNS} FROM ue_mapping_comment \
             WHERE mapping_id = $1 AND deleted = FALSE ORDER BY time_stamp DESC, id DESC"
        ))
        .bind(mapping_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn comment(&self, comment_id: i64) -> DbResult<Option<Comment>> {
        let row = sqlx::query_as(&format!(
            "SELECT {COMMENT_COLUMNS} FROM ue_mapping_comment WHERE id = $1"
        ))
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn add_comment(&self, mapping_id: i64, user: &str, text: &str) -> DbResult<Comment> {
        let row = sqlx::query_as(&format!(
            "INSERT INTO ue_mapping_comment (time_stamp, user_stamp, comment, mapping_id, deleted) \
             VALUES (NOW(), $1, $2, $3, FALSE) RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(user)
        .bind(text)
        .bind(mapping_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn edit_comment(&self, comment_id: i64, text: &str) -> DbResult<Comment> {
        sqlx::query_as(&format!(
            "UPDATE ue_mapping_comment SET comment = $1, time_stamp = NOW() WHERE id = $2 \
             RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(text)
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Comment", comment_id))
    }

    async fn delete_comment(&self, comment_id: i64) -> DbResult<Comment> {
        sqlx::query_as(&format!(
            "UPDATE ue_mapping_comment SET deleted = TRUE WHERE id = $1 RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Comment", comment_id))
    }
}
