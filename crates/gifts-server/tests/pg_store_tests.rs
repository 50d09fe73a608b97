//! Postgres store integration tests using SQLx
//!
//! Each test gets a fresh database with `tests/migrations` applied and
//! `tests/fixtures/pg_mappings.sql` loaded by `#[sqlx::test]`.
//!
//! Coverage includes:
//! - Status change transaction (single history row, mirrored status, rollback)
//! - Current history row selection by release time
//! - Grouped search totals and paging
//! - SQL rendering of facet predicates against real rows
//! - Comment edits restamping the row

use sqlx::PgPool;

use gifts_server::db::DbError;
use gifts_server::features::search::predicate::{Field, Predicate, Value};
use gifts_server::store::{MappingStore, PageRequest, PgMappingStore, StatusOutcome};

const REVIEWED: i64 = 3;

fn page(limit: i64, offset: i64) -> PageRequest {
    PageRequest { limit, offset }
}

async fn history_rows(pool: &PgPool, mapping_id: i64) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM ue_mapping_status WHERE mapping_id = $1")
        .bind(mapping_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn mapping_status(pool: &PgPool, mapping_id: i64) -> Option<i64> {
    sqlx::query_scalar("SELECT status FROM mapping WHERE mapping_id = $1")
        .bind(mapping_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

// ============================================================================
// Status Change Tests
// ============================================================================

#[sqlx::test(migrations = "tests/migrations", fixtures("pg_mappings"))]
#[ignore] // Requires database
async fn test_status_change_twice_writes_one_row(pool: PgPool) {
    let store = PgMappingStore::new(pool.clone());

    let first = store.change_status(2, REVIEWED, "curator1").await.unwrap();
    let StatusOutcome::Changed(change) = first else {
        panic!("expected a new history row, got {first:?}");
    };
    assert_eq!(change.status, REVIEWED);
    assert_eq!(change.mapping_id, 2);
    assert_eq!(change.user_stamp.as_deref(), Some("curator1"));

    let second = store.change_status(2, REVIEWED, "curator2").await.unwrap();
    assert_eq!(second, StatusOutcome::Unchanged);

    assert_eq!(history_rows(&pool, 2).await, 1);
    assert_eq!(mapping_status(&pool, 2).await, Some(REVIEWED));

    let view_status: Option<i64> =
        sqlx::query_scalar("SELECT status FROM mapping_view WHERE mapping_id = 2")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(view_status, Some(REVIEWED));

    let history = store.status_history(2).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, change.id);
}

#[sqlx::test(migrations = "tests/migrations", fixtures("pg_mappings"))]
#[ignore] // Requires database
async fn test_status_change_matching_mapping_status_is_unchanged(pool: PgPool) {
    let store = PgMappingStore::new(pool.clone());

    // Mapping 1 has no history rows yet and already carries REVIEWED
    let outcome = store.change_status(1, REVIEWED, "curator1").await.unwrap();
    assert_eq!(outcome, StatusOutcome::Unchanged);
    assert_eq!(history_rows(&pool, 1).await, 0);
}

#[sqlx::test(migrations = "tests/migrations", fixtures("pg_mappings"))]
#[ignore] // Requires database
async fn test_status_change_without_view_row_rolls_back(pool: PgPool) {
    let store = PgMappingStore::new(pool.clone());

    let result = store.change_status(5, REVIEWED, "curator1").await;
    assert!(matches!(result, Err(DbError::NotFound(_))), "{result:?}");

    assert_eq!(history_rows(&pool, 5).await, 0);
    assert_eq!(mapping_status(&pool, 5).await, Some(1));
}

#[sqlx::test(migrations = "tests/migrations", fixtures("pg_mappings"))]
#[ignore] // Requires database
async fn test_status_change_for_missing_mapping(pool: PgPool) {
    let store = PgMappingStore::new(pool);

    let result = store.change_status(999, REVIEWED, "curator1").await;
    assert!(matches!(result, Err(DbError::NotFound(_))), "{result:?}");
}

// ============================================================================
// Mapping Record Tests
// ============================================================================

#[sqlx::test(migrations = "tests/migrations", fixtures("pg_mappings"))]
#[ignore] // Requires database
async fn test_current_history_follows_latest_release(pool: PgPool) {
    let store = PgMappingStore::new(pool);

    let record = store.mapping(3).await.unwrap().unwrap();
    let current = record.current.as_ref().unwrap();
    assert_eq!(current.grouping_id, Some(250));
    assert_eq!(current.release.release_mapping_history_id, 3);
    assert_eq!(current.release.uniprot_release.as_deref(), Some("2019_02"));
    assert_eq!(
        current.species.as_ref().and_then(|s| s.ensembl_tax_id),
        Some(9606)
    );
    assert_eq!(record.ensembl_tax_ids, vec![9606]);

    let orphan = store.mapping(5).await.unwrap().unwrap();
    assert!(orphan.current.is_none());

    assert!(store.mapping(999).await.unwrap().is_none());

    let tp53 = store.mapping(1).await.unwrap().unwrap();
    assert_eq!(tp53.uniprot.entry_version, Some(262));
}

#[sqlx::test(migrations = "tests/migrations", fixtures("pg_mappings"))]
#[ignore] // Requires database
async fn test_grouped_mappings_use_release_and_grouping(pool: PgPool) {
    let store = PgMappingStore::new(pool);

    let old_group: Vec<i64> = store
        .grouped_mappings(1, 200)
        .await
        .unwrap()
        .iter()
        .map(|r| r.mapping_id())
        .collect();
    assert_eq!(old_group, vec![3]);

    let tp53: Vec<i64> = store
        .grouped_mappings(1, 100)
        .await
        .unwrap()
        .iter()
        .map(|r| r.mapping_id())
        .collect();
    assert_eq!(tp53, vec![1, 2]);
}

// ============================================================================
// Search Tests
// ============================================================================

#[sqlx::test(migrations = "tests/migrations", fixtures("pg_mappings"))]
#[ignore] // Requires database
async fn test_search_totals_count_groups(pool: PgPool) {
    let store = PgMappingStore::new(pool);

    let first = store.search_mappings(&Predicate::All, page(2, 0)).await.unwrap();
    assert_eq!(first.total, 4);
    assert_eq!(first.groups.len(), 2);

    // Mapping 5 has no history, so it forms its own group and sorts first
    assert_eq!(first.groups[0].grouping_id, None);
    let singleton: Vec<i64> = first.groups[0].entries.iter().map(|r| r.mapping_id()).collect();
    assert_eq!(singleton, vec![5]);

    assert_eq!(first.groups[1].grouping_id, Some(100));
    let tp53: Vec<i64> = first.groups[1].entries.iter().map(|r| r.mapping_id()).collect();
    assert_eq!(tp53, vec![1, 2]);

    let rest = store.search_mappings(&Predicate::All, page(2, 2)).await.unwrap();
    assert_eq!(rest.total, 4);
    let groups: Vec<Option<i64>> = rest.groups.iter().map(|g| g.grouping_id).collect();
    assert_eq!(groups, vec![Some(250), Some(300)]);
}

#[sqlx::test(migrations = "tests/migrations", fixtures("pg_mappings"))]
#[ignore] // Requires database
async fn test_search_applies_rendered_predicates(pool: PgPool) {
    let store = PgMappingStore::new(pool);

    let not_reviewed = store
        .search_mappings(&Predicate::Equals(Field::Status, Value::Int(1)), page(10, 0))
        .await
        .unwrap();
    assert_eq!(not_reviewed.total, 3);

    let mouse = store
        .search_mappings(&Predicate::Equals(Field::TaxId, Value::Int(10090)), page(10, 0))
        .await
        .unwrap();
    assert_eq!(mouse.total, 1);
    assert_eq!(mouse.groups[0].entries[0].mapping_id(), 4);

    let base = Predicate::StartsWithIgnoreCase(Field::ProteinAccession, "p04637".into());
    let isoforms = store.search_mappings(&base, page(10, 0)).await.unwrap();
    assert_eq!(isoforms.total, 2);

    // Underscore is matched literally rather than as a LIKE wildcard
    let literal = Predicate::StartsWithIgnoreCase(Field::ProteinAccession, "P04637_".into());
    let none = store.search_mappings(&literal, page(10, 0)).await.unwrap();
    assert_eq!(none.total, 0);
    assert!(none.groups.is_empty());
}

#[sqlx::test(migrations = "tests/migrations", fixtures("pg_mappings"))]
#[ignore] // Requires database
async fn test_view_search_groups_by_view_grouping(pool: PgPool) {
    let store = PgMappingStore::new(pool);

    let views = store.search_mapping_views(&Predicate::All, page(10, 0)).await.unwrap();
    assert_eq!(views.total, 3);

    let unmapped = store
        .search_mapping_views(
            &Predicate::Equals(Field::MappingType, Value::Text("unmapped".into())),
            page(10, 0),
        )
        .await
        .unwrap();
    assert_eq!(unmapped.total, 1);
    assert_eq!(unmapped.groups[0].entries[0].id, 14);
}

#[sqlx::test(migrations = "tests/migrations", fixtures("pg_mappings"))]
#[ignore] // Requires database
async fn test_mappings_in_release(pool: PgPool) {
    let store = PgMappingStore::new(pool);

    let release = store.mappings_in_release(1, page(2, 0)).await.unwrap();
    assert_eq!(release.total, 3);
    let ids: Vec<i64> = release.items.iter().map(|r| r.mapping_id()).collect();
    assert_eq!(ids, vec![1, 2]);
}

// ============================================================================
// Comment Tests
// ============================================================================

#[sqlx::test(migrations = "tests/migrations", fixtures("pg_mappings"))]
#[ignore] // Requires database
async fn test_comment_edit_restamps_row(pool: PgPool) {
    let store = PgMappingStore::new(pool);

    let original = store.comments(1).await.unwrap().remove(0);
    let edited = store.edit_comment(original.id, "Checked against CCDS").await.unwrap();
    assert_eq!(edited.comment, "Checked against CCDS");
    assert!(edited.time_stamp > original.time_stamp);

    let deleted = store.delete_comment(original.id).await.unwrap();
    assert!(deleted.deleted);
    assert!(store.comments(1).await.unwrap().is_empty());
    assert!(store.comment(original.id).await.unwrap().is_some());
}
