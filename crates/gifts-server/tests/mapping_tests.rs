//! Mapping endpoint integration tests
//!
//! Coverage includes:
//! - Mapping detail with taxonomy and related entries
//! - Pairwise alignment against canned sequences
//! - Status changes, their history and the mirrored status
//! - Alignment-difference updates
//! - Release lookups

use axum::http::StatusCode;
use serde_json::json;

mod common;
use common::{ids, remove_rows, TestApp, CURATOR};

// ============================================================================
// Detail
// ============================================================================

#[tokio::test]
async fn test_mapping_detail() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/v1/mapping/1").await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let data = &body["data"];
    assert_eq!(data["taxonomy"]["species"], "homo_sapiens");
    assert_eq!(data["taxonomy"]["ensemblTaxId"], 9606);
    assert_eq!(data["taxonomy"]["uniprotTaxId"], 9606);
    assert_eq!(data["mapping"]["mappingId"], 1);
    assert_eq!(data["mapping"]["groupingId"], 100);
    assert_eq!(
        data["mapping"]["ensemblTranscript"]["sequence"],
        "MEEPQSDPSVEPPLSQETFSDLWKLL"
    );

    let related = &data["relatedEntries"];
    let mapped: Vec<i64> = related["mapped"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|m| m["mappingId"].as_i64())
        .collect();
    assert_eq!(mapped, vec![2]);
    assert!(related["mapped"][0]["ensemblTranscript"]["sequence"].is_null());

    let ensembl = related["unmapped"]["ensembl"].as_array().unwrap();
    assert_eq!(ensembl.len(), 1);
    assert_eq!(ensembl[0]["enstId"], "ENST00000620438");
    assert_eq!(ensembl[0]["ensgSymbol"], "TP53");

    let uniprot = related["unmapped"]["uniprot"].as_array().unwrap();
    assert_eq!(uniprot.len(), 1);
    assert_eq!(uniprot[0]["uniprotAccession"], "P04637-3");
    assert_eq!(uniprot[0]["isCanonical"], false);
    assert_eq!(uniprot[0]["chromosomeLine"], "17p13.1");
}

#[tokio::test]
async fn test_related_entries_never_include_the_mapping() {
    let app = TestApp::new().await;

    for id in 1..=4 {
        let (status, body) = app.get(&format!("/api/v1/mapping/{id}?sequence=false")).await;
        assert_eq!(status, StatusCode::OK, "mapping {id}: {body}");

        let mapped = body["data"]["relatedEntries"]["mapped"].as_array().unwrap();
        assert!(
            mapped.iter().all(|m| m["mappingId"] != id),
            "mapping {id} lists itself"
        );
    }
}

#[tokio::test]
async fn test_detail_without_sequence_skips_the_fetch() {
    let app = TestApp::new().await;

    // No canned sequence exists for this transcript
    let (status, _) = app.get("/api/v1/mapping/3").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.get("/api/v1/mapping/3?sequence=false").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["mapping"]["ensemblTranscript"]["sequence"].is_null());
    assert!(body["data"]["relatedEntries"]["mapped"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_mapping_detail_is_not_found() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/v1/mapping/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_mapping_without_history_is_not_found() {
    let app = TestApp::with_edited_fixture(|fixture| {
        remove_rows(fixture, "mapping_histories", "mapping_id", 1)
    })
    .await;

    let (status, body) = app.get("/api/v1/mapping/1?sequence=false").await;
    assert_eq!(status, StatusCode::NOT_FOUND, "{body}");
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    // Mappings that kept their history are unaffected
    let (status, _) = app.get("/api/v1/mapping/2?sequence=false").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_mapping_without_species_snapshot_is_not_found() {
    let app = TestApp::with_edited_fixture(|fixture| {
        remove_rows(fixture, "transcript_histories", "transcript_id", 1)
    })
    .await;

    let (status, body) = app.get("/api/v1/mapping/1?sequence=false").await;
    assert_eq!(status, StatusCode::NOT_FOUND, "{body}");
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

// ============================================================================
// Pairwise alignment
// ============================================================================

#[tokio::test]
async fn test_pairwise_identical_sequences() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/v1/mapping/1/pairwise").await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let data = &body["data"];
    assert_eq!(data["mappingId"], 1);
    assert_eq!(data["enstId"], "ENST00000269305");
    assert_eq!(data["uniprotAccession"], "P04637");
    assert_eq!(data["alignment"]["differences"], 0);
    assert_eq!(data["alignment"]["ensembl"], data["alignment"]["uniprot"]);
}

#[tokio::test]
async fn test_pairwise_gaps_the_shorter_sequence() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/v1/mapping/2/pairwise").await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let alignment = &body["data"]["alignment"];
    let ensembl = alignment["ensembl"].as_str().unwrap();
    let uniprot = alignment["uniprot"].as_str().unwrap();
    let match_line = alignment["matchLine"].as_str().unwrap();

    assert!(ensembl.contains('-'));
    assert!(!uniprot.contains('-'));
    assert_eq!(ensembl.len(), uniprot.len());
    assert_eq!(match_line.len(), uniprot.len());
}

#[tokio::test]
async fn test_pairwise_sequence_failure_is_not_found() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/v1/mapping/3/pairwise").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

// ============================================================================
// Status
// ============================================================================

#[tokio::test]
async fn test_list_statuses() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/v1/mappings/statuses").await;
    assert_eq!(status, StatusCode::OK);

    let labels: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|s| s["description"].as_str())
        .collect();
    assert_eq!(labels, vec!["NOT_REVIEWED", "UNDER_REVIEW", "REVIEWED", "REJECTED"]);
}

#[tokio::test]
async fn test_status_change_requires_principal() {
    let app = TestApp::new().await;

    let (status, body) = app
        .put_as("/api/v1/mapping/2/status", None, json!({ "status": "REVIEWED" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_status_change_rejects_bad_payloads() {
    let app = TestApp::new().await;

    let (status, _) = app.put_as("/api/v1/mapping/2/status", Some(CURATOR), json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .put_as("/api/v1/mapping/2/status", Some(CURATOR), json!({ "status": "  " }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .put_as("/api/v1/mapping/2/status", Some(CURATOR), json!({ "status": "APPROVED" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .put_as("/api/v1/mapping/999/status", Some(CURATOR), json!({ "status": "REVIEWED" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_status_change_twice_writes_one_history_row() {
    let app = TestApp::new().await;
    let before = app.store.snapshot().await.status_history.len();

    let (status, body) = app
        .put_as("/api/v1/mapping/2/status", Some(CURATOR), json!({ "status": "reviewed" }))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["mappingId"], 2);
    assert_eq!(body["data"]["status"], "REVIEWED");
    assert_eq!(body["data"]["user"], CURATOR);

    let (status, body) = app
        .put_as("/api/v1/mapping/2/status", Some(CURATOR), json!({ "status": "REVIEWED" }))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let snapshot = app.store.snapshot().await;
    assert_eq!(snapshot.status_history.len(), before + 1);

    // Both denormalized copies follow the latest history row
    let mapping = snapshot.mappings.iter().find(|m| m.mapping_id == 2).unwrap();
    let view = snapshot.mapping_views.iter().find(|v| v.mapping_id == 2).unwrap();
    assert_eq!(mapping.status, Some(3));
    assert_eq!(view.status, Some(3));

    let (_, history) = app.get("/api/v1/mapping/2/status-history").await;
    let history = history["data"].as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["status"], "REVIEWED");
    assert_eq!(history[0]["user"], CURATOR);

    let (_, detail) = app.get("/api/v1/mapping/2?sequence=false").await;
    assert_eq!(detail["data"]["mapping"]["status"], "REVIEWED");

    let (_, views) = app.get("/api/v1/mappings/views?searchTerm=2").await;
    assert_eq!(views["data"][0]["entries"][0]["status"], "REVIEWED");
}

#[tokio::test]
async fn test_status_change_to_current_status_is_no_content() {
    let app = TestApp::new().await;

    let (status, _) = app
        .put_as("/api/v1/mapping/1/status", Some(CURATOR), json!({ "status": "REVIEWED" }))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, history) = app.get("/api/v1/mapping/1/status-history").await;
    assert_eq!(history["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_status_history_of_missing_mapping() {
    let app = TestApp::new().await;

    let (status, _) = app.get("/api/v1/mapping/999/status-history").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Alignment difference
// ============================================================================

#[tokio::test]
async fn test_alignment_difference_update() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post_as("/api/v1/mapping/4/alignment_difference/7", Some(CURATOR), None)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["alignmentDifference"], 7);

    let large = app.search_ids("/api/v1/mappings?facets=sequence:large").await;
    assert_eq!(large, ids([3, 4]));
}

#[tokio::test]
async fn test_alignment_difference_rejections() {
    let app = TestApp::new().await;

    let (status, _) = app
        .post_as("/api/v1/mapping/4/alignment_difference/7", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .post_as("/api/v1/mapping/4/alignment_difference/-1", Some(CURATOR), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post_as("/api/v1/mapping/999/alignment_difference/1", Some(CURATOR), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Releases
// ============================================================================

#[tokio::test]
async fn test_latest_release_for_assembly() {
    let app = TestApp::new().await;

    for accession in ["GCA_000001405.28", "gca_000001405.28"] {
        let (status, body) = app
            .get(&format!("/api/v1/mappings/release/{accession}/latest"))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["releaseMappingHistoryId"], 1);
        assert_eq!(body["data"]["uniprotRelease"], "2019_01");
    }

    let (status, _) = app.get("/api/v1/mappings/release/GCA_999/latest").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_release_per_species() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/v1/mappings/species/10090/release").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({ "ensembl": 95, "uniprot": "2019_01" }));

    let (status, _) = app.get("/api/v1/mappings/species/4932/release").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_mappings_in_release() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/v1/mappings/release-history/1?limit=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["meta"]["pagination"]["total"], 3);
    assert_eq!(body["data"][0]["mappingId"], 1);
}

// ============================================================================
// Service routes
// ============================================================================

#[tokio::test]
async fn test_health_and_root() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = app.get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "GIFTS Server");
}
