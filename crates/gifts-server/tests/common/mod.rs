//! Shared harness for the HTTP integration tests
//!
//! Every test gets its own router over a fresh [`InMemoryStore`] loaded from
//! `tests/fixtures/mappings.json`, with canned protein sequences in place of
//! the Ensembl and UniProt REST services.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;
use tower::ServiceExt;

use gifts_server::{
    api,
    config::Config,
    external::{ExternalError, SequenceService},
    features::FeatureState,
    middleware::USER_HEADER,
    store::InMemoryStore,
    vocabulary::Vocabulary,
};

pub const FIXTURE: &str = include_str!("../fixtures/mappings.json");

pub const CURATOR: &str = "curator1";

/// Drops the rows of `relation` whose `column` equals `id`
pub fn remove_rows(fixture: &mut Value, relation: &str, column: &str, id: i64) {
    if let Some(rows) = fixture[relation].as_array_mut() {
        rows.retain(|row| row[column].as_i64() != Some(id));
    }
}

/// Sequences keyed by accession; anything else answers 404
pub struct FakeSequenceService;

#[async_trait]
impl SequenceService for FakeSequenceService {
    async fn ensembl_protein(&self, transcript_id: &str) -> Result<String, ExternalError> {
        match transcript_id {
            "ENST00000269305" | "ENST00000413465" => Ok("MEEPQSDPSVEPPLSQETFSDLWKLL".into()),
            "ENSMUST00000108658" => Ok("MTAMEESQSDISLELPLSQETF".into()),
            other => Err(ExternalError::Status {
                service: "Ensembl",
                status: 404,
                id: other.to_string(),
            }),
        }
    }

    async fn uniprot_protein(&self, accession: &str) -> Result<String, ExternalError> {
        match accession {
            "P04637" => Ok("MEEPQSDPSVEPPLSQETFSDLWKLL".into()),
            "P04637-2" => Ok("MEEPQSDPSVEPPLSQETFSDLWKLLPENNVLSPL".into()),
            "P02340" => Ok("MTAMEESQSDISLELPLSQETF".into()),
            other => Err(ExternalError::Status {
                service: "UniProt",
                status: 404,
                id: other.to_string(),
            }),
        }
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryStore>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_fixture(FIXTURE).await
    }

    /// Same harness over the shared fixture after `edit` rewrites its JSON
    pub async fn with_edited_fixture(edit: impl FnOnce(&mut Value)) -> Self {
        let mut json: Value = serde_json::from_str(FIXTURE).expect("fixture is JSON");
        edit(&mut json);
        Self::with_fixture(&json.to_string()).await
    }

    pub async fn with_fixture(fixture: &str) -> Self {
        let store = Arc::new(InMemoryStore::from_json(fixture).expect("fixture parses"));
        let vocabulary = Vocabulary::load(store.as_ref())
            .await
            .expect("vocabulary loads");

        let state = FeatureState {
            store: store.clone(),
            vocabulary: Arc::new(vocabulary),
            sequences: Arc::new(FakeSequenceService),
        };

        Self {
            router: api::create_router(state, &Config::default()),
            store,
        }
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        user: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(USER_HEADER, user);
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None, None).await
    }

    pub async fn get_as(&self, uri: &str, user: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(user), None).await
    }

    pub async fn post_as(&self, uri: &str, user: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        self.send(Method::POST, uri, user, body).await
    }

    pub async fn put_as(&self, uri: &str, user: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, user, Some(body)).await
    }

    pub async fn delete_as(&self, uri: &str, user: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, Some(user), None).await
    }

    /// Mapping ids across every group of a search response
    pub async fn search_ids(&self, uri: &str) -> BTreeSet<i64> {
        let (status, body) = self.get(uri).await;
        assert_eq!(status, StatusCode::OK, "search {uri} failed: {body}");
        mapping_ids(&body)
    }
}

pub fn mapping_ids(body: &Value) -> BTreeSet<i64> {
    body["data"]
        .as_array()
        .expect("data is an array of groups")
        .iter()
        .flat_map(|group| group["entries"].as_array().cloned().unwrap_or_default())
        .filter_map(|entry| entry["mappingId"].as_i64())
        .collect()
}

pub fn ids<const N: usize>(values: [i64; N]) -> BTreeSet<i64> {
    values.into_iter().collect()
}
