//! GIFTS Server Library
//!
//! REST backend for curating mappings between Ensembl transcripts and
//! UniProt entries.
//!
//! # Overview
//!
//! - **Search**: free-text terms and facets compiled to predicates over
//!   mappings, returned grouped by their release grouping id
//! - **Mapping detail**: taxonomy, related entries and pairwise alignment
//! - **Curation**: status changes with history, alignment differences and
//!   comments, all attributed to the `x-user-id` principal
//!
//! # Architecture
//!
//! Each feature under [`features`] is split into queries (reads) and
//! commands (writes). Persistence sits behind the [`store::MappingStore`]
//! trait with a PostgreSQL implementation and an in-memory one loaded from a
//! JSON fixture.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use gifts_server::{api, config::Config, features::FeatureState};
//! use gifts_server::{external::RestSequenceService, store::InMemoryStore, vocabulary::Vocabulary};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let store = Arc::new(InMemoryStore::load("fixture.json").await?);
//!     let vocabulary = Arc::new(Vocabulary::load(store.as_ref()).await?);
//!     let sequences = Arc::new(RestSequenceService::new(&config.external)?);
//!     api::serve(config, FeatureState { store, vocabulary, sequences }).await
//! }
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod external;
pub mod features;
pub mod middleware;
pub mod models;
pub mod store;
pub mod vocabulary;

pub use error::{ApiResult, AppError};
