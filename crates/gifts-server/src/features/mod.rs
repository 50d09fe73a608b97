//! Feature modules implementing the GIFTS API
//!
//! Each feature is a vertical slice with its own `queries` (reads),
//! `commands` (writes) and `routes.rs`.
//!
//! # Features
//!
//! - **search**: classifier, facet compiler and resolver, plus the two
//!   search endpoints
//! - **mappings**: mapping detail, related entries, releases, status and
//!   alignment-difference updates
//! - **comments**: curator comments with soft delete

pub mod comments;
pub mod mappings;
pub mod search;
pub mod shared;

use axum::Router;
use std::sync::Arc;

use crate::external::SequenceService;
use crate::store::MappingStore;
use crate::vocabulary::Vocabulary;

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    pub store: Arc<dyn MappingStore>,
    /// Loaded once at startup
    pub vocabulary: Arc<Vocabulary>,
    pub sequences: Arc<dyn SequenceService>,
}

/// Mounts every feature under the API root
///
/// - `/mappings` - search and release listings
/// - `/mapping/:id` - one mapping, its status, comments and alignments
pub fn router(state: FeatureState) -> Router<()> {
    Router::new()
        .nest("/mappings", search::search_routes().merge(mappings::collection_routes()))
        .nest(
            "/mapping",
            mappings::mapping_routes().merge(comments::comment_routes()),
        )
        .with_state(state)
}
