pub mod search_mappings;
pub mod search_views;

pub use search_mappings::{SearchMappingsError, SearchMappingsQuery, SearchMappingsResponse};
pub use search_views::{SearchViewsError, SearchViewsQuery, SearchViewsResponse};

use super::facets::{FacetError, FacetSet};
use super::predicate::Predicate;
use super::resolver::SearchTarget;
use crate::vocabulary::Vocabulary;

/// Compile an optional facet string
pub(crate) fn facet_filter(
    facets: Option<&str>,
    target: SearchTarget,
    vocabulary: &Vocabulary,
) -> Result<Predicate, FacetError> {
    match facets {
        Some(raw) => FacetSet::parse(raw)?.compile(target, vocabulary),
        None => Ok(Predicate::All),
    }
}
