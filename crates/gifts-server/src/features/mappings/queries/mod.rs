pub mod get_mapping;
pub mod pairwise;
pub mod releases;
pub mod statuses;

pub use get_mapping::{GetMappingError, GetMappingQuery, GetMappingResponse};
pub use pairwise::{PairwiseError, PairwiseResponse};
pub use releases::{ReleaseError, ReleaseMappingsQuery};
pub use statuses::StatusHistoryError;
