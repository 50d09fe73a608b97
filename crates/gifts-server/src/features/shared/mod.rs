//! Helpers shared across feature slices

pub mod pagination;

pub use pagination::{PaginationError, PaginationMetadata, PaginationParams};
