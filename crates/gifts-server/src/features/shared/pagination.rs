//! Shared pagination utilities
//!
//! List endpoints take `limit`/`offset` query parameters. For grouped
//! search results both count groups, not rows.
//!
//! ```rust,ignore
//! use gifts_server::features::shared::pagination::{PaginationParams, PaginationMetadata};
//!
//! let params = PaginationParams::new(Some(20), Some(40));
//! params.validate()?;
//! let metadata = PaginationMetadata::from_params(&params, 95);
//! assert!(metadata.has_next);
//! ```

use serde::{Deserialize, Serialize};

use crate::store::PageRequest;

pub const DEFAULT_LIMIT: i64 = 20;

pub const MAX_LIMIT: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PaginationError {
    #[error("Limit must be between 1 and {MAX_LIMIT}")]
    InvalidLimit,
    #[error("Offset cannot be negative")]
    InvalidOffset,
}

/// Common pagination request parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct PaginationParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
}

impl PaginationParams {
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Self {
        Self { limit, offset }
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    pub fn validate(&self) -> Result<(), PaginationError> {
        if let Some(limit) = self.limit {
            if !(1..=MAX_LIMIT).contains(&limit) {
                return Err(PaginationError::InvalidLimit);
            }
        }
        if self.offset.is_some_and(|o| o < 0) {
            return Err(PaginationError::InvalidOffset);
        }
        Ok(())
    }

    pub fn page_request(&self) -> PageRequest {
        PageRequest {
            limit: self.limit(),
            offset: self.offset(),
        }
    }
}

/// Pagination metadata for response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMetadata {
    pub limit: i64,
    pub offset: i64,
    /// Total number of items (groups for grouped results)
    pub total: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationMetadata {
    pub fn new(limit: i64, offset: i64, total: i64) -> Self {
        Self {
            limit,
            offset,
            total,
            has_next: offset + limit < total,
            has_prev: offset > 0,
        }
    }

    pub fn from_params(params: &PaginationParams, total: i64) -> Self {
        Self::new(params.limit(), params.offset(), total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = PaginationParams::default();
        assert_eq!(params.limit(), DEFAULT_LIMIT);
        assert_eq!(params.offset(), 0);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        assert_eq!(
            PaginationParams::new(Some(0), None).validate(),
            Err(PaginationError::InvalidLimit)
        );
        assert_eq!(
            PaginationParams::new(Some(101), None).validate(),
            Err(PaginationError::InvalidLimit)
        );
        assert_eq!(
            PaginationParams::new(None, Some(-1)).validate(),
            Err(PaginationError::InvalidOffset)
        );
        assert!(PaginationParams::new(Some(100), Some(500)).validate().is_ok());
    }

    #[test]
    fn test_metadata_navigation() {
        let meta = PaginationMetadata::new(20, 0, 45);
        assert!(meta.has_next);
        assert!(!meta.has_prev);

        let meta = PaginationMetadata::new(20, 40, 45);
        assert!(!meta.has_next);
        assert!(meta.has_prev);

        let meta = PaginationMetadata::new(20, 0, 0);
        assert!(!meta.has_next);
    }
}
