//! GIFTS Common Library
//!
//! Shared plumbing for the GIFTS workspace members.
//!
//! - **Error Handling**: [`GiftsError`] and the [`Result`] alias
//! - **Logging**: tracing subscriber setup driven by `LOG_*` variables
//!
//! # Example
//!
//! ```no_run
//! use gifts_common::logging::{init_logging, LogConfig};
//!
//! fn main() -> gifts_common::Result<()> {
//!     let config = LogConfig::from_env()?;
//!     let _guard = init_logging(&config)?;
//!     tracing::info!("ready");
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod error;
pub mod logging;

pub use error::{GiftsError, Result};
