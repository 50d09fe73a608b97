//! Single-mapping views and curation writes

pub mod assembler;
pub mod commands;
pub mod grouping;
pub mod queries;
pub mod routes;

pub use routes::{collection_routes, mapping_routes};
