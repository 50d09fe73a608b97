//! Curator comments on mappings

pub mod commands;
pub mod queries;
pub mod routes;

pub use routes::comment_routes;
