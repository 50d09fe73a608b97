//! Mapping search
//!
//! A request carries an optional `searchTerm` and an optional `facets`
//! string. The term is classified ([`classifier`]) and resolved to a base
//! predicate for the target collection ([`resolver`]); the facets compile
//! to a second predicate ([`facets`]); the store evaluates their
//! conjunction and returns a page of groups.

pub mod classifier;
pub mod facets;
pub mod predicate;
pub mod queries;
pub mod resolver;
pub mod routes;

pub use routes::search_routes;
