//! Retrieval of document context for a query vector

pub mod search;

pub use search::VectorIndexGateway;
