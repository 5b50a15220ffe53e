//! Document index and retrieval.
//!
//! - `loader`: extracts text from the corpus directory
//! - `chunker`: splits text into overlapping windows
//! - `indexer`: fingerprint-gated index builds
//! - `store` / `sqlite`: the embedding index itself
//! - `retriever`: query-time similarity search

pub mod chunker;
pub mod indexer;
pub mod loader;
pub mod retriever;
pub mod sqlite;
pub mod store;

pub use retriever::Retriever;
pub use sqlite::SqliteDocStore;
pub use store::{DocChunk, DocSearchResult, DocumentStore};
