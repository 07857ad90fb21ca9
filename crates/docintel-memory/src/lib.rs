//! Document ingestion and in-memory semantic retrieval.

pub mod document;
pub mod error;
pub mod index;
pub mod retriever;

pub use error::MemoryError;
pub use index::{EmbeddingIndex, IndexError, ScoredChunk};
pub use retriever::Retriever;
