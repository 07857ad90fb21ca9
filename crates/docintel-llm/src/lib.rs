//! Sentence-embedding providers and the backend-agnostic [`EmbeddingProvider`] trait.

pub mod any;
#[cfg(feature = "candle")]
pub mod candle_provider;
pub mod error;
#[cfg(feature = "mock")]
pub mod mock;
pub mod ollama;
pub mod provider;

pub use any::AnyEmbedder;
pub use error::LlmError;
pub use provider::EmbeddingProvider;
