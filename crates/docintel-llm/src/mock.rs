//! Deterministic embedder for tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::LlmError;
use crate::provider::EmbeddingProvider;

/// Returns `embedding` for every input unless an exact-text override exists.
#[derive(Debug, Clone)]
pub struct MockEmbedder {
    pub embedding: Vec<f32>,
    pub overrides: HashMap<String, Vec<f32>>,
    pub fail: bool,
    calls: Arc<AtomicUsize>,
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self {
            embedding: vec![1.0, 0.0, 0.0],
            overrides: HashMap::new(),
            fail: false,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl MockEmbedder {
    #[must_use]
    pub fn with_embedding(embedding: Vec<f32>) -> Self {
        Self {
            embedding,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_override(mut self, text: impl Into<String>, embedding: Vec<f32>) -> Self {
        self.overrides.insert(text.into(), embedding);
        self
    }

    /// Number of texts embedded so far, shared across clones.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl EmbeddingProvider for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        if self.fail {
            return Err(LlmError::Other("mock embedding error".into()));
        }
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(self
            .overrides
            .get(text)
            .cloned()
            .unwrap_or_else(|| self.embedding.clone()))
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "mock"
    }
}
