use docintel_llm::EmbeddingProvider;
use docintel_memory::MemoryError;
use docintel_memory::Retriever;
use docintel_memory::document::{Document, DocumentError, LoaderRegistry, TextSplitter};
use serde::Serialize;

use crate::config::{Config, RetrievalConfig};
use crate::extract::{ExtractedFields, answer_from_text, extract_all};

pub const NO_DOCUMENT_ANSWER: &str = "Upload a document first";
pub const NOT_FOUND_ANSWER: &str = "Not found in document";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Memory(#[from] MemoryError),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub answer: String,
    /// Best retrieval score, clamped to `[0, 1]`. Zero when nothing was found.
    pub confidence: f32,
    /// Text of the chunk the answer came from.
    pub source: Option<String>,
}

impl Answer {
    fn fixed(answer: &str) -> Self {
        Self {
            answer: answer.to_owned(),
            confidence: 0.0,
            source: None,
        }
    }

    #[must_use]
    pub fn no_document() -> Self {
        Self::fixed(NO_DOCUMENT_ANSWER)
    }

    #[must_use]
    pub fn not_found() -> Self {
        Self::fixed(NOT_FOUND_ANSWER)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadSummary {
    pub source: String,
    pub chunk_count: usize,
    pub word_count: usize,
}

#[derive(Debug)]
enum SessionState {
    Empty,
    Ready { document: Document },
}

/// One user's working set: the current document, its chunks and their vectors.
///
/// Uploading replaces everything; a failed upload leaves the previous
/// document in place.
pub struct Session<E> {
    loaders: LoaderRegistry,
    splitter: TextSplitter,
    retriever: Retriever<E>,
    retrieval: RetrievalConfig,
    state: SessionState,
}

impl<E: EmbeddingProvider> Session<E> {
    /// # Errors
    ///
    /// Returns an error if the chunking settings in `config` are invalid.
    pub fn new(embedder: E, config: &Config) -> Result<Self, SessionError> {
        Ok(Self {
            loaders: LoaderRegistry::new(config.document.max_file_size),
            splitter: TextSplitter::new(config.splitter_config())?,
            retriever: Retriever::new(embedder),
            retrieval: config.retrieval.clone(),
            state: SessionState::Empty,
        })
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self.state, SessionState::Ready { .. })
    }

    #[must_use]
    pub fn document(&self) -> Option<&Document> {
        match &self.state {
            SessionState::Empty => None,
            SessionState::Ready { document } => Some(document),
        }
    }

    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.retriever.chunk_count()
    }

    /// Parse, chunk and index an uploaded file, replacing the current document.
    ///
    /// # Errors
    ///
    /// Returns an error if the file type is unsupported, the file cannot be
    /// parsed, or embedding fails. The session keeps its previous state.
    pub async fn upload(&mut self, file_name: &str, bytes: &[u8]) -> Result<UploadSummary, SessionError> {
        let document = self.loaders.load_upload(file_name, bytes).await?;
        let word_count = document.word_count();
        let chunks = self.splitter.split(&document);
        let chunk_count = self.retriever.index(chunks).await?;

        let summary = UploadSummary {
            source: document.metadata.source.clone(),
            chunk_count,
            word_count,
        };
        tracing::info!(
            source = %summary.source,
            chunks = chunk_count,
            words = word_count,
            "document processed"
        );
        self.state = SessionState::Ready { document };
        Ok(summary)
    }

    /// Answer a question from the best-matching chunks of the current document.
    /// A document that produced no chunks counts as no document.
    ///
    /// # Errors
    ///
    /// Returns an error if the question cannot be embedded.
    pub async fn ask(&self, question: &str) -> Result<Answer, SessionError> {
        if !self.is_ready() || self.chunk_count() == 0 {
            return Ok(Answer::no_document());
        }

        let results = self.retriever.retrieve(question, self.retrieval.top_k).await?;
        let Some(best) = results.first().map(|r| r.score) else {
            return Ok(Answer::not_found());
        };
        if best < self.retrieval.score_threshold {
            tracing::debug!(best, threshold = self.retrieval.score_threshold, "below guardrail");
            return Ok(Answer::not_found());
        }

        for scored in &results {
            if let Some(answer) = answer_from_text(question, &scored.chunk.content) {
                return Ok(Answer {
                    answer,
                    confidence: best.clamp(0.0, 1.0),
                    source: Some(scored.chunk.content.clone()),
                });
            }
        }

        Ok(Answer::not_found())
    }

    /// Structured fields from the full document text, or `None` before the
    /// first upload and when the document has no text.
    #[must_use]
    pub fn extract(&self) -> Option<ExtractedFields> {
        let document = self.document().filter(|d| !d.content.trim().is_empty())?;
        let fields = extract_all(&document.content);
        tracing::debug!(
            source = %document.metadata.source,
            found = fields.found_count(),
            "extracted fields"
        );
        Some(fields)
    }
}
