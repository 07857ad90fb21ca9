#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    #[error("LLM error: {0}")]
    Llm(#[from] docintel_llm::LlmError),

    #[error("index error: {0}")]
    Index(#[from] crate::index::IndexError),
}
