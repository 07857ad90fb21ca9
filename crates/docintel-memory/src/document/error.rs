#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("file too large: {0} bytes")]
    FileTooLarge(u64),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("DOCX error: {0}")]
    Docx(String),

    #[error("chunk_size ({chunk_size}) must be greater than chunk_overlap ({chunk_overlap})")]
    InvalidChunking {
        chunk_size: usize,
        chunk_overlap: usize,
    },
}
