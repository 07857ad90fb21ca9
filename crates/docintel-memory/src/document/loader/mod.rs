mod docx;
mod pdf;
mod text;

pub use docx::DocxLoader;
pub use pdf::PdfLoader;
pub use text::TextLoader;

use std::io::Write;
use std::path::Path;

use super::{DEFAULT_MAX_FILE_SIZE, Document, DocumentError, DocumentLoader, DocumentMetadata};

async fn check_size(path: &Path, max_size: u64) -> Result<(), DocumentError> {
    let meta = tokio::fs::metadata(path).await?;
    if meta.len() > max_size {
        return Err(DocumentError::FileTooLarge(meta.len()));
    }
    Ok(())
}

fn metadata_for(path: &Path, content_type: &str) -> DocumentMetadata {
    DocumentMetadata {
        source: path.display().to_string(),
        content_type: content_type.to_owned(),
    }
}

/// Lowercased extension of `file_name`, if any.
#[must_use]
pub fn file_extension(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

/// Dispatches to the PDF, DOCX or plain-text loader by file extension.
pub struct LoaderRegistry {
    text: TextLoader,
    pdf: PdfLoader,
    docx: DocxLoader,
    max_file_size: u64,
}

impl Default for LoaderRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FILE_SIZE)
    }
}

impl LoaderRegistry {
    #[must_use]
    pub fn new(max_file_size: u64) -> Self {
        Self {
            text: TextLoader { max_file_size },
            pdf: PdfLoader { max_file_size },
            docx: DocxLoader { max_file_size },
            max_file_size,
        }
    }

    /// # Errors
    ///
    /// Returns [`DocumentError::UnsupportedFormat`] for anything but `pdf`, `docx` and `txt`.
    pub fn for_extension(&self, ext: &str) -> Result<&dyn DocumentLoader, DocumentError> {
        let loaders: [&dyn DocumentLoader; 3] = [&self.pdf, &self.docx, &self.text];
        let ext = ext.to_ascii_lowercase();
        loaders
            .into_iter()
            .find(|l| l.supported_extensions().contains(&ext.as_str()))
            .ok_or(DocumentError::UnsupportedFormat(ext))
    }

    /// Parse uploaded bytes. The bytes are spooled to a temporary file that is
    /// removed when parsing finishes, whether or not it succeeded.
    ///
    /// # Errors
    ///
    /// Returns an error for unsupported extensions, oversized input, I/O
    /// failures, or parse failures.
    pub async fn load_upload(&self, file_name: &str, bytes: &[u8]) -> Result<Document, DocumentError> {
        let ext = file_extension(file_name)
            .ok_or_else(|| DocumentError::UnsupportedFormat(file_name.to_owned()))?;
        let loader = self.for_extension(&ext)?;

        let len = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        if len > self.max_file_size {
            return Err(DocumentError::FileTooLarge(len));
        }

        let mut tmp = tempfile::Builder::new()
            .prefix("docintel-")
            .suffix(&format!(".{ext}"))
            .tempfile()?;
        tmp.write_all(bytes)?;
        tmp.flush()?;

        let mut document = loader.load(tmp.path()).await?;
        document.metadata.source = file_name.to_owned();
        tracing::debug!(
            file_name,
            bytes = bytes.len(),
            chars = document.content.len(),
            "parsed upload"
        );
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_lowercased() {
        assert_eq!(file_extension("Rate_Confirmation.PDF").as_deref(), Some("pdf"));
        assert_eq!(file_extension("archive.tar.DOCX").as_deref(), Some("docx"));
        assert_eq!(file_extension("README"), None);
    }

    #[test]
    fn registry_dispatch() {
        let registry = LoaderRegistry::default();
        assert_eq!(registry.for_extension("pdf").unwrap().supported_extensions(), &["pdf"]);
        assert_eq!(registry.for_extension("DOCX").unwrap().supported_extensions(), &["docx"]);
        assert_eq!(registry.for_extension("txt").unwrap().supported_extensions(), &["txt"]);
    }

    #[test]
    fn unsupported_extension_rejected() {
        let registry = LoaderRegistry::default();
        let err = registry.for_extension("xlsx").err().unwrap();
        assert!(matches!(err, DocumentError::UnsupportedFormat(ref e) if e == "xlsx"));
        assert_eq!(err.to_string(), "unsupported file type: xlsx");
    }

    #[tokio::test]
    async fn upload_txt_uses_original_name_as_source() {
        let registry = LoaderRegistry::default();
        let doc = registry
            .load_upload("bol.TXT", b"Shipment_ID: SHP1234\n")
            .await
            .unwrap();
        assert_eq!(doc.content, "Shipment_ID: SHP1234\n");
        assert_eq!(doc.metadata.source, "bol.TXT");
    }

    #[tokio::test]
    async fn upload_docx() {
        let registry = LoaderRegistry::default();
        let bytes = super::docx::tests::docx_bytes(&super::docx::tests::body(&[
            "Equipment: Reefer",
            "Mode: FTL",
        ]));
        let doc = registry.load_upload("load.docx", &bytes).await.unwrap();
        assert_eq!(doc.content, "Equipment: Reefer\nMode: FTL");
    }

    #[tokio::test]
    async fn upload_unsupported_type() {
        let registry = LoaderRegistry::default();
        let result = registry.load_upload("notes.csv", b"a,b").await;
        assert!(matches!(result, Err(DocumentError::UnsupportedFormat(_))));
    }

    #[tokio::test]
    async fn upload_without_extension() {
        let registry = LoaderRegistry::default();
        let result = registry.load_upload("noext", b"text").await;
        assert!(matches!(result, Err(DocumentError::UnsupportedFormat(_))));
    }

    #[tokio::test]
    async fn upload_too_large() {
        let registry = LoaderRegistry::new(4);
        let result = registry.load_upload("big.txt", b"12345").await;
        assert!(matches!(result, Err(DocumentError::FileTooLarge(5))));
    }

    #[tokio::test]
    async fn upload_temp_file_removed_after_failure() {
        let registry = LoaderRegistry::default();
        let before = count_spooled_files();
        let result = registry.load_upload("broken.pdf", b"not a pdf").await;
        assert!(result.is_err());
        assert!(count_spooled_files() <= before);
    }

    fn count_spooled_files() -> usize {
        std::fs::read_dir(std::env::temp_dir())
            .map(|entries| {
                entries
                    .filter_map(Result::ok)
                    .filter(|e| {
                        let name = e.file_name().to_string_lossy().into_owned();
                        name.starts_with("docintel-") && name.ends_with(".pdf")
                    })
                    .count()
            })
            .unwrap_or(0)
    }
}
