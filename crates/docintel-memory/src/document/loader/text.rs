use std::path::Path;
use std::pin::Pin;

use super::super::{DEFAULT_MAX_FILE_SIZE, Document, DocumentError, DocumentLoader};
use super::{check_size, metadata_for};

pub struct TextLoader {
    pub max_file_size: u64,
}

impl Default for TextLoader {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl DocumentLoader for TextLoader {
    fn load(
        &self,
        path: &Path,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Document, DocumentError>> + Send + '_>>
    {
        let path = path.to_path_buf();
        let max_size = self.max_file_size;
        Box::pin(async move {
            let path = std::fs::canonicalize(&path)?;
            check_size(&path, max_size).await?;

            // Invalid UTF-8 surfaces as io::ErrorKind::InvalidData.
            let content = tokio::fs::read_to_string(&path).await?;

            Ok(Document {
                content,
                metadata: metadata_for(&path, "text/plain"),
            })
        })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["txt"]
    }
}
