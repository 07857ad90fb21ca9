use std::future::Future;

use crate::error::LlmError;

/// Anything that turns text into a fixed-length vector.
///
/// Implementations must return vectors of the same dimensionality for every
/// input, otherwise cosine scores between chunks and queries are meaningless.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single string.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to produce an embedding.
    fn embed(&self, text: &str) -> impl Future<Output = Result<Vec<f32>, LlmError>> + Send;

    /// Embed many strings, preserving input order.
    ///
    /// The default implementation calls [`EmbeddingProvider::embed`] sequentially.
    ///
    /// # Errors
    ///
    /// Returns the first embedding error encountered.
    fn embed_batch(
        &self,
        texts: &[String],
    ) -> impl Future<Output = Result<Vec<Vec<f32>>, LlmError>> + Send {
        async move {
            let mut vectors = Vec::with_capacity(texts.len());
            for text in texts {
                vectors.push(self.embed(text).await?);
            }
            Ok(vectors)
        }
    }

    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct LengthEmbedder;

    impl EmbeddingProvider for LengthEmbedder {
        #[allow(clippy::cast_precision_loss)]
        async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
            if text.is_empty() {
                return Err(LlmError::Other("empty input".into()));
            }
            Ok(vec![text.len() as f32, 1.0])
        }

        fn name(&self) -> &'static str {
            "length"
        }
    }

    #[tokio::test]
    async fn default_batch_preserves_order() {
        let texts = vec!["a".to_owned(), "abc".to_owned(), "ab".to_owned()];
        let vectors = LengthEmbedder.embed_batch(&texts).await.unwrap();
        assert_eq!(vectors.len(), 3);
        assert!((vectors[0][0] - 1.0).abs() < f32::EPSILON);
        assert!((vectors[1][0] - 3.0).abs() < f32::EPSILON);
        assert!((vectors[2][0] - 2.0).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn default_batch_stops_on_first_error() {
        let texts = vec!["ok".to_owned(), String::new()];
        let result = LengthEmbedder.embed_batch(&texts).await;
        assert!(matches!(result, Err(LlmError::Other(_))));
    }

    #[tokio::test]
    async fn default_batch_empty_input() {
        let vectors = LengthEmbedder.embed_batch(&[]).await.unwrap();
        assert!(vectors.is_empty());
    }
}
