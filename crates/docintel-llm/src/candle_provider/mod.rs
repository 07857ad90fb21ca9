pub mod embed;

pub use candle_core::Device;

use std::sync::Arc;

use self::embed::EmbedModel;
use crate::error::LlmError;
use crate::provider::EmbeddingProvider;

/// Local BERT sentence embeddings (e.g. `sentence-transformers/all-MiniLM-L6-v2`).
///
/// Inference is CPU/GPU bound and runs on the blocking thread pool.
#[derive(Clone)]
pub struct CandleEmbedder {
    model: Arc<EmbedModel>,
    repo_id: String,
}

impl std::fmt::Debug for CandleEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CandleEmbedder")
            .field("repo_id", &self.repo_id)
            .field("device", &self.device_name())
            .finish_non_exhaustive()
    }
}

impl CandleEmbedder {
    /// Download (or reuse the hub cache) and load the model onto `device`.
    ///
    /// # Errors
    ///
    /// Returns an error if the model cannot be downloaded or loaded.
    pub fn load(repo_id: &str, device: &Device) -> Result<Self, LlmError> {
        let model = EmbedModel::load(repo_id, device)?;
        tracing::info!(repo_id, device = device_label(device), "loaded embedding model");
        Ok(Self {
            model: Arc::new(model),
            repo_id: repo_id.to_owned(),
        })
    }

    #[must_use]
    pub fn device_name(&self) -> &'static str {
        device_label(self.model.device())
    }
}

fn device_label(device: &Device) -> &'static str {
    match device {
        Device::Cpu => "cpu",
        Device::Cuda(_) => "cuda",
        Device::Metal(_) => "metal",
    }
}

impl EmbeddingProvider for CandleEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        let model = Arc::clone(&self.model);
        let text = text.to_owned();
        tokio::task::spawn_blocking(move || model.embed_sync(&text))
            .await
            .map_err(|e| LlmError::Inference(format!("candle embedding task failed: {e}")))?
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        let model = Arc::clone(&self.model);
        let texts = texts.to_vec();
        tokio::task::spawn_blocking(move || model.embed_batch_sync(&texts))
            .await
            .map_err(|e| LlmError::Inference(format!("candle embedding task failed: {e}")))?
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "candle"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_device_label() {
        assert_eq!(device_label(&Device::Cpu), "cpu");
    }

    #[tokio::test]
    #[ignore = "downloads sentence-transformers/all-MiniLM-L6-v2 from HuggingFace"]
    async fn integration_minilm_embeddings_are_normalized() {
        let embedder =
            CandleEmbedder::load("sentence-transformers/all-MiniLM-L6-v2", &Device::Cpu).unwrap();
        let vector = embedder.embed("Carrier: Acme Logistics").await.unwrap();
        assert_eq!(vector.len(), 384);
        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-3);
    }
}
