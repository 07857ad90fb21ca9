use super::Config;

impl Config {
    pub(crate) fn apply_env_overrides(&mut self) {
        self.apply_env_overrides_document();
        self.apply_env_overrides_embedding();
        self.apply_env_overrides_gateway();
    }

    fn apply_env_overrides_document(&mut self) {
        if let Some(n) = parse_env::<usize>("DOCINTEL_CHUNK_SIZE") {
            self.document.chunk_size = n;
        }
        if let Some(n) = parse_env::<usize>("DOCINTEL_CHUNK_OVERLAP") {
            self.document.chunk_overlap = n;
        }
        if let Some(bytes) = parse_env::<u64>("DOCINTEL_MAX_FILE_SIZE") {
            self.document.max_file_size = bytes;
        }
        if let Some(k) = parse_env::<usize>("DOCINTEL_TOP_K") {
            self.retrieval.top_k = k;
        }
        if let Some(threshold) = parse_env::<f32>("DOCINTEL_SCORE_THRESHOLD") {
            self.retrieval.score_threshold = threshold;
        }
    }

    fn apply_env_overrides_embedding(&mut self) {
        if let Ok(v) = std::env::var("DOCINTEL_EMBEDDING_PROVIDER") {
            if let Ok(kind) = serde_json::from_value(serde_json::Value::String(v.clone())) {
                self.embedding.provider = kind;
            } else {
                tracing::warn!("ignoring invalid DOCINTEL_EMBEDDING_PROVIDER value: {v}");
            }
        }
        if let Ok(v) = std::env::var("DOCINTEL_EMBEDDING_MODEL") {
            self.embedding.model = v;
        }
        if let Ok(v) = std::env::var("DOCINTEL_EMBEDDING_BASE_URL") {
            self.embedding.base_url = v;
        }
        if let Ok(v) = std::env::var("DOCINTEL_EMBEDDING_DEVICE") {
            self.embedding.device = v;
        }
    }

    fn apply_env_overrides_gateway(&mut self) {
        if let Ok(v) = std::env::var("DOCINTEL_GATEWAY_BIND") {
            self.gateway.bind = v;
        }
        if let Some(port) = parse_env::<u16>("DOCINTEL_GATEWAY_PORT") {
            self.gateway.port = port;
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    let v = std::env::var(key).ok()?;
    if let Ok(parsed) = v.trim().parse::<T>() {
        Some(parsed)
    } else {
        tracing::warn!("ignoring invalid {key} value: {v}");
        None
    }
}
