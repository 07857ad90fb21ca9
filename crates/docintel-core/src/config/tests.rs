use std::io::Write;

use serial_test::serial;

use super::*;

const ENV_KEYS: [&str; 11] = [
    "DOCINTEL_CHUNK_SIZE",
    "DOCINTEL_CHUNK_OVERLAP",
    "DOCINTEL_MAX_FILE_SIZE",
    "DOCINTEL_TOP_K",
    "DOCINTEL_SCORE_THRESHOLD",
    "DOCINTEL_EMBEDDING_PROVIDER",
    "DOCINTEL_EMBEDDING_MODEL",
    "DOCINTEL_EMBEDDING_BASE_URL",
    "DOCINTEL_EMBEDDING_DEVICE",
    "DOCINTEL_GATEWAY_BIND",
    "DOCINTEL_GATEWAY_PORT",
];

fn clear_env() {
    for key in ENV_KEYS {
        unsafe { std::env::remove_var(key) };
    }
}

#[test]
fn defaults() {
    let config = Config::default();
    assert_eq!(config.document.chunk_size, 500);
    assert_eq!(config.document.chunk_overlap, 50);
    assert_eq!(config.document.max_file_size, 50 * 1024 * 1024);
    assert_eq!(config.retrieval.top_k, 5);
    assert!((config.retrieval.score_threshold - 0.3).abs() < f32::EPSILON);
    assert_eq!(config.embedding.provider, EmbeddingProviderKind::Candle);
    assert_eq!(config.embedding.model, "sentence-transformers/all-MiniLM-L6-v2");
    assert_eq!(config.embedding.device, "cpu");
    assert_eq!(config.gateway.bind, "127.0.0.1");
    assert_eq!(config.gateway.port, 8090);
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn missing_file_uses_defaults() {
    clear_env();
    let config = Config::load(std::path::Path::new("/nonexistent/docintel.toml")).unwrap();
    assert_eq!(config.document.chunk_size, 500);
    assert_eq!(config.retrieval.top_k, 5);
}

#[test]
#[serial]
fn parse_partial_toml() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.toml");
    let mut f = std::fs::File::create(&path).unwrap();
    write!(
        f,
        r#"
[document]
chunk_size = 200

[retrieval]
score_threshold = 0.45

[embedding]
provider = "ollama"
model = "all-minilm"
"#
    )
    .unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.document.chunk_size, 200);
    assert_eq!(config.document.chunk_overlap, 50);
    assert_eq!(config.retrieval.top_k, 5);
    assert!((config.retrieval.score_threshold - 0.45).abs() < f32::EPSILON);
    assert_eq!(config.embedding.provider, EmbeddingProviderKind::Ollama);
    assert_eq!(config.embedding.model, "all-minilm");
    assert_eq!(config.gateway.port, 8090);
}

#[test]
#[serial]
fn shipped_default_toml_matches_defaults() {
    clear_env();
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/default.toml");
    let config = Config::load(&path).unwrap();
    let defaults = Config::default();
    assert_eq!(config.document.chunk_size, defaults.document.chunk_size);
    assert_eq!(config.document.chunk_overlap, defaults.document.chunk_overlap);
    assert_eq!(config.document.max_file_size, defaults.document.max_file_size);
    assert_eq!(config.retrieval.top_k, defaults.retrieval.top_k);
    assert_eq!(config.embedding.provider, defaults.embedding.provider);
    assert_eq!(config.embedding.model, defaults.embedding.model);
    assert_eq!(config.gateway.max_body_size, defaults.gateway.max_body_size);
}

#[test]
#[serial]
fn invalid_toml_is_an_error() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[document\nchunk_size = ").unwrap();
    assert!(Config::load(&path).is_err());
}

#[test]
#[serial]
fn env_overrides() {
    clear_env();
    unsafe {
        std::env::set_var("DOCINTEL_CHUNK_SIZE", "300");
        std::env::set_var("DOCINTEL_CHUNK_OVERLAP", "30");
        std::env::set_var("DOCINTEL_TOP_K", "3");
        std::env::set_var("DOCINTEL_SCORE_THRESHOLD", "0.5");
        std::env::set_var("DOCINTEL_EMBEDDING_PROVIDER", "ollama");
        std::env::set_var("DOCINTEL_EMBEDDING_MODEL", "nomic-embed-text");
        std::env::set_var("DOCINTEL_GATEWAY_PORT", "9000");
    }
    let mut config = Config::default();
    config.apply_env_overrides();
    clear_env();

    assert_eq!(config.document.chunk_size, 300);
    assert_eq!(config.document.chunk_overlap, 30);
    assert_eq!(config.retrieval.top_k, 3);
    assert!((config.retrieval.score_threshold - 0.5).abs() < f32::EPSILON);
    assert_eq!(config.embedding.provider, EmbeddingProviderKind::Ollama);
    assert_eq!(config.embedding.model, "nomic-embed-text");
    assert_eq!(config.gateway.port, 9000);
}

#[test]
#[serial]
fn invalid_env_values_ignored() {
    clear_env();
    unsafe {
        std::env::set_var("DOCINTEL_CHUNK_SIZE", "lots");
        std::env::set_var("DOCINTEL_EMBEDDING_PROVIDER", "openai");
        std::env::set_var("DOCINTEL_GATEWAY_PORT", "70000");
    }
    let mut config = Config::default();
    config.apply_env_overrides();
    clear_env();

    assert_eq!(config.document.chunk_size, 500);
    assert_eq!(config.embedding.provider, EmbeddingProviderKind::Candle);
    assert_eq!(config.gateway.port, 8090);
}

#[test]
fn validate_rejects_overlap_not_below_chunk_size() {
    let mut config = Config::default();
    config.document.chunk_overlap = config.document.chunk_size;
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("chunk_overlap"));
}

#[test]
fn validate_rejects_zero_top_k() {
    let mut config = Config::default();
    config.retrieval.top_k = 0;
    assert!(config.validate().is_err());
}

#[test]
fn validate_rejects_threshold_out_of_range() {
    let mut config = Config::default();
    config.retrieval.score_threshold = 1.5;
    assert!(config.validate().is_err());
    config.retrieval.score_threshold = f32::NAN;
    assert!(config.validate().is_err());
}

#[test]
fn validate_rejects_zero_max_file_size() {
    let mut config = Config::default();
    config.document.max_file_size = 0;
    assert!(config.validate().is_err());
}

#[test]
fn splitter_config_mirrors_document_section() {
    let mut config = Config::default();
    config.document.chunk_size = 120;
    config.document.chunk_overlap = 20;
    let splitter = config.splitter_config();
    assert_eq!(splitter.chunk_size, 120);
    assert_eq!(splitter.chunk_overlap, 20);
}

#[test]
fn provider_kind_display() {
    assert_eq!(EmbeddingProviderKind::Candle.to_string(), "candle");
    assert_eq!(EmbeddingProviderKind::Ollama.to_string(), "ollama");
}

#[test]
fn config_roundtrips_through_toml() {
    let config = Config::default();
    let serialized = toml::to_string(&config).unwrap();
    let parsed: Config = toml::from_str(&serialized).unwrap();
    assert_eq!(parsed.document.chunk_size, config.document.chunk_size);
    assert_eq!(parsed.embedding.provider, config.embedding.provider);
}
