mod prompt;

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use docintel_core::Session;
use docintel_core::config::{Config, EmbeddingProviderKind};
use docintel_gateway::GatewayServer;
use docintel_llm::AnyEmbedder;
use docintel_llm::ollama::OllamaEmbedder;
use tokio::sync::watch;

#[derive(Parser)]
#[command(name = "docintel", version, about = "Ask questions about logistics documents")]
struct Cli {
    /// Path to a TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP gateway.
    Serve,
    /// Load a document and answer a question, or prompt for questions.
    Ask {
        file: PathBuf,
        question: Vec<String>,
    },
    /// Load a document and print its shipment fields as JSON.
    Extract { file: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_subscriber();

    let config_path = resolve_config_path(cli.config.as_deref());
    let config = Config::load(&config_path)?;
    config.validate()?;
    tracing::debug!(path = %config_path.display(), "configuration loaded");

    let embedder = create_embedder(&config)?;
    let mut session = Session::new(embedder, &config)?;

    match cli.command {
        Command::Serve => serve(session, &config).await,
        Command::Ask { file, question } => {
            load_file(&mut session, &file).await?;
            if question.is_empty() {
                prompt::run(&session).await
            } else {
                let answer = session.ask(&question.join(" ")).await?;
                println!("{}", serde_json::to_string_pretty(&answer)?);
                Ok(())
            }
        }
        Command::Extract { file } => {
            load_file(&mut session, &file).await?;
            let fields = session
                .extract()
                .context("document was not loaded into the session")?;
            println!("{}", serde_json::to_string_pretty(&fields)?);
            Ok(())
        }
    }
}

async fn serve(session: Session<AnyEmbedder>, config: &Config) -> anyhow::Result<()> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {e:#}");
            return;
        }
        tracing::info!("received shutdown signal");
        let _ = shutdown_tx.send(true);
    });

    GatewayServer::new(&config.gateway.bind, config.gateway.port, session, shutdown_rx)
        .with_max_body_size(config.gateway.max_body_size)
        .serve()
        .await?;
    Ok(())
}

async fn load_file(session: &mut Session<AnyEmbedder>, path: &Path) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("{} has no file name", path.display()))?;

    let summary = session.upload(&file_name, &bytes).await?;
    eprintln!(
        "Document processed: {} ({} words). Total chunks: {}",
        summary.source, summary.word_count, summary.chunk_count
    );
    Ok(())
}

fn create_embedder(config: &Config) -> anyhow::Result<AnyEmbedder> {
    let embedding = &config.embedding;
    match embedding.provider {
        EmbeddingProviderKind::Ollama => Ok(AnyEmbedder::Ollama(OllamaEmbedder::new(
            &embedding.base_url,
            embedding.model.clone(),
        ))),
        #[cfg(feature = "candle")]
        EmbeddingProviderKind::Candle => {
            let device = select_device(&embedding.device)?;
            let embedder = docintel_llm::candle_provider::CandleEmbedder::load(&embedding.model, &device)
                .with_context(|| format!("failed to load embedding model {}", embedding.model))?;
            Ok(AnyEmbedder::Candle(embedder))
        }
        #[allow(unreachable_patterns)]
        other => bail!("embedding provider {other} not available (feature not enabled)"),
    }
}

#[cfg(feature = "candle")]
fn select_device(preference: &str) -> anyhow::Result<docintel_llm::candle_provider::Device> {
    match preference {
        "metal" => {
            #[cfg(feature = "metal")]
            return Ok(docintel_llm::candle_provider::Device::new_metal(0)?);
            #[cfg(not(feature = "metal"))]
            bail!("candle compiled without metal feature");
        }
        "cuda" => {
            #[cfg(feature = "cuda")]
            return Ok(docintel_llm::candle_provider::Device::new_cuda(0)?);
            #[cfg(not(feature = "cuda"))]
            bail!("candle compiled without cuda feature");
        }
        "auto" => {
            #[cfg(feature = "metal")]
            if let Ok(device) = docintel_llm::candle_provider::Device::new_metal(0) {
                return Ok(device);
            }
            #[cfg(feature = "cuda")]
            if let Ok(device) = docintel_llm::candle_provider::Device::new_cuda(0) {
                return Ok(device);
            }
            Ok(docintel_llm::candle_provider::Device::Cpu)
        }
        _ => Ok(docintel_llm::candle_provider::Device::Cpu),
    }
}

fn resolve_config_path(cli_path: Option<&Path>) -> PathBuf {
    if let Some(path) = cli_path {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var("DOCINTEL_CONFIG") {
        return PathBuf::from(path);
    }
    PathBuf::from("config/default.toml")
}

fn init_subscriber() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
