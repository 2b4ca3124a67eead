//! # Docket CLI (`docket`)
//!
//! Thin command-line surface over the ingestion and retrieval services.
//!
//! ```bash
//! docket init                                # create the index database
//! docket ingest acme ./contract.pdf          # ingest one document
//! docket ingest-mail acme                    # ingest the demo mail thread
//! docket ask acme "What was the grant size?" # ask a question
//! docket stats acme                          # indexed chunk count
//! ```
//!
//! All commands accept `--config` pointing to a TOML file; without one the
//! built-in defaults apply and only `OPENAI_API_KEY` is needed.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use docket::config::{load_config, Config};
use docket::embedding::OpenAiEmbedder;
use docket::ingest::IngestionService;
use docket::mail::AdvisorGrantThread;
use docket::models::SourceRef;
use docket::retrieve::RetrievalService;
use docket::store::sqlite::SqliteIndex;
use docket::store::TenantIndex;
use docket::synthesis::OpenAiSynthesizer;

#[derive(Parser)]
#[command(
    name = "docket",
    about = "Per-client ingestion and grounded retrieval for legal documents and mail",
    version
)]
struct Cli {
    /// Path to configuration file (TOML). Missing file means defaults.
    #[arg(long, global = true, default_value = "./config/docket.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the index database. Idempotent.
    Init,

    /// Ingest one document (pdf, docx, or txt) for a client.
    Ingest {
        /// Client identifier; each client gets an isolated collection.
        client: String,
        /// Path to the document to ingest.
        file: PathBuf,
    },

    /// Ingest the built-in advisor equity grant mail thread for a client.
    IngestMail {
        client: String,
    },

    /// Ask a question against a client's indexed sources.
    Ask {
        client: String,
        question: String,
    },

    /// Show the number of indexed chunks for a client.
    Stats {
        client: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            SqliteIndex::open(&config.index.base_path).await?;
            println!("index initialized at {}", config.index.base_path.display());
        }
        Commands::Ingest { client, file } => {
            let filename = file
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| anyhow::anyhow!("invalid file path: {}", file.display()))?
                .to_string();
            let bytes = std::fs::read(&file)?;

            let report = ingestion_service(&config)
                .await?
                .ingest_document(&client, &filename, &bytes)
                .await?;
            println!("ingested {}", report.filename);
            println!("  chunks processed: {}", report.chunks_processed);
        }
        Commands::IngestMail { client } => {
            let report = ingestion_service(&config)
                .await?
                .ingest_mailbox(&client, &AdvisorGrantThread)
                .await?;
            println!("ingested mail thread");
            println!("  emails processed: {}", report.emails_processed);
            println!("  chunks created: {}", report.chunks_created);
        }
        Commands::Ask { client, question } => {
            let index = open_index(&config).await?;
            let embedder = Arc::new(OpenAiEmbedder::new(&config.embedding)?);
            let synthesizer = Arc::new(OpenAiSynthesizer::new(&config.synthesis)?);
            let service = RetrievalService::new(embedder, synthesizer, index);

            let answer = service.ask(&client, &question).await?;
            println!("{}", answer.answer);
            if !answer.sources.is_empty() {
                println!("\nSources:");
                for source in &answer.sources {
                    match source {
                        SourceRef::Document { filename } => println!("  - {}", filename),
                        SourceRef::Email { subject, from } => {
                            println!("  - {} <{}>", subject, from)
                        }
                    }
                }
            }
        }
        Commands::Stats { client } => {
            let index = open_index(&config).await?;
            let count = index.count(&client).await?;
            println!("{}: {} indexed chunks", client, count);
        }
    }

    Ok(())
}

async fn open_index(config: &Config) -> Result<Arc<dyn TenantIndex>> {
    Ok(Arc::new(SqliteIndex::open(&config.index.base_path).await?))
}

async fn ingestion_service(config: &Config) -> Result<IngestionService> {
    let index = open_index(config).await?;
    let embedder = Arc::new(OpenAiEmbedder::new(&config.embedding)?);
    Ok(IngestionService::new(
        embedder,
        index,
        config.chunking.clone(),
    ))
}
