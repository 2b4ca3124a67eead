use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub synthesis: SynthesisConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IndexConfig {
    /// Directory holding the SQLite index file.
    #[serde(default = "default_base_path")]
    pub base_path: PathBuf,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            base_path: default_base_path(),
        }
    }
}

fn default_base_path() -> PathBuf {
    PathBuf::from("./data")
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    #[serde(default = "default_document_chunk_size")]
    pub document_chunk_size: usize,
    #[serde(default = "default_overlap")]
    pub document_overlap: usize,
    #[serde(default = "default_email_chunk_size")]
    pub email_chunk_size: usize,
    #[serde(default = "default_overlap")]
    pub email_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            document_chunk_size: default_document_chunk_size(),
            document_overlap: default_overlap(),
            email_chunk_size: default_email_chunk_size(),
            email_overlap: default_overlap(),
        }
    }
}

fn default_document_chunk_size() -> usize {
    1000
}
fn default_overlap() -> usize {
    200
}
fn default_email_chunk_size() -> usize {
    500
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_embedding_model() -> String {
    "text-embedding-ada-002".to_string()
}
fn default_max_retries() -> u32 {
    5
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct SynthesisConfig {
    #[serde(default = "default_synthesis_model")]
    pub model: String,
    /// Kept low so answers lean deterministic.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            model: default_synthesis_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_synthesis_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_temperature() -> f64 {
    0.3
}
fn default_max_tokens() -> u32 {
    500
}

/// Load configuration from a TOML file.
///
/// A missing file yields the built-in defaults, so `docket` works out of
/// the box with only `OPENAI_API_KEY` in the environment.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate(&config)?;

    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.chunking.document_chunk_size == 0 || config.chunking.email_chunk_size == 0 {
        anyhow::bail!("chunking sizes must be > 0");
    }
    if config.chunking.document_overlap >= config.chunking.document_chunk_size {
        anyhow::bail!("chunking.document_overlap must be smaller than chunking.document_chunk_size");
    }
    if config.chunking.email_overlap >= config.chunking.email_chunk_size {
        anyhow::bail!("chunking.email_overlap must be smaller than chunking.email_chunk_size");
    }
    if !(0.0..=2.0).contains(&config.synthesis.temperature) {
        anyhow::bail!("synthesis.temperature must be in [0.0, 2.0]");
    }
    if config.synthesis.max_tokens == 0 {
        anyhow::bail!("synthesis.max_tokens must be > 0");
    }
    Ok(())
}
