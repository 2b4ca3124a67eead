//! # Docket
//!
//! Per-client ingestion and grounded retrieval core for legal documents
//! and mail.
//!
//! Docket ingests heterogeneous text sources (uploaded documents, email
//! threads) into an isolated vector collection per client, and answers
//! natural-language questions by retrieving the nearest chunks and
//! synthesizing a grounded, source-citing answer.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────────┐   ┌─────────────┐
//! │  Documents   │──▶│ IngestionService │──▶│ TenantIndex  │
//! │  Mail thread │   │ extract→chunk→   │   │ (SQLite, one │
//! └──────────────┘   │ embed→upsert     │   │ collection   │
//!                    └──────────────────┘   │ per client)  │
//!                                           └──────┬───────┘
//!                    ┌──────────────────┐          │
//!      question ────▶│ RetrievalService │◀─────────┘
//!                    │ embed→query→     │
//!      answer  ◀──── │ context→synth    │
//!                    └──────────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`error`] | Pipeline error taxonomy |
//! | [`extract`] | PDF/DOCX/TXT text normalization |
//! | [`chunk`] | Deterministic overlapping-window chunking |
//! | [`embedding`] | Embedding provider boundary |
//! | [`synthesis`] | Answer-synthesis boundary |
//! | [`store`] | Tenant vector store (SQLite + in-memory) |
//! | [`mail`] | Email thread model and demo fixture |
//! | [`ingest`] | Ingestion orchestration |
//! | [`retrieve`] | Question answering orchestration |

pub mod chunk;
pub mod config;
pub mod embedding;
pub mod error;
pub mod extract;
pub mod ingest;
pub mod mail;
pub mod models;
pub mod retrieve;
pub mod store;
pub mod synthesis;

pub use error::{DocketError, Result};
pub use ingest::IngestionService;
pub use models::{Answer, ChunkMeta, DocumentIngestReport, MailboxIngestReport, SourceRef};
pub use retrieve::RetrievalService;
