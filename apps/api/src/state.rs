use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::config::Config;
use crate::parsing::pdf::PdfTextExtractor;
use crate::scanner::engine::ScoringEngine;
use crate::scanner::tips::TipPhraser;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Vocabulary and section patterns, built once at startup. Read-only.
    pub engine: Arc<ScoringEngine>,
    /// Pluggable tip phraser. `LlmTipPhraser` when ANTHROPIC_API_KEY is set, else templates.
    pub tip_phraser: Arc<dyn TipPhraser>,
    pub pdf: Arc<PdfTextExtractor>,
    pub started_at: DateTime<Utc>,
}
