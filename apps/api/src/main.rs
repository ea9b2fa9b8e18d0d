mod config;
mod errors;
mod llm_client;
mod models;
mod parsing;
mod routes;
mod scanner;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::parsing::pdf::PdfTextExtractor;
use crate::routes::build_router;
use crate::scanner::engine::ScoringEngine;
use crate::scanner::tips::{LlmTipPhraser, TemplateTipPhraser, TipPhraser};
use crate::scanner::vocabulary::Vocabulary;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ATS Scanner v{}", env!("CARGO_PKG_VERSION"));

    // Build the vocabulary once; shared read-only for the life of the process
    let vocabulary = match &config.skills_file {
        Some(path) => {
            let extra = Vocabulary::load_terms_file(path)
                .with_context(|| format!("Failed to load SKILLS_FILE '{}'", path.display()))?;
            info!("Loaded {} extra vocabulary terms from {}", extra.len(), path.display());
            Vocabulary::with_extra_terms(extra)?
        }
        None => Vocabulary::builtin(),
    };
    info!("Vocabulary ready: {} terms", vocabulary.len());

    let engine = Arc::new(ScoringEngine::new(vocabulary, config.max_input_chars)?);

    // Tip phraser: LLM when a key is configured, deterministic templates otherwise
    let tip_phraser: Arc<dyn TipPhraser> = match &config.anthropic_api_key {
        Some(api_key) => {
            let llm = LlmClient::new(api_key.clone(), config.tip_timeout)?;
            info!("LLM tip phrasing enabled (model: {})", llm_client::MODEL);
            Arc::new(LlmTipPhraser(llm))
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set; tips will use built-in templates");
            Arc::new(TemplateTipPhraser)
        }
    };

    let pdf = Arc::new(PdfTextExtractor::new(config.max_upload_bytes)?);

    // Build app state
    let state = AppState {
        config: config.clone(),
        engine,
        tip_phraser,
        pdf,
        started_at: Utc::now(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend domain is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
