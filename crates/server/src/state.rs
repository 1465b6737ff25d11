//! Shared application state.

use crate::config::ServerConfig;
use anyhow::{Context, Result};
use deck_core::{BrandConfig, ConversationStore, JobStore, Orchestrator, SlidePlanner};
use deck_pptx::PptxRenderer;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Handles shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub planner: Arc<SlidePlanner>,
    pub renderer: Arc<PptxRenderer>,
    pub orchestrator: Arc<Orchestrator>,
    pub conversations: Arc<ConversationStore>,
    pub jobs: Arc<JobStore>,
    pub output_dir: PathBuf,
}

impl AppState {
    pub fn new(brand: BrandConfig, output_dir: impl Into<PathBuf>) -> Self {
        let output_dir = output_dir.into();
        let renderer = Arc::new(PptxRenderer::new(brand));
        let orchestrator = Orchestrator::new(renderer.clone(), output_dir.clone());

        Self {
            planner: Arc::new(SlidePlanner::new()),
            renderer,
            orchestrator: Arc::new(orchestrator),
            conversations: Arc::new(ConversationStore::new()),
            jobs: Arc::new(JobStore::new()),
            output_dir,
        }
    }

    /// Load the brand and make sure the output directory exists.
    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        let brand = match &config.brand_config {
            Some(path) => BrandConfig::load(path)
                .with_context(|| format!("Failed to load brand config {}", path.display()))?,
            None => BrandConfig::default(),
        };
        log::info!("Using brand '{}'", brand.name);

        std::fs::create_dir_all(&config.output_dir).with_context(|| {
            format!("Failed to create output directory: {}", config.output_dir.display())
        })?;

        Ok(Self::new(brand, config.output_dir.clone()))
    }

    /// Drop conversations and job records older than `ttl`.
    pub fn expire(&self, ttl: Duration) -> usize {
        self.conversations.expire(ttl) + self.jobs.expire(ttl)
    }
}
