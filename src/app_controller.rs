use anyhow::{Context, Result, anyhow};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;

use crate::app_config::Config;
use crate::chapters::{ChapterMarker, ChapterStore, Segmenter};
use crate::file_utils::FileManager;
use crate::providers::{self, Provider};
use crate::translation::{
    ChapterOrchestrator, ChapterStatus, PipelineSettings, PromptBuilder, ReferenceTexts, RunSummary, Sleeper,
    TokioSleeper, TranslationClient, UnmappedTermsLog,
};

/// Main application controller for chapter splitting and translation
pub struct Controller {
    config: Config,
}

impl Controller {
    /// Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Chapter store over the configured source and output directories
    pub fn store(&self) -> ChapterStore {
        ChapterStore::new(&self.config.paths.chapters_dir, &self.config.paths.output_dir)
    }

    /// Split the raw dump into one source file per chapter, returning the numbers written
    pub fn split(&self) -> Result<Vec<u32>> {
        let raw_input = &self.config.paths.raw_input;
        if !FileManager::file_exists(raw_input) {
            return Err(anyhow!("Raw input file not found: {:?}", raw_input));
        }

        let raw = FileManager::read_to_string(raw_input)?;
        let marker = ChapterMarker::from_config(&self.config.marker)?;
        let units = Segmenter::new(marker).segment(&raw);

        if units.is_empty() {
            warn!("No chapter markers found in {:?}", raw_input);
            return Ok(Vec::new());
        }

        let store = self.store();
        for unit in &units {
            store.write_source(unit)?;
        }

        info!("Split {} chapters into {:?}", units.len(), store.source_dir());
        Ok(units.iter().map(|unit| unit.number).collect())
    }

    /// Translate every pending chapter with the configured provider
    pub async fn translate(&self) -> Result<RunSummary> {
        let provider = providers::create_provider(&self.config.translation)
            .context("Failed to create translation provider")?;
        self.translate_with(provider, Arc::new(TokioSleeper)).await
    }

    /// Translate every pending chapter with an explicit provider and sleeper
    pub async fn translate_with(&self, provider: Arc<dyn Provider>, sleeper: Arc<dyn Sleeper>) -> Result<RunSummary> {
        let store = self.store();
        let units = store.load_sources()?;
        if units.is_empty() {
            warn!("No chapter files found in {:?}", store.source_dir());
            return Ok(RunSummary::default());
        }

        let orchestrator = self.build_orchestrator(provider, sleeper)?;
        info!(
            "Translating {} chapters from {} to {} ({})",
            units.len(),
            self.config.translation.common.source_language,
            self.config.translation.common.target_language,
            self.config.translation.provider.display_name()
        );

        let progress_bar = ProgressBar::new(units.len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chapters ({percent}%) {msg} {eta}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));

        let result = orchestrator
            .run(&units, |unit, status| {
                if let ChapterStatus::Translated { .. } = status {
                    progress_bar.set_message(format!("chapter {}", unit.number));
                }
                progress_bar.inc(1);
            })
            .await;

        progress_bar.finish_and_clear();
        let summary = result?;

        store.write_index()?;
        Ok(summary)
    }

    /// Split the raw dump, then translate
    pub async fn run(&self) -> Result<RunSummary> {
        let provider = providers::create_provider(&self.config.translation)
            .context("Failed to create translation provider")?;
        self.run_with(provider, Arc::new(TokioSleeper)).await
    }

    /// `run` with an explicit provider and sleeper
    pub async fn run_with(&self, provider: Arc<dyn Provider>, sleeper: Arc<dyn Sleeper>) -> Result<RunSummary> {
        self.split()?;
        self.translate_with(provider, sleeper).await
    }

    /// Write the chapter index consumed by the reader page
    pub fn index(&self) -> Result<PathBuf> {
        let path = self.store().write_index()?;
        info!("Wrote chapter index to {:?}", path);
        Ok(path)
    }

    /// Wire an orchestrator from the configuration
    pub fn build_orchestrator(&self, provider: Arc<dyn Provider>, sleeper: Arc<dyn Sleeper>) -> Result<ChapterOrchestrator> {
        let references = Arc::new(ReferenceTexts::load(&self.config.paths)?);
        let common = &self.config.translation.common;

        Ok(ChapterOrchestrator::new(
            TranslationClient::new(provider),
            PromptBuilder::from_config(references, common),
            PipelineSettings::from_config(common),
            self.store(),
            UnmappedTermsLog::new(self.config.paths.unmapped_terms_log_path()),
            sleeper,
        ))
    }
}
