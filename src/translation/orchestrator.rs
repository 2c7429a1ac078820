/*!
 * Chapter orchestration.
 *
 * Drives every chapter through chunking, retried model calls, reassembly and
 * the truncation guard, then persists it. Chapters below the resume floor or
 * with an existing output file are skipped, so a rerun after a crash only
 * calls the model for chapters that are still missing.
 */

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};

use crate::app_config::TranslationCommonConfig;
use crate::chapters::{ChapterOutput, ChapterStore, ChapterUnit};
use crate::errors::TranslationError;
use crate::translation::chunker::{TranslationChunk, chunk_unit};
use crate::translation::core::TranslationClient;
use crate::translation::prompts::PromptBuilder;
use crate::translation::retry::{RetryPolicy, Sleeper, with_retry};
use crate::translation::terms::{ChunkTerms, UnmappedTermsLog, split_unmapped_terms};

/// Translation of one chunk, before reassembly
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkResult {
    pub chapter_number: u32,
    pub sequence_index: usize,
    pub translated_text: String,
    pub unmapped_terms: Option<String>,
}

/// Outcome of processing a single chapter
#[derive(Debug, Clone, PartialEq)]
pub enum ChapterStatus {
    /// Translated and written in this run
    Translated {
        chunks: usize,
        output_chars: usize,
        unmapped_chunks: usize,
    },
    /// Output file already present
    AlreadyTranslated,
    /// Number below the configured resume floor
    BelowResumeFloor,
}

/// Counters for a whole run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub translated: usize,
    pub already_translated: usize,
    pub below_resume_floor: usize,
}

impl RunSummary {
    pub fn record(&mut self, status: &ChapterStatus) {
        match status {
            ChapterStatus::Translated { .. } => self.translated += 1,
            ChapterStatus::AlreadyTranslated => self.already_translated += 1,
            ChapterStatus::BelowResumeFloor => self.below_resume_floor += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.translated + self.already_translated + self.below_resume_floor
    }
}

/// Tunables of the chapter loop
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub max_chunk_chars: usize,
    /// Pause between two chunk calls of the same chapter
    pub chunk_delay: Duration,
    pub min_output_ratio: f64,
    /// Absolute lower bound on output length, 0 disables it
    pub min_output_chars: usize,
    pub resume_from: u32,
    pub retry: RetryPolicy,
}

impl PipelineSettings {
    pub fn from_config(common: &TranslationCommonConfig) -> Self {
        Self {
            max_chunk_chars: common.max_chunk_chars,
            chunk_delay: common.chunk_delay(),
            min_output_ratio: common.min_output_ratio,
            min_output_chars: common.min_output_chars,
            resume_from: common.resume_from,
            retry: RetryPolicy::from_config(common),
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from_config(&TranslationCommonConfig::default())
    }
}

/// Sequential chapter translator
pub struct ChapterOrchestrator {
    client: TranslationClient,
    prompts: PromptBuilder,
    settings: PipelineSettings,
    store: ChapterStore,
    terms_log: UnmappedTermsLog,
    sleeper: Arc<dyn Sleeper>,
}

impl ChapterOrchestrator {
    pub fn new(
        client: TranslationClient,
        prompts: PromptBuilder,
        settings: PipelineSettings,
        store: ChapterStore,
        terms_log: UnmappedTermsLog,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self {
            client,
            prompts,
            settings,
            store,
            terms_log,
            sleeper,
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn store(&self) -> &ChapterStore {
        &self.store
    }

    /// Translate every chapter in order, stopping at the first failure
    pub async fn run<F>(&self, units: &[ChapterUnit], mut on_chapter: F) -> Result<RunSummary, TranslationError>
    where
        F: FnMut(&ChapterUnit, &ChapterStatus),
    {
        let mut summary = RunSummary::default();

        for unit in units {
            let status = self.process_chapter(unit).await.map_err(|e| {
                warn!("Aborting run at chapter {}: {}", unit.number, e);
                e
            })?;
            summary.record(&status);
            on_chapter(unit, &status);
        }

        info!(
            "Run complete: {} translated, {} already done, {} below resume floor",
            summary.translated, summary.already_translated, summary.below_resume_floor
        );
        Ok(summary)
    }

    /// Translate one chapter unless it is skipped
    pub async fn process_chapter(&self, unit: &ChapterUnit) -> Result<ChapterStatus, TranslationError> {
        if unit.number < self.settings.resume_from {
            debug!(
                "Skipping chapter {} (below resume floor {})",
                unit.number, self.settings.resume_from
            );
            return Ok(ChapterStatus::BelowResumeFloor);
        }

        if self.store.is_translated(unit.number) {
            info!("Skipping chapter {} (already translated)", unit.number);
            return Ok(ChapterStatus::AlreadyTranslated);
        }

        let chunks = chunk_unit(unit, self.settings.max_chunk_chars);
        if chunks.is_empty() {
            return Err(TranslationError::EmptyChapter { chapter: unit.number });
        }
        info!(
            "Translating chapter {} ({} characters, {} chunks) with {}",
            unit.number,
            unit.char_count(),
            chunks.len(),
            self.client.provider_name()
        );

        let mut results = Vec::with_capacity(chunks.len());
        for (position, chunk) in chunks.iter().enumerate() {
            if position > 0 {
                self.sleeper.sleep(self.settings.chunk_delay).await;
            }
            results.push(self.translate_chunk(chunk).await?);
        }

        let final_text = results
            .iter()
            .map(|result| result.translated_text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let output_chars = final_text.chars().count();
        self.check_length(unit, output_chars)?;

        // Terms are logged before the output file marks the chapter as done
        let terms: Vec<ChunkTerms> = results
            .into_iter()
            .filter_map(|result| {
                result.unmapped_terms.map(|terms| ChunkTerms {
                    sequence_index: result.sequence_index,
                    terms,
                })
            })
            .collect();
        let label = ChapterStore::file_name(unit.number);
        self.terms_log.append_chapter(&label, &terms).map_err(|e| {
            TranslationError::Storage(format!(
                "Failed to record unmapped terms of chapter {} in {:?}: {}",
                unit.number,
                self.terms_log.path(),
                e
            ))
        })?;

        let output = ChapterOutput {
            chapter_number: unit.number,
            final_text,
        };
        let path = self
            .store
            .write_output(&output)
            .map_err(|e| TranslationError::Storage(e.to_string()))?;
        info!("Saved chapter {} to {:?}", unit.number, path);

        Ok(ChapterStatus::Translated {
            chunks: chunks.len(),
            output_chars,
            unmapped_chunks: terms.len(),
        })
    }

    async fn translate_chunk(&self, chunk: &TranslationChunk) -> Result<ChunkResult, TranslationError> {
        let prompt = self.prompts.build(&chunk.text);
        let label = format!("chapter {} chunk {}", chunk.chapter_number, chunk.sequence_index + 1);

        let response = with_retry(&self.settings.retry, self.sleeper.as_ref(), &label, || {
            self.client.call_model(&prompt)
        })
        .await?;

        let (translated_text, unmapped_terms) = split_unmapped_terms(&response);
        debug!("{} translated ({} characters)", label, translated_text.chars().count());

        Ok(ChunkResult {
            chapter_number: chunk.chapter_number,
            sequence_index: chunk.sequence_index,
            translated_text,
            unmapped_terms,
        })
    }

    fn check_length(&self, unit: &ChapterUnit, output_chars: usize) -> Result<(), TranslationError> {
        let input_chars = unit.char_count();
        let ratio_floor = self.settings.min_output_ratio * input_chars as f64;
        let below_ratio = (output_chars as f64) < ratio_floor;
        let below_absolute = self.settings.min_output_chars > 0 && output_chars < self.settings.min_output_chars;

        if below_ratio || below_absolute {
            return Err(TranslationError::SuspiciouslyShort {
                chapter: unit.number,
                output_chars,
                input_chars,
            });
        }
        Ok(())
    }
}
