/*!
 * Prompt construction for chapter translation.
 *
 * The reference texts (style sample and glossaries) are loaded once and
 * shared; every chunk prompt embeds all of them followed by the chunk text.
 */

use std::sync::Arc;

use anyhow::{Context, Result};
use log::{debug, warn};

use crate::app_config::{PathsConfig, TranslationCommonConfig};
use crate::file_utils::FileManager;
use crate::translation::terms::UNMAPPED_TERMS_MARKER;

/// Heading preceding the text to translate; always the last section of a prompt
pub const SOURCE_TEXT_HEADING: &str = "SOURCE TEXT:";

/// Static reference material injected into every prompt
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceTexts {
    /// Sample of the desired output, for format and tone only
    pub style_reference: String,
    /// Highest priority glossary
    pub late_glossary: String,
    /// Fallback glossary
    pub early_glossary: String,
    /// Recently curated terms, may be empty
    pub update_glossary: String,
}

impl ReferenceTexts {
    /// Load the reference files. The update glossary is optional.
    pub fn load(paths: &PathsConfig) -> Result<Self> {
        let style_reference = FileManager::read_to_string(&paths.style_reference)
            .context("Style reference is required")?;
        let late_glossary = FileManager::read_to_string(&paths.late_glossary)
            .context("Late glossary is required")?;
        let early_glossary = FileManager::read_to_string(&paths.early_glossary)
            .context("Early glossary is required")?;
        let update_glossary = FileManager::read_optional(&paths.update_glossary)?;

        if update_glossary.is_empty() {
            warn!("No update glossary found at {:?}, continuing without it", paths.update_glossary);
        }

        let references = Self {
            style_reference,
            late_glossary,
            early_glossary,
            update_glossary,
        };
        debug!("Loaded reference texts ({} characters)", references.total_chars());

        Ok(references)
    }

    pub fn total_chars(&self) -> usize {
        [
            &self.style_reference,
            &self.late_glossary,
            &self.early_glossary,
            &self.update_glossary,
        ]
        .iter()
        .map(|text| text.chars().count())
        .sum()
    }
}

/// Builds translation prompts from the shared reference texts
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    references: Arc<ReferenceTexts>,
    source_language: String,
    target_language: String,
}

impl PromptBuilder {
    pub fn new(
        references: Arc<ReferenceTexts>,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
    ) -> Self {
        Self {
            references,
            source_language: source_language.into(),
            target_language: target_language.into(),
        }
    }

    pub fn from_config(references: Arc<ReferenceTexts>, common: &TranslationCommonConfig) -> Self {
        Self::new(references, &common.source_language, &common.target_language)
    }

    /// Full prompt for one chunk of source text
    pub fn build(&self, source_text: &str) -> String {
        let refs = &self.references;
        let mut prompt = format!(
            "You are a professional web-novel translator.

TASK:
Translate the following {source} text into fluent, natural {target} suitable for continuous reading.

STYLE REQUIREMENT:
Match the WRITING STYLE, FORMATTING, PARAGRAPH STRUCTURE, and DIALOGUE PRESENTATION
of the provided STYLE REFERENCE.
- The style reference is for format and tone only.
- Do NOT reuse or paraphrase its content.

STRICT RULES:
1. Use glossary terms EXACTLY as defined.
2. If a term appears in both glossaries, use the LATE glossary.
3. Do NOT invent names, realms, races, or titles.
4. Preserve pacing and paragraph structure.
5. Do NOT summarize or modernize.
6. If a proper noun, cultivation term, race, realm, title, or place is NOT in any glossary:
   - Transliterate conservatively
   - List it at the end under {marker}

STYLE REFERENCE (FORMAT & TONE ONLY):
{style}

GLOSSARY (LATE, highest priority):
{late}

GLOSSARY (EARLY, fallback):
{early}
",
            source = self.source_language,
            target = self.target_language,
            marker = UNMAPPED_TERMS_MARKER,
            style = refs.style_reference.trim(),
            late = refs.late_glossary.trim(),
            early = refs.early_glossary.trim(),
        );

        if !refs.update_glossary.trim().is_empty() {
            prompt.push_str("\nGLOSSARY (UPDATE, recently added terms):\n");
            prompt.push_str(refs.update_glossary.trim());
            prompt.push('\n');
        }

        prompt.push('\n');
        prompt.push_str(SOURCE_TEXT_HEADING);
        prompt.push('\n');
        prompt.push_str(source_text);
        prompt
    }
}
