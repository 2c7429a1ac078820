/*!
 * Unmapped term handling.
 *
 * The model is asked to list proper nouns it could not find in any glossary
 * after a `[UNMAPPED_TERMS]` marker. That appendix is cut off the translation
 * and collected into an append-only log for later glossary curation.
 */

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::file_utils::FileManager;

/// Marker the model places before its list of unmapped terms
pub const UNMAPPED_TERMS_MARKER: &str = "[UNMAPPED_TERMS]";

/// Split a model answer into the clean translation and the unmapped-terms appendix
pub fn split_unmapped_terms(response: &str) -> (String, Option<String>) {
    match response.split_once(UNMAPPED_TERMS_MARKER) {
        Some((translation, terms)) => {
            let terms = terms.trim();
            let terms = (!terms.is_empty()).then(|| terms.to_string());
            (translation.trim().to_string(), terms)
        }
        None => (response.trim().to_string(), None),
    }
}

/// Unmapped terms reported for one chunk
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkTerms {
    pub sequence_index: usize,
    pub terms: String,
}

/// Append-only log of unmapped terms, one section per chapter
#[derive(Debug, Clone)]
pub struct UnmappedTermsLog {
    path: PathBuf,
}

impl UnmappedTermsLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Render the section appended for one chapter
    pub fn format_section(chapter_label: &str, entries: &[ChunkTerms]) -> String {
        let mut section = format!("\n\n=== {} ===\n", chapter_label);
        for entry in entries {
            section.push_str(&format!(
                "\n--- From {} (chunk {}) ---\n{}",
                chapter_label,
                entry.sequence_index + 1,
                entry.terms
            ));
        }
        section
    }

    /// Append the chapter's terms; nothing is written when there are none
    pub fn append_chapter(&self, chapter_label: &str, entries: &[ChunkTerms]) -> Result<bool> {
        if entries.is_empty() {
            return Ok(false);
        }
        FileManager::append_to_file(&self.path, &Self::format_section(chapter_label, entries))?;
        Ok(true)
    }
}
