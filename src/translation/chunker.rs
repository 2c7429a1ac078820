/*!
 * Paragraph-bounded chunking.
 *
 * The model caps its output size, so long chapters are sent in pieces. A
 * chunk never splits a paragraph: a paragraph longer than the limit is sent
 * alone and may exceed it.
 */

use crate::chapters::ChapterUnit;

/// One piece of a chapter sent in a single request
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationChunk {
    pub chapter_number: u32,
    /// 0-based position within the chapter
    pub sequence_index: usize,
    pub text: String,
}

/// Non-blank, trimmed lines of `text`
pub fn paragraphs(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Greedily pack paragraphs into chunks of at most `max_chunk_chars` characters.
///
/// Lengths are counted in characters and exclude the joining newlines.
pub fn chunk_text(text: &str, max_chunk_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_len = 0usize;

    for paragraph in paragraphs(text) {
        let paragraph_len = paragraph.chars().count();

        if current_len + paragraph_len > max_chunk_chars && !current.is_empty() {
            chunks.push(current.join("\n"));
            current.clear();
            current_len = 0;
        }

        current.push(paragraph);
        current_len += paragraph_len;
    }

    if !current.is_empty() {
        chunks.push(current.join("\n"));
    }

    chunks
}

/// Chunk a chapter into numbered pieces
pub fn chunk_unit(unit: &ChapterUnit, max_chunk_chars: usize) -> Vec<TranslationChunk> {
    chunk_text(&unit.raw_text, max_chunk_chars)
        .into_iter()
        .enumerate()
        .map(|(sequence_index, text)| TranslationChunk {
            chapter_number: unit.number,
            sequence_index,
            text,
        })
        .collect()
}
