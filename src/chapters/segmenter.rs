/*!
 * Chapter segmentation of a concatenated novel dump.
 *
 * A chapter starts at a line beginning with the configured marker
 * (`第12章`, `Chapter 12`, ...). Source dumps taken from EPUBs often repeat
 * the title line inside the chapter body; those repeats are removed so that
 * each unit carries exactly one title line.
 */

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Result, anyhow};
use log::{debug, warn};
use regex::Regex;

use crate::app_config::MarkerConfig;
use crate::file_utils::FileManager;

/// One chapter of source text
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterUnit {
    /// Chapter number parsed from the marker, always >= 1
    pub number: u32,
    /// Chapter text, title line first
    pub raw_text: String,
    /// File the unit was loaded from, if any
    pub source: Option<PathBuf>,
}

impl ChapterUnit {
    pub fn new(number: u32, raw_text: impl Into<String>) -> Self {
        Self {
            number,
            raw_text: raw_text.into(),
            source: None,
        }
    }

    /// Length of the chapter text in characters
    pub fn char_count(&self) -> usize {
        self.raw_text.chars().count()
    }
}

/// Outcome of matching one line against the marker
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerLine {
    /// Marker with a usable chapter number
    Chapter(u32),
    /// Marker whose digits are not a valid chapter number (zero or overflowing)
    Invalid(String),
}

/// Compiled chapter marker pattern
#[derive(Debug, Clone)]
pub struct ChapterMarker {
    pattern: Regex,
}

impl ChapterMarker {
    /// Build a marker matching `<prefix><digits><suffix>` at a line start
    pub fn new(prefix: &str, suffix: &str) -> Result<Self> {
        if prefix.trim().is_empty() {
            return Err(anyhow!("Chapter marker prefix must not be empty"));
        }

        let pattern = format!(
            r"^{}\s*(\d+)\s*{}",
            regex::escape(prefix.trim()),
            regex::escape(suffix.trim())
        );
        let pattern = Regex::new(&pattern)
            .map_err(|e| anyhow!("Invalid chapter marker pattern: {}", e))?;

        Ok(Self { pattern })
    }

    pub fn from_config(config: &MarkerConfig) -> Result<Self> {
        Self::new(&config.prefix, &config.suffix)
    }

    /// Match a single line, returning `None` when it is not a marker line
    pub fn match_line(&self, line: &str) -> Option<MarkerLine> {
        let captures = self.pattern.captures(line)?;
        let digits = captures.get(1)?.as_str();

        match digits.parse::<u32>() {
            Ok(number) if number >= 1 => Some(MarkerLine::Chapter(number)),
            _ => Some(MarkerLine::Invalid(digits.to_string())),
        }
    }
}

impl Default for ChapterMarker {
    fn default() -> Self {
        let config = MarkerConfig::default();
        Self::new(&config.prefix, &config.suffix)
            .expect("default chapter marker must compile")
    }
}

/// A contiguous run of lines opened by a marker line
struct Span<'a> {
    marker: MarkerLine,
    lines: Vec<&'a str>,
}

impl Span<'_> {
    fn number(&self) -> Option<u32> {
        match self.marker {
            MarkerLine::Chapter(number) => Some(number),
            MarkerLine::Invalid(_) => None,
        }
    }
}

/// Splits a raw dump into chapter units
#[derive(Debug, Clone, Default)]
pub struct Segmenter {
    marker: ChapterMarker,
}

impl Segmenter {
    pub fn new(marker: ChapterMarker) -> Self {
        Self { marker }
    }

    pub fn marker(&self) -> &ChapterMarker {
        &self.marker
    }

    /// Split `raw` into chapter units sorted by chapter number.
    ///
    /// Text before the first marker is discarded. A marker repeating the number
    /// of the chapter being read is a duplicated title line and does not start a
    /// new chapter. When the same number opens two separate chapters, the later
    /// one replaces the earlier.
    pub fn segment(&self, raw: &str) -> Vec<ChapterUnit> {
        let text = FileManager::normalize_line_endings(raw);

        let mut spans: Vec<Span> = Vec::new();
        let mut current: Option<Span> = None;
        let mut preamble_lines = 0usize;

        for line in text.split('\n') {
            match self.marker.match_line(line) {
                Some(marker) => {
                    let repeats_current = matches!(
                        (&current, &marker),
                        (Some(span), MarkerLine::Chapter(number)) if span.number() == Some(*number)
                    );

                    if repeats_current {
                        if let Some(span) = current.as_mut() {
                            span.lines.push(line);
                        }
                    } else {
                        if let Some(span) = current.take() {
                            spans.push(span);
                        }
                        current = Some(Span { marker, lines: vec![line] });
                    }
                }
                None => match current.as_mut() {
                    Some(span) => span.lines.push(line),
                    None => preamble_lines += 1,
                },
            }
        }
        if let Some(span) = current.take() {
            spans.push(span);
        }

        if preamble_lines > 0 && !spans.is_empty() {
            debug!("Discarded {} line(s) before the first chapter marker", preamble_lines);
        }

        let mut chapters: BTreeMap<u32, ChapterUnit> = BTreeMap::new();
        for span in spans {
            let number = match &span.marker {
                MarkerLine::Chapter(number) => *number,
                MarkerLine::Invalid(digits) => {
                    warn!(
                        "Dropping chapter with unusable number '{}' ({} line(s))",
                        digits,
                        span.lines.len()
                    );
                    continue;
                }
            };

            let unit = ChapterUnit::new(number, self.dedup_title_lines(&span.lines));
            if chapters.insert(number, unit).is_some() {
                warn!(
                    "Chapter {} appears more than once in the input; keeping the later occurrence",
                    number
                );
            }
        }

        chapters.into_values().collect()
    }

    /// Keep the first marker line, drop every later one, keep everything else verbatim
    fn dedup_title_lines(&self, lines: &[&str]) -> String {
        let mut kept = Vec::with_capacity(lines.len());
        let mut seen_title = false;

        for line in lines {
            if self.marker.match_line(line).is_some() {
                if seen_title {
                    continue;
                }
                seen_title = true;
            }
            kept.push(*line);
        }

        kept.join("\n").trim().to_string()
    }
}
