/*!
 * On-disk chapter layout.
 *
 * Source and translated chapters share the `ch_<N>.txt` naming scheme in two
 * separate directories. The presence of a translated file is the only record
 * that a chapter is done, so outputs are written through a temporary file and
 * renamed into place.
 */

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use super::segmenter::ChapterUnit;
use crate::file_utils::FileManager;

static CHAPTER_FILE_STEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ch_(\d+)$").expect("chapter file pattern must compile"));

/// File name of the reader index written by `write_index`
pub const INDEX_FILE_NAME: &str = "chapters.json";

/// A finished chapter translation
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterOutput {
    pub chapter_number: u32,
    pub final_text: String,
}

/// Source and output directories of a translation project
#[derive(Debug, Clone)]
pub struct ChapterStore {
    source_dir: PathBuf,
    output_dir: PathBuf,
}

impl ChapterStore {
    pub fn new(source_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// `ch_<N>.txt`
    pub fn file_name(number: u32) -> String {
        format!("ch_{}.txt", number)
    }

    /// Chapter number encoded in a `ch_<N>.txt` path
    pub fn parse_file_name(path: &Path) -> Option<u32> {
        let stem = path.file_stem()?.to_str()?;
        CHAPTER_FILE_STEM
            .captures(stem)?
            .get(1)?
            .as_str()
            .parse()
            .ok()
    }

    pub fn source_path(&self, number: u32) -> PathBuf {
        self.source_dir.join(Self::file_name(number))
    }

    pub fn output_path(&self, number: u32) -> PathBuf {
        self.output_dir.join(Self::file_name(number))
    }

    /// Persist a segmented chapter, replacing any previous file for the same number
    pub fn write_source(&self, unit: &ChapterUnit) -> Result<PathBuf> {
        let path = self.source_path(unit.number);
        let replaced = path.exists();
        FileManager::write_to_file(&path, &unit.raw_text)?;
        debug!(
            "{} source chapter {:?}",
            if replaced { "Overwrote" } else { "Wrote" },
            path
        );
        Ok(path)
    }

    /// Load every source chapter, sorted by chapter number
    pub fn load_sources(&self) -> Result<Vec<ChapterUnit>> {
        let mut units = Vec::new();

        for path in self.chapter_files(&self.source_dir)? {
            let Some(number) = Self::parse_file_name(&path) else {
                debug!("Ignoring non-chapter file {:?}", path);
                continue;
            };
            let raw_text = FileManager::read_to_string(&path)?;
            units.push(ChapterUnit {
                number,
                raw_text,
                source: Some(path),
            });
        }

        units.sort_by_key(|unit| unit.number);
        Ok(units)
    }

    /// Whether a translation for `number` has already been persisted
    pub fn is_translated(&self, number: u32) -> bool {
        FileManager::file_exists(self.output_path(number))
    }

    /// Persist a finished translation. The file appears only once fully written.
    pub fn write_output(&self, output: &ChapterOutput) -> Result<PathBuf> {
        FileManager::ensure_dir(&self.output_dir)?;

        let path = self.output_path(output.chapter_number);
        let partial = path.with_extension("txt.part");
        FileManager::write_to_file(&partial, &output.final_text)?;
        fs::rename(&partial, &path)
            .with_context(|| format!("Failed to move {:?} into place", partial))?;

        Ok(path)
    }

    pub fn read_output(&self, number: u32) -> Result<String> {
        FileManager::read_to_string(self.output_path(number))
    }

    /// Numbers of all translated chapters, ascending
    pub fn list_translated(&self) -> Result<Vec<u32>> {
        if !FileManager::dir_exists(&self.output_dir) {
            return Ok(Vec::new());
        }

        let mut numbers: Vec<u32> = self
            .chapter_files(&self.output_dir)?
            .iter()
            .filter_map(|path| Self::parse_file_name(path))
            .collect();
        numbers.sort_unstable();
        Ok(numbers)
    }

    /// Write the JSON chapter list consumed by the static reader page
    pub fn write_index(&self) -> Result<PathBuf> {
        let files: Vec<String> = self
            .list_translated()?
            .into_iter()
            .map(Self::file_name)
            .collect();

        let json = serde_json::to_string_pretty(&files)
            .context("Failed to serialize chapter index")?;
        let path = self.output_dir.join(INDEX_FILE_NAME);
        FileManager::write_to_file(&path, &json)?;

        Ok(path)
    }

    fn chapter_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        if !FileManager::dir_exists(dir) {
            return Err(anyhow::anyhow!("Chapter directory does not exist: {:?}", dir));
        }
        FileManager::find_files(dir, "txt")
    }
}
