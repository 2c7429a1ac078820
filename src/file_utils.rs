use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: File helpers for chapter, glossary and log files

/// Stateless file operations used across the pipeline
pub struct FileManager;

impl FileManager {
    /// True for an existing regular file
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    /// True for an existing directory
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    /// Create `dir` and its parents; an empty path means the working directory
    pub fn ensure_dir<P: AsRef<Path>>(dir: P) -> Result<()> {
        let dir = dir.as_ref();
        if dir.as_os_str().is_empty() || dir.is_dir() {
            return Ok(());
        }
        fs::create_dir_all(dir).with_context(|| format!("Failed to create directory: {:?}", dir))
    }

    /// Files directly inside `dir` whose extension matches, case-insensitively
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
        let wanted = extension.trim_start_matches('.');
        let mut found = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).min_depth(1).max_depth(1).follow_links(true) {
            let entry = entry.with_context(|| format!("Failed to list directory: {:?}", dir.as_ref()))?;
            let matches = entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(wanted));

            if matches {
                found.push(entry.into_path());
            }
        }

        Ok(found)
    }

    /// Whole file as UTF-8 text
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        let path = path.as_ref();
        fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))
    }

    /// Like `read_to_string`, but a missing file reads as empty
    pub fn read_optional<P: AsRef<Path>>(path: P) -> Result<String> {
        let path = path.as_ref();
        if Self::file_exists(path) {
            Self::read_to_string(path)
        } else {
            Ok(String::new())
        }
    }

    /// Replace the file's content, creating parent directories as needed
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            Self::ensure_dir(parent)?;
        }
        fs::write(path, content).with_context(|| format!("Failed to write file: {:?}", path))
    }

    /// Append to the file, creating it and its parent directories as needed
    pub fn append_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            Self::ensure_dir(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open {:?} for appending", path))?;
        file.write_all(content.as_bytes())
            .with_context(|| format!("Failed to append to {:?}", path))
    }

    /// Convert `\r\n` and lone `\r` line endings to `\n`
    pub fn normalize_line_endings(text: &str) -> String {
        text.replace("\r\n", "\n").replace('\r', "\n")
    }
}
