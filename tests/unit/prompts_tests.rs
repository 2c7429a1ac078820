/*!
 * Tests for reference loading, prompt building and unmapped terms
 */

use std::sync::Arc;

use anyhow::Result;
use chapterwai::translation::prompts::{PromptBuilder, ReferenceTexts, SOURCE_TEXT_HEADING};
use chapterwai::translation::terms::{ChunkTerms, UnmappedTermsLog, split_unmapped_terms};

use crate::common;

/// Test loading the reference files without an update glossary
#[test]
fn test_referenceTexts_load_withoutUpdateGlossary_shouldSucceed() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    common::create_reference_files(temp_dir.path())?;
    let config = common::test_config(temp_dir.path());

    let references = ReferenceTexts::load(&config.paths)?;

    assert_eq!(references.late_glossary, "林动 = Lin Dong");
    assert!(references.update_glossary.is_empty());
    Ok(())
}

/// Test that a missing required glossary is an error
#[test]
fn test_referenceTexts_load_withoutEarlyGlossary_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_reference_files(temp_dir.path())?;
    std::fs::remove_file(temp_dir.path().join("early gloss.txt"))?;
    let config = common::test_config(temp_dir.path());

    assert!(ReferenceTexts::load(&config.paths).is_err());
    Ok(())
}

/// Test the prompt layout with custom languages
#[test]
fn test_promptBuilder_withLanguages_shouldUseThem() {
    let references = Arc::new(ReferenceTexts {
        style_reference: "Style.".into(),
        late_glossary: "late".into(),
        early_glossary: "early".into(),
        update_glossary: "update".into(),
    });
    let builder = PromptBuilder::new(references, "Korean", "German");

    let prompt = builder.build("본문");

    assert!(prompt.contains("Translate the following Korean text into fluent, natural German"));
    let late_at = prompt.find("GLOSSARY (LATE").unwrap();
    let early_at = prompt.find("GLOSSARY (EARLY").unwrap();
    assert!(late_at < early_at);
    assert!(prompt.ends_with(&format!("{}\n본문", SOURCE_TEXT_HEADING)));
}

/// Test that a marker inside the translation splits only once
#[test]
fn test_splitUnmappedTerms_withRepeatedMarker_shouldSplitAtFirst() {
    let (text, terms) = split_unmapped_terms("Body\n[UNMAPPED_TERMS]\n- A\n[UNMAPPED_TERMS]\n- B");
    assert_eq!(text, "Body");
    assert_eq!(terms.as_deref(), Some("- A\n[UNMAPPED_TERMS]\n- B"));
}

/// Test the append-only log layout across two chapters
#[test]
fn test_unmappedTermsLog_shouldAppendSectionsPerChapter() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("update_gloss.txt");
    common::create_test_file(temp_dir.path(), "update_gloss.txt", "existing = kept")?;
    let log = UnmappedTermsLog::new(&path);

    assert!(!log.append_chapter("ch_1.txt", &[])?);
    assert!(log.append_chapter("ch_2.txt", &[ChunkTerms { sequence_index: 0, terms: "- 青阳镇".into() }])?);
    assert!(log.append_chapter(
        "ch_3.txt",
        &[
            ChunkTerms { sequence_index: 0, terms: "- 甲".into() },
            ChunkTerms { sequence_index: 2, terms: "- 乙".into() },
        ],
    )?);

    let content = std::fs::read_to_string(&path)?;
    assert_eq!(
        content,
        "existing = kept\
         \n\n=== ch_2.txt ===\n\n--- From ch_2.txt (chunk 1) ---\n- 青阳镇\
         \n\n=== ch_3.txt ===\n\n--- From ch_3.txt (chunk 1) ---\n- 甲\n--- From ch_3.txt (chunk 3) ---\n- 乙"
    );
    Ok(())
}
