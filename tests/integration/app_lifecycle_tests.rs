/*!
 * Integration tests for application lifecycle
 */

use std::fs;
use std::sync::Arc;

use anyhow::Result;
use chapterwai::app_controller::Controller;
use chapterwai::providers::mock::MockProvider;

use crate::common::{self, RecordingSleeper};

/// Test splitting the raw dump into chapter files
#[test]
fn test_split_withSampleDump_shouldWriteChapterFiles() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "untranslated_chapters.txt", common::SAMPLE_RAW_DUMP)?;
    let controller = Controller::with_config(common::test_config(temp_dir.path()))?;

    let numbers = controller.split()?;

    assert_eq!(numbers, vec![1, 2, 3]);
    let chapter_one = fs::read_to_string(temp_dir.path().join("cn_chapters").join("ch_1.txt"))?;
    assert!(chapter_one.starts_with("第1章 出发"));
    assert_eq!(chapter_one.matches("第1章").count(), 1);
    Ok(())
}

/// Test that a missing raw input is reported
#[test]
fn test_split_withoutRawInput_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::with_config(common::test_config(temp_dir.path()))?;

    assert!(controller.split().is_err());
    Ok(())
}

/// Test splitting a dump with no markers
#[test]
fn test_split_withoutMarkers_shouldWriteNothing() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "untranslated_chapters.txt", "just a preface\nno chapters")?;
    let controller = Controller::with_config(common::test_config(temp_dir.path()))?;

    assert!(controller.split()?.is_empty());
    assert!(!temp_dir.path().join("cn_chapters").exists());
    Ok(())
}

/// Test split then translate with an injected provider, including the index
#[tokio::test]
async fn test_translateWith_afterSplit_shouldTranslateAndIndex() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    common::create_reference_files(temp_dir.path())?;
    common::create_test_file(temp_dir.path(), "untranslated_chapters.txt", common::SAMPLE_RAW_DUMP)?;
    let controller = Controller::with_config(common::test_config(temp_dir.path()))?;
    controller.split()?;

    let provider = MockProvider::working();
    let summary = controller
        .translate_with(Arc::new(provider.clone()), Arc::new(RecordingSleeper::new()))
        .await?;

    assert_eq!(summary.translated, 3);
    assert_eq!(provider.call_count(), 3);

    let output_dir = temp_dir.path().join("en_chapters");
    let translated = fs::read_to_string(output_dir.join("ch_3.txt"))?;
    assert_eq!(translated, "[TRANSLATED] 第3章 离别\n他们挥手告别。");

    let index: Vec<String> = serde_json::from_str(&fs::read_to_string(output_dir.join("chapters.json"))?)?;
    assert_eq!(index, vec!["ch_1.txt", "ch_2.txt", "ch_3.txt"]);
    Ok(())
}

/// Test the full run twice: the second run only resumes
#[test]
fn test_runWith_twice_shouldCompleteAndResume() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_reference_files(temp_dir.path())?;
    common::create_test_file(temp_dir.path(), "untranslated_chapters.txt", common::SAMPLE_RAW_DUMP)?;
    let controller = Controller::with_config(common::test_config(temp_dir.path()))?;
    let provider = MockProvider::working();

    let first = tokio_test::block_on(
        controller.run_with(Arc::new(provider.clone()), Arc::new(RecordingSleeper::new())),
    )?;
    let second = tokio_test::block_on(
        controller.run_with(Arc::new(provider.clone()), Arc::new(RecordingSleeper::new())),
    )?;

    assert_eq!(first.translated, 3);
    assert_eq!(second.translated, 0);
    assert_eq!(second.already_translated, 3);
    assert_eq!(provider.call_count(), 3);
    Ok(())
}

/// Test that a run through the configured provider persists nothing when every call fails
#[tokio::test]
async fn test_run_withUnreachableProvider_shouldLeaveOutputDirEmpty() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_reference_files(temp_dir.path())?;
    common::create_test_file(temp_dir.path(), "untranslated_chapters.txt", common::SAMPLE_RAW_DUMP)?;
    let controller = Controller::with_config(common::test_config(temp_dir.path()))?;

    assert!(controller.run().await.is_err());

    let output_dir = temp_dir.path().join("en_chapters");
    let written = if output_dir.exists() { common::read_dir_snapshot(&output_dir)? } else { Vec::new() };
    assert!(written.is_empty(), "unexpected output files: {:?}", written);
    assert_eq!(controller.store().list_translated()?, Vec::<u32>::new());
    Ok(())
}

/// Test that translating without the reference files fails before any call
#[tokio::test]
async fn test_translateWith_withoutReferenceFiles_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "untranslated_chapters.txt", common::SAMPLE_RAW_DUMP)?;
    let controller = Controller::with_config(common::test_config(temp_dir.path()))?;
    controller.split()?;

    let provider = MockProvider::working();
    let result = controller
        .translate_with(Arc::new(provider.clone()), Arc::new(RecordingSleeper::new()))
        .await;

    assert!(result.is_err());
    assert_eq!(provider.call_count(), 0);
    Ok(())
}

/// Test the index command on a project with partial output
#[test]
fn test_index_shouldListExistingTranslations() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let output_dir = temp_dir.path().join("en_chapters");
    common::create_test_file(&output_dir, "ch_12.txt", "twelve")?;
    common::create_test_file(&output_dir, "ch_2.txt", "two")?;
    let controller = Controller::with_config(common::test_config(temp_dir.path()))?;

    let path = controller.index()?;

    let index: Vec<String> = serde_json::from_str(&fs::read_to_string(path)?)?;
    assert_eq!(index, vec!["ch_2.txt", "ch_12.txt"]);
    Ok(())
}
