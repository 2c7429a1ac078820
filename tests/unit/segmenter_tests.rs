/*!
 * Tests for splitting a raw dump into chapters
 */

use chapterwai::chapters::{ChapterMarker, Segmenter};

use crate::common;

/// Test the sample dump: preamble dropped, duplicate title removed, order kept
#[test]
fn test_segment_withSampleDump_shouldProduceThreeChapters() {
    common::init_logging();
    let units = Segmenter::default().segment(common::SAMPLE_RAW_DUMP);

    let numbers: Vec<u32> = units.iter().map(|u| u.number).collect();
    assert_eq!(numbers, vec![1, 2, 3]);

    assert_eq!(
        units[0].raw_text,
        "第1章 出发\n林动站在山门前。\n他深吸了一口气。\n风吹过青阳镇。"
    );
    assert_eq!(units[1].raw_text, "第2章 相遇\n一个少女走了过来。");
    assert!(!units.iter().any(|u| u.raw_text.contains("书名")));
}

/// Test the duplicated title scenario
#[test]
fn test_segment_withRepeatedTitleLine_shouldKeepOneTitle() {
    let raw = "第1章 Start\nHello\n第1章 Start\nWorld";
    let units = Segmenter::default().segment(raw);

    assert_eq!(units.len(), 1);
    assert_eq!(units[0].number, 1);
    assert_eq!(units[0].raw_text, "第1章 Start\nHello\nWorld");
}

/// Test leading junk, a repeated title line and a second chapter together
#[test]
fn test_segment_withJunkAndRepeatedTitle_shouldKeepTwoChapters() {
    let raw = "junk\n第1章 Start\nHello\n第1章 Start\nWorld\n第2章 Next\nFoo";
    let units = Segmenter::default().segment(raw);

    assert_eq!(units.len(), 2);
    assert_eq!(units[0].number, 1);
    assert_eq!(units[0].raw_text, "第1章 Start\nHello\nWorld");
    assert_eq!(units[1].number, 2);
    assert_eq!(units[1].raw_text, "第2章 Next\nFoo");
    assert!(!units.iter().any(|u| u.raw_text.contains("junk")));
}

/// Test that empty input is not an error
#[test]
fn test_segment_withEmptyInput_shouldReturnNothing() {
    assert!(Segmenter::default().segment("").is_empty());
    assert!(Segmenter::default().segment("no markers here\nat all").is_empty());
}

/// Test that a marker with an unusable number drops its span only
#[test]
fn test_segment_withChapterZero_shouldDropThatSpan() {
    common::init_logging();
    let raw = "第0章 序\n序言\n第1章 正文\n内容";
    let units = Segmenter::default().segment(raw);

    assert_eq!(units.len(), 1);
    assert_eq!(units[0].raw_text, "第1章 正文\n内容");
}

/// Test last-wins on a chapter number appearing twice
#[test]
fn test_segment_withDuplicateChapterNumber_shouldKeepLaterSpan() {
    common::init_logging();
    let raw = "第5章 旧\n旧内容\n第6章\n六\n第5章 新\n新内容";
    let units = Segmenter::default().segment(raw);

    assert_eq!(units.iter().map(|u| u.number).collect::<Vec<_>>(), vec![5, 6]);
    assert_eq!(units[0].raw_text, "第5章 新\n新内容");
}

/// Test that output is sorted numerically, not by input order
#[test]
fn test_segment_withUnorderedChapters_shouldSortByNumber() {
    let raw = "第10章\n十\n第2章\n二\n第1章\n一";
    let units = Segmenter::default().segment(raw);

    assert_eq!(units.iter().map(|u| u.number).collect::<Vec<_>>(), vec![1, 2, 10]);
}

/// Test a custom marker
#[test]
fn test_segment_withEnglishMarker_shouldSplitOnIt() {
    let marker = ChapterMarker::new("Chapter", "").unwrap();
    let units = Segmenter::new(marker).segment("Chapter 1\nOne\nChapter 2: Two\nText");

    assert_eq!(units.len(), 2);
    assert_eq!(units[1].raw_text, "Chapter 2: Two\nText");
}

/// Test that an empty prefix is rejected
#[test]
fn test_chapterMarker_withEmptyPrefix_shouldFail() {
    assert!(ChapterMarker::new("", "章").is_err());
}
