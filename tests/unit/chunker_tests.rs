/*!
 * Tests for paragraph-bounded chunking
 */

use chapterwai::translation::chunker::{chunk_text, paragraphs};

/// Test the 100/100/50 scenario with a limit of 150
#[test]
fn test_chunkText_withThreeParagraphs_shouldCloseBeforeOverflow() {
    let a = "a".repeat(100);
    let b = "b".repeat(100);
    let c = "c".repeat(50);
    let text = format!("{}\n{}\n{}", a, b, c);

    let chunks = chunk_text(&text, 150);

    assert_eq!(chunks, vec![a, format!("{}\n{}", b, c)]);
}

/// Test that an oversized paragraph is sent whole
#[test]
fn test_chunkText_withOversizedParagraph_shouldKeepItAlone() {
    let long = "x".repeat(500);
    let text = format!("short\n{}\ntail", long);

    let chunks = chunk_text(&text, 100);

    assert_eq!(chunks, vec!["short".to_string(), long, "tail".to_string()]);
}

/// Test that blank lines and indentation never reach a chunk
#[test]
fn test_chunkText_withBlankLines_shouldDropThem() {
    let chunks = chunk_text("\n\n  第一段  \n\n\n第二段\n   \n", 1000);
    assert_eq!(chunks, vec!["第一段\n第二段"]);
}

/// Test the partition property over a range of limits
#[test]
fn test_chunkText_forManyLimits_shouldPartitionParagraphs() {
    let text = (1..=40)
        .map(|i| "段".repeat(i * 7 % 53 + 1))
        .collect::<Vec<_>>()
        .join("\n\n");
    let expected = paragraphs(&text);

    for max in [1, 10, 60, 150, 10_000] {
        let chunks = chunk_text(&text, max);

        assert!(chunks.iter().all(|c| !c.is_empty()));
        let rejoined: Vec<&str> = chunks.iter().flat_map(|c| c.split('\n')).collect();
        assert_eq!(rejoined, expected, "limit {}", max);

        for chunk in &chunks {
            let lines: Vec<&str> = chunk.split('\n').collect();
            let len: usize = lines.iter().map(|l| l.chars().count()).sum();
            assert!(len <= max || lines.len() == 1, "limit {} chunk of {} chars", max, len);
        }
    }
}
