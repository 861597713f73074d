use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classifier::count_words;

/// A display segment of the article being read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingBlock {
    pub id: String,
    pub index: usize,
    pub word_count: usize,
}

impl ReadingBlock {
    pub fn new(id: impl Into<String>, index: usize, word_count: usize) -> Self {
        Self {
            id: id.into(),
            index,
            word_count,
        }
    }
}

/// Visibility report for one block, emitted as the viewport moves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockSample {
    pub block_id: String,
    /// Fraction of the block that has been on screen, in [0, 1]
    pub coverage: f64,
    /// Dwell since the previous sample for this block
    pub dwell_ms: u64,
    pub timestamp: DateTime<Utc>,
}

impl BlockSample {
    pub fn new(
        block_id: impl Into<String>,
        coverage: f64,
        dwell_ms: u64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            block_id: block_id.into(),
            coverage,
            dwell_ms,
            timestamp,
        }
    }
}

/// Split article text into blocks on blank lines.
///
/// Paragraphs without words are skipped; indices stay contiguous.
pub fn segment_article(text: &str) -> Vec<ReadingBlock> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            flush_paragraph(&mut current, &mut blocks);
        } else {
            current.push(line);
        }
    }
    flush_paragraph(&mut current, &mut blocks);

    blocks
}

fn flush_paragraph(lines: &mut Vec<&str>, blocks: &mut Vec<ReadingBlock>) {
    let words: usize = lines.iter().map(|line| count_words(line)).sum();
    if words > 0 {
        let index = blocks.len();
        blocks.push(ReadingBlock::new(format!("block-{index}"), index, words));
    }
    lines.clear();
}
