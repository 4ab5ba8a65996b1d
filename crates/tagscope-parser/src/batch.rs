//! Line batching for the remote tagging service
//!
//! The service accepts a bounded payload per request, so files are sent as
//! consecutive, non-overlapping groups of lines.

use crate::{ParserError, Result};

/// A group of consecutive lines joined with `\n`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBatch {
    /// Batch index within the file
    pub index: usize,

    /// First line covered (0-based, inclusive)
    pub start_line: usize,

    /// Line after the last one covered (exclusive)
    pub end_line: usize,

    /// Joined line content
    pub content: String,
}

impl TextBatch {
    /// Number of lines in this batch
    pub fn line_count(&self) -> usize {
        self.end_line - self.start_line
    }
}

/// Iterator over fixed-size line batches of one file
///
/// The cursor only moves forward; create a new reader to start over.
#[derive(Debug, Clone)]
pub struct BatchReader {
    lines: Vec<String>,
    batch_size: usize,
    cursor: usize,
    next_index: usize,
}

impl BatchReader {
    /// Create a reader over `lines`, `batch_size` lines at a time
    pub fn new(lines: Vec<String>, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(ParserError::ZeroBatchSize);
        }

        Ok(Self {
            lines,
            batch_size,
            cursor: 0,
            next_index: 0,
        })
    }

    /// Create a reader over the lines of `text`
    pub fn from_text(text: &str, batch_size: usize) -> Result<Self> {
        Self::new(text.lines().map(str::to_string).collect(), batch_size)
    }

    /// Total number of lines
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Lines not yet returned
    pub fn remaining_lines(&self) -> usize {
        self.lines.len() - self.cursor
    }

    /// Number of batches this reader produces in total
    pub fn batch_count(&self) -> usize {
        self.lines.len().div_ceil(self.batch_size)
    }

    /// Whether every line has been returned
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.lines.len()
    }
}

impl Iterator for BatchReader {
    type Item = TextBatch;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_exhausted() {
            return None;
        }

        let start = self.cursor;
        let end = (start + self.batch_size).min(self.lines.len());
        self.cursor = end;

        let batch = TextBatch {
            index: self.next_index,
            start_line: start,
            end_line: end,
            content: self.lines[start..end].join("\n"),
        };
        self.next_index += 1;

        tracing::debug!(
            "batch {}: lines {}..{} ({} chars)",
            batch.index,
            start,
            end,
            batch.content.len()
        );

        Some(batch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining_lines().div_ceil(self.batch_size);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for BatchReader {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn lines(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("line {i}")).collect()
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        assert!(matches!(
            BatchReader::new(lines(3), 0),
            Err(ParserError::ZeroBatchSize)
        ));
    }

    #[test]
    fn test_last_batch_shorter() {
        let batches: Vec<TextBatch> = BatchReader::new(lines(5), 2).unwrap().collect();

        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].content, "line 0\nline 1");
        assert_eq!(batches[2].content, "line 4");
        assert_eq!(batches[2].line_count(), 1);
        assert_eq!(batches[2].index, 2);
    }

    #[test]
    fn test_empty_input_has_no_batches() {
        let mut reader = BatchReader::new(Vec::new(), 10).unwrap();
        assert_eq!(reader.batch_count(), 0);
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_exhausted_reader_stays_exhausted() {
        let mut reader = BatchReader::from_text("one\ntwo", 1125).unwrap();
        assert_eq!(reader.next().unwrap().content, "one\ntwo");
        assert!(reader.is_exhausted());
        assert!(reader.next().is_none());
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_crlf_lines() {
        let batches: Vec<TextBatch> = BatchReader::from_text("a\r\nb\r\nc", 2)
            .unwrap()
            .collect();
        assert_eq!(batches[0].content, "a\nb");
        assert_eq!(batches[1].content, "c");
    }

    proptest! {
        #[test]
        fn prop_batches_cover_input_in_order(
            input in proptest::collection::vec("[a-z ]{0,12}", 0..60),
            batch_size in 1usize..9,
        ) {
            let reader = BatchReader::new(input.clone(), batch_size).unwrap();
            let expected_count = reader.batch_count();
            let batches: Vec<TextBatch> = reader.collect();

            prop_assert_eq!(batches.len(), expected_count);

            let mut next_line = 0;
            for (i, batch) in batches.iter().enumerate() {
                prop_assert_eq!(batch.index, i);
                prop_assert_eq!(batch.start_line, next_line);
                prop_assert!(batch.line_count() >= 1 && batch.line_count() <= batch_size);
                next_line = batch.end_line;
            }
            prop_assert_eq!(next_line, input.len());

            let rebuilt: Vec<String> = batches.into_iter().map(|b| b.content).collect();
            prop_assert_eq!(rebuilt.join("\n"), input.join("\n"));
        }
    }
}
