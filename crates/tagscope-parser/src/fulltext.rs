//! Fulltext conversion
//!
//! Turns JSON work records carrying a `fulltext` field into wrapped plain
//! text files that can be fed to the tagging pipelines.

use std::path::{Path, PathBuf};

use crate::{ParserError, Result};

/// Default column width of converted text
pub const DEFAULT_WRAP_WIDTH: usize = 80;

/// Outcome of converting a directory
#[derive(Debug, Clone, Default)]
pub struct ConversionReport {
    /// Text files written
    pub converted: Vec<PathBuf>,
    /// JSON files that could not be converted, with the reason
    pub skipped: Vec<(PathBuf, String)>,
}

impl ConversionReport {
    /// Total JSON files seen
    pub fn total(&self) -> usize {
        self.converted.len() + self.skipped.len()
    }
}

/// Convert every `*.json` file in `dir`
pub fn convert_directory(dir: &Path, width: usize) -> Result<ConversionReport> {
    let entries = std::fs::read_dir(dir).map_err(|e| ParserError::io(dir, e))?;

    let mut json_files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_json(path))
        .collect();
    json_files.sort();

    let mut report = ConversionReport::default();
    for path in json_files {
        match convert_file(&path, width) {
            Ok(written) => {
                tracing::info!("wrote {}", written.display());
                report.converted.push(written);
            }
            Err(e) => {
                tracing::warn!("skipping {}: {}", path.display(), e);
                report.skipped.push((path, e.to_string()));
            }
        }
    }

    Ok(report)
}

/// Convert one JSON file, writing `<stem>.txt` beside it
pub fn convert_file(path: &Path, width: usize) -> Result<PathBuf> {
    let raw = std::fs::read_to_string(path).map_err(|e| ParserError::io(path, e))?;

    let work: serde_json::Value =
        serde_json::from_str(&raw).map_err(|e| ParserError::InvalidDocument {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

    let fulltext = work
        .get("fulltext")
        .and_then(|v| v.as_str())
        .ok_or_else(|| ParserError::InvalidDocument {
            path: path.display().to_string(),
            reason: "missing string field `fulltext`".to_string(),
        })?;

    let output = path.with_extension("txt");
    let wrapped = wrap_text(fulltext, width).join("\n");
    std::fs::write(&output, wrapped).map_err(|e| ParserError::io(&output, e))?;

    Ok(output)
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Greedily wrap `text` into lines of at most `width` characters
///
/// Runs of whitespace (including newlines) collapse to one space. Words
/// longer than `width` are split across lines.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        let needed = if current.is_empty() {
            word_len
        } else {
            current_len + 1 + word_len
        };

        if needed <= width {
            if !current.is_empty() {
                current.push(' ');
                current_len += 1;
            }
            current.push_str(word);
            current_len += word_len;
            continue;
        }

        if word_len <= width {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
            continue;
        }

        // Over-long word: use what is left of the current line, then full lines
        let mut rest = word;
        if !current.is_empty() {
            let room = width.saturating_sub(current_len + 1);
            if room > 0 {
                let split = char_offset(rest, room);
                current.push(' ');
                current.push_str(&rest[..split]);
                rest = &rest[split..];
            }
            lines.push(std::mem::take(&mut current));
        }
        while rest.chars().count() > width {
            let split = char_offset(rest, width);
            lines.push(rest[..split].to_string());
            rest = &rest[split..];
        }
        current.push_str(rest);
        current_len = rest.chars().count();
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

/// Byte offset of the `n`th character
fn char_offset(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map(|(i, _)| i).unwrap_or(s.len())
}
