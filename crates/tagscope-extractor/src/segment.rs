//! Sentence segmentation on Unicode sentence boundaries

use unicode_segmentation::UnicodeSegmentation;

use crate::SentenceSegmenter;

/// Abbreviations whose trailing period does not end a sentence
const ABBREVIATIONS: &[&str] = &[
    "Mr", "Mrs", "Ms", "Dr", "Prof", "Sr", "Jr", "St", "Gen", "Gov", "Sen", "Rep", "Capt",
    "Col", "Lt", "Sgt", "Rev", "Hon", "Inc", "Corp", "Co", "Ltd", "Bros", "Mt", "Ft", "vs",
    "etc", "No", "Jan", "Feb", "Mar", "Apr", "Aug", "Sept", "Sep", "Oct", "Nov", "Dec",
];

/// Splits text with UAX #29 sentence boundaries, then rejoins breaks that
/// follow a known abbreviation or a single initial ("J. Smith")
#[derive(Debug, Clone, Default)]
pub struct UnicodeSentenceSegmenter {
    extra_abbreviations: Vec<String>,
}

impl UnicodeSentenceSegmenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an abbreviation (without its period)
    pub fn with_abbreviation(mut self, abbreviation: impl Into<String>) -> Self {
        self.extra_abbreviations.push(abbreviation.into());
        self
    }

    fn ends_with_abbreviation(&self, sentence: &str) -> bool {
        let Some(stem) = sentence.trim_end().strip_suffix('.') else {
            return false;
        };
        let last_word = stem
            .rsplit(|c: char| c.is_whitespace() || c == '(' || c == '"')
            .next()
            .unwrap_or("");

        if last_word.chars().count() == 1 && last_word.chars().all(char::is_uppercase) {
            return true;
        }

        ABBREVIATIONS.contains(&last_word) || self.extra_abbreviations.iter().any(|a| a == last_word)
    }
}

impl SentenceSegmenter for UnicodeSentenceSegmenter {
    fn split(&self, text: &str) -> Vec<String> {
        let mut sentences: Vec<String> = Vec::new();
        let mut carry = false;

        for piece in text.unicode_sentences() {
            match sentences.last_mut() {
                Some(previous) if carry => previous.push_str(piece),
                _ => sentences.push(piece.to_string()),
            }
            carry = sentences
                .last()
                .map(|s| self.ends_with_abbreviation(s))
                .unwrap_or(false);
        }

        sentences
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}
