//! Named Entity Recognition (NER) module
//!
//! Provides the entity categories the summary tracks and a rule-based
//! tagger: word tokenization, coarse part-of-speech tags, and chunking of
//! proper-noun runs labelled by gazetteer, titles, organization keywords
//! and left context.

use std::collections::HashMap;

use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

use crate::{EntityTagger, TaggedChunk};
use tagscope_core::{NerConfig, Result};

// ============================================================================
// Entity Categories
// ============================================================================

/// Entity categories counted by the summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityCategory {
    Location,
    Person,
    Organization,
}

impl EntityCategory {
    /// All tracked categories in report order
    pub const ALL: [EntityCategory; 3] = [Self::Location, Self::Person, Self::Organization];

    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Location => "LOCATION",
            Self::Person => "PERSON",
            Self::Organization => "ORGANIZATION",
        }
    }

    /// Parse a chunk label, `None` for labels that are not tracked
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "LOCATION" => Some(Self::Location),
            "PERSON" => Some(Self::Person),
            "ORGANIZATION" => Some(Self::Organization),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Label given to proper-noun runs no rule could classify
pub const UNRESOLVED_LABEL: &str = "NNP";

// ============================================================================
// Word lists
// ============================================================================

const TITLES: &[&str] = &[
    "Mr.", "Mrs.", "Ms.", "Dr.", "Prof.", "Sen.", "Gov.", "Gen.", "Rep.", "Capt.", "Col.",
    "Lt.", "Sgt.", "Rev.", "Hon.", "Sir", "Dame", "Lady", "Lord", "President", "Senator",
    "Governor", "General", "Captain", "Colonel", "King", "Queen", "Prince", "Princess",
    "Pope", "Judge", "Mayor", "Chancellor", "Minister",
];

const ABBREVIATIONS: &[&str] = &[
    "Mr", "Mrs", "Ms", "Dr", "Prof", "Sen", "Gov", "Gen", "Rep", "Capt", "Col", "Lt", "Sgt",
    "Rev", "Hon", "Inc", "Corp", "Co", "Ltd", "Jr", "Sr", "St", "Mt", "Bros",
];

const ORG_KEYWORDS: &[&str] = &[
    "Inc.", "Corp.", "Co.", "Ltd.", "LLC", "PLC", "Company", "Corporation", "Incorporated",
    "University", "College", "School", "Institute", "Academy", "Bank", "Agency",
    "Association", "Society", "Foundation", "Council", "Committee", "Commission",
    "Department", "Ministry", "Party", "Group", "Club", "Church", "Museum", "Hospital",
    "Times", "News", "Press", "Airlines", "Motors", "Bros.", "Federation", "Union",
    "Parliament", "Congress", "Senate", "Court", "Army", "Navy",
];

const LOCATION_CUES: &[&str] = &[
    "in", "at", "from", "near", "to", "into", "across", "throughout", "outside", "inside",
    "toward", "towards",
];

const FIRST_NAMES: &[&str] = &[
    "John", "James", "Robert", "Michael", "William", "David", "Richard", "Joseph", "Thomas",
    "Charles", "George", "Henry", "Edward", "Peter", "Paul", "Mark", "Daniel", "Samuel",
    "Mary", "Elizabeth", "Sarah", "Anne", "Anna", "Margaret", "Jane", "Emily", "Susan",
    "Catherine", "Alice", "Helen", "Emma", "Laura", "Rebecca", "Scott", "Barack", "Angela",
    "Vladimir", "Donald", "Hillary", "Abraham",
];

const DETERMINERS: &[&str] = &[
    "the", "a", "an", "this", "that", "these", "those", "some", "any", "each", "every", "no",
];

const PREPOSITIONS: &[&str] = &[
    "in", "at", "from", "near", "to", "into", "across", "throughout", "outside", "inside",
    "toward", "towards", "of", "on", "by", "for", "with", "about", "over", "under", "after",
    "before", "between", "during", "through", "without", "within", "against", "among",
];

const PRONOUNS: &[&str] = &[
    "i", "you", "he", "she", "it", "we", "they", "me", "him", "her", "us", "them",
];

const CONJUNCTIONS: &[&str] = &["and", "or", "but", "nor", "yet", "so"];

// ============================================================================
// Rule-based tagger
// ============================================================================

/// Gazetteer entry for entity matching
#[derive(Debug, Clone)]
pub struct GazetteerEntry {
    pub phrase: String,
    pub category: EntityCategory,
}

/// Rule-based entity tagger using a gazetteer, word lists and patterns
pub struct RuleBasedTagger {
    /// Part-of-speech patterns (regex -> tag)
    pos_patterns: Vec<(Regex, &'static str)>,
    /// Whole-phrase patterns (regex -> category)
    entity_patterns: Vec<(Regex, EntityCategory)>,
    /// Known phrases (lowercase phrase -> entry)
    gazetteer: HashMap<String, GazetteerEntry>,
}

impl RuleBasedTagger {
    /// Create a new tagger with the default English gazetteer
    pub fn new() -> Self {
        let mut tagger = Self {
            pos_patterns: Vec::new(),
            entity_patterns: Vec::new(),
            gazetteer: HashMap::new(),
        };

        tagger.init_patterns();
        tagger.init_gazetteer();
        tagger
    }

    /// Create with gazetteer additions from configuration
    pub fn from_config(config: &NerConfig) -> Self {
        let mut tagger = Self::new();
        for phrase in &config.extra_locations {
            tagger.add_term(phrase, EntityCategory::Location);
        }
        for phrase in &config.extra_people {
            tagger.add_term(phrase, EntityCategory::Person);
        }
        for phrase in &config.extra_organizations {
            tagger.add_term(phrase, EntityCategory::Organization);
        }
        tagger
    }

    fn init_patterns(&mut self) {
        self.add_pos_pattern(r"^\d+([.,:/]\d+)*(st|nd|rd|th|s)?$", "CD");
        self.add_pos_pattern(r"^[$€£¥]$", "$");

        // Acronyms like NASA or IBM
        self.add_entity_pattern(r"^[A-Z]{2,6}$", EntityCategory::Organization);
    }

    fn init_gazetteer(&mut self) {
        for place in [
            "Africa", "America", "Asia", "Europe", "Antarctica", "Australia", "Argentina",
            "Brazil", "Canada", "Chile", "China", "Egypt", "England", "France", "Germany",
            "Greece", "India", "Iran", "Iraq", "Ireland", "Israel", "Italy", "Japan", "Kenya",
            "Mexico", "Nigeria", "Norway", "Pakistan", "Peru", "Poland", "Portugal", "Russia",
            "Scotland", "Spain", "Sweden", "Switzerland", "Turkey", "Ukraine", "Wales",
            "United States", "United Kingdom", "South Africa", "New Zealand", "Amsterdam",
            "Athens", "Beijing", "Berlin", "Boston", "Cairo", "Chicago", "Delhi", "Dublin",
            "Edinburgh", "Hong Kong", "Istanbul", "Jerusalem", "Lagos", "Lisbon", "London",
            "Los Angeles", "Madrid", "Moscow", "Mumbai", "Nairobi", "New York", "Paris",
            "Philadelphia", "Rome", "San Francisco", "Seoul", "Shanghai", "Sydney", "Tokyo",
            "Toronto", "Vienna", "Washington", "Texas", "California", "Virginia", "Ohio",
            "Florida", "Georgia", "Kentucky", "Tennessee", "Mississippi", "Missouri",
            "Atlantic", "Pacific", "Mediterranean", "Thames", "Nile", "Amazon River",
        ] {
            self.add_term(place, EntityCategory::Location);
        }

        for org in [
            "United Nations", "European Union", "NATO", "Red Cross", "World Bank",
            "Google", "Microsoft", "Apple", "Amazon", "Reuters", "Associated Press",
            "Supreme Court", "White House", "Pentagon", "Congress", "Parliament",
        ] {
            self.add_term(org, EntityCategory::Organization);
        }
    }

    /// Add a part-of-speech regex pattern
    fn add_pos_pattern(&mut self, pattern: &str, tag: &'static str) {
        if let Ok(regex) = Regex::new(pattern) {
            self.pos_patterns.push((regex, tag));
        }
    }

    /// Add a whole-phrase regex pattern
    fn add_entity_pattern(&mut self, pattern: &str, category: EntityCategory) {
        if let Ok(regex) = Regex::new(pattern) {
            self.entity_patterns.push((regex, category));
        }
    }

    /// Add a gazetteer phrase
    pub fn add_term(&mut self, phrase: &str, category: EntityCategory) {
        let normalized = normalize_phrase(phrase);
        if normalized.is_empty() {
            return;
        }
        self.gazetteer.insert(
            normalized.to_lowercase(),
            GazetteerEntry {
                phrase: normalized,
                category,
            },
        );
    }

    /// Look up a phrase in the gazetteer
    pub fn lookup(&self, phrase: &str) -> Option<&GazetteerEntry> {
        self.gazetteer.get(&normalize_phrase(phrase).to_lowercase())
    }

    /// Split a sentence into word and punctuation tokens
    pub fn tokenize(&self, sentence: &str) -> Vec<String> {
        let mut tokens: Vec<String> = Vec::new();

        for piece in sentence.split_word_bounds() {
            if piece.trim().is_empty() {
                continue;
            }

            // Keep abbreviation periods on the word ("Mr." not "Mr", ".")
            if piece == "." {
                if let Some(last) = tokens.last_mut() {
                    if ABBREVIATIONS.contains(&last.as_str()) {
                        last.push('.');
                        continue;
                    }
                }
            }

            // Split possessives ("France's" -> "France", "'s")
            if let Some(stem) = piece
                .strip_suffix("'s")
                .or_else(|| piece.strip_suffix("\u{2019}s"))
            {
                if !stem.is_empty() {
                    tokens.push(stem.to_string());
                    tokens.push("'s".to_string());
                    continue;
                }
            }

            tokens.push(piece.to_string());
        }

        tokens
    }

    /// Assign a coarse part-of-speech tag to each token
    pub fn pos_tag(&self, tokens: &[String]) -> Vec<(String, String)> {
        tokens
            .iter()
            .map(|token| (token.clone(), self.tag_token(token).to_string()))
            .collect()
    }

    fn tag_token(&self, token: &str) -> &'static str {
        for (regex, tag) in &self.pos_patterns {
            if regex.is_match(token) {
                return tag;
            }
        }

        if token == "'s" {
            return "POS";
        }
        if !token.chars().any(char::is_alphanumeric) {
            return match token {
                "." | "!" | "?" => ".",
                "," => ",",
                ":" | ";" | "-" | "--" | "\u{2014}" => ":",
                _ => "SYM",
            };
        }

        let lower = token.to_lowercase();
        if DETERMINERS.contains(&lower.as_str()) {
            return "DT";
        }
        if PREPOSITIONS.contains(&lower.as_str()) {
            return "IN";
        }
        if PRONOUNS.contains(&lower.as_str()) {
            return "PRP";
        }
        if CONJUNCTIONS.contains(&lower.as_str()) {
            return "CC";
        }
        if token.chars().next().is_some_and(char::is_uppercase) {
            return "NNP";
        }
        "NN"
    }

    /// Group proper-noun runs into labelled chunks
    pub fn chunk(&self, tagged: &[(String, String)]) -> Vec<TaggedChunk> {
        let mut chunks = Vec::new();
        let mut i = 0;

        while i < tagged.len() {
            if tagged[i].1 != "NNP" {
                i += 1;
                continue;
            }

            let start = i;
            let mut end = i + 1;
            loop {
                while end < tagged.len() && tagged[end].1 == "NNP" {
                    end += 1;
                }
                // "Bank of England", "Procter & Gamble"
                let joins = end + 1 < tagged.len()
                    && matches!(tagged[end].0.as_str(), "of" | "&")
                    && tagged[end + 1].1 == "NNP"
                    && (self.has_org_keyword(&tagged[start..end])
                        || self.lookup(&phrase_of(&tagged[start..end + 2])).is_some());
                if joins {
                    end += 2;
                } else {
                    break;
                }
            }

            let previous = start.checked_sub(1).map(|p| tagged[p].0.as_str());
            chunks.push(self.label_run(&tagged[start..end], previous, start == 0));
            i = end;
        }

        chunks
    }

    fn label_run(
        &self,
        run: &[(String, String)],
        previous: Option<&str>,
        sentence_start: bool,
    ) -> TaggedChunk {
        if let Some(chunk) = self.classify(run, previous) {
            return chunk;
        }

        // A capitalized first word may just be the start of the sentence
        if sentence_start && run.len() > 1 {
            if let Some(chunk) = self.classify(&run[1..], None) {
                return chunk;
            }
        }

        TaggedChunk::new(UNRESOLVED_LABEL, run.to_vec())
    }

    fn classify(&self, run: &[(String, String)], previous: Option<&str>) -> Option<TaggedChunk> {
        let phrase = phrase_of(run);
        let labelled = |category: EntityCategory, leaves: &[(String, String)]| {
            Some(TaggedChunk::new(category.as_str(), leaves.to_vec()))
        };

        if let Some(entry) = self.lookup(&phrase) {
            return labelled(entry.category, run);
        }

        // Leading titles mark a person; the title is not part of the name
        let titles = run
            .iter()
            .take_while(|(token, _)| TITLES.contains(&token.as_str()))
            .count();
        if titles > 0 && titles < run.len() {
            return labelled(EntityCategory::Person, &run[titles..]);
        }

        if self.has_org_keyword(run) {
            return labelled(EntityCategory::Organization, run);
        }

        for (regex, category) in &self.entity_patterns {
            if regex.is_match(&phrase) {
                return labelled(*category, run);
            }
        }

        if run.len() > 1 && FIRST_NAMES.contains(&run[0].0.as_str()) {
            return labelled(EntityCategory::Person, run);
        }

        if previous.is_some_and(|p| LOCATION_CUES.contains(&p)) {
            return labelled(EntityCategory::Location, run);
        }

        None
    }

    fn has_org_keyword(&self, run: &[(String, String)]) -> bool {
        run.iter()
            .any(|(token, _)| ORG_KEYWORDS.contains(&token.as_str()))
    }
}

impl Default for RuleBasedTagger {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityTagger for RuleBasedTagger {
    fn tag(&self, sentence: &str) -> Result<Vec<TaggedChunk>> {
        let tokens = self.tokenize(sentence);
        let tagged = self.pos_tag(&tokens);
        tracing::debug!("parts of speech: {:?}", tagged);

        Ok(self.chunk(&tagged))
    }
}

fn phrase_of(run: &[(String, String)]) -> String {
    run.iter()
        .map(|(token, _)| token.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

fn normalize_phrase(phrase: &str) -> String {
    phrase.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ============================================================================
// Tests
// ============================================================================
