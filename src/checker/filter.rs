//! Noise reduction for raw grammar-service matches.
//!
//! A match survives only when its word is unknown to every dictionary, does
//! not look like code, is not a contraction, and was raised by a rule and
//! category worth showing to a prose writer.

use crate::checker::dictionary::TechnicalDictionary;
use crate::FlaggedMatch;
use aho_corasick::AhoCorasick;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

pub const CONTRACTIONS: &[&str] = &[
    "don't", "won't", "can't", "couldn't", "wouldn't", "shouldn't", "didn't", "doesn't",
    "haven't", "hasn't", "hadn't", "isn't", "aren't", "wasn't", "weren't", "i'm", "you're",
    "he's", "she's", "it's", "we're", "they're", "i've", "you've", "we've", "they've", "i'll",
    "you'll", "he'll", "she'll", "it'll", "we'll", "they'll", "i'd", "you'd", "he'd", "she'd",
    "it'd", "we'd", "they'd", "let's", "that's", "what's", "where's", "when's", "who's", "how's",
    "why's", "there's", "here's",
];

pub const PROGRAMMING_TERMS: &[&str] = &[
    "const", "let", "var", "function", "return", "import", "export", "class", "interface", "type",
    "enum", "namespace", "async", "await", "true", "false", "null", "undefined", "typeof",
    "instanceof",
];

/// Rules too strict for informal technical prose
pub const SKIPPED_RULES: &[&str] = &[
    "UPPERCASE_SENTENCE_START",
    "WHITESPACE_RULE",
    "DOUBLE_PUNCTUATION",
];

pub const ALLOWED_CATEGORIES: &[&str] = &["TYPOS", "SPELLING", "GRAMMAR"];

pub const FILE_EXTENSIONS: &[&str] = &[
    "js", "ts", "html", "css", "json", "xml", "yml", "yaml", "md", "txt", "pdf", "png", "jpg",
    "jpeg", "gif", "svg",
];

/// Substrings that mark an address rather than a word
const ADDRESS_MARKERS: &[&str] = &["@", ".com", "http"];

/// Longest all-caps word still treated as an acronym
const ACRONYM_MAX_LEN: usize = 5;

lazy_static! {
    static ref CAMEL_CASE: Regex = Regex::new(r"\p{Ll}\p{Lu}").unwrap();
    static ref FILE_EXTENSION: Regex =
        Regex::new(&format!(r"(?i)\.(?:{})$", FILE_EXTENSIONS.join("|"))).unwrap();
    static ref ADDRESS: AhoCorasick = AhoCorasick::builder()
        .ascii_case_insensitive(true)
        .build(ADDRESS_MARKERS)
        .unwrap();
}

/// Heuristic check for identifiers, acronyms, addresses and keywords
pub fn is_likely_technical(word: &str) -> bool {
    if word.chars().any(|c| c.is_ascii_digit()) {
        return true;
    }

    if CAMEL_CASE.is_match(word) {
        return true;
    }

    if word.chars().count() <= ACRONYM_MAX_LEN && !word.chars().any(char::is_lowercase) {
        return true;
    }

    if word.contains('_') {
        return true;
    }

    if ADDRESS.is_match(word) || FILE_EXTENSION.is_match(word) {
        return true;
    }

    PROGRAMMING_TERMS.contains(&word.to_lowercase().as_str())
}

pub fn is_contraction(word: &str) -> bool {
    let normalized = word.to_lowercase().replace('\u{2019}', "'");
    CONTRACTIONS.contains(&normalized.as_str())
}

fn is_skipped_rule(rule_id: Option<&str>) -> bool {
    rule_id.is_some_and(|id| SKIPPED_RULES.contains(&id))
}

/// Categories are matched by fragment, so `TYPOS_EXTRA` still counts as typos
fn is_allowed_category(category: Option<&str>) -> bool {
    match category {
        None => true,
        Some(category) => {
            let category = category.to_uppercase();
            ALLOWED_CATEGORIES
                .iter()
                .any(|allowed| category.contains(allowed))
        }
    }
}

/// The dictionaries a match is checked against
pub struct Dictionaries<'a> {
    pub technical: &'a TechnicalDictionary,
    pub learned: &'a HashSet<String>,
}

impl Dictionaries<'_> {
    /// Whether a flagged word is accepted by a dictionary or a heuristic
    pub fn accepts(&self, word: &str) -> bool {
        let lower = word.to_lowercase();

        self.technical.contains(&lower)
            || self.learned.contains(&lower)
            || is_likely_technical(word)
            || is_contraction(word)
    }

    pub fn keeps(&self, flagged: &FlaggedMatch) -> bool {
        !self.accepts(&flagged.word)
            && !is_skipped_rule(flagged.rule_id.as_deref())
            && is_allowed_category(flagged.category.as_deref())
    }
}

/// Drop noise from raw matches, preserving the service's order
pub fn filter_matches(matches: &[FlaggedMatch], dictionaries: &Dictionaries<'_>) -> Vec<FlaggedMatch> {
    matches
        .iter()
        .filter(|m| dictionaries.keeps(m))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flagged(word: &str, category: Option<&str>, rule_id: Option<&str>) -> FlaggedMatch {
        FlaggedMatch {
            word: word.to_string(),
            start: 0,
            end: word.chars().count(),
            suggestions: Vec::new(),
            message: "Possible spelling mistake found.".to_string(),
            category: category.map(str::to_string),
            rule_id: rule_id.map(str::to_string),
        }
    }

    #[test]
    fn test_technical_heuristics() {
        assert!(is_likely_technical("API2"));
        assert!(is_likely_technical("getUserName"));
        assert!(is_likely_technical("CSS"));
        assert!(is_likely_technical("snake_case"));
        assert!(is_likely_technical("me@example.org"));
        assert!(is_likely_technical("example.com"));
        assert!(is_likely_technical("https"));
        assert!(is_likely_technical("config.YAML"));
        assert!(is_likely_technical("undefined"));
        assert!(is_likely_technical("Async"));

        assert!(!is_likely_technical("Teh"));
        assert!(!is_likely_technical("recieve"));
        assert!(!is_likely_technical("KUBERNETES"));
    }

    #[test]
    fn test_contractions() {
        assert!(is_contraction("don't"));
        assert!(is_contraction("Don\u{2019}t"));
        assert!(is_contraction("THERE'S"));
        assert!(!is_contraction("dont"));
        assert_eq!(CONTRACTIONS.len(), 50);
    }

    #[test]
    fn test_closed_lists() {
        assert!(SKIPPED_RULES.contains(&"WHITESPACE_RULE"));
        assert!(PROGRAMMING_TERMS.contains(&"instanceof"));
        assert_eq!(ALLOWED_CATEGORIES, &["TYPOS", "SPELLING", "GRAMMAR"]);
    }

    #[test]
    fn test_filter_pipeline() {
        let technical = TechnicalDictionary::from_words(["kubernetes"]).unwrap();
        let learned: HashSet<String> = ["frobnicate".to_string()].into_iter().collect();
        let dictionaries = Dictionaries {
            technical: &technical,
            learned: &learned,
        };

        let raw = vec![
            flagged("Teh", Some("TYPOS"), Some("MORFOLOGIK_RULE_EN_US")),
            flagged("API2", Some("TYPOS"), None),
            flagged("getUserName", Some("TYPOS"), None),
            flagged("CSS", Some("TYPOS"), None),
            flagged("don't", Some("TYPOS"), None),
            flagged("Kubernetes", Some("TYPOS"), None),
            flagged("Frobnicate", Some("TYPOS"), None),
            flagged("hello", Some("CASING"), Some("UPPERCASE_SENTENCE_START")),
            flagged("there", Some("STYLE"), Some("SOME_STYLE_RULE")),
            flagged("an", Some("GRAMMAR"), Some("EN_A_VS_AN")),
            flagged("recieve", None, None),
        ];

        let kept: Vec<_> = filter_matches(&raw, &dictionaries)
            .into_iter()
            .map(|m| m.word)
            .collect();
        assert_eq!(kept, vec!["Teh", "an", "recieve"]);
    }

    #[test]
    fn test_category_fragments() {
        assert!(is_allowed_category(Some("TYPOS")));
        assert!(is_allowed_category(Some("grammar")));
        assert!(is_allowed_category(None));
        assert!(!is_allowed_category(Some("PUNCTUATION")));
    }
}
