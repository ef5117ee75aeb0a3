use anyhow::{Context, Result};
use fst::{Set, Streamer};
use std::path::Path;
use tokio::fs;

/// Read-only set of technical terms, built once per session
pub struct TechnicalDictionary {
    set: Option<Set<Vec<u8>>>,
}

impl Default for TechnicalDictionary {
    fn default() -> Self {
        Self::empty()
    }
}

impl TechnicalDictionary {
    pub fn empty() -> Self {
        Self { set: None }
    }

    /// Build from arbitrary words; they are lowercased and deduplicated
    pub fn from_words<I, S>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut sorted_words: Vec<String> = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        sorted_words.sort();
        sorted_words.dedup();

        if sorted_words.is_empty() {
            return Ok(Self::empty());
        }

        let set = Set::from_iter(sorted_words).context("Failed to build technical dictionary")?;
        Ok(Self { set: Some(set) })
    }

    /// Load a JSON array of strings
    pub async fn load_json(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read technical terms: {}", path.display()))?;
        let terms: Vec<String> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse technical terms: {}", path.display()))?;

        Self::from_words(terms)
    }

    /// `word` must already be lowercase
    pub fn contains(&self, word: &str) -> bool {
        self.set
            .as_ref()
            .is_some_and(|set| set.contains(word.as_bytes()))
    }

    pub fn len(&self) -> usize {
        self.set.as_ref().map_or(0, |set| set.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn words(&self) -> Vec<String> {
        let mut words = Vec::new();
        let Some(set) = &self.set else {
            return words;
        };

        let mut stream = set.stream();

        while let Some(key) = stream.next() {
            if let Ok(word) = String::from_utf8(key.to_vec()) {
                words.push(word);
            }
        }

        words
    }
}
