pub mod checker;
pub mod cli;
pub mod config;
pub mod dict;
pub mod error;
pub mod parser;

pub use checker::SpellCheckEngine;
pub use config::Config;
pub use parser::{Extraction, Segment};

use serde::{Deserialize, Serialize};

/// A span flagged by the grammar service, in flat-text char offsets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlaggedMatch {
    pub word: String,
    pub start: usize,
    pub end: usize,
    pub suggestions: Vec<String>,
    pub message: String,
    pub category: Option<String>,
    pub rule_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CheckResult {
    pub error_count: usize,
    pub learned_count: usize,
    pub errors: Vec<SpellError>,
}

/// A flagged match resolved against the document it came from
#[derive(Debug, Clone)]
pub struct SpellError {
    pub word: String,
    pub start: usize,
    pub end: usize,
    /// Rendered element backing the match, when it maps to a segment
    pub element_id: Option<String>,
    pub context: String,
    pub message: String,
    pub suggestions: Vec<String>,
}
