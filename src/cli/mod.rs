pub mod output;

use crate::checker::SpellCheckEngine;
use crate::parser::{self, char_slice, Extraction};
use crate::{CheckResult, FlaggedMatch, SpellError};
use anyhow::{Context, Result};
use output::{
    print_errors, print_interactive_prompt, print_not_stored, OutputFormat, PromptChoice,
};
use std::fs;
use std::path::Path;

/// Chars of flat text shown on each side of a match
const CONTEXT_RADIUS: usize = 20;

/// Extract a file, check its flat text and report what was flagged
pub async fn check_file(
    engine: &SpellCheckEngine,
    file_path: &Path,
    colored: bool,
    format: &OutputFormat,
) -> Result<CheckResult> {
    let content = fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read file: {}", file_path.display()))?;

    let extraction = parser::parse_file(file_path, &content);
    let matches = engine.check_text(&extraction.text).await;
    let errors = resolve_matches(&extraction, &matches);

    let result = CheckResult {
        error_count: errors.len(),
        learned_count: 0,
        errors,
    };

    print_errors(file_path, &result, colored, format);

    Ok(result)
}

/// Like `check_file`, but offers to learn each flagged word
pub async fn check_file_interactive(
    engine: &SpellCheckEngine,
    file_path: &Path,
    colored: bool,
) -> Result<CheckResult> {
    let content = fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read file: {}", file_path.display()))?;

    let extraction = parser::parse_file(file_path, &content);
    let matches = engine.check_text(&extraction.text).await;

    let mut remaining = Vec::new();
    let mut learned_count = 0;

    for error in resolve_matches(&extraction, &matches) {
        // An earlier answer may already cover this word
        if engine.is_accepted(&error.word).await {
            continue;
        }

        match print_interactive_prompt(&error, colored) {
            PromptChoice::Learn => learned_count += learn(engine, &error.word, colored).await,
            PromptChoice::Skip => remaining.push(error),
            PromptChoice::Quit => {
                remaining.push(error);
                break;
            }
        }
    }

    Ok(CheckResult {
        error_count: remaining.len(),
        learned_count,
        errors: remaining,
    })
}

/// Teach `word`, returning 1 only when the store persisted it
async fn learn(engine: &SpellCheckEngine, word: &str, colored: bool) -> usize {
    if engine.learn_word(word).await {
        1
    } else {
        print_not_stored(word, colored);
        0
    }
}

/// Map flagged matches back onto the segments they came from
pub fn resolve_matches(extraction: &Extraction, matches: &[FlaggedMatch]) -> Vec<SpellError> {
    matches
        .iter()
        .map(|flagged| SpellError {
            word: flagged.word.clone(),
            start: flagged.start,
            end: flagged.end,
            element_id: extraction
                .locate(flagged)
                .map(|segment| segment.origin.element_id()),
            context: get_context(&extraction.text, flagged.start, flagged.end),
            message: flagged.message.clone(),
            suggestions: flagged.suggestions.clone(),
        })
        .collect()
}

fn get_context(text: &str, start: usize, end: usize) -> String {
    let total = text.chars().count();
    let from = start.saturating_sub(CONTEXT_RADIUS);
    let to = (end + CONTEXT_RADIUS).min(total);
    let context = char_slice(text, from, to).replace('\n', " ");

    match (from > 0, to < total) {
        (true, true) => format!("...{}...", context),
        (true, false) => format!("...{}", context),
        (false, true) => format!("{}...", context),
        (false, false) => context,
    }
}
