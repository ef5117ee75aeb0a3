use crate::{CheckResult, SpellError};
use colored::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Write};
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonError {
    file: String,
    start: usize,
    end: usize,
    element_id: Option<String>,
    word: String,
    message: String,
    suggestions: Vec<String>,
    context: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonOutput {
    files_checked: usize,
    total_errors: usize,
    errors: Vec<JsonError>,
}

/// Answer to an interactive prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptChoice {
    Skip,
    Learn,
    Quit,
}

impl PromptChoice {
    pub fn parse(input: &str) -> Self {
        match input.trim() {
            "a" | "A" => PromptChoice::Learn,
            "q" | "Q" => PromptChoice::Quit,
            _ => PromptChoice::Skip,
        }
    }
}

pub fn print_errors(
    file_path: &Path,
    result: &CheckResult,
    colored_output: bool,
    format: &OutputFormat,
) {
    match format {
        OutputFormat::Text => print_text_errors(file_path, result, colored_output),
        OutputFormat::Json => print_json_errors(file_path, result),
    }
}

fn location(error: &SpellError) -> String {
    match &error.element_id {
        Some(id) => format!("{}:{}", id, error.start),
        None => error.start.to_string(),
    }
}

fn print_text_errors(file_path: &Path, result: &CheckResult, colored_output: bool) {
    if result.errors.is_empty() {
        return;
    }

    let file_name = file_path.display().to_string();

    if colored_output {
        println!("\n{}", file_name.bold().underline());
    } else {
        println!("\n{}", file_name);
    }

    for error in &result.errors {
        let location = location(error);

        if colored_output {
            println!(
                "  {} {} {}",
                location.blue().bold(),
                error.word.red().bold(),
                format_context(&error.context, &error.word, colored_output)
            );
            if !error.message.is_empty() {
                println!("    {}", error.message.dimmed());
            }

            if !error.suggestions.is_empty() {
                let suggestions = error
                    .suggestions
                    .iter()
                    .map(|s| s.green().to_string())
                    .collect::<Vec<_>>()
                    .join(&", ".dimmed().to_string());
                println!("    {} {}", "→".dimmed(), suggestions);
            }
        } else {
            println!("  {} {} {}", location, error.word, &error.context);
            if !error.message.is_empty() {
                println!("    {}", error.message);
            }

            if !error.suggestions.is_empty() {
                println!("    → {}", error.suggestions.join(", "));
            }
        }
    }
}

fn print_json_errors(file_path: &Path, result: &CheckResult) {
    let json_errors: Vec<JsonError> = result
        .errors
        .iter()
        .map(|e| JsonError {
            file: file_path.display().to_string(),
            start: e.start,
            end: e.end,
            element_id: e.element_id.clone(),
            word: e.word.clone(),
            message: e.message.clone(),
            suggestions: e.suggestions.clone(),
            context: e.context.clone(),
        })
        .collect();

    let output = JsonOutput {
        files_checked: 1,
        total_errors: result.error_count,
        errors: json_errors,
    };

    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error: failed to serialize report: {}", e),
    }
}

fn format_context(context: &str, word: &str, colored: bool) -> String {
    if colored {
        context.replace(word, &word.red().bold().to_string())
    } else {
        context.to_string()
    }
}

pub fn print_check_summary(total_errors: usize, files: &[impl AsRef<Path>], colored: bool) {
    println!();
    if total_errors == 0 {
        if colored {
            println!("{}", "✓ No spelling errors found!".green().bold());
        } else {
            println!("✓ No spelling errors found!");
        }
    } else {
        let error_word = if total_errors == 1 { "error" } else { "errors" };
        let file_word = if files.len() == 1 { "file" } else { "files" };
        if colored {
            println!(
                "{} {} {} found in {} {}",
                "✗".red().bold(),
                total_errors.to_string().red().bold(),
                error_word,
                files.len(),
                file_word
            );
        } else {
            println!(
                "✗ {} {} found in {} {}",
                total_errors,
                error_word,
                files.len(),
                file_word
            );
        }
    }
}

pub fn print_learn_summary(learned: usize, colored: bool) {
    if learned == 0 {
        return;
    }

    let word = if learned == 1 { "word" } else { "words" };
    if colored {
        println!(
            "{} {} {} added to the dictionary",
            "✓".green().bold(),
            learned.to_string().green().bold(),
            word
        );
    } else {
        println!("✓ {} {} added to the dictionary", learned, word);
    }
}

/// A learned word that the store did not newly persist
pub fn print_not_stored(word: &str, colored: bool) {
    if colored {
        println!(
            "{} {} is accepted for this session but was not newly stored",
            "!".yellow().bold(),
            word.cyan()
        );
    } else {
        println!(
            "! {} is accepted for this session but was not newly stored",
            word
        );
    }
}

pub fn print_interactive_prompt(error: &SpellError, colored: bool) -> PromptChoice {
    if colored {
        println!(
            "\n{} {}",
            "Possible mistake:".yellow().bold(),
            location(error).blue()
        );
        println!("  {}", format_context(&error.context, &error.word, colored));
        if !error.message.is_empty() {
            println!("  {}", error.message.dimmed());
        }
    } else {
        println!("\nPossible mistake: {}", location(error));
        println!("  {}", error.context);
        if !error.message.is_empty() {
            println!("  {}", error.message);
        }
    }

    if !error.suggestions.is_empty() {
        println!("  → {}", error.suggestions.join(", "));
    }

    for option in ["[s] Skip", "[a] Add to dictionary", "[q] Quit"] {
        println!("  {}", option);
    }

    print!("\nChoice: ");
    if io::stdout().flush().is_err() {
        return PromptChoice::Skip;
    }

    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return PromptChoice::Skip;
    }

    PromptChoice::parse(&input)
}
