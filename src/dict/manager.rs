use crate::checker::SpellCheckEngine;
use crate::cli::output::print_not_stored;
use anyhow::Result;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown while the engine waits on the network
pub fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

pub async fn list_words(engine: &SpellCheckEngine) -> Result<()> {
    engine.initialize().await;
    let words = engine.learned_words().await;

    if words.is_empty() {
        println!("{}", "No learned words yet.".yellow());
        println!(
            "Run {} to add one.",
            "prosechk words add <WORD>".cyan()
        );
        return Ok(());
    }

    println!("{}", "Learned words:".bold());
    println!();
    for word in &words {
        println!("  {} {}", "✓".green(), word.cyan());
    }
    println!();
    println!("{} {}", words.len().to_string().yellow(), "total".dimmed());

    Ok(())
}

pub async fn add_words(engine: &SpellCheckEngine, words: &[String]) -> Result<()> {
    if words.is_empty() {
        anyhow::bail!("No words given. Use --help for usage information.");
    }

    let pb = spinner("Saving...");
    engine.initialize().await;

    let mut outcomes = Vec::new();
    for word in words {
        let persisted = engine.learn_word(word).await;
        outcomes.push((word, persisted));
    }
    pb.finish_and_clear();

    for (word, persisted) in outcomes {
        if persisted {
            println!("{} Added {}", "✓".green().bold(), word.cyan());
        } else {
            print_not_stored(word, true);
        }
    }

    Ok(())
}

pub async fn sync_words(engine: &SpellCheckEngine) -> Result<()> {
    let pb = spinner("Syncing learned words...");
    engine.initialize().await;
    let before = engine.learned_words().await.len();
    engine.reconcile().await;
    let after = engine.learned_words().await.len();
    pb.finish_and_clear();

    println!(
        "{} {} learned words ({} new)",
        "✓".green().bold(),
        after.to_string().cyan(),
        after.saturating_sub(before)
    );

    Ok(())
}
