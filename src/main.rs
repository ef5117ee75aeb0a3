use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use prosechk::cli::output::{print_check_summary, print_learn_summary, OutputFormat};
use prosechk::{cli, dict, Config, SpellCheckEngine};
use std::io;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "prosechk")]
#[command(version, about = "Spelling and grammar checks for rich-text documents", long_about = None)]
struct Cli {
    /// Files to check (.json portable text, .md markdown, anything else as plain text)
    #[arg(value_name = "FILES")]
    files: Vec<PathBuf>,

    /// Offer to add each flagged word to the dictionary
    #[arg(short, long)]
    interactive: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Exit with code 0 even if errors are found
    #[arg(long)]
    no_fail: bool,

    /// Language sent to the grammar service (e.g., en-US, en-GB)
    #[arg(short, long)]
    language: Option<String>,

    /// Output format (text, json)
    #[arg(short = 'o', long, default_value = "text")]
    format: OutputFormat,

    /// Config file (defaults to ./.prosechk.toml)
    #[arg(short, long, env = "PROSECHK_CONFIG")]
    config: Option<PathBuf>,

    /// Log engine activity to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Generate shell completion script
    #[arg(long, value_name = "SHELL")]
    completion: Option<Shell>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Parser, Debug)]
enum Commands {
    /// Learned word management
    Words {
        #[command(subcommand)]
        action: WordsCommands,
    },
}

#[derive(Parser, Debug)]
enum WordsCommands {
    /// List learned words
    List,
    /// Teach words to the dictionary
    Add {
        /// Words to accept from now on
        words: Vec<String>,
    },
    /// Re-read the word store into the local copy
    Sync,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("prosechk={}", default_level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    // Handle shell completion generation
    if let Some(shell) = cli.completion {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "prosechk", &mut io::stdout());
        return Ok(());
    }

    // Load configuration
    let config = Config::load(cli.language.clone(), cli.config.as_deref())?;
    debug!(?config, "configuration loaded");

    let engine = SpellCheckEngine::from_config(&config)?;

    // Handle subcommands
    if let Some(command) = cli.command {
        return handle_command(&engine, command).await;
    }

    // Validate input files
    if cli.files.is_empty() {
        anyhow::bail!("No files specified. Use --help for usage information.");
    }

    let pb = dict::manager::spinner("Connecting to grammar service...");
    engine.initialize().await;
    pb.finish_and_clear();

    let colored = !cli.no_color;
    let mut total_errors = 0;
    let mut total_learned = 0;

    for file_path in &cli.files {
        if !file_path.exists() {
            eprintln!("Error: File not found: {}", file_path.display());
            continue;
        }

        let result = if cli.interactive {
            cli::check_file_interactive(&engine, file_path, colored).await?
        } else {
            cli::check_file(&engine, file_path, colored, &cli.format).await?
        };

        total_errors += result.error_count;
        total_learned += result.learned_count;
    }

    // Print summary
    if matches!(cli.format, OutputFormat::Text) || cli.interactive {
        print_learn_summary(total_learned, colored);
        print_check_summary(total_errors, &cli.files, colored);
    }

    // Exit with appropriate code
    if total_errors > 0 && !cli.no_fail {
        std::process::exit(1);
    }

    Ok(())
}

async fn handle_command(engine: &SpellCheckEngine, command: Commands) -> Result<()> {
    match command {
        Commands::Words { action } => match action {
            WordsCommands::List => dict::manager::list_words(engine).await?,
            WordsCommands::Add { words } => dict::manager::add_words(engine, &words).await?,
            WordsCommands::Sync => dict::manager::sync_words(engine).await?,
        },
    }
    Ok(())
}
