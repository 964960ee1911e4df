mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    apply, ask, format, init, stats, text, ApplyArgs, AskArgs, FormatArgs, InitArgs, StatsArgs,
    TextArgs,
};

/// Scribe CLI - rich text documents from the command line
#[derive(Parser, Debug)]
#[command(name = "scribe")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default scribe.config.json
    Init(InitArgs),

    /// Print a document as plain text
    Text(TextArgs),

    /// Normalize and rewrite a document
    Format(FormatArgs),

    /// Word, character and block counts
    Stats(StatsArgs),

    /// Run key chords or a link against a document
    Apply(ApplyArgs),

    /// Ask the assistant about a document
    Ask(AskArgs),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let cwd = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(err) => {
            eprintln!("{} Cannot get current directory: {}", "Error:".red().bold(), err);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::Text(args) => text(args, &cwd),
        Command::Format(args) => format(args),
        Command::Stats(args) => stats(args),
        Command::Apply(args) => apply(args, &cwd),
        Command::Ask(args) => ask(args, &cwd),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
