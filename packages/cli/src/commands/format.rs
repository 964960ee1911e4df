use super::read_content;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use scribe_document::{deserialize, serialize, serialize_pretty, try_deserialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct FormatArgs {
    /// Document file
    pub input: PathBuf,

    /// Indent the output
    #[arg(short, long)]
    pub pretty: bool,

    /// Rewrite the file instead of printing to stdout
    #[arg(short, long)]
    pub write: bool,
}

pub fn format(args: FormatArgs) -> Result<()> {
    let content = read_content(&args.input)?;

    // Plain-text files are converted rather than rejected
    if let Err(e) = try_deserialize(&content) {
        tracing::warn!(file = %args.input.display(), error = %e, "converting plain text");
    }

    let formatted = format_content(&content, args.pretty);
    if args.write {
        fs::write(&args.input, &formatted)?;
        println!("  {} {}", "✓".green(), args.input.display());
    } else {
        println!("{}", formatted);
    }
    Ok(())
}

fn format_content(content: &str, pretty: bool) -> String {
    let document = deserialize(content);
    if pretty {
        serialize_pretty(&document)
    } else {
        serialize(&document)
    }
}
