use super::{read_content, title_of};
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use scribe_editor::{EditSession, EditorConfig, MockChatBackend, QuickAction};
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct AskArgs {
    /// Document file
    pub input: PathBuf,

    /// Question about the document
    pub message: Option<String>,

    /// Canned prompt (summarize, improve, grammar, expand)
    #[arg(short, long)]
    pub action: Option<QuickAction>,
}

pub fn ask(args: AskArgs, cwd: &Path) -> Result<()> {
    let prompt = match (&args.message, args.action) {
        (Some(message), _) => message.clone(),
        (None, Some(action)) => action.prompt().to_string(),
        (None, None) => return Err(anyhow!("Provide a message or --action")),
    };

    let config = EditorConfig::load(cwd)?;
    let content = read_content(&args.input)?;
    let mut session =
        EditSession::from_content("cli", title_of(&args.input), &content).with_config(&config);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let reply = runtime.block_on(session.ask(&MockChatBackend, &prompt))?;

    println!("{} {}", "You:".bright_blue().bold(), prompt);
    println!("{} {}", "Assistant:".green().bold(), reply);
    Ok(())
}
