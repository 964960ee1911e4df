use super::{read_content, title_of};
use anyhow::Result;
use clap::Args;
use scribe_document::{deserialize, plain_text};
use scribe_editor::{document_context, EditorConfig};
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct TextArgs {
    /// Document file
    pub input: PathBuf,

    /// Print the assistant context instead of the full text
    #[arg(long)]
    pub context: bool,

    /// Title used in the context (defaults to the file name)
    #[arg(long)]
    pub title: Option<String>,
}

pub fn text(args: TextArgs, cwd: &Path) -> Result<()> {
    println!("{}", render(&args, cwd)?);
    Ok(())
}

fn render(args: &TextArgs, cwd: &Path) -> Result<String> {
    let document = deserialize(&read_content(&args.input)?);

    if args.context {
        let config = EditorConfig::load(cwd)?;
        let title = args
            .title
            .clone()
            .unwrap_or_else(|| title_of(&args.input));
        Ok(document_context(&title, &document, config.chat_context_limit))
    } else {
        Ok(plain_text(&document))
    }
}
