use super::{read_content, title_of};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use scribe_editor::{Dispatch, EditSession, EditorConfig, KeyChord, Keymap, Mutation};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Document file
    pub input: PathBuf,

    /// Key chords to press, comma separated (e.g. "ctrl+b,ctrl+alt+1")
    #[arg(short, long, value_delimiter = ',')]
    pub keys: Vec<String>,

    /// Link the selection to this url
    #[arg(long)]
    pub link: Option<String>,

    /// Text typed at the end of the document
    #[arg(long)]
    pub append: Option<String>,

    /// Put the caret at the end instead of selecting everything
    #[arg(long)]
    pub caret: bool,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn apply(args: ApplyArgs, cwd: &Path) -> Result<()> {
    let config = EditorConfig::load(cwd)?;
    let keymap = config.keymap()?;

    let content = read_content(&args.input)?;
    let mut session =
        EditSession::from_content("cli", title_of(&args.input), &content).with_config(&config);

    let content = run(&mut session, &keymap, &args)?;
    match &args.output {
        Some(output) => {
            fs::write(output, content)?;
            eprintln!(
                "  {} {} (version {})",
                "✓".green(),
                output.display(),
                session.version()
            );
        }
        None => println!("{}", content),
    }
    Ok(())
}

fn run(session: &mut EditSession, keymap: &Keymap, args: &ApplyArgs) -> Result<String> {
    if args.caret {
        let end = session.document().end();
        session.set_selection(Some(scribe_document::Range::collapsed(end)));
    } else {
        session.select_all();
    }

    for key in &args.keys {
        let chord: KeyChord = key.trim().parse()?;
        match session.handle_key(keymap, &chord)? {
            Dispatch::Command(_) => {}
            Dispatch::Reserved { action } => {
                eprintln!("  {} {} is reserved for {}", "⚠️".yellow(), chord, action);
            }
            Dispatch::Unhandled => {
                eprintln!("  {} {} is not an editor shortcut", "⚠️".yellow(), chord);
            }
        }
    }

    if let Some(url) = &args.link {
        session.apply(Mutation::ToggleLink { url: url.clone() })?;
    }

    if let Some(text) = &args.append {
        let end = session.document().end();
        session.set_selection(Some(scribe_document::Range::collapsed(end)));
        session.apply(Mutation::InsertText { text: text.clone() })?;
    }

    Ok(session.content())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_document::{deserialize, ElementKind, Path as NodePath};

    fn args(keys: &[&str]) -> ApplyArgs {
        ApplyArgs {
            input: PathBuf::from("doc.scribe"),
            keys: keys.iter().map(|key| key.to_string()).collect(),
            link: None,
            append: None,
            caret: false,
            output: None,
        }
    }

    #[test]
    fn test_keys_apply_to_whole_document() {
        let mut session = EditSession::from_content("cli", "doc", "Heading");
        let content = run(
            &mut session,
            &Keymap::with_defaults(),
            &args(&["ctrl+alt+1", "ctrl+b", "ctrl+k"]),
        )
        .unwrap();

        let document = deserialize(&content);
        let block = document.element(&NodePath::new(vec![0])).unwrap();
        assert_eq!(block.kind, ElementKind::HeadingOne);
        let leaf = document.text_node(&NodePath::new(vec![0, 0])).unwrap();
        assert!(leaf.marks.bold);
        assert_eq!(session.version(), 2);
    }

    #[test]
    fn test_append_and_link() {
        let mut session = EditSession::from_content("cli", "doc", "Read ");
        let mut args = args(&[]);
        args.link = Some("https://example.com".to_string());
        args.append = Some(" now".to_string());

        let content = run(&mut session, &Keymap::with_defaults(), &args).unwrap();
        assert!(content.contains(r#""url":"https://example.com""#));
        assert_eq!(session.plain_text(), "Read  now");
    }

    #[test]
    fn test_invalid_chord_is_an_error() {
        let mut session = EditSession::from_content("cli", "doc", "text");
        let result = run(&mut session, &Keymap::with_defaults(), &args(&["ctrl+"]));
        assert!(result.is_err());
    }
}
