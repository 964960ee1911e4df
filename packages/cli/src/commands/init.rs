use anyhow::Result;
use clap::Args;
use colored::Colorize;
use scribe_document::{serialize_pretty, Align, Document, Element, ElementKind, Marks, Node, Text};
use scribe_editor::{EditorConfig, DEFAULT_CONFIG_NAME};
use std::fs;
use std::path::Path;

const WELCOME_FILE: &str = "welcome.scribe";

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Quiet interval before auto-save, in milliseconds
    #[arg(long, default_value_t = 2000)]
    pub autosave_delay_ms: u64,

    /// Undo levels kept (0 = unlimited)
    #[arg(long, default_value_t = 100)]
    pub history_depth: usize,

    /// Skip creating the welcome document
    #[arg(long)]
    pub bare: bool,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &Path) -> Result<()> {
    let config_path = EditorConfig::path_in(cwd);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing Scribe workspace...".bright_blue().bold());

    let config = EditorConfig {
        autosave_delay_ms: args.autosave_delay_ms,
        history_depth: args.history_depth,
        ..EditorConfig::default()
    };
    config.write(cwd)?;
    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);

    let welcome = cwd.join(WELCOME_FILE);
    if !args.bare && !welcome.exists() {
        fs::write(&welcome, serialize_pretty(&welcome_document()))?;
        println!("  {} Created {}", "✓".green(), WELCOME_FILE);
    }

    println!();
    println!("{}", "✅ Workspace initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Run: scribe text {}", WELCOME_FILE);
    println!("  2. Run: scribe apply {} --keys ctrl+b", WELCOME_FILE);
    println!("  3. Run: scribe stats .");

    Ok(())
}

fn welcome_document() -> Document {
    let bold = Marks {
        bold: true,
        ..Marks::default()
    };
    Document::from_nodes(vec![
        Element::new(ElementKind::HeadingOne, vec![Node::text("Welcome to Scribe")])
            .with_align(Align::Center)
            .into(),
        Element::paragraph(vec![
            Node::text("Documents are trees of "),
            Text::with_marks("blocks", bold).into(),
            Node::text(" holding formatted text."),
        ])
        .into(),
        Element::new(
            ElementKind::BulletedList,
            vec![
                Element::new(ElementKind::ListItem, vec![Node::text("Headings and lists")]).into(),
                Element::new(
                    ElementKind::ListItem,
                    vec![
                        Node::text("Links like "),
                        Element::link("https://example.com", vec![Node::text("this one")]).into(),
                    ],
                )
                .into(),
            ],
        )
        .into(),
    ])
}
