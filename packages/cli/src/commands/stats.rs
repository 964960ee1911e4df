use super::{read_content, DOCUMENT_EXTENSIONS};
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use scribe_document::{deserialize, stats as document_stats, DocumentStats};
use scribe_editor::DEFAULT_CONFIG_NAME;
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Document file or directory
    pub input: PathBuf,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

#[derive(Debug, Serialize)]
struct FileStats {
    path: String,
    words: usize,
    characters: usize,
    blocks: usize,
}

impl FileStats {
    fn new(path: &Path, stats: DocumentStats) -> Self {
        Self {
            path: path.display().to_string(),
            words: stats.words,
            characters: stats.characters,
            blocks: stats.blocks,
        }
    }
}

pub fn stats(args: StatsArgs) -> Result<()> {
    let files = if args.input.is_file() {
        vec![args.input.clone()]
    } else if args.input.is_dir() {
        find_document_files(&args.input)
    } else {
        return Err(anyhow!(
            "Input path does not exist: {}",
            args.input.display()
        ));
    };

    let mut results = Vec::new();
    for file in &files {
        let document = deserialize(&read_content(file)?);
        results.push(FileStats::new(file, document_stats(&document)));
    }

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("{}", "⚠️  No documents found".yellow());
        return Ok(());
    }

    for result in &results {
        println!("{}", result.path.bright_white());
        println!(
            "  {} words, {} characters, {} blocks",
            result.words, result.characters, result.blocks
        );
    }
    if results.len() > 1 {
        let words: usize = results.iter().map(|r| r.words).sum();
        println!();
        println!(
            "{} {} words in {} documents",
            "Total:".green().bold(),
            words,
            results.len()
        );
    }
    Ok(())
}

fn find_document_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|entry| entry.into_path())
        .filter(|path| path.is_file() && is_document_file(path))
        .collect();
    files.sort();
    files
}

fn is_document_file(path: &Path) -> bool {
    if path.file_name().is_some_and(|name| name == DEFAULT_CONFIG_NAME) {
        return false;
    }
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| DOCUMENT_EXTENSIONS.contains(&ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_finds_documents_but_not_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("a.scribe"), "one two").unwrap();
        fs::write(dir.path().join("nested/b.json"), "[]").unwrap();
        fs::write(dir.path().join("notes.txt"), "skip").unwrap();
        fs::write(dir.path().join(DEFAULT_CONFIG_NAME), "{}").unwrap();

        let files = find_document_files(dir.path());
        let names: Vec<_> = files
            .iter()
            .filter_map(|path| path.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.scribe", "b.json"]);
    }

    #[test]
    fn test_missing_input() {
        let result = stats(StatsArgs {
            input: PathBuf::from("/definitely/not/here"),
            format: "text".to_string(),
        });
        assert!(result.is_err());
    }
}
