pub mod apply;
pub mod ask;
pub mod format;
pub mod init;
pub mod stats;
pub mod text;

pub use apply::{apply, ApplyArgs};
pub use ask::{ask, AskArgs};
pub use format::{format, FormatArgs};
pub use init::{init, InitArgs};
pub use stats::{stats, StatsArgs};
pub use text::{text, TextArgs};

use anyhow::{Context, Result};
use std::path::Path;

/// File extensions holding serialized documents
pub const DOCUMENT_EXTENSIONS: [&str; 2] = ["scribe", "json"];

/// Raw content of a document file. Callers hand it to `deserialize`, which
/// loads anything that is not a node array as plain text.
pub fn read_content(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))
}

/// Title used for a document file: its file stem
pub fn title_of(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
