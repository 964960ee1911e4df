use crate::chat::DEFAULT_CONTEXT_LIMIT;
use crate::keymap::{default_reserved_chords, Keymap, KeymapError, ReservedChord};
use crate::undo_stack::DEFAULT_HISTORY_DEPTH;
use crate::EditorError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_NAME: &str = "scribe.config.json";

/// Editor configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Quiet interval before auto-save, in milliseconds
    #[serde(default = "default_autosave_delay_ms")]
    pub autosave_delay_ms: u64,

    /// Undo levels kept (0 = unlimited)
    #[serde(default = "default_history_depth")]
    pub history_depth: usize,

    /// Characters of document text sent as chat context
    #[serde(default = "default_chat_context_limit")]
    pub chat_context_limit: usize,

    /// Chords handed back to the host instead of being handled
    #[serde(default = "default_reserved_chords")]
    pub reserved_chords: Vec<ReservedChord>,
}

fn default_autosave_delay_ms() -> u64 {
    2000
}

fn default_history_depth() -> usize {
    DEFAULT_HISTORY_DEPTH
}

fn default_chat_context_limit() -> usize {
    DEFAULT_CONTEXT_LIMIT
}

impl EditorConfig {
    /// Load config from a directory
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, EditorError> {
        let config_path = Self::path_in(dir);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: EditorConfig = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(EditorConfig::default())
        }
    }

    /// Write config into a directory, returning the file path
    pub fn write(&self, dir: impl AsRef<Path>) -> Result<PathBuf, EditorError> {
        let config_path = Self::path_in(dir);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, json)?;
        Ok(config_path)
    }

    pub fn path_in(dir: impl AsRef<Path>) -> PathBuf {
        dir.as_ref().join(DEFAULT_CONFIG_NAME)
    }

    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }

    /// Build the key dispatcher with the configured reserved chords
    pub fn keymap(&self) -> Result<Keymap, KeymapError> {
        Keymap::from_reserved(&self.reserved_chords)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            autosave_delay_ms: default_autosave_delay_ms(),
            history_depth: default_history_depth(),
            chat_context_limit: default_chat_context_limit(),
            reserved_chords: default_reserved_chords(),
        }
    }
}
