//! # Keymap Dispatcher
//!
//! Translates a key chord into at most one editor command. Rules are checked
//! in order and the first match wins:
//!
//! 1. Reserved chords belong to the host application (word count, link
//!    dialog). They are reported back and never consumed here.
//! 2. `ctrl` + letter (no alt, no meta): `b` `i` `u` toggle marks, `z` undoes
//!    and `shift+z` redoes.
//! 3. `ctrl+shift` + key (no alt): `l` `e` `r` `j` align, `7` `8` toggle
//!    numbered and bulleted lists, `.` `,` step the font size by 2.
//! 4. `ctrl+alt` + digit (no shift): `0` paragraph, `1`-`3` headings, `4`-`6`
//!    paragraph.
//!
//! Anything else is unhandled and falls through to default text input.

use crate::commands::{BlockFormat, FONT_SIZE_STEP};
use crate::mutations::Mutation;
use scribe_document::{Align, ElementKind, Mark};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Modifier keys as a bitfield
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const CTRL: Modifiers = Modifiers(0b0001);
    pub const SHIFT: Modifiers = Modifiers(0b0010);
    pub const ALT: Modifiers = Modifiers(0b0100);
    pub const META: Modifiers = Modifiers(0b1000);

    pub const fn new(ctrl: bool, shift: bool, alt: bool, meta: bool) -> Self {
        let mut bits = 0u8;
        if ctrl {
            bits |= 0b0001;
        }
        if shift {
            bits |= 0b0010;
        }
        if alt {
            bits |= 0b0100;
        }
        if meta {
            bits |= 0b1000;
        }
        Modifiers(bits)
    }

    #[inline]
    pub const fn ctrl(self) -> bool {
        self.0 & 0b0001 != 0
    }

    #[inline]
    pub const fn shift(self) -> bool {
        self.0 & 0b0010 != 0
    }

    #[inline]
    pub const fn alt(self) -> bool {
        self.0 & 0b0100 != 0
    }

    #[inline]
    pub const fn meta(self) -> bool {
        self.0 & 0b1000 != 0
    }

    #[inline]
    pub const fn union(self, other: Modifiers) -> Modifiers {
        Modifiers(self.0 | other.0)
    }

    #[inline]
    pub const fn contains(self, other: Modifiers) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    const fn intersect(self, other: Modifiers) -> Modifiers {
        Modifiers(self.0 & other.0)
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.ctrl() {
            parts.push("ctrl");
        }
        if self.shift() {
            parts.push("shift");
        }
        if self.alt() {
            parts.push("alt");
        }
        if self.meta() {
            parts.push("meta");
        }
        write!(f, "{}", parts.join("+"))
    }
}

/// A key as reported by the host: a character (lowercased) or a named key
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Named(String),
}

impl KeyCode {
    /// Build from a host key name such as `"b"`, `"B"`, `"."` or `"Enter"`
    pub fn from_key(key: &str) -> Self {
        let mut chars = key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => KeyCode::Char(c.to_ascii_lowercase()),
            _ => KeyCode::Named(key.to_lowercase()),
        }
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyCode::Char(c) => write!(f, "{}", c),
            KeyCode::Named(name) => f.write_str(name),
        }
    }
}

/// A key together with the modifiers held while pressing it
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub key: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyChord {
    pub fn new(key: KeyCode, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn char(c: char, modifiers: Modifiers) -> Self {
        Self::new(KeyCode::Char(c.to_ascii_lowercase()), modifiers)
    }

    /// Whether a pressed chord triggers this one. Ctrl and shift must match
    /// exactly; alt and meta held on top of this chord's own are ignored.
    pub fn covers(&self, pressed: &KeyChord) -> bool {
        let strict = Modifiers::CTRL | Modifiers::SHIFT;
        self.key == pressed.key
            && pressed.modifiers.contains(self.modifiers)
            && pressed.modifiers.intersect(strict) == self.modifiers.intersect(strict)
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers == Modifiers::NONE {
            write!(f, "{}", self.key)
        } else {
            write!(f, "{}+{}", self.modifiers, self.key)
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum KeymapError {
    #[error("Invalid key binding: {0}")]
    InvalidKey(String),
}

impl FromStr for KeyChord {
    type Err = KeymapError;

    /// Parse strings like `ctrl+shift+c`, `cmd+k` or `alt+1`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut modifiers = Modifiers::NONE;
        let mut key = None;

        // A trailing "+" is the plus key itself
        let (body, plus_key) = match s.strip_suffix("++") {
            Some(body) => (body, true),
            None => (s, s == "+"),
        };
        let parts: Vec<&str> = if plus_key && body == "+" {
            Vec::new()
        } else {
            body.split('+').filter(|part| !part.is_empty()).collect()
        };

        for part in parts {
            match part.trim().to_lowercase().as_str() {
                "cmd" | "ctrl" | "control" => modifiers = modifiers | Modifiers::CTRL,
                "shift" => modifiers = modifiers | Modifiers::SHIFT,
                "alt" | "option" | "opt" => modifiers = modifiers | Modifiers::ALT,
                "meta" | "super" | "win" => modifiers = modifiers | Modifiers::META,
                other => {
                    if key.is_some() {
                        return Err(KeymapError::InvalidKey(format!(
                            "Multiple keys in binding: {}",
                            s
                        )));
                    }
                    key = Some(KeyCode::from_key(other));
                }
            }
        }
        if plus_key {
            if key.is_some() {
                return Err(KeymapError::InvalidKey(format!("Multiple keys in binding: {}", s)));
            }
            key = Some(KeyCode::Char('+'));
        }

        let key = key.ok_or_else(|| KeymapError::InvalidKey(format!("No key found in binding: {}", s)))?;
        Ok(KeyChord::new(key, modifiers))
    }
}

/// A chord owned by the host application, with the action it triggers there
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservedChord {
    pub chord: String,
    pub action: String,
}

impl ReservedChord {
    pub fn new(chord: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            chord: chord.into(),
            action: action.into(),
        }
    }
}

/// Reserved chords every host starts with
pub fn default_reserved_chords() -> Vec<ReservedChord> {
    vec![
        ReservedChord::new("ctrl+shift+c", "word-count"),
        ReservedChord::new("ctrl+k", "insert-link"),
    ]
}

/// An editing intent a chord resolves to
#[derive(Debug, Clone, PartialEq)]
pub enum EditorCommand {
    Apply(Mutation),
    Undo,
    Redo,
}

/// Outcome of dispatching one chord
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// The host owns this chord; let the event continue to it
    Reserved { action: String },

    /// Run this command and consume the event
    Command(EditorCommand),

    /// Not an editor shortcut
    Unhandled,
}

#[derive(Debug, Clone, Default)]
pub struct Keymap {
    reserved: Vec<(KeyChord, String)>,
}

impl Keymap {
    /// Keymap without reserved chords
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut keymap = Self::new();
        for reserved in default_reserved_chords() {
            if let Ok(chord) = reserved.chord.parse() {
                keymap.reserved.push((chord, reserved.action));
            }
        }
        keymap
    }

    /// Build a keymap reserving the given chords
    pub fn from_reserved(reserved: &[ReservedChord]) -> Result<Self, KeymapError> {
        let reserved = reserved
            .iter()
            .map(|entry| Ok((entry.chord.parse::<KeyChord>()?, entry.action.clone())))
            .collect::<Result<Vec<_>, KeymapError>>()?;
        Ok(Self { reserved })
    }

    pub fn reserve(&mut self, chord: KeyChord, action: impl Into<String>) {
        self.reserved.push((chord, action.into()));
    }

    pub fn reserved(&self) -> impl Iterator<Item = (&KeyChord, &str)> {
        self.reserved
            .iter()
            .map(|(chord, action)| (chord, action.as_str()))
    }

    pub fn resolve(&self, chord: &KeyChord) -> Dispatch {
        let dispatch = self.resolve_inner(chord);
        tracing::debug!(%chord, ?dispatch, "resolved key chord");
        dispatch
    }

    fn resolve_inner(&self, chord: &KeyChord) -> Dispatch {
        if let Some((_, action)) = self
            .reserved
            .iter()
            .find(|(reserved, _)| reserved.covers(chord))
        {
            return Dispatch::Reserved {
                action: action.clone(),
            };
        }

        let KeyCode::Char(key) = chord.key else {
            return Dispatch::Unhandled;
        };
        let mods = chord.modifiers;
        if !mods.ctrl() {
            return Dispatch::Unhandled;
        }

        if !mods.alt() && !mods.meta() {
            let command = match key {
                'b' => Some(toggle(Mark::Bold)),
                'i' => Some(toggle(Mark::Italic)),
                'u' => Some(toggle(Mark::Underline)),
                'z' if mods.shift() => Some(EditorCommand::Redo),
                'z' => Some(EditorCommand::Undo),
                _ => None,
            };
            if let Some(command) = command {
                return Dispatch::Command(command);
            }
        }

        if mods.shift() && !mods.alt() {
            let mutation = match key {
                'l' => Some(block(BlockFormat::Align(Align::Left))),
                'e' => Some(block(BlockFormat::Align(Align::Center))),
                'r' => Some(block(BlockFormat::Align(Align::Right))),
                'j' => Some(block(BlockFormat::Align(Align::Justify))),
                '7' | '&' => Some(block(BlockFormat::Kind(ElementKind::NumberedList))),
                '8' | '*' => Some(block(BlockFormat::Kind(ElementKind::BulletedList))),
                '.' | '>' => Some(Mutation::AdjustFontSize {
                    delta: FONT_SIZE_STEP,
                }),
                ',' | '<' => Some(Mutation::AdjustFontSize {
                    delta: -FONT_SIZE_STEP,
                }),
                _ => None,
            };
            if let Some(mutation) = mutation {
                return Dispatch::Command(EditorCommand::Apply(mutation));
            }
        }

        if mods.alt() && !mods.shift() {
            if let Some(level) = key.to_digit(10).filter(|digit| *digit <= 6) {
                // No heading kinds beyond level 3; those digits fall back to paragraph
                let kind = match level {
                    1..=3 => ElementKind::heading(level as u8),
                    _ => ElementKind::Paragraph,
                };
                return Dispatch::Command(EditorCommand::Apply(block(BlockFormat::Kind(kind))));
            }
        }

        Dispatch::Unhandled
    }
}

fn toggle(mark: Mark) -> EditorCommand {
    EditorCommand::Apply(Mutation::ToggleMark { mark })
}

fn block(format: BlockFormat) -> Mutation {
    Mutation::ToggleBlock { format }
}
