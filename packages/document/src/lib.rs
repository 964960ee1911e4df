//! # Scribe Document Model
//!
//! The structured-text tree behind the editor, with no I/O of its own.
//!
//! ```text
//! persisted string ──deserialize──▶ Document ──serialize──▶ persisted string
//!                                     │  ▲
//!                        transforms   │  │  normalize (after every edit)
//!                                     ▼  │
//!                                   Document ──plain_text──▶ chat context / stats
//! ```
//!
//! - [`ast`]: node types and tree navigation
//! - [`selection`]: points, ranges and block-relative positions
//! - [`transforms`]: invariant-preserving mutation primitives
//! - [`normalize`]: the pass that restores invariants
//! - [`serializer`]: the persisted form and its plain-text fallback

pub mod ast;
pub mod error;
pub mod normalize;
pub mod path;
pub mod selection;
pub mod serializer;
pub mod transforms;

pub use ast::{Align, Document, Element, ElementKind, Mark, MarkKind, Marks, Node, Text};
pub use error::{TreeError, TreeResult};
pub use path::Path;
pub use selection::{Point, Range, TextPosition};
pub use serializer::{
    deserialize, from_plain_text, plain_text, serialize, serialize_pretty, stats,
    try_deserialize, word_count, DocumentStats,
};
pub use transforms::ElementPatch;
