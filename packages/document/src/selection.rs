//! # Selection Model
//!
//! A [`Point`] is a leaf path plus a char offset into that leaf. A [`Range`]
//! is an anchor and a focus point; it is collapsed (a caret) when both are
//! equal and may be backward when the focus precedes the anchor.
//!
//! Structural edits move leaves around, so commands convert points to
//! [`TextPosition`]s (text block ordinal plus offset within the block) before
//! mutating and back afterwards. Neither form ever fails to resolve against a
//! non-empty tree: stale points degrade to the nearest surviving position.

use crate::ast::{Document, ElementKind};
use crate::path::Path;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Point {
    pub path: Path,
    pub offset: usize,
}

impl Point {
    pub fn new(path: impl Into<Path>, offset: usize) -> Self {
        Self {
            path: path.into(),
            offset,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub anchor: Point,
    pub focus: Point,
}

impl Range {
    pub fn new(anchor: Point, focus: Point) -> Self {
        Self { anchor, focus }
    }

    pub fn collapsed(point: Point) -> Self {
        Self {
            anchor: point.clone(),
            focus: point,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    pub fn is_expanded(&self) -> bool {
        !self.is_collapsed()
    }

    pub fn is_backward(&self) -> bool {
        self.focus < self.anchor
    }

    /// Start and end in document order
    pub fn edges(&self) -> (&Point, &Point) {
        if self.is_backward() {
            (&self.focus, &self.anchor)
        } else {
            (&self.anchor, &self.focus)
        }
    }

    pub fn start(&self) -> &Point {
        self.edges().0
    }

    pub fn end(&self) -> &Point {
        self.edges().1
    }
}

/// A location expressed as text block ordinal and char offset within the
/// block's concatenated text. Stable across splits and merges of leaves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TextPosition {
    pub block: usize,
    pub offset: usize,
}

impl TextPosition {
    pub fn new(block: usize, offset: usize) -> Self {
        Self { block, offset }
    }
}

impl Document {
    /// First position in the document
    pub fn start(&self) -> Point {
        self.all_leaves()
            .first()
            .map(|(path, _)| Point::new(path.clone(), 0))
            .unwrap_or_default()
    }

    /// Last position in the document
    pub fn end(&self) -> Point {
        self.all_leaves()
            .last()
            .map(|(path, text)| Point::new(path.clone(), text.len()))
            .unwrap_or_default()
    }

    /// Range spanning the whole document
    pub fn all(&self) -> Range {
        Range::new(self.start(), self.end())
    }

    pub fn start_of(&self, path: &Path) -> Option<Point> {
        self.leaves(path)
            .first()
            .map(|(leaf, _)| Point::new(leaf.clone(), 0))
    }

    pub fn end_of(&self, path: &Path) -> Option<Point> {
        self.leaves(path)
            .last()
            .map(|(leaf, text)| Point::new(leaf.clone(), text.len()))
    }

    /// Snap a possibly stale point onto an existing leaf. Offsets past the end
    /// of a leaf are clamped; paths that no longer exist fall back to the start
    /// of the nearest existing ancestor.
    pub fn resolve_point(&self, point: &Point) -> Point {
        if let Some(text) = self.text_node(&point.path) {
            return Point::new(point.path.clone(), point.offset.min(text.len()));
        }

        let mut current = Some(point.path.clone());
        while let Some(candidate) = current {
            if candidate.is_root() {
                break;
            }
            if self.node(&candidate).is_some() {
                if let Some(start) = self.start_of(&candidate) {
                    return start;
                }
            }
            current = candidate.parent();
        }
        self.start()
    }

    pub fn resolve_range(&self, range: &Range) -> Range {
        Range::new(self.resolve_point(&range.anchor), self.resolve_point(&range.focus))
    }

    pub fn is_valid_point(&self, point: &Point) -> bool {
        self.text_node(&point.path)
            .is_some_and(|text| point.offset <= text.len())
    }

    /// Convert a point into a block-relative position
    pub fn position_of(&self, point: &Point) -> Option<TextPosition> {
        let block = self.text_block_of(&point.path)?;
        let ordinal = self.text_blocks().iter().position(|path| *path == block)?;

        let mut offset = 0;
        for (leaf, text) in self.leaves(&block) {
            if leaf == point.path {
                return Some(TextPosition::new(ordinal, offset + point.offset.min(text.len())));
            }
            offset += text.len();
        }
        None
    }

    /// Convert a block-relative position back into a point. An offset that
    /// falls on a leaf boundary resolves to the end of the earlier leaf.
    /// Offsets past the end of the block clamp to its end.
    pub fn point_at(&self, position: TextPosition) -> Option<Point> {
        let blocks = self.text_blocks();
        let block = blocks.get(position.block)?;
        let leaves = self.leaves(block);

        let mut start = 0;
        for (leaf, text) in &leaves {
            let end = start + text.len();
            if position.offset <= end {
                return Some(Point::new(leaf.clone(), position.offset - start));
            }
            start = end;
        }
        leaves
            .last()
            .map(|(leaf, text)| Point::new(leaf.clone(), text.len()))
    }

    /// Number of text blocks
    pub fn block_count(&self) -> usize {
        self.text_blocks().len()
    }

    /// Concatenated char length of a text block
    pub fn block_len(&self, block: usize) -> usize {
        self.text_blocks()
            .get(block)
            .and_then(|path| self.node(path))
            .map(|node| node.char_len())
            .unwrap_or(0)
    }

    /// Trim an expanded range whose end sits at the very start of a later
    /// text block, so that block is not counted as selected.
    pub fn unhang_range(&self, range: &Range) -> Range {
        if range.is_collapsed() {
            return range.clone();
        }
        let (start, end) = range.edges();
        let (Some(start_pos), Some(end_pos)) = (self.position_of(start), self.position_of(end)) else {
            return range.clone();
        };
        if end_pos.offset != 0 || end_pos.block <= start_pos.block {
            return range.clone();
        }

        let previous = TextPosition::new(end_pos.block - 1, self.block_len(end_pos.block - 1));
        match self.point_at(previous) {
            Some(new_end) => Range::new(start.clone(), new_end),
            None => range.clone(),
        }
    }

    /// Recompute a point after the node at `deleted` has been removed from
    /// this tree. Points inside the removed subtree move to the start of the
    /// node that took its place, or the end of the preceding sibling.
    pub fn point_after_deletion(&self, point: &Point, deleted: &Path) -> Point {
        if let Some(path) = point.path.transform_removal(deleted) {
            return self.resolve_point(&Point::new(path, point.offset));
        }

        if self.node(deleted).is_some() {
            if let Some(start) = self.start_of(deleted) {
                return start;
            }
        }
        if let Some(end) = deleted.previous().and_then(|previous| self.end_of(&previous)) {
            return end;
        }
        self.resolve_point(&Point::new(deleted.clone(), 0))
    }

    pub fn range_after_deletion(&self, range: &Range, deleted: &Path) -> Range {
        Range::new(
            self.point_after_deletion(&range.anchor, deleted),
            self.point_after_deletion(&range.focus, deleted),
        )
    }

    /// Text block paths intersecting the range, in document order
    pub fn blocks_in_range(&self, range: &Range) -> Vec<Path> {
        let (start, end) = range.edges();
        let (Some(first), Some(last)) = (self.position_of(start), self.position_of(end)) else {
            return Vec::new();
        };
        self.text_blocks()
            .into_iter()
            .skip(first.block)
            .take(last.block.saturating_sub(first.block) + 1)
            .collect()
    }

    /// Leaves the range touches. A collapsed range touches the leaf holding
    /// the caret. An expanded range touches every leaf it overlaps by at least
    /// one char, plus the start leaf when nothing else overlaps.
    pub fn touched_leaves(&self, range: &Range) -> Vec<Path> {
        let (start, end) = range.edges();
        if range.is_collapsed() {
            return self
                .text_node(&start.path)
                .map(|_| vec![start.path.clone()])
                .unwrap_or_default();
        }

        let mut touched = Vec::new();
        for (path, text) in self.all_leaves() {
            if path < start.path || path > end.path {
                continue;
            }
            let from = if path == start.path { start.offset } else { 0 };
            let to = if path == end.path { end.offset } else { text.len() };
            if from < to {
                touched.push(path);
            }
        }
        if touched.is_empty() && self.text_node(&start.path).is_some() {
            touched.push(start.path.clone());
        }
        touched
    }

    /// Nearest enclosing element of `kind` for the point, if any
    pub fn enclosing(&self, point: &Point, kind: ElementKind) -> Option<Path> {
        self.ancestor_of_kind(&point.path, kind)
    }
}
