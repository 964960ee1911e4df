//! # Tree Transforms
//!
//! Primitive mutations every command is built from. Each one validates its
//! target, applies the change and normalizes before returning (unless called
//! inside [`Document::without_normalizing`]).
//!
//! Path-addressed primitives (`insert_nodes`, `remove_node`, `wrap_nodes`...)
//! report bad targets as [`TreeError`]. Range-addressed ones work on
//! [`TextPosition`]s so they stay valid while leaves are split and merged
//! underneath them.

use crate::ast::{Align, Document, Element, ElementKind, Marks, Node, Text};
use crate::error::{TreeError, TreeResult};
use crate::path::Path;
use crate::selection::{Point, Range, TextPosition};
use std::collections::BTreeSet;

/// Shallow property update for an element. `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementPatch {
    pub kind: Option<ElementKind>,
    pub align: Option<Option<Align>>,
    pub url: Option<Option<String>>,
}

impl ElementPatch {
    pub fn kind(kind: ElementKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    pub fn align(align: Option<Align>) -> Self {
        Self {
            align: Some(align),
            ..Self::default()
        }
    }

    pub fn url(url: Option<String>) -> Self {
        Self {
            url: Some(url),
            ..Self::default()
        }
    }

    fn apply(&self, element: &mut Element) {
        if let Some(kind) = self.kind {
            element.kind = kind;
        }
        if let Some(align) = self.align {
            element.align = align;
        }
        if let Some(url) = &self.url {
            element.url = url.clone();
        }
    }
}

impl Document {
    /// Insert `nodes` so the first one ends up at `at`
    pub fn insert_nodes(&mut self, nodes: Vec<Node>, at: &Path) -> TreeResult<()> {
        let (index, parent) = split_path(at)?;
        let children = self
            .children_at_mut(&parent)
            .ok_or_else(|| TreeError::invalid_path(at))?;
        if index > children.len() {
            return Err(TreeError::invalid_path(at));
        }

        children.splice(index..index, nodes);
        self.normalize_if_ready();
        Ok(())
    }

    pub fn remove_node(&mut self, at: &Path) -> TreeResult<Node> {
        let (index, parent) = split_path(at)?;
        let children = self
            .children_at_mut(&parent)
            .ok_or_else(|| TreeError::invalid_path(at))?;
        if index >= children.len() {
            return Err(TreeError::invalid_path(at));
        }

        let node = children.remove(index);
        self.normalize_if_ready();
        Ok(node)
    }

    /// Remove every node the matcher accepts. Descendants of a removed node
    /// are not visited. Returns how many nodes were removed.
    pub fn remove_nodes(&mut self, matcher: impl Fn(&Path, &Node) -> bool) -> usize {
        let targets = self.matching_paths(&matcher);
        let count = targets.len();

        self.without_normalizing(|doc| {
            for path in targets.iter().rev() {
                let _ = doc.remove_node(path);
            }
        });
        count
    }

    /// Merge `patch` into the element at `at`. Children are never touched.
    pub fn set_node_properties(&mut self, at: &Path, patch: &ElementPatch) -> TreeResult<()> {
        let node = self.node_mut(at).ok_or_else(|| TreeError::invalid_path(at))?;
        let element = node
            .as_element_mut()
            .ok_or_else(|| TreeError::NotAnElement(at.clone()))?;

        patch.apply(element);
        self.normalize_if_ready();
        Ok(())
    }

    /// Move `count` siblings starting at `at` into `wrapper`, which takes
    /// their place. The wrapper's own children are replaced.
    pub fn wrap_nodes(&mut self, wrapper: Element, at: &Path, count: usize) -> TreeResult<()> {
        let (index, parent) = split_path(at)?;
        let children = self
            .children_at_mut(&parent)
            .ok_or_else(|| TreeError::invalid_path(at))?;
        if count == 0 || index + count > children.len() {
            return Err(TreeError::invalid_path(at));
        }

        let wrapped: Vec<Node> = children.drain(index..index + count).collect();
        children.insert(index, Node::Element(wrapper.shallow_clone(wrapped)));
        self.normalize_if_ready();
        Ok(())
    }

    /// Replace the element at `at` with its children
    pub fn unwrap_node(&mut self, at: &Path) -> TreeResult<()> {
        let (index, parent) = split_path(at)?;
        let children = self
            .children_at_mut(&parent)
            .ok_or_else(|| TreeError::invalid_path(at))?;

        match children.get(index) {
            Some(Node::Element(_)) => {}
            Some(Node::Text(_)) => return Err(TreeError::NotAnElement(at.clone())),
            None => return Err(TreeError::invalid_path(at)),
        }
        if let Node::Element(element) = children.remove(index) {
            children.splice(index..index, element.children);
        }
        self.normalize_if_ready();
        Ok(())
    }

    /// Unwrap every element the matcher accepts, innermost first.
    /// Returns how many elements were unwrapped.
    pub fn unwrap_nodes(&mut self, matcher: impl Fn(&Path, &Node) -> bool) -> usize {
        let mut targets = Vec::new();
        for (path, node) in self.descendants() {
            if node.as_element().is_some() && matcher(&path, node) {
                targets.push(path);
            }
        }
        let count = targets.len();

        self.without_normalizing(|doc| {
            for path in targets.iter().rev() {
                let _ = doc.unwrap_node(path);
            }
        });
        count
    }

    /// Split the element at `at` so that children from `index` on move into
    /// a new sibling with the same properties. Splitting at either edge does
    /// nothing and returns `false`.
    pub fn split_node(&mut self, at: &Path, index: usize) -> TreeResult<bool> {
        let (position, parent) = split_path(at)?;
        let siblings = self
            .children_at_mut(&parent)
            .ok_or_else(|| TreeError::invalid_path(at))?;
        let element = siblings
            .get_mut(position)
            .ok_or_else(|| TreeError::invalid_path(at))?
            .as_element_mut()
            .ok_or_else(|| TreeError::NotAnElement(at.clone()))?;

        if index == 0 || index >= element.children.len() {
            return Ok(false);
        }
        let tail = element.children.split_off(index);
        let sibling = element.shallow_clone(tail);
        siblings.insert(position + 1, Node::Element(sibling));
        self.normalize_if_ready();
        Ok(true)
    }

    /// Delete the span covered by `range`, merging the block holding its end
    /// into the block holding its start. Returns the collapsed caret.
    pub fn remove_range(&mut self, range: &Range) -> Option<Point> {
        let (start, end) = range.edges();
        let from = self.position_of(start)?;
        let to = self.position_of(end)?;
        let caret = self.delete_between(from, to)?;
        self.point_at(caret)
    }

    /// Delete everything between two positions. Returns where the caret
    /// lands, which is always `start`.
    pub fn delete_between(&mut self, start: TextPosition, end: TextPosition) -> Option<TextPosition> {
        let (start, end) = if end < start { (end, start) } else { (start, end) };
        let blocks = self.text_blocks();
        let first = blocks.get(start.block)?.clone();
        let last = blocks.get(end.block)?.clone();
        if start == end {
            return Some(start);
        }

        self.without_normalizing(|doc| {
            if start.block == end.block {
                let children = doc.children_at_mut(&first)?;
                let from = split_inline_at(children, start.offset);
                let to = split_inline_at(children, end.offset);
                children.drain(from..to);
                return Some(());
            }

            let tail = {
                let children = doc.children_at_mut(&last)?;
                let at = split_inline_at(children, end.offset);
                children.split_off(at)
            };
            {
                let children = doc.children_at_mut(&first)?;
                let at = split_inline_at(children, start.offset);
                children.truncate(at);
                children.extend(tail);
            }
            for path in blocks[start.block + 1..=end.block].iter().rev() {
                doc.remove_node(path).ok()?;
            }
            Some(())
        })?;

        Some(start)
    }

    /// Insert `text` at `position`. Without explicit marks the text joins the
    /// leaf at the position; with marks it becomes its own run. Returns the
    /// position just after the inserted text.
    pub fn insert_text(
        &mut self,
        position: TextPosition,
        text: &str,
        marks: Option<&Marks>,
    ) -> Option<TextPosition> {
        let point = self.point_at(position)?;
        let after = TextPosition::new(position.block, position.offset + text.chars().count());
        if text.is_empty() {
            return Some(position);
        }

        match marks {
            None => {
                let leaf = self.node_mut(&point.path)?.as_text_mut()?;
                let byte = byte_offset(&leaf.text, point.offset);
                leaf.text.insert_str(byte, text);
                self.normalize_if_ready();
            }
            Some(marks) => {
                let parent = point.path.parent()?;
                let index = point.path.last()?;
                self.without_normalizing(|doc| {
                    let siblings = doc.children_at_mut(&parent)?;
                    let Node::Text(leaf) = siblings.get_mut(index)? else {
                        return None;
                    };
                    let byte = byte_offset(&leaf.text, point.offset);
                    let tail = Text::with_marks(leaf.text.split_off(byte), leaf.marks.clone());
                    let inserted = Text::with_marks(text, marks.clone());
                    siblings.splice(
                        index + 1..index + 1,
                        [Node::Text(inserted), Node::Text(tail)],
                    );
                    Some(())
                })?;
            }
        }
        Some(after)
    }

    /// Insert an inline node (a link) at `position`, splitting the run it
    /// falls in. Returns the position just after the inserted node.
    pub fn insert_inline(&mut self, position: TextPosition, node: Node) -> Option<TextPosition> {
        let block = self.text_blocks().get(position.block)?.clone();
        let len = node.char_len();

        let children = self.children_at_mut(&block)?;
        let at = split_inline_at(children, position.offset);
        children.insert(at, node);

        self.normalize_if_ready();
        Some(TextPosition::new(position.block, position.offset + len))
    }

    /// Split the text block at `position` in two. The new block keeps the
    /// kind and alignment of the original. Returns the start of the new block.
    pub fn insert_break(&mut self, position: TextPosition) -> Option<TextPosition> {
        let block = self.text_blocks().get(position.block)?.clone();
        let (index, parent) = split_path(&block).ok()?;

        let siblings = self.children_at_mut(&parent)?;
        let Node::Element(element) = siblings.get_mut(index)? else {
            return None;
        };
        let at = split_inline_at(&mut element.children, position.offset);
        let tail = element.children.split_off(at);
        let sibling = element.shallow_clone(tail);
        siblings.insert(index + 1, Node::Element(sibling));

        self.normalize_if_ready();
        Some(TextPosition::new(position.block + 1, 0))
    }

    /// Apply `update` to the marks of every char in `range`, splitting leaves
    /// at the range edges. Collapsed ranges change nothing.
    pub fn update_marks(&mut self, range: &Range, update: impl Fn(&mut Marks)) -> bool {
        let Some(spans) = self.block_spans(range) else {
            return false;
        };

        self.without_normalizing(|doc| {
            let mut changed = false;
            for (block, from, to) in spans {
                let Some(children) = doc.children_at_mut(&block) else {
                    continue;
                };
                let first = split_inline_at(children, from);
                let last = split_inline_at(children, to);
                for node in &mut children[first..last] {
                    for_each_text(node, &update);
                    changed = true;
                }
            }
            changed
        })
    }

    /// Wrap the inline content covered by `range` in copies of `wrapper`,
    /// one per text block it crosses.
    pub fn wrap_inline(&mut self, wrapper: &Element, range: &Range) -> bool {
        let Some(spans) = self.block_spans(range) else {
            return false;
        };

        self.without_normalizing(|doc| {
            let mut changed = false;
            for (block, from, to) in spans {
                let Some(children) = doc.children_at_mut(&block) else {
                    continue;
                };
                let first = split_inline_at(children, from);
                let last = split_inline_at(children, to);
                let wrapped: Vec<Node> = children.drain(first..last).collect();
                children.insert(first, Node::Element(wrapper.shallow_clone(wrapped)));
                changed = true;
            }
            changed
        })
    }

    /// Lift the list items among text blocks `first..=last` out of their
    /// lists. Lists are split around the lifted items so untouched items stay
    /// listed. Lifted items keep the `list-item` kind until normalized.
    pub fn unwrap_lists(&mut self, first: usize, last: usize) {
        let blocks = self.text_blocks();
        let Some(targeted) = blocks.get(first..=last.min(blocks.len().saturating_sub(1))) else {
            return;
        };

        let mut groups: Vec<(Path, usize, usize)> = Vec::new();
        for path in targeted {
            let (Some(list), Some(index)) = (path.parent(), path.last()) else {
                continue;
            };
            if !self.element(&list).is_some_and(|element| element.kind.is_list()) {
                continue;
            }
            match groups.last_mut() {
                Some(group) if group.0 == list => group.2 = index,
                _ => groups.push((list, index, index)),
            }
        }

        self.without_normalizing(|doc| {
            for (list, from, to) in groups.into_iter().rev() {
                let _ = doc.split_node(&list, to + 1);
                let middle = match doc.split_node(&list, from) {
                    Ok(true) => list.next().unwrap_or(list),
                    _ => list,
                };
                let _ = doc.unwrap_node(&middle);
            }
        });
    }

    /// The inline range `(block path, from, to)` covered in each text block
    /// the range crosses. Empty spans are skipped.
    fn block_spans(&self, range: &Range) -> Option<Vec<(Path, usize, usize)>> {
        let (start, end) = range.edges();
        let from = self.position_of(start)?;
        let to = self.position_of(end)?;
        let blocks = self.text_blocks();

        let mut spans = Vec::new();
        for ordinal in from.block..=to.block {
            let path = blocks.get(ordinal)?;
            let block_start = if ordinal == from.block { from.offset } else { 0 };
            let block_end = if ordinal == to.block {
                to.offset
            } else {
                self.block_len(ordinal)
            };
            if block_start < block_end {
                spans.push((path.clone(), block_start, block_end));
            }
        }
        Some(spans)
    }

    fn matching_paths(&self, matcher: &impl Fn(&Path, &Node) -> bool) -> Vec<Path> {
        let mut targets: Vec<Path> = Vec::new();
        for (path, node) in self.descendants() {
            if targets.last().is_some_and(|last| path.is_within(last)) {
                continue;
            }
            if matcher(&path, node) {
                targets.push(path);
            }
        }
        targets
    }

    /// Link elements holding any leaf the range touches
    pub fn links_in_range(&self, range: &Range) -> Vec<Path> {
        let links: BTreeSet<Path> = self
            .touched_leaves(range)
            .iter()
            .filter_map(|leaf| self.ancestor_of_kind(leaf, ElementKind::Link))
            .collect();
        links.into_iter().collect()
    }
}

fn split_path(path: &Path) -> TreeResult<(usize, Path)> {
    match (path.last(), path.parent()) {
        (Some(index), Some(parent)) => Ok((index, parent)),
        _ => Err(TreeError::invalid_path(path)),
    }
}

/// Make sure a child boundary exists at char `offset` within `children`,
/// splitting a text or link that straddles it. Returns the index of the
/// first child starting at or after the offset.
fn split_inline_at(children: &mut Vec<Node>, offset: usize) -> usize {
    let mut start = 0;
    for index in 0..children.len() {
        if offset <= start {
            return index;
        }
        let len = children[index].char_len();
        if offset < start + len {
            let local = offset - start;
            let tail = match &mut children[index] {
                Node::Text(text) => {
                    let byte = byte_offset(&text.text, local);
                    Node::Text(Text::with_marks(text.text.split_off(byte), text.marks.clone()))
                }
                Node::Element(element) => {
                    let at = split_inline_at(&mut element.children, local);
                    let rest = element.children.split_off(at);
                    Node::Element(element.shallow_clone(rest))
                }
            };
            children.insert(index + 1, tail);
            return index + 1;
        }
        start += len;
    }
    children.len()
}

fn for_each_text(node: &mut Node, update: &impl Fn(&mut Marks)) {
    match node {
        Node::Text(text) => update(&mut text.marks),
        Node::Element(element) => {
            for child in &mut element.children {
                for_each_text(child, update);
            }
        }
    }
}

pub(crate) fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}
