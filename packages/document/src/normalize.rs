//! Normalization restores the tree invariants after an edit.
//!
//! Rules, applied bottom-up in a single pass:
//!
//! - the root holds block elements only; stray text and links are grouped
//!   into a paragraph and stray list items become paragraphs
//! - lists hold list items only; nested lists are hoisted into their parent,
//!   other blocks are converted, empty lists are removed
//! - text blocks hold text and links only; nested blocks are flattened
//! - links need a non-empty url and some text, otherwise they are unwrapped
//!   or dropped, and never contain other elements
//! - `url` only survives on links, `align` never does
//! - adjacent text with equal marks is merged, empty text is dropped unless
//!   it is the only child
//! - the root is never empty
//!
//! The pass is idempotent: normalizing a normalized tree changes nothing.

use crate::ast::{Document, Element, ElementKind, Node, Text};
use std::mem;

impl Document {
    pub fn normalize(&mut self) {
        let nodes = mem::take(&mut self.children);
        self.children = normalize_root(nodes);
    }

    /// Run `f` with normalization suspended, normalizing once afterwards.
    /// Calls nest; only the outermost one normalizes.
    pub fn without_normalizing<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.suspended += 1;
        let result = f(self);
        self.suspended -= 1;
        self.normalize_if_ready();
        result
    }

    pub fn is_normalizing(&self) -> bool {
        self.suspended == 0
    }

    pub fn is_normalized(&self) -> bool {
        let mut copy = self.clone();
        copy.normalize();
        copy.children == self.children
    }

    pub(crate) fn normalize_if_ready(&mut self) {
        if self.is_normalizing() {
            self.normalize();
        }
    }
}

fn normalize_root(nodes: Vec<Node>) -> Vec<Node> {
    let mut blocks = Vec::with_capacity(nodes.len());
    let mut stray = Vec::new();

    for node in nodes {
        match node {
            Node::Text(_) => stray.push(node),
            Node::Element(element) if element.kind.is_inline() => stray.push(Node::Element(element)),
            Node::Element(mut element) => {
                flush_paragraph(&mut stray, &mut blocks);
                if element.kind == ElementKind::ListItem {
                    element.kind = ElementKind::Paragraph;
                }
                if element.kind.is_list() {
                    if let Some(list) = normalize_list(element) {
                        blocks.push(Node::Element(list));
                    }
                } else {
                    blocks.push(Node::Element(normalize_text_block(element)));
                }
            }
        }
    }
    flush_paragraph(&mut stray, &mut blocks);

    if blocks.is_empty() {
        blocks.push(Node::Element(normalize_text_block(Element::paragraph(Vec::new()))));
    }
    blocks
}

fn flush_paragraph(stray: &mut Vec<Node>, blocks: &mut Vec<Node>) {
    if stray.is_empty() {
        return;
    }
    let paragraph = Element::paragraph(mem::take(stray));
    blocks.push(Node::Element(normalize_text_block(paragraph)));
}

fn normalize_list(mut list: Element) -> Option<Element> {
    list.url = None;

    let mut items = Vec::with_capacity(list.children.len());
    let mut stray = Vec::new();

    for child in mem::take(&mut list.children) {
        match child {
            Node::Text(_) => stray.push(child),
            Node::Element(element) if element.kind.is_inline() => stray.push(Node::Element(element)),
            Node::Element(element) if element.kind.is_list() => {
                flush_item(&mut stray, &mut items);
                if let Some(nested) = normalize_list(element) {
                    items.extend(nested.children);
                }
            }
            Node::Element(mut element) => {
                flush_item(&mut stray, &mut items);
                element.kind = ElementKind::ListItem;
                items.push(Node::Element(normalize_text_block(element)));
            }
        }
    }
    flush_item(&mut stray, &mut items);

    if items.is_empty() {
        return None;
    }
    list.children = items;
    Some(list)
}

fn flush_item(stray: &mut Vec<Node>, items: &mut Vec<Node>) {
    if stray.is_empty() {
        return;
    }
    let item = Element::new(ElementKind::ListItem, mem::take(stray));
    items.push(Node::Element(normalize_text_block(item)));
}

fn normalize_text_block(mut block: Element) -> Element {
    block.url = None;
    let inline = flatten_inline(mem::take(&mut block.children));
    block.children = coalesce(inline);
    block
}

fn flatten_inline(nodes: Vec<Node>) -> Vec<Node> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Text(_) => out.push(node),
            Node::Element(element) if element.kind == ElementKind::Link => {
                out.extend(normalize_link(element));
            }
            Node::Element(element) => out.extend(flatten_inline(element.children)),
        }
    }
    out
}

/// A normalized link, its bare text when the url is missing, or nothing
/// when it holds no text.
fn normalize_link(mut link: Element) -> Vec<Node> {
    let mut texts = Vec::new();
    collect_texts(mem::take(&mut link.children), &mut texts);

    let has_url = link.url.as_deref().is_some_and(|url| !url.trim().is_empty());
    if !has_url {
        return texts;
    }
    if texts.iter().all(|node| node.char_len() == 0) {
        return Vec::new();
    }

    link.align = None;
    link.children = coalesce(texts);
    vec![Node::Element(link)]
}

fn collect_texts(nodes: Vec<Node>, out: &mut Vec<Node>) {
    for node in nodes {
        match node {
            Node::Text(_) => out.push(node),
            Node::Element(element) => collect_texts(element.children, out),
        }
    }
}

fn coalesce(nodes: Vec<Node>) -> Vec<Node> {
    let has_content = nodes.iter().any(|node| match node {
        Node::Text(text) => !text.is_empty(),
        Node::Element(_) => true,
    });

    let mut out: Vec<Node> = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Text(text) => {
                if text.is_empty() && (has_content || !out.is_empty()) {
                    continue;
                }
                if let Some(Node::Text(previous)) = out.last_mut() {
                    if previous.marks == text.marks {
                        previous.text.push_str(&text.text);
                        continue;
                    }
                }
                out.push(Node::Text(text));
            }
            Node::Element(element) => {
                if let Some(Node::Element(previous)) = out.last_mut() {
                    if previous.kind == element.kind && previous.url == element.url {
                        let mut merged = mem::take(&mut previous.children);
                        merged.extend(element.children);
                        previous.children = coalesce(merged);
                        continue;
                    }
                }
                out.push(Node::Element(element));
            }
        }
    }

    if out.is_empty() {
        out.push(Node::Text(Text::default()));
    }
    out
}
