//! # Document Tree
//!
//! The in-memory shape of a formatted document.
//!
//! ```text
//! Document
//!  ├─ paragraph / heading-*            (text block)
//!  │   ├─ Text { text, marks }
//!  │   └─ link { url }
//!  │       └─ Text
//!  └─ numbered-list / bulleted-list    (container)
//!      └─ list-item                    (text block)
//!          └─ Text
//! ```
//!
//! Element kinds form a closed set. Adding one means extending [`ElementKind`]
//! and every exhaustive match over it.

use crate::path::Path;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementKind {
    Paragraph,
    HeadingOne,
    HeadingTwo,
    HeadingThree,
    ListItem,
    NumberedList,
    BulletedList,
    Link,
}

impl ElementKind {
    pub const ALL: [ElementKind; 8] = [
        ElementKind::Paragraph,
        ElementKind::HeadingOne,
        ElementKind::HeadingTwo,
        ElementKind::HeadingThree,
        ElementKind::ListItem,
        ElementKind::NumberedList,
        ElementKind::BulletedList,
        ElementKind::Link,
    ];

    /// Heading kind for a level. Levels without a kind fall back to paragraph.
    pub fn heading(level: u8) -> Self {
        match level {
            1 => ElementKind::HeadingOne,
            2 => ElementKind::HeadingTwo,
            3 => ElementKind::HeadingThree,
            _ => ElementKind::Paragraph,
        }
    }

    pub fn is_list(self) -> bool {
        matches!(self, ElementKind::NumberedList | ElementKind::BulletedList)
    }

    pub fn is_inline(self) -> bool {
        matches!(self, ElementKind::Link)
    }

    /// Blocks whose children are text runs and links
    pub fn is_text_block(self) -> bool {
        match self {
            ElementKind::Paragraph
            | ElementKind::HeadingOne
            | ElementKind::HeadingTwo
            | ElementKind::HeadingThree
            | ElementKind::ListItem => true,
            ElementKind::NumberedList | ElementKind::BulletedList | ElementKind::Link => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Paragraph => "paragraph",
            ElementKind::HeadingOne => "heading-one",
            ElementKind::HeadingTwo => "heading-two",
            ElementKind::HeadingThree => "heading-three",
            ElementKind::ListItem => "list-item",
            ElementKind::NumberedList => "numbered-list",
            ElementKind::BulletedList => "bulleted-list",
            ElementKind::Link => "link",
        }
    }
}

impl FromStr for ElementKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ElementKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("Unknown element kind: {}", s))
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    Center,
    Right,
    Justify,
}

impl Align {
    pub fn as_str(self) -> &'static str {
        match self {
            Align::Left => "left",
            Align::Center => "center",
            Align::Right => "right",
            Align::Justify => "justify",
        }
    }
}

impl FromStr for Align {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Align::Left),
            "center" => Ok(Align::Center),
            "right" => Ok(Align::Right),
            "justify" => Ok(Align::Justify),
            _ => Err(format!("Unknown alignment: {}", s)),
        }
    }
}

/// Inline formatting carried by a text run. Unset booleans and `None` values
/// are omitted when serialized, so `false` and absent compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marks {
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub underline: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// Logical pixels
    #[serde(default, skip_serializing_if = "Option::is_none", with = "font_size")]
    pub font_size: Option<u32>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Marks {
    /// True when the mark is set with exactly this value
    pub fn has(&self, mark: &Mark) -> bool {
        match mark {
            Mark::Bold => self.bold,
            Mark::Italic => self.italic,
            Mark::Underline => self.underline,
            Mark::Color(color) => self.color.as_deref() == Some(color.as_str()),
            Mark::FontSize(size) => self.font_size == Some(*size),
        }
    }

    pub fn add(&mut self, mark: &Mark) {
        match mark {
            Mark::Bold => self.bold = true,
            Mark::Italic => self.italic = true,
            Mark::Underline => self.underline = true,
            Mark::Color(color) => self.color = Some(color.clone()),
            Mark::FontSize(size) => self.font_size = Some(*size),
        }
    }

    pub fn remove(&mut self, kind: MarkKind) {
        match kind {
            MarkKind::Bold => self.bold = false,
            MarkKind::Italic => self.italic = false,
            MarkKind::Underline => self.underline = false,
            MarkKind::Color => self.color = None,
            MarkKind::FontSize => self.font_size = None,
        }
    }

    pub fn is_plain(&self) -> bool {
        *self == Marks::default()
    }
}

/// A single formatting attribute together with its value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "mark", content = "value", rename_all = "camelCase")]
pub enum Mark {
    Bold,
    Italic,
    Underline,
    Color(String),
    FontSize(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkKind {
    Bold,
    Italic,
    Underline,
    Color,
    FontSize,
}

impl Mark {
    pub fn kind(&self) -> MarkKind {
        match self {
            Mark::Bold => MarkKind::Bold,
            Mark::Italic => MarkKind::Italic,
            Mark::Underline => MarkKind::Underline,
            Mark::Color(_) => MarkKind::Color,
            Mark::FontSize(_) => MarkKind::FontSize,
        }
    }

    /// Build a mark from its wire name and optional value, e.g.
    /// `("fontSize", Some("16"))` or `("bold", None)`.
    pub fn parse(name: &str, value: Option<&str>) -> Option<Mark> {
        match name {
            "bold" => Some(Mark::Bold),
            "italic" => Some(Mark::Italic),
            "underline" => Some(Mark::Underline),
            "color" => value
                .filter(|v| !v.trim().is_empty())
                .map(|v| Mark::Color(v.trim().to_string())),
            "fontSize" | "font-size" => value
                .and_then(|v| v.trim().parse::<u32>().ok())
                .filter(|size| *size > 0)
                .map(Mark::FontSize),
            _ => None,
        }
    }
}

/// Leaf node: a run of characters sharing one set of marks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Text {
    pub text: String,

    #[serde(flatten)]
    pub marks: Marks,
}

impl Text {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: Marks::default(),
        }
    }

    pub fn with_marks(text: impl Into<String>, marks: Marks) -> Self {
        Self {
            text: text.into(),
            marks,
        }
    }

    /// Length in chars
    pub fn len(&self) -> usize {
        // Offsets everywhere in the tree count chars, not bytes
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    #[serde(rename = "type")]
    pub kind: ElementKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<Align>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default)]
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(kind: ElementKind, children: Vec<Node>) -> Self {
        Self {
            kind,
            align: None,
            url: None,
            children,
        }
    }

    pub fn paragraph(children: Vec<Node>) -> Self {
        Self::new(ElementKind::Paragraph, children)
    }

    pub fn link(url: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            kind: ElementKind::Link,
            align: None,
            url: Some(url.into()),
            children,
        }
    }

    pub fn with_align(mut self, align: Align) -> Self {
        self.align = Some(align);
        self
    }

    /// Copy of this element's properties with a different set of children
    pub fn shallow_clone(&self, children: Vec<Node>) -> Self {
        Self {
            kind: self.kind,
            align: self.align,
            url: self.url.clone(),
            children,
        }
    }
}

/// A node is either a structural element or a text leaf. Elements are tried
/// first when reading the wire form; anything carrying `text` and no `type`
/// is a leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Element(Element),
    Text(Text),
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(Text::new(text))
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Node::Text(text) => Some(text),
            Node::Element(_) => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut Text> {
        match self {
            Node::Text(text) => Some(text),
            Node::Element(_) => None,
        }
    }

    pub fn children(&self) -> Option<&Vec<Node>> {
        self.as_element().map(|element| &element.children)
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        self.as_element_mut().map(|element| &mut element.children)
    }

    pub fn is_kind(&self, kind: ElementKind) -> bool {
        self.as_element().is_some_and(|element| element.kind == kind)
    }

    /// Concatenated text of every leaf below this node
    pub fn string(&self) -> String {
        match self {
            Node::Text(text) => text.text.clone(),
            Node::Element(element) => element.children.iter().map(Node::string).collect(),
        }
    }

    /// Length of [`Node::string`] in chars
    pub fn char_len(&self) -> usize {
        match self {
            Node::Text(text) => text.len(),
            Node::Element(element) => element.children.iter().map(Node::char_len).sum(),
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl From<Text> for Node {
    fn from(text: Text) -> Self {
        Node::Text(text)
    }
}

/// The root of a document tree: an ordered sequence of blocks.
///
/// Mutating primitives normalize before they return unless they run inside
/// [`Document::without_normalizing`].
#[derive(Debug, Clone)]
pub struct Document {
    pub(crate) children: Vec<Node>,
    pub(crate) suspended: u32,
}

impl Document {
    /// Build a document from raw nodes, restoring every tree invariant
    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        let mut doc = Self {
            children: nodes,
            suspended: 0,
        };
        doc.normalize();
        doc
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn into_children(self) -> Vec<Node> {
        self.children
    }

    pub fn node(&self, path: &Path) -> Option<&Node> {
        let (first, rest) = path.split_first()?;
        let mut node = self.children.get(*first)?;
        for &index in rest {
            node = node.children()?.get(index)?;
        }
        Some(node)
    }

    pub fn node_mut(&mut self, path: &Path) -> Option<&mut Node> {
        let (first, rest) = path.split_first()?;
        let mut node = self.children.get_mut(*first)?;
        for &index in rest {
            node = node.children_mut()?.get_mut(index)?;
        }
        Some(node)
    }

    pub fn element(&self, path: &Path) -> Option<&Element> {
        self.node(path)?.as_element()
    }

    pub fn element_mut(&mut self, path: &Path) -> Option<&mut Element> {
        self.node_mut(path)?.as_element_mut()
    }

    pub fn text_node(&self, path: &Path) -> Option<&Text> {
        self.node(path)?.as_text()
    }

    /// Children of the node at `parent`; the root path yields the top level
    pub fn children_at(&self, parent: &Path) -> Option<&Vec<Node>> {
        if parent.is_root() {
            return Some(&self.children);
        }
        self.node(parent)?.children()
    }

    pub fn children_at_mut(&mut self, parent: &Path) -> Option<&mut Vec<Node>> {
        if parent.is_root() {
            return Some(&mut self.children);
        }
        self.node_mut(parent)?.children_mut()
    }

    /// Every node with its path, in document order
    pub fn descendants(&self) -> Vec<(Path, &Node)> {
        let mut out = Vec::new();
        collect_descendants(&self.children, &Path::root(), &mut out);
        out
    }

    /// Paths of all text blocks (paragraphs, headings, list items) in order
    pub fn text_blocks(&self) -> Vec<Path> {
        self.descendants()
            .into_iter()
            .filter(|(_, node)| {
                node.as_element()
                    .is_some_and(|element| element.kind.is_text_block())
            })
            .map(|(path, _)| path)
            .collect()
    }

    /// Text leaves below `at`, in order
    pub fn leaves(&self, at: &Path) -> Vec<(Path, &Text)> {
        let mut out = Vec::new();
        if let Some(node) = self.node(at) {
            collect_leaves(node, at, &mut out);
        }
        out
    }

    /// Every text leaf in the document, in order
    pub fn all_leaves(&self) -> Vec<(Path, &Text)> {
        let mut out = Vec::new();
        for (index, node) in self.children.iter().enumerate() {
            collect_leaves(node, &Path::new(vec![index]), &mut out);
        }
        out
    }

    /// Nearest ancestor-or-self of `path` that is a text block
    pub fn text_block_of(&self, path: &Path) -> Option<Path> {
        let mut current = Some(path.clone());
        while let Some(candidate) = current {
            if candidate.is_root() {
                return None;
            }
            if self
                .element(&candidate)
                .is_some_and(|element| element.kind.is_text_block())
            {
                return Some(candidate);
            }
            current = candidate.parent();
        }
        None
    }

    /// Nearest strict ancestor of `path` with the given kind
    pub fn ancestor_of_kind(&self, path: &Path, kind: ElementKind) -> Option<Path> {
        let mut current = path.parent();
        while let Some(candidate) = current {
            if candidate.is_root() {
                return None;
            }
            if self.node(&candidate).is_some_and(|node| node.is_kind(kind)) {
                return Some(candidate);
            }
            current = candidate.parent();
        }
        None
    }
}

fn collect_descendants<'a>(nodes: &'a [Node], prefix: &Path, out: &mut Vec<(Path, &'a Node)>) {
    for (index, node) in nodes.iter().enumerate() {
        let path = prefix.child(index);
        out.push((path.clone(), node));
        if let Some(children) = node.children() {
            collect_descendants(children, &path, out);
        }
    }
}

fn collect_leaves<'a>(node: &'a Node, path: &Path, out: &mut Vec<(Path, &'a Text)>) {
    match node {
        Node::Text(text) => out.push((path.clone(), text)),
        Node::Element(element) => {
            for (index, child) in element.children.iter().enumerate() {
                collect_leaves(child, &path.child(index), out);
            }
        }
    }
}

impl Default for Document {
    /// A single empty paragraph
    fn default() -> Self {
        Self {
            children: vec![Node::Element(Element::paragraph(vec![Node::Text(Text::default())]))],
            suspended: 0,
        }
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.children == other.children
    }
}

impl Eq for Document {}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.children.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let nodes = Vec::<Node>::deserialize(deserializer)?;
        Ok(Document::from_nodes(nodes))
    }
}

/// `fontSize` is written as a decimal string and accepted as a string or a
/// number. Values that do not describe a positive size are dropped.
mod font_size {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Integer(u64),
        Float(f64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &Option<u32>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(size) => serializer.serialize_str(&size.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
        let repr = Option::<Repr>::deserialize(deserializer)?;
        let size = match repr {
            Some(Repr::Integer(n)) => u32::try_from(n).ok(),
            Some(Repr::Float(f)) if f.is_finite() && f >= 1.0 => Some(f.round() as u32),
            Some(Repr::Float(_)) => None,
            Some(Repr::Text(s)) => s.trim().trim_end_matches("px").parse::<u32>().ok(),
            None => None,
        };
        Ok(size.filter(|size| *size > 0))
    }
}
