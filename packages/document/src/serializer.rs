//! # Content Codec
//!
//! Converts a [`Document`] to and from its persisted string form: a JSON array
//! of nodes. Reading never fails. Content that is not a valid node array
//! (legacy plain text, truncated writes) becomes a single paragraph holding
//! the raw string verbatim.
//!
//! [`plain_text`] flattens a document for chat context and statistics. It is
//! lossy and never used for persistence.

use crate::ast::{Document, Element, Node, Text};
use crate::error::{TreeError, TreeResult};
use serde::{Deserialize, Serialize};

/// Serialize a document to its persisted form
pub fn serialize(doc: &Document) -> String {
    match serde_json::to_string(doc) {
        Ok(content) => content,
        Err(err) => {
            // Node types serialize infallibly; an error here is a bug
            tracing::error!(error = %err, "failed to serialize document");
            String::new()
        }
    }
}

/// Indented form, for files meant to be read by people
pub fn serialize_pretty(doc: &Document) -> String {
    match serde_json::to_string_pretty(doc) {
        Ok(content) => content,
        Err(err) => {
            tracing::error!(error = %err, "failed to serialize document");
            String::new()
        }
    }
}

/// Strict parse of the persisted form
pub fn try_deserialize(raw: &str) -> TreeResult<Document> {
    serde_json::from_str::<Document>(raw).map_err(|err| TreeError::malformed(err.to_string()))
}

/// Parse persisted content, falling back to a plain paragraph
pub fn deserialize(raw: &str) -> Document {
    if raw.is_empty() {
        return Document::default();
    }

    match try_deserialize(raw) {
        Ok(doc) => doc,
        Err(err) => {
            tracing::debug!(error = %err, len = raw.len(), "content is not a node array, treating as plain text");
            from_plain_text(raw)
        }
    }
}

/// A single unstyled paragraph holding `raw` as-is
pub fn from_plain_text(raw: &str) -> Document {
    Document::from_nodes(vec![Node::Element(Element::paragraph(vec![Node::Text(
        Text::new(raw),
    )]))])
}

/// Text of every block, one block per line
pub fn plain_text(doc: &Document) -> String {
    doc.text_blocks()
        .iter()
        .filter_map(|path| doc.node(path))
        .map(Node::string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStats {
    pub words: usize,
    pub characters: usize,
    pub blocks: usize,
}

pub fn word_count(doc: &Document) -> usize {
    plain_text(doc).split_whitespace().count()
}

pub fn stats(doc: &Document) -> DocumentStats {
    let text = plain_text(doc);
    DocumentStats {
        words: text.split_whitespace().count(),
        characters: doc
            .all_leaves()
            .iter()
            .map(|(_, leaf)| leaf.len())
            .sum(),
        blocks: doc.block_count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ElementKind, Marks};

    #[test]
    fn test_empty_content_is_default() {
        assert_eq!(deserialize(""), Document::default());
        assert_eq!(serialize(&deserialize("")), r#"[{"type":"paragraph","children":[{"text":""}]}]"#);
    }

    #[test]
    fn test_plain_text_fallback_is_verbatim() {
        for raw in ["just some notes", "[not json", "{\"text\": 1}", "   ", "[{\"type\":\"heading-four\",\"children\":[]}]"] {
            let doc = deserialize(raw);
            assert_eq!(doc.children().len(), 1);
            let paragraph = doc.children()[0].as_element().unwrap();
            assert_eq!(paragraph.kind, ElementKind::Paragraph);
            assert_eq!(paragraph.children, vec![Node::text(raw)]);
        }
    }

    #[test]
    fn test_strict_parse_reports_malformed() {
        assert!(matches!(
            try_deserialize("nope"),
            Err(TreeError::MalformedContent(_))
        ));
    }

    #[test]
    fn test_parse_normalizes() {
        let doc = deserialize(r#"[{"type":"paragraph","children":[{"text":"a"},{"text":"b"}]}]"#);
        assert_eq!(serialize(&doc), r#"[{"type":"paragraph","children":[{"text":"ab"}]}]"#);
    }

    #[test]
    fn test_wire_shape() {
        let doc = Document::from_nodes(vec![
            Element::new(ElementKind::HeadingOne, vec![Node::text("Title")])
                .with_align(crate::ast::Align::Center)
                .into(),
            Element::paragraph(vec![
                Node::Text(Text::with_marks(
                    "bold",
                    Marks {
                        bold: true,
                        color: Some("#ea4335".to_string()),
                        ..Marks::default()
                    },
                )),
                Element::link("https://example.com", vec![Node::text("link")]).into(),
            ])
            .into(),
        ]);

        assert_eq!(
            serialize(&doc),
            concat!(
                r#"[{"type":"heading-one","align":"center","children":[{"text":"Title"}]},"#,
                r##"{"type":"paragraph","children":[{"text":"bold","bold":true,"color":"#ea4335"},"##,
                r#"{"type":"link","url":"https://example.com","children":[{"text":"link"}]}]}]"#
            )
        );
    }

    #[test]
    fn test_plain_text_joins_blocks() {
        let doc = deserialize(
            r#"[
                {"type":"heading-two","children":[{"text":"Notes"}]},
                {"type":"bulleted-list","children":[
                    {"type":"list-item","children":[{"text":"first "},{"type":"link","url":"u","children":[{"text":"item"}]}]},
                    {"type":"list-item","children":[{"text":"second"}]}
                ]}
            ]"#,
        );
        assert_eq!(plain_text(&doc), "Notes\nfirst item\nsecond");
    }

    #[test]
    fn test_stats() {
        let doc = deserialize(
            r#"[{"type":"paragraph","children":[{"text":"one two"}]},{"type":"paragraph","children":[{"text":"three"}]}]"#,
        );
        assert_eq!(
            stats(&doc),
            DocumentStats {
                words: 3,
                characters: 12,
                blocks: 2,
            }
        );
        assert_eq!(word_count(&Document::default()), 0);
    }
}
