//! AGLDT XML extraction
//!
//! Pulls `<sentence>` elements and their `<word>` children out of a treebank
//! document. No schema validation is done: unknown elements and attributes
//! are ignored, missing attributes are filled in by the token model.

use crate::sentence::{RawWord, Sentence, SentenceMeta};
use roxmltree::{Node, ParsingOptions};
use thiserror::Error;

/// Error reading a treebank document
#[derive(Debug, Error)]
pub enum XmlError {
    #[error("XML error: {0}")]
    Parse(#[from] roxmltree::Error),
}

/// Sentences of one treebank document, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub sentences: Vec<Sentence>,
}

impl Document {
    pub fn metadata(&self) -> impl Iterator<Item = &SentenceMeta> {
        self.sentences.iter().map(|s| &s.meta)
    }
}

/// Parse a treebank document from its text
pub fn parse_document(text: &str) -> Result<Document, XmlError> {
    // Treebank files sometimes carry a DOCTYPE
    let mut options = ParsingOptions::default();
    options.allow_dtd = true;

    let doc = roxmltree::Document::parse_with_options(text, options)?;

    let sentences = doc
        .descendants()
        .filter(|n| n.has_tag_name("sentence"))
        .map(parse_sentence)
        .collect();

    Ok(Document { sentences })
}

fn attribute(node: Node<'_, '_>, name: &str) -> Option<String> {
    node.attribute(name)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn parse_sentence(node: Node<'_, '_>) -> Sentence {
    let meta = SentenceMeta {
        id: attribute(node, "id"),
        document_id: attribute(node, "document_id"),
        subdoc: attribute(node, "subdoc"),
    };

    let records: Vec<RawWord> = node
        .children()
        .filter(|n| n.has_tag_name("word"))
        .map(|word| {
            let mut raw = RawWord::new();
            for attr in word.attributes() {
                raw.insert(attr.name(), attr.value());
            }
            raw
        })
        .collect();

    Sentence::assemble(meta, &records)
}
