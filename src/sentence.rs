//! Sentence assembly
//!
//! Turns the raw attribute records of a `<sentence>` element into an ordered
//! sequence of [`Token`]s. Records are never reordered or dropped: a
//! malformed record becomes a token carrying fallback sentinels.

use crate::token::Token;

/// Attributes of a single `<word>` element, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawWord {
    attrs: Vec<(String, String)>,
}

impl RawWord {
    pub fn new() -> Self {
        Self { attrs: Vec::new() }
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut raw = Self::new();
        for (key, value) in pairs {
            raw.insert(key, value);
        }
        raw
    }

    /// Set an attribute, replacing any previous value
    pub fn insert(&mut self, key: &str, value: &str) {
        match self.attrs.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value.to_string(),
            None => self.attrs.push((key.to_string(), value.to_string())),
        }
    }

    /// Attribute value, if present (may be empty)
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// Metadata carried by the `<sentence>` element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SentenceMeta {
    pub id: Option<String>,
    pub document_id: Option<String>,
    pub subdoc: Option<String>,
}

impl SentenceMeta {
    /// Label used when reporting problems in this sentence
    pub fn label(&self) -> &str {
        self.id.as_deref().unwrap_or("?")
    }
}

/// An annotated sentence: tokens in reading order plus metadata
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sentence {
    pub meta: SentenceMeta,
    pub tokens: Vec<Token>,
}

impl Sentence {
    pub fn new(meta: SentenceMeta, tokens: Vec<Token>) -> Self {
        Self { meta, tokens }
    }

    /// Assemble a sentence from raw word records, keeping their order
    pub fn assemble<'a>(meta: SentenceMeta, records: impl IntoIterator<Item = &'a RawWord>) -> Self {
        let tokens = records.into_iter().map(Token::from_raw).collect();
        Self { meta, tokens }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Real words only, artificial nodes skipped
    pub fn words(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter().filter(|t| t.is_word())
    }

    pub fn forms(&self) -> Vec<&str> {
        self.tokens.iter().map(|t| t.form.as_str()).collect()
    }

    /// First token with the given id
    pub fn get(&self, id: &str) -> Option<&Token> {
        self.tokens.iter().find(|t| t.id == id)
    }

    /// Tokens attached to the root, in input order
    pub fn roots(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter().filter(|t| t.is_root())
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
