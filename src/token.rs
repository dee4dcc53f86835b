//! Token records for AGLDT sentences
//!
//! A sentence is made of real corpus words and of artificial nodes, which
//! stand for elided governors. Both share the same attribute set and differ
//! only by their [`NodeKind`].

use crate::morph::{Morph, MorphError};
use crate::sentence::RawWord;

/// Head value marking the sentence root
pub const ROOT_HEAD: &str = "0";

/// Fallback for missing id, form, lemma and postag
pub const MISSING: &str = "_";

/// Fallback for a missing relation; signals an annotation error
pub const RELATION_ERROR: &str = "ERR";

/// Distinguishes real words from artificial (elliptic) nodes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// A real corpus token
    Word,
    /// A synthetic node for an elided governor, with the value of its
    /// `artificial` attribute (e.g. `elliptic`)
    Artificial { kind: Option<String> },
}

/// A word or artificial node in a sentence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub id: String,
    pub form: String,
    pub lemma: String,
    pub postag: String,
    pub head: String,
    pub relation: String,
    /// Provenance reference (usually a CTS URN)
    pub cite: Option<String>,
    pub kind: NodeKind,
}

/// Raw attribute values for a token, before fallbacks are applied
///
/// Empty strings count as absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenFields<'a> {
    pub id: Option<&'a str>,
    pub form: Option<&'a str>,
    pub lemma: Option<&'a str>,
    pub postag: Option<&'a str>,
    pub head: Option<&'a str>,
    pub relation: Option<&'a str>,
    pub cite: Option<&'a str>,
}

fn or_fallback(value: Option<&str>, fallback: &str) -> String {
    present(value).unwrap_or(fallback).to_string()
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

impl Token {
    fn with_kind(fields: TokenFields<'_>, kind: NodeKind) -> Self {
        Self {
            id: or_fallback(fields.id, MISSING),
            form: or_fallback(fields.form, MISSING),
            lemma: or_fallback(fields.lemma, MISSING),
            postag: or_fallback(fields.postag, MISSING),
            head: or_fallback(fields.head, ROOT_HEAD),
            relation: or_fallback(fields.relation, RELATION_ERROR),
            cite: present(fields.cite).map(str::to_string),
            kind,
        }
    }

    /// Create a real word, filling in fallbacks for absent attributes
    pub fn word(fields: TokenFields<'_>) -> Self {
        Self::with_kind(fields, NodeKind::Word)
    }

    /// Create an artificial node of the given kind
    pub fn artificial(fields: TokenFields<'_>, kind: Option<&str>) -> Self {
        let kind = present(kind).map(str::to_string);
        Self::with_kind(fields, NodeKind::Artificial { kind })
    }

    /// Build a token from a raw `<word>` record
    ///
    /// The presence of an `artificial` attribute, whatever its value, makes
    /// the token artificial.
    pub fn from_raw(raw: &RawWord) -> Self {
        let fields = TokenFields {
            id: raw.get("id"),
            form: raw.get("form"),
            lemma: raw.get("lemma"),
            postag: raw.get("postag"),
            head: raw.get("head"),
            relation: raw.get("relation"),
            cite: raw.get("cite"),
        };

        if raw.contains("artificial") {
            Self::artificial(fields, raw.get("artificial"))
        } else {
            Self::word(fields)
        }
    }

    pub fn is_artificial(&self) -> bool {
        match self.kind {
            NodeKind::Artificial { .. } => true,
            NodeKind::Word => false,
        }
    }

    pub fn is_word(&self) -> bool {
        !self.is_artificial()
    }

    /// Whether this token hangs directly from the sentence root
    pub fn is_root(&self) -> bool {
        self.head == ROOT_HEAD
    }

    /// The artificial subtype, if this is an artificial node
    pub fn artificial_kind(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Artificial { kind } => kind.as_deref(),
            NodeKind::Word => None,
        }
    }

    /// Decode the positional morphological tag
    pub fn morph(&self) -> Result<Morph, MorphError> {
        Morph::decode(&self.postag)
    }
}
