//! AGLDT: reading Ancient Greek and Latin Dependency Treebank files
//!
//! Loads AGLDT-style XML treebanks, resolves the true heads of words attached
//! through artificial (elliptical) nodes, and exports CoNLL-2009 tables or
//! dependency graphs.

pub mod conll; // CoNLL-2009 table parsing
pub mod export; // CoNLL-2009 export
pub mod graph; // Dependency graph view and triples
pub mod morph; // Positional morphology tags
pub mod reader; // Corpus reader over treebank files
pub mod resolve; // True-head resolution through artificial nodes
pub mod sentence;
pub mod token; // Token model with attribute fallbacks
pub mod xml; // XML extraction

// Re-exports for convenience
pub use conll::{ConllError, ConllReader, ConllRow};
pub use export::{Dialect, Export, ExportError, ExportOptions, Exporter, export_to_conll};
pub use graph::{DependencyGraph, GraphConfig, GraphError, Triple};
pub use morph::{Morph, MorphError};
pub use reader::{AgldtReader, FileSelection, ReaderError};
pub use resolve::{HeadResolver, ResolveError, true_head};
pub use sentence::{RawWord, Sentence, SentenceMeta};
pub use token::{NodeKind, Token};
pub use xml::{Document, XmlError, parse_document};
