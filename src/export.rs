//! CoNLL export
//!
//! Serializes sentences to the CoNLL-2009 table: one row per real word,
//! headed by its true head, with a blank line after every sentence.
//! Artificial nodes never get a row. Words whose head chain is malformed are
//! logged and skipped; the rest of the corpus is still exported.
//!
//! The whole table is built in memory and written in one operation.

use crate::resolve::{HeadResolver, ResolveError};
use crate::sentence::Sentence;
use crate::token::Token;
use std::fmt;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Relation for words whose true head differs from their annotated head
pub const MEDIATED_RELATION: &str = "ExD";

/// Lemma emitted when a word has none
pub const UNKNOWN_LEMMA: &str = "Unknown";

/// POS column for words with an empty tag
pub const EMPTY_TAG_FILLER: &str = "x--------";

/// Combining comma above, used in some files in place of an apostrophe
const COMBINING_COMMA_ABOVE: char = '\u{0313}';

/// Error during export
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Unsupported CoNLL dialect: {0}")]
    UnknownDialect(String),

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Tabular layout of the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// ID FORM LEMMA PLEMMA POS PPOS FEAT PFEAT HEAD PHEAD DEPREL PDEPREL FILLPRED PRED APREDs
    #[default]
    Conll2009,
}

impl FromStr for Dialect {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "2009" | "conll2009" => Ok(Dialect::Conll2009),
            other => Err(ExportError::UnknownDialect(other.to_string())),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Conll2009 => write!(f, "2009"),
        }
    }
}

/// Export-time policies layered over the token model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub dialect: Dialect,
    pub mediated_relation: String,
    pub unknown_lemma: String,
    pub empty_tag_filler: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            mediated_relation: MEDIATED_RELATION.to_string(),
            unknown_lemma: UNKNOWN_LEMMA.to_string(),
            empty_tag_filler: EMPTY_TAG_FILLER.to_string(),
        }
    }
}

/// A word left out of the export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedToken {
    pub sentence: Option<String>,
    pub id: String,
    pub cite: Option<String>,
    pub error: ResolveError,
}

/// Rendered table plus what went into it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Export {
    pub text: String,
    pub rows: usize,
    pub sentences: usize,
    pub skipped: Vec<SkippedToken>,
}

/// Relation label shown for `word` once its true head is known
///
/// The annotated relation is kept when the true head is the annotated head;
/// otherwise the word is attached through ellipsis and gets the mediated
/// relation.
pub fn mediated_relation<'a>(word: &'a Token, true_head: &str, options: &'a ExportOptions) -> &'a str {
    if word.head == true_head {
        &word.relation
    } else {
        &options.mediated_relation
    }
}

/// Replace the combining comma above with a plain apostrophe
pub fn normalize_form(form: &str) -> String {
    form.replace(COMBINING_COMMA_ABOVE, "'")
}

/// Writes sentences as CoNLL tables
#[derive(Debug, Clone, Default)]
pub struct Exporter {
    options: ExportOptions,
}

impl Exporter {
    pub fn new(options: ExportOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Build the full table in memory
    pub fn render(&self, sentences: &[Sentence]) -> Export {
        let mut export = Export::default();
        for sentence in sentences {
            self.render_sentence(sentence, &mut export);
        }
        export
    }

    fn render_sentence(&self, sentence: &Sentence, export: &mut Export) {
        let resolver = HeadResolver::new(&sentence.tokens);

        for word in sentence.words() {
            let head = match resolver.resolve(word) {
                Ok(head) => head,
                Err(error) => {
                    log::error!(
                        "Problem with the head of token {}:{} (sentence {}): {}",
                        word.cite.as_deref().unwrap_or("?"),
                        word.id,
                        sentence.meta.label(),
                        error
                    );
                    export.skipped.push(SkippedToken {
                        sentence: sentence.meta.id.clone(),
                        id: word.id.clone(),
                        cite: word.cite.clone(),
                        error,
                    });
                    continue;
                }
            };

            export.text.push_str(&self.format_row(word, head));
            export.rows += 1;
        }

        export.text.push('\n');
        export.sentences += 1;
    }

    /// One table row for `word` attached to `head`
    pub fn format_row(&self, word: &Token, head: &str) -> String {
        let options = &self.options;

        let lemma = if word.lemma.is_empty() {
            options.unknown_lemma.as_str()
        } else {
            word.lemma.as_str()
        };

        let pos = match word.postag.chars().next() {
            Some(c) => c.to_string(),
            None => options.empty_tag_filler.clone(),
        };

        let feat = word
            .postag
            .chars()
            .map(String::from)
            .collect::<Vec<_>>()
            .join("|");

        let relation = mediated_relation(word, head, options);

        match options.dialect {
            Dialect::Conll2009 => format!(
                "{}\t{}\t{}\t_\t{}\t_\t{}\t_\t{}\t_\t{}\t_\t_\t_\t_\n",
                word.id,
                normalize_form(&word.form),
                lemma,
                pos,
                feat,
                head,
                relation
            ),
        }
    }

    /// Render and write to any sink in a single write
    pub fn write_to<W: Write>(&self, sentences: &[Sentence], mut writer: W) -> Result<Export, ExportError> {
        let export = self.render(sentences);
        writer.write_all(export.text.as_bytes())?;
        writer.flush()?;
        Ok(export)
    }

    /// Render and write to a file, created or truncated
    pub fn write(&self, sentences: &[Sentence], path: impl AsRef<Path>) -> Result<Export, ExportError> {
        let path = path.as_ref();
        let export = self.render(sentences);

        let mut file = File::create(path).map_err(|source| ExportError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        file.write_all(export.text.as_bytes())
            .map_err(|source| ExportError::Write {
                path: path.to_path_buf(),
                source,
            })?;

        log::info!(
            "Exported {} rows from {} sentences to {} ({} skipped)",
            export.rows,
            export.sentences,
            path.display(),
            export.skipped.len()
        );
        Ok(export)
    }
}

/// Export `sentences` to `out_file` in the given dialect with default policies
pub fn export_to_conll(
    sentences: &[Sentence],
    out_file: impl AsRef<Path>,
    dialect: Dialect,
) -> Result<Export, ExportError> {
    let options = ExportOptions {
        dialect,
        ..Default::default()
    };
    Exporter::new(options).write(sentences, out_file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentence::SentenceMeta;
    use crate::token::TokenFields;

    fn word(id: &str, form: &str, postag: &str, head: &str, relation: &str) -> Token {
        Token::word(TokenFields {
            id: Some(id),
            form: Some(form),
            lemma: Some(form),
            postag: Some(postag),
            head: Some(head),
            relation: Some(relation),
            cite: Some("urn:test:1"),
        })
    }

    fn artificial(id: &str, head: &str) -> Token {
        Token::artificial(
            TokenFields {
                id: Some(id),
                form: Some("[0]"),
                head: Some(head),
                relation: Some("OBJ"),
                ..Default::default()
            },
            Some("elliptic"),
        )
    }

    fn sentence(id: &str, tokens: Vec<Token>) -> Sentence {
        let meta = SentenceMeta {
            id: Some(id.to_string()),
            ..Default::default()
        };
        Sentence::new(meta, tokens)
    }

    #[test]
    fn test_mediated_relation_through_artificial() {
        let s = sentence(
            "1",
            vec![
                word("1", "ἔφη", "v3siia---", "0", "PRED"),
                artificial("2", "1"),
                word("3", "ἀνήρ", "n-s---mn-", "2", "SBJ"),
            ],
        );

        let export = Exporter::default().render(&[s]);
        let rows: Vec<&str> = export.text.lines().collect();

        assert_eq!(export.rows, 2);
        assert_eq!(
            rows[0],
            "1\tἔφη\tἔφη\t_\tv\t_\tv|3|s|i|i|a|-|-|-\t_\t0\t_\tPRED\t_\t_\t_\t_"
        );
        assert_eq!(
            rows[1],
            "3\tἀνήρ\tἀνήρ\t_\tn\t_\tn|-|s|-|-|-|m|n|-\t_\t1\t_\tExD\t_\t_\t_\t_"
        );
        assert_eq!(rows[2], "");
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn test_chain_of_artificial_nodes_is_mediated() {
        // ἀνήρ -> [0] -> [1] -> ἔφη
        let s = sentence(
            "1",
            vec![
                word("1", "ἔφη", "v3siia---", "0", "PRED"),
                artificial("2", "1"),
                artificial("3", "2"),
                word("4", "ἀνήρ", "n-s---mn-", "3", "SBJ"),
            ],
        );

        let export = Exporter::default().render(&[s]);
        let row: Vec<&str> = export.text.lines().nth(1).unwrap().split('\t').collect();

        assert_eq!(export.rows, 2);
        assert_eq!(row[0], "4");
        assert_eq!(row[8], "1");
        assert_eq!(row[10], "ExD");
    }

    #[test]
    fn test_mediated_relation_policy() {
        let options = ExportOptions::default();
        let w = word("3", "x", "n--------", "2", "SBJ");

        assert_eq!(mediated_relation(&w, "2", &options), "SBJ");
        assert_eq!(mediated_relation(&w, "1", &options), "ExD");
    }

    #[test]
    fn test_empty_tag_uses_filler() {
        let mut w = word("1", "καί", "", "0", "COORD");
        w.postag.clear();
        let exporter = Exporter::default();

        let row = exporter.format_row(&w, "0");
        let fields: Vec<&str> = row.trim_end_matches('\n').split('\t').collect();

        assert_eq!(fields.len(), 15);
        assert_eq!(fields[4], "x--------");
        assert_eq!(fields[6], "");
    }

    #[test]
    fn test_empty_lemma_is_unknown() {
        let mut w = word("1", "καί", "c--------", "0", "COORD");
        w.lemma.clear();

        let row = Exporter::default().format_row(&w, "0");
        assert_eq!(row.split('\t').nth(2), Some("Unknown"));
    }

    #[test]
    fn test_form_apostrophe_normalized() {
        let w = word("1", "δ\u{0313}", "d--------", "0", "AuxY");

        let row = Exporter::default().format_row(&w, "0");
        assert_eq!(row.split('\t').nth(1), Some("δ'"));
    }

    #[test]
    fn test_cycle_skips_only_the_affected_token() {
        let broken = sentence(
            "1",
            vec![
                word("1", "a", "v--------", "0", "PRED"),
                artificial("2", "3"),
                artificial("3", "2"),
                word("4", "b", "n--------", "2", "SBJ"),
                word("5", "c", "n--------", "1", "OBJ"),
            ],
        );
        let fine = sentence("2", vec![word("1", "d", "v--------", "0", "PRED")]);

        let export = Exporter::default().render(&[broken, fine]);

        assert_eq!(export.rows, 3);
        assert_eq!(export.sentences, 2);
        assert_eq!(export.skipped.len(), 1);
        assert_eq!(export.skipped[0].id, "4");
        assert_eq!(export.skipped[0].sentence.as_deref(), Some("1"));
        assert!(matches!(export.skipped[0].error, ResolveError::Cycle { .. }));

        let ids: Vec<&str> = export
            .text
            .lines()
            .filter(|l| !l.is_empty())
            .map(|l| l.split('\t').next().unwrap())
            .collect();
        assert_eq!(ids, vec!["1", "5", "1"]);
    }

    #[test]
    fn test_empty_sentence_still_gets_separator() {
        let export = Exporter::default().render(&[sentence("1", vec![])]);
        assert_eq!(export.text, "\n");
    }

    #[test]
    fn test_dialect_from_str() {
        assert_eq!("2009".parse::<Dialect>().unwrap(), Dialect::Conll2009);
        assert!(matches!(
            "2006".parse::<Dialect>(),
            Err(ExportError::UnknownDialect(d)) if d == "2006"
        ));
        assert_eq!(Dialect::Conll2009.to_string(), "2009");
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.conll");
        let s = sentence("1", vec![word("1", "a", "v--------", "0", "PRED")]);

        let export = export_to_conll(&[s], &path, Dialect::Conll2009).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();

        assert_eq!(written, export.text);
        assert!(written.ends_with("\n\n"));
    }

    #[test]
    fn test_write_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.conll");

        let err = Exporter::default().write(&[], &path).unwrap_err();
        assert!(matches!(err, ExportError::Write { .. }));
    }

    #[test]
    fn test_write_to_sink() {
        let mut buffer = Vec::new();
        let s = sentence("1", vec![word("1", "a", "v--------", "0", "PRED")]);

        let export = Exporter::default().write_to(&[s], &mut buffer).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), export.text);
    }
}
