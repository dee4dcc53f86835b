//! CoNLL-2009 table parsing
//!
//! Reads back tables written by the exporter: 15 tab-separated columns per
//! row, sentences separated by blank lines. Only the columns the exporter
//! fills are kept.

use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor, Lines};
use std::path::Path;
use thiserror::Error;

/// Number of columns in a CoNLL-2009 row
pub const COLUMNS: usize = 15;

/// Error during CoNLL parsing
#[derive(Debug, Error)]
pub enum ConllError {
    #[error("Parse error at line {line}: expected 15 columns, found {found}")]
    Columns { line: usize, found: usize },

    #[error("IO error at line {line}: {source}")]
    Io {
        line: usize,
        #[source]
        source: io::Error,
    },
}

/// One row of the table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConllRow {
    pub id: String,
    pub form: String,
    pub lemma: String,
    pub pos: String,
    pub feat: String,
    pub head: String,
    pub relation: String,
}

/// CoNLL reader that iterates over sentences
pub struct ConllReader<R: BufRead> {
    lines: Lines<R>,
    line_num: usize,
}

impl<R: BufRead> ConllReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_num: 0,
        }
    }
}

impl ConllReader<Box<dyn BufRead>> {
    /// Create a reader from a file path; `.gz` files are decompressed
    pub fn from_file(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        let reader: Box<dyn BufRead> = if path.extension().is_some_and(|ext| ext == "gz") {
            Box::new(BufReader::new(GzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };
        Ok(Self::new(reader))
    }
}

impl ConllReader<Cursor<String>> {
    /// Create a reader from a string
    pub fn from_str(text: &str) -> Self {
        Self::new(Cursor::new(text.to_string()))
    }
}

impl<R: BufRead> Iterator for ConllReader<R> {
    type Item = Result<Vec<ConllRow>, ConllError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut rows = Vec::new();

        loop {
            self.line_num += 1;
            match self.lines.next() {
                None => {
                    if rows.is_empty() {
                        return None;
                    }
                    break;
                }
                Some(Err(source)) => {
                    return Some(Err(ConllError::Io {
                        line: self.line_num,
                        source,
                    }));
                }
                Some(Ok(line)) => {
                    if line.trim().is_empty() {
                        if rows.is_empty() {
                            continue;
                        }
                        break;
                    }
                    match parse_row(&line, self.line_num) {
                        Ok(row) => rows.push(row),
                        Err(e) => return Some(Err(e)),
                    }
                }
            }
        }

        Some(Ok(rows))
    }
}

/// Parse a single row; column order is
/// ID FORM LEMMA PLEMMA POS PPOS FEAT PFEAT HEAD PHEAD DEPREL PDEPREL FILLPRED PRED
fn parse_row(line: &str, line_num: usize) -> Result<ConllRow, ConllError> {
    // Trailing whitespace would eat an empty FEAT column, so only strip CR
    let fields: Vec<&str> = line.trim_end_matches('\r').split('\t').collect();

    if fields.len() != COLUMNS {
        return Err(ConllError::Columns {
            line: line_num,
            found: fields.len(),
        });
    }

    Ok(ConllRow {
        id: fields[0].to_string(),
        form: fields[1].to_string(),
        lemma: fields[2].to_string(),
        pos: fields[4].to_string(),
        feat: fields[6].to_string(),
        head: fields[8].to_string(),
        relation: fields[10].to_string(),
    })
}
