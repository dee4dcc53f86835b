//! Corpus reader for directories of AGLDT treebank files
//!
//! A reader owns a root directory and an ordered list of file ids (paths
//! relative to the root). Files ending in `.gz` are decompressed on the fly.
//!
//! The `Result`-returning views fail on the first unreadable file. [`AgldtReader::iter`]
//! is lenient instead: unreadable files are logged and skipped.
//!
//! # Examples
//!
//! ```no_run
//! use agldt::{AgldtReader, Dialect, FileSelection};
//!
//! let reader = AgldtReader::from_dir("treebanks/").unwrap();
//! let sentences = reader.annotated_sents(FileSelection::All).unwrap();
//! reader.export_to_conll(&sentences, "out.conll", Dialect::Conll2009).unwrap();
//! ```

use crate::export::{Dialect, Export, ExportError, export_to_conll};
use crate::graph::{DependencyGraph, GraphConfig, GraphError, Triple};
use crate::sentence::{Sentence, SentenceMeta};
use crate::token::Token;
use crate::xml::{Document, XmlError, parse_document};
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error reading a corpus
#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("Failed to open file {}: {source}", path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Xml {
        path: PathBuf,
        #[source]
        source: XmlError,
    },

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Expected a single file identifier, but the reader holds {0} files")]
    AmbiguousFile(usize),

    #[error("Unknown file identifier: {0}")]
    UnknownFile(String),

    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Which files a multi-file view covers
#[derive(Debug, Clone, Copy, Default)]
pub enum FileSelection<'a> {
    #[default]
    All,
    One(&'a str),
    Many(&'a [&'a str]),
}

impl<'a> From<&'a str> for FileSelection<'a> {
    fn from(fileid: &'a str) -> Self {
        FileSelection::One(fileid)
    }
}

impl<'a> From<&'a [&'a str]> for FileSelection<'a> {
    fn from(fileids: &'a [&'a str]) -> Self {
        FileSelection::Many(fileids)
    }
}

/// Reader over the treebank files of one directory
#[derive(Debug, Clone)]
pub struct AgldtReader {
    root: PathBuf,
    fileids: Vec<String>,
}

fn is_treebank_file(name: &str) -> bool {
    name.ends_with(".xml") || name.ends_with(".xml.gz")
}

impl AgldtReader {
    /// Create a reader over explicit file ids
    pub fn new<S: Into<String>>(root: impl AsRef<Path>, fileids: impl IntoIterator<Item = S>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            fileids: fileids.into_iter().map(Into::into).collect(),
        }
    }

    /// Every `.xml` and `.xml.gz` file directly under `root`
    ///
    /// Files are sorted for deterministic results.
    pub fn from_dir(root: impl AsRef<Path>) -> Result<Self, ReaderError> {
        let root = root.as_ref();
        let entries = fs::read_dir(root).map_err(|source| ReaderError::FileOpen {
            path: root.to_path_buf(),
            source,
        })?;

        let mut fileids = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if is_treebank_file(&name) {
                fileids.push(name);
            }
        }
        fileids.sort();

        Ok(Self::new(root, fileids))
    }

    /// Files matching a glob pattern relative to `root`, sorted
    pub fn from_glob(root: impl AsRef<Path>, pattern: &str) -> Result<Self, ReaderError> {
        let root = root.as_ref();
        let full = root.join(pattern);

        let mut fileids: Vec<String> = glob::glob(&full.to_string_lossy())?
            .filter_map(Result::ok)
            .filter(|path| path.is_file())
            .filter_map(|path| {
                path.strip_prefix(root)
                    .ok()
                    .map(|rel| rel.to_string_lossy().into_owned())
            })
            .collect();
        fileids.sort();

        Ok(Self::new(root, fileids))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn fileids(&self) -> &[String] {
        &self.fileids
    }

    pub fn abspath(&self, fileid: &str) -> PathBuf {
        self.root.join(fileid)
    }

    fn check_fileid<'a>(&self, fileid: &'a str) -> Result<&'a str, ReaderError> {
        if self.fileids.iter().any(|f| f == fileid) {
            Ok(fileid)
        } else {
            Err(ReaderError::UnknownFile(fileid.to_string()))
        }
    }

    fn selected<'a>(&'a self, selection: FileSelection<'a>) -> Result<Vec<&'a str>, ReaderError> {
        match selection {
            FileSelection::All => Ok(self.fileids.iter().map(String::as_str).collect()),
            FileSelection::One(fileid) => Ok(vec![self.check_fileid(fileid)?]),
            FileSelection::Many(fileids) => fileids.iter().map(|&f| self.check_fileid(f)).collect(),
        }
    }

    /// Parse exactly one file
    ///
    /// `None` is accepted only when the reader holds a single file; treebank
    /// documents are never concatenated.
    pub fn xml(&self, fileid: Option<&str>) -> Result<Document, ReaderError> {
        let fileid = match fileid {
            Some(fileid) => self.check_fileid(fileid)?,
            None => match self.fileids.as_slice() {
                [only] => only.as_str(),
                files => return Err(ReaderError::AmbiguousFile(files.len())),
            },
        };

        let path = self.abspath(fileid);
        let text = read_text(&path)?;
        parse_document(&text).map_err(|source| ReaderError::Xml { path, source })
    }

    fn documents(&self, selection: FileSelection<'_>) -> Result<Vec<Document>, ReaderError> {
        self.selected(selection)?
            .into_iter()
            .map(|fileid| self.xml(Some(fileid)))
            .collect()
    }

    /// Sentence metadata, in step with [`AgldtReader::annotated_sents`]
    pub fn sentences_metadata(&self, selection: FileSelection<'_>) -> Result<Vec<SentenceMeta>, ReaderError> {
        Ok(self
            .documents(selection)?
            .into_iter()
            .flat_map(|doc| doc.sentences)
            .map(|s| s.meta)
            .collect())
    }

    pub fn annotated_sents(&self, selection: FileSelection<'_>) -> Result<Vec<Sentence>, ReaderError> {
        Ok(self
            .documents(selection)?
            .into_iter()
            .flat_map(|doc| doc.sentences)
            .collect())
    }

    /// Word forms per sentence, artificial nodes included
    pub fn sents(&self, selection: FileSelection<'_>) -> Result<Vec<Vec<String>>, ReaderError> {
        Ok(self
            .annotated_sents(selection)?
            .iter()
            .map(|s| s.forms().into_iter().map(str::to_string).collect())
            .collect())
    }

    pub fn annotated_words(&self, selection: FileSelection<'_>) -> Result<Vec<Token>, ReaderError> {
        Ok(self
            .annotated_sents(selection)?
            .into_iter()
            .flat_map(|s| s.tokens)
            .collect())
    }

    pub fn words(&self, selection: FileSelection<'_>) -> Result<Vec<String>, ReaderError> {
        Ok(self
            .annotated_words(selection)?
            .into_iter()
            .map(|t| t.form)
            .collect())
    }

    /// Sentences of every file, skipping (and logging) unreadable ones
    pub fn iter(&self) -> impl Iterator<Item = Sentence> + '_ {
        self.fileids
            .iter()
            .flat_map(move |fileid| self.open_file_sentences(fileid))
    }

    fn open_file_sentences(&self, fileid: &str) -> Vec<Sentence> {
        match self.xml(Some(fileid)) {
            Ok(doc) => doc.sentences,
            Err(e) => {
                log::warn!("Skipping {}: {}", fileid, e);
                Vec::new()
            }
        }
    }

    pub fn sent_to_graph(&self, sentence: &Sentence, config: &GraphConfig) -> Result<DependencyGraph, GraphError> {
        DependencyGraph::from_sentence(sentence, config)
    }

    pub fn triples(&self, sentence: &Sentence, config: &GraphConfig) -> Result<Vec<Triple>, GraphError> {
        Ok(self.sent_to_graph(sentence, config)?.triples())
    }

    pub fn export_to_conll(
        &self,
        sentences: &[Sentence],
        out_file: impl AsRef<Path>,
        dialect: Dialect,
    ) -> Result<Export, ExportError> {
        export_to_conll(sentences, out_file, dialect)
    }
}

/// Read a whole file as text, decompressing `.gz` files
pub(crate) fn read_text(path: &Path) -> Result<String, ReaderError> {
    let file = File::open(path).map_err(|source| ReaderError::FileOpen {
        path: path.to_path_buf(),
        source,
    })?;

    let mut text = String::new();
    let gzipped = path.extension().is_some_and(|ext| ext == "gz");
    let read = if gzipped {
        GzDecoder::new(file).read_to_string(&mut text)
    } else {
        io::BufReader::new(file).read_to_string(&mut text)
    };
    read.map_err(|source| ReaderError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(text)
}
