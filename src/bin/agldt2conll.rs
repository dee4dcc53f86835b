//! Command-line front end for AGLDT treebanks
//!
//! Usage:
//!   agldt2conll export treebanks/ -o corpus.conll
//!   agldt2conll triples treebanks/ --file tlg0012.tlg001.xml --sentence 1
//!   agldt2conll stats treebanks/ --glob "tlg0012*.xml"
//!
//! Set `RUST_LOG=debug` to trace head resolution.

use agldt::resolve::HeadResolver;
use agldt::{AgldtReader, Dialect, GraphConfig, export_to_conll};
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

#[derive(Parser)]
#[command(name = "agldt2conll")]
#[command(author, version, about = "Read AGLDT treebanks and export them to CoNLL")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Export a corpus to a single CoNLL table
    Export {
        /// Treebank directory
        root: PathBuf,

        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Only files matching this pattern (relative to ROOT)
        #[arg(long)]
        glob: Option<String>,

        #[arg(long, default_value = "2009")]
        dialect: Dialect,
    },

    /// Print dependency triples of one file
    Triples {
        root: PathBuf,

        /// File id relative to ROOT
        #[arg(long)]
        file: String,

        /// 1-based sentence position in the file; all sentences if omitted
        #[arg(long)]
        sentence: Option<usize>,

        /// Relation for root tokens that carry none
        #[arg(long, default_value = agldt::graph::DEFAULT_ROOT_RELATION)]
        root_relation: String,
    },

    /// Print per-file counts
    Stats {
        root: PathBuf,

        #[arg(long)]
        glob: Option<String>,
    },
}

fn open_reader(root: &Path, glob: Option<&str>) -> Result<AgldtReader> {
    let reader = match glob {
        Some(pattern) => AgldtReader::from_glob(root, pattern),
        None => AgldtReader::from_dir(root),
    }
    .with_context(|| format!("Failed to list treebank files in {}", root.display()))?;

    if reader.fileids().is_empty() {
        log::warn!("No treebank files found in {}", root.display());
    }
    Ok(reader)
}

fn export(root: &Path, output: &Path, glob: Option<&str>, dialect: Dialect) -> Result<()> {
    let reader = open_reader(root, glob)?;
    log::info!("Reading {} files from {}", reader.fileids().len(), root.display());

    let sentences: Vec<_> = reader.iter().collect();
    let export = export_to_conll(&sentences, output, dialect)
        .with_context(|| format!("Failed to export to {}", output.display()))?;

    println!(
        "{} sentences, {} rows, {} skipped tokens",
        export.sentences,
        export.rows,
        export.skipped.len()
    );
    Ok(())
}

fn triples(root: &Path, file: &str, sentence: Option<usize>, root_relation: String) -> Result<()> {
    let reader = AgldtReader::new(root, [file]);
    let doc = reader
        .xml(None)
        .with_context(|| format!("Failed to read {}", reader.abspath(file).display()))?;
    let config = GraphConfig { root_relation };

    let selected: Vec<_> = match sentence {
        Some(0) => bail!("Sentence positions start at 1"),
        Some(n) => match doc.sentences.get(n - 1) {
            Some(s) => vec![s],
            None => bail!("{} has only {} sentences", file, doc.sentences.len()),
        },
        None => doc.sentences.iter().collect(),
    };

    for s in selected {
        println!("# sentence {}", s.meta.label());
        let graph = match reader.sent_to_graph(s, &config) {
            Ok(graph) => graph,
            Err(e) => {
                log::warn!("{}", e);
                continue;
            }
        };
        println!("# root relation {}", graph.root_relation());
        for t in graph.triples() {
            println!(
                "({}, {})\t{}\t({}, {})",
                t.head.0, t.head.1, t.relation, t.dependent.0, t.dependent.1
            );
        }
        println!();
    }
    Ok(())
}

fn stats(root: &Path, glob: Option<&str>) -> Result<()> {
    let reader = open_reader(root, glob)?;

    println!("file\tsentences\twords\tartificial\tunresolved");
    for fileid in reader.fileids() {
        let doc = match reader.xml(Some(fileid)) {
            Ok(doc) => doc,
            Err(e) => {
                log::warn!("Skipping {}: {}", fileid, e);
                continue;
            }
        };

        let (mut words, mut artificial, mut unresolved) = (0, 0, 0);
        for s in &doc.sentences {
            let resolver = HeadResolver::new(&s.tokens);
            for token in &s.tokens {
                if token.is_artificial() {
                    artificial += 1;
                    continue;
                }
                words += 1;
                if resolver.resolve(token).is_err() {
                    unresolved += 1;
                }
            }
        }

        println!(
            "{}\t{}\t{}\t{}\t{}",
            fileid,
            doc.sentences.len(),
            words,
            artificial,
            unresolved
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();

    match cli.command {
        Command::Export {
            root,
            output,
            glob,
            dialect,
        } => export(&root, &output, glob.as_deref(), dialect),
        Command::Triples {
            root,
            file,
            sentence,
            root_relation,
        } => triples(&root, &file, sentence, root_relation),
        Command::Stats { root, glob } => stats(&root, glob.as_deref()),
    }
}
