use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use retrieval_core::persist::{
    load_manifest, remove_manifest, save_idf, save_index, save_manifest, save_meta, save_tf, save_tfidf, IndexPaths, MetaFile,
};
use retrieval_core::tokenizer::normalize;
use retrieval_core::{Corpus, DocId, InvertedIndex, TfIdfTables};
use tracing_subscriber::{EnvFilter, fmt};
use walkdir::WalkDir;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Normalize crawled pages and build the boolean index and TF-IDF tables", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Turn raw page_<id>.txt files into processed_page_<id>.txt token files
    Normalize {
        /// Directory of raw text pages
        #[arg(long)]
        input: String,
        /// Directory for processed token files
        #[arg(long, default_value = "./processed_documents")]
        output: String,
    },
    /// Build the inverted index and TF / IDF / TF-IDF tables from processed token files
    Build {
        /// Directory of processed token files
        #[arg(long, default_value = "./processed_documents")]
        input: String,
        /// Output index directory
        #[arg(long, default_value = "./index")]
        output: String,
        /// Crawl manifest with `doc_id<TAB>url` lines, copied into the index
        #[arg(long)]
        manifest: Option<String>,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Normalize { input, output } => normalize_dir(Path::new(&input), Path::new(&output)),
        Commands::Build { input, output, manifest } => build_index(&input, &output, manifest.as_deref()),
    }
}

fn normalize_dir(input: &Path, output: &Path) -> Result<()> {
    fs::create_dir_all(output).with_context(|| format!("creating {}", output.display()))?;

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(input).max_depth(1).sort_by_file_name() {
        let entry = entry?;
        let p = entry.path();
        if entry.file_type().is_file() && p.extension().and_then(|s| s.to_str()) == Some("txt") {
            files.push(p.to_path_buf());
        }
    }

    for file in &files {
        let text = fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
        let tokens = normalize(&text);
        let name = file.file_name().and_then(|s| s.to_str()).unwrap_or_default();
        let out = output.join(format!("processed_{name}"));
        fs::write(&out, tokens.join(" ")).with_context(|| format!("writing {}", out.display()))?;
        tracing::debug!(path = %out.display(), tokens = tokens.len(), "normalized");
    }

    tracing::info!(num_docs = files.len(), output = %output.display(), "normalization complete");
    Ok(())
}

fn build_index(input: &str, output: &str, manifest: Option<&str>) -> Result<()> {
    let corpus = Corpus::load_dir(Path::new(input)).with_context(|| format!("loading corpus from {input}"))?;
    let out_paths = IndexPaths::new(output);
    fs::create_dir_all(&out_paths.root)?;

    let index = InvertedIndex::build(&corpus);
    save_index(&out_paths, &index)?;

    let tables = TfIdfTables::build(&corpus);
    save_tf(&out_paths, &tables.tf)?;
    save_idf(&out_paths, &tables.idf)?;
    save_tfidf(&out_paths, &tables.tfidf)?;

    let doc_ids: Vec<DocId> = corpus.ids().collect();
    if let Some(manifest) = manifest {
        let urls = load_manifest(Path::new(manifest)).with_context(|| format!("reading manifest {manifest}"))?;
        let listed = urls.len();
        // pages the crawler listed but that never reached the corpus are left out
        let urls: BTreeMap<DocId, String> = urls.into_iter().filter(|(id, _)| corpus.contains(*id)).collect();
        if urls.len() < listed {
            tracing::warn!(dropped = listed - urls.len(), manifest, "manifest lists documents missing from the corpus");
        }
        save_manifest(&out_paths, &urls)?;
    } else {
        // a manifest from an earlier build would not match this corpus
        remove_manifest(&out_paths)?;
    }

    let meta = MetaFile {
        num_docs: corpus.len() as u32,
        doc_ids,
        created_at: time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339).unwrap_or_else(|_| "".into()),
        version: 1,
    };
    save_meta(&out_paths, &meta)?;

    tracing::info!(output, num_docs = meta.num_docs, num_terms = index.num_terms(), "index build complete");
    Ok(())
}
