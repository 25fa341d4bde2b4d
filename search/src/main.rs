use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use search::{read_queries, Session, DEFAULT_TOP_N};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "search")]
#[command(about = "Run boolean or ranked queries against a built index", long_about = None)]
struct Args {
    /// Index directory path
    #[arg(long, default_value = "./index")]
    index: String,
    /// Print results as JSON lines
    #[arg(long, default_value_t = false)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Boolean queries: terms, `&`, `|`, `( )`, `!term`
    Boolean {
        /// File with one query per line
        #[arg(long)]
        queries: Option<PathBuf>,
        query: Vec<String>,
    },
    /// Free-text queries ranked by cosine similarity
    Vector {
        #[arg(long)]
        queries: Option<PathBuf>,
        /// Number of results per query
        #[arg(long, default_value_t = DEFAULT_TOP_N)]
        top: usize,
        query: Vec<String>,
    },
}

fn collect_queries(file: Option<PathBuf>, inline: Vec<String>) -> Result<Vec<String>> {
    let mut queries = inline;
    if let Some(file) = file {
        queries.extend(read_queries(&file).with_context(|| format!("reading {}", file.display()))?);
    }
    Ok(queries)
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let session = Session::open(&args.index).with_context(|| format!("loading index {}", args.index))?;

    match args.command {
        Commands::Boolean { queries, query } => {
            let queries = collect_queries(queries, query)?;
            for outcome in session.run_boolean_batch(queries.iter().map(String::as_str)) {
                match (&outcome.result, args.json) {
                    (Ok(ids), true) => println!("{}", serde_json::json!({ "query": outcome.query, "docs": ids })),
                    (Err(err), true) => println!("{}", serde_json::json!({ "query": outcome.query, "error": err.to_string() })),
                    (Ok(ids), false) => println!("{}: {:?}", outcome.query, ids),
                    (Err(err), false) => println!("error: {err}"),
                }
            }
        }
        Commands::Vector { queries, top, query } => {
            let queries = collect_queries(queries, query)?;
            for outcome in session.run_vector_batch(queries.iter().map(String::as_str), top) {
                if args.json {
                    println!("{}", serde_json::to_string(&outcome)?);
                    continue;
                }
                println!("{}:", outcome.query);
                for hit in &outcome.hits {
                    match session.url(hit.doc_id) {
                        Some(url) => println!("  {} {:.6} {}", hit.doc_id, hit.score, url),
                        None => println!("  {} {:.6}", hit.doc_id, hit.score),
                    }
                }
            }
        }
    }
    Ok(())
}
