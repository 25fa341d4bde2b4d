use retrieval_core::persist::{
    ensure_known, load_idf, load_index, load_manifest, load_meta, load_tfidf, IndexPaths, MetaFile,
};
use retrieval_core::{BooleanEngine, DocId, Error, FormatFault, Hit, Result, VectorEngine};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

pub const DEFAULT_TOP_N: usize = 10;

/// One boolean query and what it produced. Failures stay attached to their query.
#[derive(Debug)]
pub struct BooleanOutcome {
    pub query: String,
    pub result: Result<Vec<DocId>>,
}

#[derive(Debug, Serialize)]
pub struct VectorOutcome {
    pub query: String,
    pub hits: Vec<Hit>,
}

/// A loaded index directory: both engines plus the build manifest. Built once,
/// then only read.
pub struct Session {
    pub meta: MetaFile,
    boolean: BooleanEngine,
    vector: VectorEngine,
    urls: BTreeMap<DocId, String>,
}

impl Session {
    /// Loads `meta.json`, `inverted_index.txt`, `idf.csv`, `tfidf.csv` and the
    /// optional `docs.tsv`. Any corrupt or inconsistent file aborts the load.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let paths = IndexPaths::new(dir);
        let meta = load_meta(&paths)?;
        let mut known = meta.doc_ids.clone();
        known.sort_unstable();

        let index = load_index(&paths)?;
        ensure_known(index.universe(), &known, &paths.inverted_index().display().to_string())?;

        let idf = load_idf(&paths)?;
        let tfidf = load_tfidf(&paths)?;
        let tfidf_origin = paths.tfidf().display().to_string();
        ensure_known(tfidf.doc_ids(), &known, &tfidf_origin)?;
        if let Some((term, _)) = tfidf.rows().find(|(term, _)| !idf.contains(term)) {
            return Err(Error::Format { origin: tfidf_origin, line: 0, fault: FormatFault::MissingIdf(term.to_string()) });
        }

        let manifest = paths.manifest();
        let urls = if manifest.exists() {
            let urls = load_manifest(&manifest)?;
            ensure_known(urls.keys().copied(), &known, &manifest.display().to_string())?;
            urls
        } else {
            BTreeMap::new()
        };

        tracing::info!(
            num_docs = meta.num_docs,
            num_terms = index.num_terms(),
            urls = urls.len(),
            "index loaded"
        );
        Ok(Self { meta, boolean: BooleanEngine::new(index), vector: VectorEngine::new(idf, tfidf), urls })
    }

    pub fn boolean(&self, query: &str) -> Result<Vec<DocId>> {
        self.boolean.search(query)
    }

    pub fn vector(&self, query: &str, top_n: usize) -> Vec<Hit> {
        self.vector.search(query, top_n)
    }

    pub fn url(&self, doc_id: DocId) -> Option<&str> {
        self.urls.get(&doc_id).map(String::as_str)
    }

    /// Evaluates every query independently; a malformed query is reported in
    /// its own outcome and the rest of the batch still runs.
    pub fn run_boolean_batch<'q, I>(&self, queries: I) -> Vec<BooleanOutcome>
    where
        I: IntoIterator<Item = &'q str>,
    {
        queries
            .into_iter()
            .map(|query| {
                let result = self.boolean(query);
                if let Err(err) = &result {
                    tracing::warn!(query, error = %err, "boolean query failed");
                }
                BooleanOutcome { query: query.to_string(), result }
            })
            .collect()
    }

    pub fn run_vector_batch<'q, I>(&self, queries: I, top_n: usize) -> Vec<VectorOutcome>
    where
        I: IntoIterator<Item = &'q str>,
    {
        queries
            .into_iter()
            .map(|query| VectorOutcome { query: query.to_string(), hits: self.vector(query, top_n) })
            .collect()
    }
}

/// Non-blank lines of a queries file, one query per line.
pub fn read_queries(path: &Path) -> std::io::Result<Vec<String>> {
    let text = std::fs::read_to_string(path)?;
    Ok(text.lines().map(str::trim).filter(|l| !l.is_empty()).map(str::to_string).collect())
}
