//! Term-Document Store: document id -> normalized token sequence.

use crate::error::{Error, FormatFault, Result};
use crate::DocId;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: DocId,
    pub tokens: Vec<String>,
}

impl Document {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Corpus {
    docs: BTreeMap<DocId, Document>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a document. Returns `false` and leaves the store untouched when the
    /// id is already taken.
    pub fn insert(&mut self, id: DocId, tokens: Vec<String>) -> bool {
        if self.docs.contains_key(&id) {
            return false;
        }
        self.docs.insert(id, Document { id, tokens });
        true
    }

    /// Builds a corpus from already-normalized text, splitting on whitespace.
    pub fn from_texts<'a, I>(texts: I) -> Result<Self>
    where
        I: IntoIterator<Item = (DocId, &'a str)>,
    {
        let mut corpus = Corpus::new();
        for (id, text) in texts {
            if !corpus.insert(id, split_tokens(text)) {
                return Err(Error::format("<memory>", 0, FormatFault::DuplicateDocument(id)));
            }
        }
        Ok(corpus)
    }

    /// Reads every `*.txt` file below `dir`. The document id is the numeric
    /// suffix of the file stem, e.g. `processed_page_12.txt` is document 12.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut corpus = Corpus::new();
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(std::io::Error::from)?;
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().and_then(|s| s.to_str()) != Some("txt") {
                continue;
            }
            let origin = path.display().to_string();
            let id = doc_id_from_path(path).ok_or_else(|| Error::format(&origin, 0, FormatFault::UnnamedDocument))?;
            let text = fs::read_to_string(path)?;
            let tokens = split_tokens(&text);
            tracing::debug!(doc_id = id, tokens = tokens.len(), path = %origin, "loaded document");
            if !corpus.insert(id, tokens) {
                return Err(Error::format(origin, 0, FormatFault::DuplicateDocument(id)));
            }
        }
        tracing::info!(num_docs = corpus.len(), dir = %dir.display(), "corpus loaded");
        Ok(corpus)
    }

    pub fn get(&self, id: DocId) -> Option<&Document> {
        self.docs.get(&id)
    }

    pub fn contains(&self, id: DocId) -> bool {
        self.docs.contains_key(&id)
    }

    /// Documents in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.docs.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = DocId> + '_ {
        self.docs.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

fn split_tokens(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

/// Extracts the trailing `_`-separated number of a file stem.
pub fn doc_id_from_path(path: &Path) -> Option<DocId> {
    let stem = path.file_stem()?.to_str()?;
    let tail = stem.rsplit('_').next()?;
    if tail.is_empty() || !tail.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    tail.parse().ok()
}
