//! TF, IDF and TF-IDF tables.
//!
//! TF(t, d)    = count(t in d) / len(d)
//! IDF(t)      = ln(N / df(t))
//! TFIDF(t, d) = TF(t, d) * IDF(t)
//!
//! All values are [`Fixed6`]; TF-IDF is the product of the already-rounded TF
//! and IDF, rounded again. Entries that round to zero are not stored.

use crate::corpus::Corpus;
use crate::fixed::Fixed6;
use crate::DocId;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Sparse term x document table. A missing entry means 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermDocTable {
    rows: BTreeMap<String, BTreeMap<DocId, Fixed6>>,
}

impl TermDocTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a value, returning the previous one for this cell if any.
    /// Zero values are dropped.
    pub fn insert(&mut self, term: &str, doc_id: DocId, value: Fixed6) -> Option<Fixed6> {
        if value.is_zero() {
            return None;
        }
        match self.rows.get_mut(term) {
            Some(row) => row.insert(doc_id, value),
            None => {
                self.rows.insert(term.to_string(), BTreeMap::from([(doc_id, value)]));
                None
            }
        }
    }

    pub fn get(&self, term: &str, doc_id: DocId) -> Fixed6 {
        self.rows.get(term).and_then(|row| row.get(&doc_id)).copied().unwrap_or_default()
    }

    pub fn row(&self, term: &str) -> Option<&BTreeMap<DocId, Fixed6>> {
        self.rows.get(term)
    }

    pub fn rows(&self) -> impl Iterator<Item = (&str, &BTreeMap<DocId, Fixed6>)> {
        self.rows.iter().map(|(t, row)| (t.as_str(), row))
    }

    /// Every stored cell, terms ascending then documents ascending.
    pub fn entries(&self) -> impl Iterator<Item = (&str, DocId, Fixed6)> {
        self.rows().flat_map(|(t, row)| row.iter().map(move |(&d, &v)| (t, d, v)))
    }

    pub fn doc_ids(&self) -> BTreeSet<DocId> {
        self.rows.values().flat_map(|row| row.keys().copied()).collect()
    }

    pub fn num_terms(&self) -> usize {
        self.rows.len()
    }

    pub fn num_entries(&self) -> usize {
        self.rows.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdfTable {
    weights: BTreeMap<String, Fixed6>,
}

impl IdfTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, term: &str, idf: Fixed6) -> Option<Fixed6> {
        self.weights.insert(term.to_string(), idf)
    }

    pub fn get(&self, term: &str) -> Option<Fixed6> {
        self.weights.get(term).copied()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.weights.contains_key(term)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Fixed6)> {
        self.weights.iter().map(|(t, &v)| (t.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

/// Term frequency ratios. Documents without tokens contribute no rows.
pub fn term_frequencies(corpus: &Corpus) -> TermDocTable {
    let mut tf = TermDocTable::new();
    for doc in corpus.iter() {
        let total = doc.len() as u64;
        let mut counts: HashMap<&str, u64> = HashMap::new();
        for token in &doc.tokens {
            *counts.entry(token.as_str()).or_insert(0) += 1;
        }
        for (term, count) in counts {
            if let Some(ratio) = Fixed6::from_ratio(count, total) {
                tf.insert(term, doc.id, ratio);
            }
        }
    }
    tf
}

/// `ln(N / df)` for every observed term, N counting empty documents too.
pub fn inverse_document_frequencies(corpus: &Corpus) -> IdfTable {
    let mut df: BTreeMap<&str, u64> = BTreeMap::new();
    for doc in corpus.iter() {
        let unique: BTreeSet<&str> = doc.tokens.iter().map(String::as_str).collect();
        for term in unique {
            *df.entry(term).or_insert(0) += 1;
        }
    }
    let n = corpus.len() as f64;
    let mut idf = IdfTable::new();
    for (term, count) in df {
        idf.insert(term, Fixed6::round((n / count as f64).ln()));
    }
    idf
}

/// Multiplies every TF cell by its term's IDF. Terms without an IDF entry
/// are skipped.
pub fn tfidf(tf: &TermDocTable, idf: &IdfTable) -> TermDocTable {
    let mut out = TermDocTable::new();
    for (term, doc_id, tf_value) in tf.entries() {
        if let Some(weight) = idf.get(term) {
            out.insert(term, doc_id, tf_value * weight);
        }
    }
    out
}

/// The three tables derived from one corpus.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TfIdfTables {
    pub tf: TermDocTable,
    pub idf: IdfTable,
    pub tfidf: TermDocTable,
}

impl TfIdfTables {
    pub fn build(corpus: &Corpus) -> Self {
        let tf = term_frequencies(corpus);
        let idf = inverse_document_frequencies(corpus);
        let tfidf = tfidf(&tf, &idf);
        tracing::info!(
            num_docs = corpus.len(),
            num_terms = idf.len(),
            tf_entries = tf.num_entries(),
            tfidf_entries = tfidf.num_entries(),
            "tf-idf tables built"
        );
        Self { tf, idf, tfidf }
    }
}
