//! Boolean inverted index: term -> set of documents containing it.

use crate::corpus::Corpus;
use crate::DocId;
use std::collections::{BTreeMap, BTreeSet};

/// Document-id set; ascending iteration order is the result order of every query.
pub type DocSet = BTreeSet<DocId>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvertedIndex {
    postings: BTreeMap<String, DocSet>, // terms sorted lexicographically
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(corpus: &Corpus) -> Self {
        let mut index = InvertedIndex::new();
        for doc in corpus.iter() {
            for token in &doc.tokens {
                index.insert(token.as_str(), doc.id);
            }
        }
        tracing::info!(num_docs = corpus.len(), num_terms = index.num_terms(), "inverted index built");
        index
    }

    pub fn insert(&mut self, term: &str, doc_id: DocId) {
        match self.postings.get_mut(term) {
            Some(docs) => {
                docs.insert(doc_id);
            }
            None => {
                self.postings.insert(term.to_string(), DocSet::from([doc_id]));
            }
        }
    }

    pub fn postings(&self, term: &str) -> Option<&DocSet> {
        self.postings.get(term)
    }

    pub fn contains_term(&self, term: &str) -> bool {
        self.postings.contains_key(term)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DocSet)> {
        self.postings.iter().map(|(t, d)| (t.as_str(), d))
    }

    /// Union of every postings entry.
    pub fn universe(&self) -> DocSet {
        self.postings.values().flatten().copied().collect()
    }

    pub fn num_terms(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }
}

impl FromIterator<(String, DocSet)> for InvertedIndex {
    fn from_iter<I: IntoIterator<Item = (String, DocSet)>>(iter: I) -> Self {
        let mut index = InvertedIndex::new();
        for (term, docs) in iter {
            index.postings.entry(term).or_default().extend(docs);
        }
        index
    }
}
