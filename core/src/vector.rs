//! Ranked retrieval in the TF-IDF vector space.
//!
//! A query is treated as a pseudo-document: each recognised term is weighted
//! `IDF(t) * count(t in query) / query length`. Documents are compared by
//! cosine similarity against their full TF-IDF row, so `|d|` covers every
//! non-zero term of the document, not just the ones the query mentions.

use crate::tfidf::{IdfTable, TermDocTable};
use crate::DocId;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Hit {
    pub doc_id: DocId,
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryVector {
    weights: BTreeMap<String, f64>,
}

impl QueryVector {
    pub fn get(&self, term: &str) -> Option<f64> {
        self.weights.get(term).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(t, &w)| (t.as_str(), w))
    }

    pub fn norm(&self) -> f64 {
        self.weights.values().map(|w| w * w).sum::<f64>().sqrt()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

/// `dot / (|q| * |d|)`, 0 when either norm is 0. Clamped to `[0, 1]`.
pub fn cosine(dot: f64, query_norm: f64, doc_norm: f64) -> f64 {
    if query_norm == 0.0 || doc_norm == 0.0 {
        return 0.0;
    }
    (dot / (query_norm * doc_norm)).clamp(0.0, 1.0)
}

pub struct VectorEngine {
    idf: IdfTable,
    tfidf: TermDocTable,
    doc_norms: HashMap<DocId, f64>,
}

impl VectorEngine {
    pub fn new(idf: IdfTable, tfidf: TermDocTable) -> Self {
        let mut squares: HashMap<DocId, f64> = HashMap::new();
        for (_, doc_id, weight) in tfidf.entries() {
            let w = weight.to_f64();
            *squares.entry(doc_id).or_insert(0.0) += w * w;
        }
        let doc_norms: HashMap<DocId, f64> = squares.into_iter().map(|(d, s)| (d, s.sqrt())).collect();
        tracing::debug!(num_terms = idf.len(), num_docs = doc_norms.len(), "vector engine ready");
        Self { idf, tfidf, doc_norms }
    }

    pub fn idf(&self) -> &IdfTable {
        &self.idf
    }

    pub fn tfidf(&self) -> &TermDocTable {
        &self.tfidf
    }

    /// Euclidean norm of a document's full TF-IDF row.
    pub fn doc_norm(&self, doc_id: DocId) -> f64 {
        self.doc_norms.get(&doc_id).copied().unwrap_or(0.0)
    }

    /// Terms missing from the IDF table are dropped.
    pub fn vectorize(&self, query: &str) -> QueryVector {
        let terms: Vec<&str> = query.split_whitespace().collect();
        let len = terms.len() as f64;
        let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
        for term in terms {
            *counts.entry(term).or_insert(0) += 1;
        }
        let weights = counts
            .into_iter()
            .filter_map(|(term, count)| {
                let idf = self.idf.get(term)?;
                Some((term.to_string(), idf.to_f64() * count as f64 / len))
            })
            .collect();
        QueryVector { weights }
    }

    pub fn similarity(&self, query: &QueryVector, doc_id: DocId) -> f64 {
        let dot: f64 = query
            .iter()
            .map(|(term, w)| w * self.tfidf.get(term, doc_id).to_f64())
            .sum();
        cosine(dot, query.norm(), self.doc_norm(doc_id))
    }

    /// Top `top_n` documents by descending score, ties by ascending id.
    /// Only documents sharing at least one weighted term with the query are
    /// scored; everything else has similarity 0.
    pub fn search(&self, query: &str, top_n: usize) -> Vec<Hit> {
        let qv = self.vectorize(query);
        if qv.is_empty() || top_n == 0 {
            return Vec::new();
        }
        let q_norm = qv.norm();

        let mut dots: HashMap<DocId, f64> = HashMap::new();
        for (term, q_weight) in qv.iter() {
            if let Some(row) = self.tfidf.row(term) {
                for (&doc_id, weight) in row {
                    *dots.entry(doc_id).or_insert(0.0) += q_weight * weight.to_f64();
                }
            }
        }

        let mut hits: Vec<Hit> = dots
            .into_iter()
            .map(|(doc_id, dot)| Hit { doc_id, score: cosine(dot, q_norm, self.doc_norm(doc_id)) })
            .collect();
        hits.sort_unstable_by(rank_order);
        hits.truncate(top_n);
        tracing::debug!(query, hits = hits.len(), "vector search");
        hits
    }
}

fn rank_order(a: &Hit, b: &Hit) -> Ordering {
    b.score.total_cmp(&a.score).then_with(|| a.doc_id.cmp(&b.doc_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Corpus;
    use crate::fixed::Fixed6;
    use crate::tfidf::TfIdfTables;

    fn engine(texts: &[(DocId, &str)]) -> VectorEngine {
        let corpus = Corpus::from_texts(texts.iter().copied()).unwrap();
        let tables = TfIdfTables::build(&corpus);
        VectorEngine::new(tables.idf, tables.tfidf)
    }

    #[test]
    fn query_weights_are_tf_times_idf() {
        let e = engine(&[(1, "a b"), (2, "b"), (3, "c"), (4, "c")]);
        let qv = e.vectorize("a a b unknown");
        // idf(a) = ln 4, idf(b) = ln 2, query length 4
        let a = Fixed6::round(4f64.ln()).to_f64() * 2.0 / 4.0;
        let b = Fixed6::round(2f64.ln()).to_f64() / 4.0;
        assert!((qv.get("a").unwrap() - a).abs() < 1e-12);
        assert!((qv.get("b").unwrap() - b).abs() < 1e-12);
        assert_eq!(qv.get("unknown"), None);
    }

    #[test]
    fn identical_single_term_document_scores_one() {
        let e = engine(&[(1, "apple"), (2, "pear"), (3, "apple pear plum")]);
        let hits = e.search("apple", 10);
        assert_eq!(hits[0].doc_id, 1);
        assert!((hits[0].score - 1.0).abs() < 1e-9);
        assert_eq!(hits[1].doc_id, 3);
        assert!(hits[1].score < 1.0 && hits[1].score > 0.0);
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn full_document_vector_penalises_extra_terms() {
        let e = engine(&[(1, "rust"), (2, "rust ocean forest desert"), (3, "go")]);
        let hits = e.search("rust", 10);
        assert_eq!(hits.iter().map(|h| h.doc_id).collect::<Vec<_>>(), vec![1, 2]);
        assert!(hits[0].score > hits[1].score);
    }

    #[test]
    fn ties_break_by_ascending_id() {
        let e = engine(&[(9, "cat"), (4, "cat"), (7, "cat"), (1, "dog")]);
        let hits = e.search("cat", 10);
        assert_eq!(hits.iter().map(|h| h.doc_id).collect::<Vec<_>>(), vec![4, 7, 9]);
    }

    #[test]
    fn top_n_truncates() {
        let e = engine(&[(1, "cat"), (2, "cat"), (3, "cat"), (4, "dog")]);
        assert_eq!(e.search("cat", 2).len(), 2);
        assert!(e.search("cat", 0).is_empty());
    }

    #[test]
    fn unrecognised_query_is_empty() {
        let e = engine(&[(1, "cat"), (2, "dog")]);
        assert!(e.search("zebra", 10).is_empty());
        assert!(e.search("", 10).is_empty());
    }

    #[test]
    fn zero_norms_score_zero() {
        assert_eq!(cosine(1.0, 0.0, 2.0), 0.0);
        assert_eq!(cosine(1.0, 2.0, 0.0), 0.0);
        let e = engine(&[(1, "cat"), (2, "dog")]);
        assert_eq!(e.similarity(&QueryVector::default(), 1), 0.0);
        assert_eq!(e.similarity(&e.vectorize("cat"), 99), 0.0);
    }
}
