use proptest::collection::{btree_map, vec as prop_vec};
use proptest::prelude::*;
use proptest::sample::select;
use retrieval_core::persist::{read_index, write_index};
use retrieval_core::tfidf::{inverse_document_frequencies, term_frequencies};
use retrieval_core::{BooleanEngine, Corpus, DocId, DocSet, InvertedIndex, TfIdfTables, VectorEngine};
use std::collections::{BTreeMap, BTreeSet};

const TERMS: [&str; 6] = ["a", "b", "c", "мёд", "сайт", "x"];

fn corpus_strategy() -> impl Strategy<Value = Corpus> {
    btree_map(0u32..40, prop_vec(select(TERMS.to_vec()), 0..10), 1..12).prop_map(|docs| {
        let mut corpus = Corpus::new();
        for (id, terms) in docs {
            corpus.insert(id, terms.into_iter().map(str::to_string).collect());
        }
        corpus
    })
}

fn postings(index: &InvertedIndex, term: &str) -> DocSet {
    index.postings(term).cloned().unwrap_or_default()
}

fn sorted(set: DocSet) -> Vec<DocId> {
    set.into_iter().collect()
}

proptest! {
    // Property: save(load(save(index))) == save(index)
    #[test]
    fn prop_index_serialization_is_fixed_point(corpus in corpus_strategy()) {
        let index = InvertedIndex::build(&corpus);
        prop_assume!(!index.is_empty());
        let mut first = Vec::new();
        write_index(&index, &mut first).unwrap();
        let loaded = read_index(first.as_slice(), "mem").unwrap();
        let mut second = Vec::new();
        write_index(&loaded, &mut second).unwrap();
        prop_assert_eq!(first, second);
        prop_assert_eq!(loaded, index);
    }

    // Property: set algebra and precedence match direct set operations
    #[test]
    fn prop_boolean_matches_set_algebra(
        corpus in corpus_strategy(),
        a in select(TERMS.to_vec()),
        b in select(TERMS.to_vec()),
        c in select(TERMS.to_vec()),
    ) {
        let index = InvertedIndex::build(&corpus);
        let universe = index.universe();
        let (pa, pb, pc) = (postings(&index, a), postings(&index, b), postings(&index, c));
        let engine = BooleanEngine::new(index);

        prop_assert_eq!(engine.search(&format!("!{a}")).unwrap(), sorted(&universe - &pa));
        prop_assert_eq!(engine.search(&format!("{a} & {b}")).unwrap(), sorted(&pa & &pb));
        prop_assert_eq!(engine.search(&format!("{a} | {b}")).unwrap(), sorted(&pa | &pb));
        prop_assert_eq!(engine.search(&format!("{a} | {b} & {c}")).unwrap(), sorted(&pa | &(&pb & &pc)));
        prop_assert_eq!(engine.search(&format!("( {a} | {b} ) & {c}")).unwrap(), sorted(&(&pa | &pb) & &pc));
    }

    // Property: evaluating the same query twice yields the same ordered result
    #[test]
    fn prop_boolean_is_idempotent(corpus in corpus_strategy(), a in select(TERMS.to_vec()), b in select(TERMS.to_vec())) {
        let engine = BooleanEngine::new(InvertedIndex::build(&corpus));
        let query = format!("!{a} | {b} & ( {a} | !{b} )");
        let first = engine.search(&query).unwrap();
        prop_assert!(first.windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(engine.search(&query).unwrap(), first);
    }

    // Property: TF ratios scaled by document length reconstruct the term counts
    #[test]
    fn prop_tf_reconstructs_counts(corpus in corpus_strategy()) {
        let tf = term_frequencies(&corpus);
        for doc in corpus.iter().filter(|d| !d.is_empty()) {
            let len = doc.len() as f64;
            let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
            for t in &doc.tokens {
                *counts.entry(t.as_str()).or_insert(0) += 1;
            }
            let mut total = 0u64;
            for (term, count) in counts {
                let scaled = tf.get(term, doc.id).to_f64() * len;
                prop_assert_eq!(scaled.round() as u64, count);
                total += scaled.round() as u64;
            }
            prop_assert_eq!(total, doc.len() as u64);
        }
    }

    // Property: rarer terms have strictly higher IDF
    #[test]
    fn prop_idf_is_monotone_in_document_frequency(corpus in corpus_strategy()) {
        let idf = inverse_document_frequencies(&corpus);
        let mut df: BTreeMap<&str, usize> = BTreeMap::new();
        for doc in corpus.iter() {
            for t in doc.tokens.iter().map(String::as_str).collect::<BTreeSet<_>>() {
                *df.entry(t).or_insert(0) += 1;
            }
        }
        for (t1, d1) in &df {
            for (t2, d2) in &df {
                if d1 < d2 {
                    prop_assert!(idf.get(t1).unwrap() > idf.get(t2).unwrap());
                }
            }
        }
    }

    // Property: scores stay within [0, 1] and come back in rank order
    #[test]
    fn prop_vector_scores_are_bounded_and_ranked(
        corpus in corpus_strategy(),
        query in prop_vec(select(TERMS.to_vec()), 0..5),
        top_n in 0usize..15,
    ) {
        let tables = TfIdfTables::build(&corpus);
        let engine = VectorEngine::new(tables.idf, tables.tfidf);
        let hits = engine.search(&query.join(" "), top_n);
        prop_assert!(hits.len() <= top_n);
        for hit in &hits {
            prop_assert!((0.0..=1.0).contains(&hit.score));
        }
        for pair in hits.windows(2) {
            prop_assert!(pair[0].score > pair[1].score
                || (pair[0].score == pair[1].score && pair[0].doc_id < pair[1].doc_id));
        }
    }
}
