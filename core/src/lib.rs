//! Retrieval core: inverted index with boolean queries, and a TF-IDF vector
//! space ranked by cosine similarity. Both are built once from a static
//! corpus of normalized token files and are read-only afterwards.

pub mod boolean;
pub mod corpus;
pub mod error;
pub mod fixed;
pub mod index;
pub mod persist;
pub mod tfidf;
pub mod tokenizer;
pub mod vector;

pub use boolean::BooleanEngine;
pub use corpus::{Corpus, Document};
pub use error::{Error, FormatFault, QueryFault, Result};
pub use fixed::Fixed6;
pub use index::{DocSet, InvertedIndex};
pub use tfidf::{IdfTable, TermDocTable, TfIdfTables};
pub use vector::{Hit, QueryVector, VectorEngine};

pub type DocId = u32;
