use crate::fixed::ParseFixedError;
use crate::DocId;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A persisted line or row could not be decoded. `line` is 1-based; 0 means
    /// the fault belongs to the file as a whole.
    #[error("{}: {fault}", locate(.origin, *.line))]
    Format { origin: String, line: u64, fault: FormatFault },
    #[error("query `{query}`: {fault}")]
    Query { query: String, fault: QueryFault },
    #[error("{origin}: document {doc_id} is not part of the corpus")]
    NotFound { origin: String, doc_id: DocId },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn format(origin: impl Into<String>, line: u64, fault: FormatFault) -> Self {
        Error::Format { origin: origin.into(), line, fault }
    }
}

fn locate(origin: &str, line: u64) -> String {
    if line == 0 { origin.to_string() } else { format!("{origin}:{line}") }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatFault {
    #[error("expected exactly one `:` separator, found {0}")]
    SeparatorCount(usize),
    #[error("document id `{0}` is not numeric")]
    NonNumericId(String),
    #[error("empty term")]
    EmptyTerm,
    #[error("term `{0}` cannot be written to the postings file")]
    UnencodableTerm(String),
    #[error("term `{0}` appears more than once")]
    DuplicateTerm(String),
    #[error("term `{term}` in document {doc_id} appears more than once")]
    DuplicateRow { term: String, doc_id: DocId },
    #[error("expected header `{expected}`, found `{found}`")]
    Header { expected: String, found: String },
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },
    #[error(transparent)]
    Number(#[from] ParseFixedError),
    #[error("term `{0}` has no IDF entry")]
    MissingIdf(String),
    #[error("file name does not end in a numeric document id")]
    UnnamedDocument,
    #[error("document id {0} is used more than once")]
    DuplicateDocument(DocId),
    #[error("num_docs is {declared} but {listed} document ids are listed")]
    DocumentCount { declared: u32, listed: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum QueryFault {
    #[error("unbalanced parentheses")]
    UnbalancedParens,
    #[error("operator is missing an operand")]
    MissingOperand,
    #[error("operands are not joined by an operator")]
    MissingOperator,
    #[error("`!` must prefix a term")]
    EmptyNegation,
}
