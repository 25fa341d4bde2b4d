use crate::error::{Error, FormatFault, Result};
use crate::fixed::Fixed6;
use crate::index::{DocSet, InvertedIndex};
use crate::tfidf::{IdfTable, TermDocTable};
use crate::DocId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::{create_dir_all, File};
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

pub const TF_HEADER: [&str; 3] = ["Term", "Document", "TF"];
pub const TFIDF_HEADER: [&str; 3] = ["Term", "Document", "TF-IDF"];
pub const IDF_HEADER: [&str; 2] = ["Term", "IDF"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    /// Every document of the corpus, ascending, including documents without tokens.
    pub doc_ids: Vec<DocId>,
    pub created_at: String,
    pub version: u32,
}

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn inverted_index(&self) -> PathBuf { self.root.join("inverted_index.txt") }
    pub fn tf(&self) -> PathBuf { self.root.join("tf.csv") }
    pub fn idf(&self) -> PathBuf { self.root.join("idf.csv") }
    pub fn tfidf(&self) -> PathBuf { self.root.join("tfidf.csv") }
    pub fn meta(&self) -> PathBuf { self.root.join("meta.json") }
    pub fn manifest(&self) -> PathBuf { self.root.join("docs.tsv") }
}

fn origin(path: &Path) -> String {
    path.display().to_string()
}

// --- inverted index: `term:doc_id,doc_id,...` ---

pub fn write_index<W: Write>(index: &InvertedIndex, mut w: W) -> Result<()> {
    for (term, docs) in index.iter() {
        if term.is_empty() || term.contains(':') || term.contains(char::is_whitespace) {
            return Err(Error::format("<index>", 0, FormatFault::UnencodableTerm(term.to_string())));
        }
        let ids: Vec<String> = docs.iter().map(DocId::to_string).collect();
        writeln!(w, "{term}:{}", ids.join(","))?;
    }
    w.flush()?;
    Ok(())
}

pub fn read_index<R: BufRead>(reader: R, origin: &str) -> Result<InvertedIndex> {
    let mut entries: BTreeMap<String, DocSet> = BTreeMap::new();
    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = n as u64 + 1;
        let fail = |fault| Error::format(origin, line_no, fault);

        let line = line.trim();
        let separators = line.matches(':').count();
        if separators != 1 {
            return Err(fail(FormatFault::SeparatorCount(separators)));
        }
        let (term, ids) = line.split_once(':').ok_or_else(|| fail(FormatFault::SeparatorCount(0)))?;
        if term.is_empty() {
            return Err(fail(FormatFault::EmptyTerm));
        }
        let mut docs = DocSet::new();
        for id in ids.split(',') {
            let id = id.trim();
            let doc_id: DocId = parse_doc_id(id).ok_or_else(|| fail(FormatFault::NonNumericId(id.to_string())))?;
            docs.insert(doc_id);
        }
        if entries.insert(term.to_string(), docs).is_some() {
            return Err(fail(FormatFault::DuplicateTerm(term.to_string())));
        }
    }
    Ok(entries.into_iter().collect())
}

pub fn save_index(paths: &IndexPaths, index: &InvertedIndex) -> Result<()> {
    create_dir_all(&paths.root)?;
    let f = File::create(paths.inverted_index())?;
    write_index(index, BufWriter::new(f))
}

pub fn load_index(paths: &IndexPaths) -> Result<InvertedIndex> {
    let path = paths.inverted_index();
    let f = File::open(&path)?;
    read_index(BufReader::new(f), &origin(&path))
}

fn parse_doc_id(raw: &str) -> Option<DocId> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

// --- tables: CSV with a fixed header ---

pub fn write_term_doc_table<W: Write>(table: &TermDocTable, header: [&str; 3], w: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(w);
    writer.write_record(header)?;
    for (term, doc_id, value) in table.entries() {
        let (doc_id, value) = (doc_id.to_string(), value.to_string());
        writer.write_record([term, doc_id.as_str(), value.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn read_term_doc_table<R: Read>(r: R, header: [&str; 3], origin: &str) -> Result<TermDocTable> {
    let mut table = TermDocTable::new();
    // zero cells are not stored, so repeats are tracked apart from the table
    let mut seen: BTreeSet<(String, DocId)> = BTreeSet::new();
    for_each_row(r, &header, origin, |line, record| {
        let fail = |fault| Error::format(origin, line, fault);
        let term = &record[0];
        if term.is_empty() {
            return Err(fail(FormatFault::EmptyTerm));
        }
        let doc_id = parse_doc_id(record[1].trim()).ok_or_else(|| fail(FormatFault::NonNumericId(record[1].to_string())))?;
        let value: Fixed6 = record[2].parse().map_err(|e| fail(FormatFault::Number(e)))?;
        if !seen.insert((term.to_string(), doc_id)) {
            return Err(fail(FormatFault::DuplicateRow { term: term.to_string(), doc_id }));
        }
        table.insert(term, doc_id, value);
        Ok(())
    })?;
    Ok(table)
}

pub fn write_idf<W: Write>(idf: &IdfTable, w: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(w);
    writer.write_record(IDF_HEADER)?;
    for (term, value) in idf.iter() {
        let value = value.to_string();
        writer.write_record([term, value.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn read_idf<R: Read>(r: R, origin: &str) -> Result<IdfTable> {
    let mut idf = IdfTable::new();
    for_each_row(r, &IDF_HEADER, origin, |line, record| {
        let fail = |fault| Error::format(origin, line, fault);
        let term = &record[0];
        if term.is_empty() {
            return Err(fail(FormatFault::EmptyTerm));
        }
        let value: Fixed6 = record[1].parse().map_err(|e| fail(FormatFault::Number(e)))?;
        if idf.insert(term, value).is_some() {
            return Err(fail(FormatFault::DuplicateTerm(term.to_string())));
        }
        Ok(())
    })?;
    Ok(idf)
}

/// Checks the header, then hands every data row with the expected field count
/// to `f` together with its 1-based line number.
fn for_each_row<R, F>(r: R, header: &[&str], origin: &str, mut f: F) -> Result<()>
where
    R: Read,
    F: FnMut(u64, &csv::StringRecord) -> Result<()>,
{
    let mut reader = csv::ReaderBuilder::new().has_headers(true).flexible(true).from_reader(r);
    let found = reader.headers()?.clone();
    if found.iter().ne(header.iter().copied()) {
        return Err(Error::format(
            origin,
            1,
            FormatFault::Header { expected: header.join(","), found: found.iter().collect::<Vec<_>>().join(",") },
        ));
    }
    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        if record.len() != header.len() {
            return Err(Error::format(origin, line, FormatFault::FieldCount { expected: header.len(), found: record.len() }));
        }
        f(line, &record)?;
    }
    Ok(())
}

pub fn save_tf(paths: &IndexPaths, tf: &TermDocTable) -> Result<()> {
    create_dir_all(&paths.root)?;
    write_term_doc_table(tf, TF_HEADER, BufWriter::new(File::create(paths.tf())?))
}

pub fn load_tf(paths: &IndexPaths) -> Result<TermDocTable> {
    let path = paths.tf();
    read_term_doc_table(BufReader::new(File::open(&path)?), TF_HEADER, &origin(&path))
}

pub fn save_tfidf(paths: &IndexPaths, tfidf: &TermDocTable) -> Result<()> {
    create_dir_all(&paths.root)?;
    write_term_doc_table(tfidf, TFIDF_HEADER, BufWriter::new(File::create(paths.tfidf())?))
}

pub fn load_tfidf(paths: &IndexPaths) -> Result<TermDocTable> {
    let path = paths.tfidf();
    read_term_doc_table(BufReader::new(File::open(&path)?), TFIDF_HEADER, &origin(&path))
}

pub fn save_idf(paths: &IndexPaths, idf: &IdfTable) -> Result<()> {
    create_dir_all(&paths.root)?;
    write_idf(idf, BufWriter::new(File::create(paths.idf())?))
}

pub fn load_idf(paths: &IndexPaths) -> Result<IdfTable> {
    let path = paths.idf();
    read_idf(BufReader::new(File::open(&path)?), &origin(&path))
}

// --- meta.json ---

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.meta())?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let path = paths.meta();
    let mut f = File::open(&path)?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: MetaFile = serde_json::from_str(&buf)?;
    meta.check(&origin(&path))?;
    Ok(meta)
}

impl MetaFile {
    /// `num_docs` is the N of every IDF value, so it has to agree with the
    /// listed ids, and those have to be distinct.
    pub fn check(&self, origin: &str) -> Result<()> {
        let mut seen = BTreeSet::new();
        for &doc_id in &self.doc_ids {
            if !seen.insert(doc_id) {
                return Err(Error::format(origin, 0, FormatFault::DuplicateDocument(doc_id)));
            }
        }
        if self.num_docs as usize != self.doc_ids.len() {
            return Err(Error::format(
                origin,
                0,
                FormatFault::DocumentCount { declared: self.num_docs, listed: self.doc_ids.len() },
            ));
        }
        Ok(())
    }
}

// --- crawl manifest: `doc_id<TAB>url` ---

pub fn read_manifest<R: BufRead>(reader: R, origin: &str) -> Result<BTreeMap<DocId, String>> {
    let mut urls = BTreeMap::new();
    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = n as u64 + 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (id, url) = line
            .split_once('\t')
            .ok_or_else(|| Error::format(origin, line_no, FormatFault::FieldCount { expected: 2, found: 1 }))?;
        let doc_id = parse_doc_id(id.trim())
            .ok_or_else(|| Error::format(origin, line_no, FormatFault::NonNumericId(id.to_string())))?;
        if urls.insert(doc_id, url.trim().to_string()).is_some() {
            return Err(Error::format(origin, line_no, FormatFault::DuplicateDocument(doc_id)));
        }
    }
    Ok(urls)
}

pub fn load_manifest(path: &Path) -> Result<BTreeMap<DocId, String>> {
    read_manifest(BufReader::new(File::open(path)?), &origin(path))
}

pub fn save_manifest(paths: &IndexPaths, urls: &BTreeMap<DocId, String>) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut w = BufWriter::new(File::create(paths.manifest())?);
    for (doc_id, url) in urls {
        writeln!(w, "{doc_id}\t{url}")?;
    }
    w.flush()?;
    Ok(())
}

/// Deletes a `docs.tsv` left over from an earlier build. A missing file is fine.
pub fn remove_manifest(paths: &IndexPaths) -> Result<()> {
    match std::fs::remove_file(paths.manifest()) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
        _ => Ok(()),
    }
}

/// Fails with `NotFound` on the first id in `ids` that is not part of `known`.
pub fn ensure_known<I>(ids: I, known: &[DocId], origin: &str) -> Result<()>
where
    I: IntoIterator<Item = DocId>,
{
    for doc_id in ids {
        if known.binary_search(&doc_id).is_err() {
            return Err(Error::NotFound { origin: origin.to_string(), doc_id });
        }
    }
    Ok(())
}
