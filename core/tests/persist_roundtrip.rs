use retrieval_core::persist::{
    load_idf, load_index, load_meta, load_tf, load_tfidf, remove_manifest, save_idf, save_index, save_manifest,
    save_meta, save_tf, save_tfidf, IndexPaths, MetaFile,
};
use std::collections::BTreeMap;
use retrieval_core::{Corpus, Error, FormatFault, InvertedIndex, TfIdfTables};
use std::fs;
use tempfile::tempdir;

fn corpus() -> Corpus {
    Corpus::from_texts([
        (1, "вконтакте павел дуров основать вконтакте"),
        (2, "облепиха мёд каравай мёд"),
        (3, "интернет компания бизнес деньги сайт"),
        (4, "онлайн пользователь сайт интернет"),
        (5, ""),
    ])
    .unwrap()
}

#[test]
fn saved_index_is_a_fixed_point() {
    let dir = tempdir().unwrap();
    let first = IndexPaths::new(dir.path().join("a"));
    let second = IndexPaths::new(dir.path().join("b"));

    let index = InvertedIndex::build(&corpus());
    save_index(&first, &index).unwrap();
    let loaded = load_index(&first).unwrap();
    assert_eq!(loaded, index);
    save_index(&second, &loaded).unwrap();

    let a = fs::read(first.inverted_index()).unwrap();
    let b = fs::read(second.inverted_index()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn tables_reload_and_resave_identically() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());
    let tables = TfIdfTables::build(&corpus());
    save_tf(&paths, &tables.tf).unwrap();
    save_idf(&paths, &tables.idf).unwrap();
    save_tfidf(&paths, &tables.tfidf).unwrap();

    assert_eq!(load_tf(&paths).unwrap(), tables.tf);
    assert_eq!(load_idf(&paths).unwrap(), tables.idf);
    assert_eq!(load_tfidf(&paths).unwrap(), tables.tfidf);

    let before = fs::read_to_string(paths.tfidf()).unwrap();
    save_tfidf(&paths, &load_tfidf(&paths).unwrap()).unwrap();
    assert_eq!(fs::read_to_string(paths.tfidf()).unwrap(), before);
    assert!(before.starts_with("Term,Document,TF-IDF\n"));
}

#[test]
fn rebuilding_reproduces_identical_bytes() {
    let dir = tempdir().unwrap();
    let a = IndexPaths::new(dir.path().join("a"));
    let b = IndexPaths::new(dir.path().join("b"));
    for paths in [&a, &b] {
        let tables = TfIdfTables::build(&corpus());
        save_tf(paths, &tables.tf).unwrap();
        save_idf(paths, &tables.idf).unwrap();
        save_tfidf(paths, &tables.tfidf).unwrap();
    }
    for (x, y) in [(a.tf(), b.tf()), (a.idf(), b.idf()), (a.tfidf(), b.tfidf())] {
        assert_eq!(fs::read(x).unwrap(), fs::read(y).unwrap());
    }
}

#[test]
fn tf_file_matches_reference_values() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());
    let tables = TfIdfTables::build(&Corpus::from_texts([(1, "x x y")]).unwrap());
    save_tf(&paths, &tables.tf).unwrap();
    assert_eq!(
        fs::read_to_string(paths.tf()).unwrap(),
        "Term,Document,TF\nx,1,0.666667\ny,1,0.333333\n"
    );
}

#[test]
fn corrupt_index_aborts_the_load() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());
    fs::write(paths.inverted_index(), "мёд:2,3\nсайт:3,четыре\n").unwrap();
    match load_index(&paths).unwrap_err() {
        Error::Format { line, fault, .. } => {
            assert_eq!(line, 2);
            assert_eq!(fault, FormatFault::NonNumericId("четыре".into()));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn index_written_by_older_tools_still_loads() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());
    fs::write(paths.inverted_index(), "груша:5\r\nмуха:1,7\r\n").unwrap();
    let index = load_index(&paths).unwrap();
    assert_eq!(index.postings("муха").unwrap().iter().copied().collect::<Vec<_>>(), vec![1, 7]);
}

#[test]
fn hand_edited_meta_is_rejected() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());
    let meta = MetaFile { num_docs: 5, doc_ids: corpus().ids().collect(), created_at: String::new(), version: 1 };
    save_meta(&paths, &meta).unwrap();
    assert_eq!(load_meta(&paths).unwrap(), meta);

    fs::write(paths.meta(), r#"{"num_docs": 7, "doc_ids": [1, 2, 3, 4, 5], "created_at": "", "version": 1}"#).unwrap();
    match load_meta(&paths).unwrap_err() {
        Error::Format { fault, .. } => assert_eq!(fault, FormatFault::DocumentCount { declared: 7, listed: 5 }),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn stale_manifest_is_removed() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());
    save_manifest(&paths, &BTreeMap::from([(99, "https://example.org/old".to_string())])).unwrap();
    assert!(paths.manifest().exists());
    remove_manifest(&paths).unwrap();
    assert!(!paths.manifest().exists());
    // nothing to remove is not an error
    remove_manifest(&paths).unwrap();
}
