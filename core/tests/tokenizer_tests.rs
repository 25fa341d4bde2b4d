use retrieval_core::tokenizer::normalize;

#[test]
fn it_normalizes_and_stems() {
    let words = normalize("Running Runners RUN! The café's menu.");
    // Stemming to "run" should appear
    assert!(words.contains(&"run".to_string()));
    // NFKC keeps the accent, lowercase applies
    assert!(words.iter().any(|w| w.starts_with("caf")));
    assert!(!words.iter().any(|w| w.chars().any(char::is_uppercase)));
}

#[test]
fn it_filters_stopwords() {
    let words = normalize("The quick brown fox and the lazy dog");
    assert!(!words.contains(&"the".to_string()));
    assert!(!words.contains(&"and".to_string()));

    let words = normalize("Павел Дуров и компания не продали сайт");
    assert!(!words.contains(&"и".to_string()));
    assert!(!words.contains(&"не".to_string()));
    assert!(words.iter().any(|w| w.starts_with("дур")));
}

#[test]
fn it_keeps_hyphenated_words_and_drops_single_letters() {
    let words = normalize("x кто-то y 42 -- z");
    assert_eq!(words.len(), 1);
    assert!(words[0].contains('-'));
}

#[test]
fn it_folds_compatibility_forms() {
    // fullwidth letters fold to ASCII under NFKC
    let words = normalize("ＲＵＳＴ");
    assert_eq!(words, vec!["rust".to_string()]);
}
