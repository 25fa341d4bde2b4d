use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref DIGITS: Regex = Regex::new(r"\d+").expect("valid regex");
    static ref NON_WORD: Regex = Regex::new(r"[^\w\s-]").expect("valid regex");
    static ref RUSSIAN: Stemmer = Stemmer::create(Algorithm::Russian);
    static ref ENGLISH: Stemmer = Stemmer::create(Algorithm::English);
    static ref STOPWORDS: HashSet<&'static str> = {
        let russian: &[&str] = &[
            "и","в","во","не","что","он","на","я","с","со","как","а","то","все","она","так","его","но","да","ты",
            "к","у","же","вы","за","бы","по","только","ее","её","мне","было","вот","от","меня","еще","ещё","нет","о",
            "из","ему","теперь","когда","даже","ну","вдруг","ли","если","уже","или","ни","быть","был","него","до",
            "вас","нибудь","опять","уж","вам","ведь","там","потом","себя","ничего","ей","может","они","тут","где",
            "есть","надо","ней","для","мы","тебя","их","чем","была","сам","чтоб","без","будто","чего","раз","тоже",
            "себе","под","будет","ж","тогда","кто","этот","того","потому","этого","какой","совсем","ним","здесь",
            "этом","один","почти","мой","тем","чтобы","нее","неё","сейчас","были","куда","зачем","всех","никогда",
            "можно","при","наконец","два","об","другой","хоть","после","над","больше","тот","через","эти","нас",
            "про","всего","них","какая","много","разве","три","эту","моя","впрочем","хорошо","свою","этой","перед",
            "иногда","лучше","чуть","том","нельзя","такой","им","более","всегда","конечно","всю","между",
        ];
        let english: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","cannot","could","did","do","does","doing","down","during",
            "each","few","for","from","further","had","has","have","having","he","her","here","hers","herself",
            "him","himself","his","how","i","if","in","into","is","it","its","itself",
            "me","more","most","my","myself","no","nor","not","of","off","on","once","only","or","other","ought",
            "our","ours","ourselves","out","over","own","same","she","should","so","some","such",
            "than","that","the","their","theirs","them","themselves","then","there","these","they","this","those",
            "through","to","too","under","until","up","very","was","we","were","what","when","where","which",
            "while","who","whom","why","with","would","you","your","yours","yourself","yourselves",
        ];
        russian.iter().chain(english.iter()).copied().collect()
    };
}

/// One-letter words that survive the short-token filter.
const SINGLE_LETTER_WORDS: [&str; 6] = ["я", "в", "у", "с", "к", "о"];

fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

fn is_cyrillic(c: char) -> bool {
    matches!(c, '\u{0400}'..='\u{04FF}')
}

/// Normalize raw page text into index tokens: NFKC, lowercase, digits and
/// punctuation (except in-word hyphens) stripped, one-letter and stop words
/// removed, then stemmed with the Russian or English Snowball stemmer.
pub fn normalize(text: &str) -> Vec<String> {
    let lowered = text.nfkc().collect::<String>().to_lowercase();
    let without_digits = DIGITS.replace_all(&lowered, "");
    let cleaned = NON_WORD.replace_all(&without_digits, " ");

    cleaned
        .split_whitespace()
        .filter(|w| w.chars().count() > 1 || SINGLE_LETTER_WORDS.contains(w))
        .filter(|w| !is_stopword(w))
        .filter(|w| w.chars().any(char::is_alphanumeric))
        .map(|w| {
            let stemmer: &Stemmer = if w.chars().any(is_cyrillic) { &RUSSIAN } else { &ENGLISH };
            stemmer.stem(w).into_owned()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_digits_and_punctuation() {
        let t = normalize("Founded in 2006, VK (ВКонтакте)!");
        assert!(!t.iter().any(|w| w.chars().any(|c| c.is_ascii_digit())));
        assert!(!t.iter().any(|w| w.contains(['(', ')', ',', '!'])));
        assert!(t.contains(&"vk".to_string()));
    }
}
