//! Text helpers shared by segmentation, classification and similarity
//!
//! All word-level matching works on alphanumeric runs, so punctuation and
//! OCR noise between words never affects a match.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::hash::Hash;

/// Words ignored when building token sets for similarity
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "his", "in",
    "is", "it", "its", "of", "on", "or", "that", "the", "this", "to", "was", "were", "will",
    "with", "you", "your", "which", "then", "into", "one", "but", "not", "him", "her",
    "they", "them", "their", "so", "if", "all", "have", "had", "been",
];

/// Words that may make up a purely positional label such as "Page 42" or "Chapter Two"
const POSITIONAL_WORDS: &[&str] = &[
    "page", "pages", "pg", "p", "chapter", "chap", "ch", "section", "sec", "part", "no",
    "number", "book", "volume", "vol", "continued", "cont", "the",
];

const NUMBER_WORDS: &[&str] = &[
    "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten", "eleven",
    "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
    "nineteen", "twenty", "thirty", "forty", "fifty", "first", "second", "third", "fourth",
    "fifth", "sixth", "seventh", "eighth", "ninth", "tenth",
];

fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
}

/// Uppercased words of `text`, in order
pub fn upper_words(text: &str) -> Vec<String> {
    words(text).map(|w| w.to_uppercase()).collect()
}

/// Lowercased words joined by single spaces
pub fn normalize_name(text: &str) -> String {
    words(text)
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lowercased content words of `text` with stop words and single letters removed
pub fn content_tokens(text: &str) -> HashSet<String> {
    words(text)
        .map(|w| w.to_lowercase())
        .filter(|w| w.chars().count() > 1 && !STOP_WORDS.contains(&w.as_str()))
        .collect()
}

/// Whether `phrase` occurs as a contiguous word sequence in `words`
///
/// Both sides must be uppercase. A text word also matches when it is the
/// phrase word plus a plural suffix ("ACES" matches "ACE").
pub fn contains_phrase(words: &[String], phrase: &str) -> bool {
    phrase_matches(words, phrase, word_matches)
}

/// Like [`contains_phrase`], but each text word need only start with its
/// phrase word, so "DIFFICULT" also matches "DIFFICULTY" and "SKILL" "SKILLED"
pub fn contains_word_stems(words: &[String], phrase: &str) -> bool {
    phrase_matches(words, phrase, |word, stem| word.starts_with(stem))
}

fn phrase_matches(words: &[String], phrase: &str, matches: impl Fn(&str, &str) -> bool) -> bool {
    let needle: Vec<&str> = phrase.split_whitespace().collect();
    if needle.is_empty() || needle.len() > words.len() {
        return false;
    }

    words.windows(needle.len()).any(|window| {
        window
            .iter()
            .zip(&needle)
            .all(|(word, want)| matches(word, want))
    })
}

fn word_matches(word: &str, want: &str) -> bool {
    match word.strip_prefix(want) {
        Some("") | Some("S") | Some("ES") => true,
        _ => false,
    }
}

/// Roman numerals from I to XCIX, in canonical form
static ROMAN_NUMERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:xc|xl|l?x{0,3})(?:ix|iv|v?i{0,3})$").expect("roman numeral pattern is valid")
});

fn is_roman_numeral(word: &str) -> bool {
    !word.is_empty() && ROMAN_NUMERAL.is_match(word)
}

/// Whether `word` reads as a chapter or page ordinal (digits, roman numeral or number word)
pub fn is_ordinal_word(word: &str) -> bool {
    let lower = word.to_lowercase();
    if lower.chars().all(|c| c.is_ascii_digit()) {
        return !lower.is_empty();
    }
    if is_roman_numeral(&lower) {
        return true;
    }
    lower
        .split('-')
        .all(|part| NUMBER_WORDS.contains(&part))
}

/// Whether a title is only a positional label ("Page 42", "CHAPTER IV", "12")
///
/// Empty titles count as positional.
pub fn is_positional_label(title: &str) -> bool {
    words(title).all(|w| {
        let lower = w.to_lowercase();
        POSITIONAL_WORDS.contains(&lower.as_str()) || is_ordinal_word(&lower)
    })
}

/// Title-case a name: first letter of each word upper, the rest lower
///
/// Letters directly after an apostrophe stay lowercase ("VERNON'S" becomes "Vernon's").
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    let mut prev = ' ';

    for c in text.chars() {
        if c.is_alphabetic() {
            if at_word_start && prev != '\'' && prev != '\u{2019}' {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = !c.is_alphanumeric();
        }
        prev = c;
    }

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First `n` characters of `text` (char-boundary safe)
pub fn take_chars(text: &str, n: usize) -> &str {
    match text.char_indices().nth(n) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Cap `text` at `cap` characters, appending "..." when anything was cut
pub fn truncate_with_ellipsis(text: &str, cap: usize) -> String {
    let head = take_chars(text, cap);
    if head.len() < text.len() {
        format!("{}...", head.trim_end())
    } else {
        head.to_string()
    }
}

/// Jaccard index of two sets; 0.0 when both are empty
pub fn jaccard<T: Eq + Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}
