//! Trick Classifier Service
//!
//! Assigns an effect category, a difficulty tier and a confidence score to
//! each candidate passage, and pulls out the method section and props list.
//!
//! Effect rules look at the title plus the first `lead_chars` characters of
//! the body; difficulty rules scan the whole body. Both are first-match-wins
//! over the ordered tables in [`effect_rules`](super::effect_rules).

use mta_common::Difficulty;
use once_cell::sync::Lazy;
use regex::Regex;

use super::effect_rules::{EffectCategory, DIFFICULTY_RULES, EFFECT_RULES, PROP_RULES};
use crate::config::ClassifierConfig;
use crate::models::{Classification, ClassifiedCandidate, TrickCandidate};
use crate::utils::text::{
    contains_phrase, contains_word_stems, is_positional_label, take_chars, upper_words,
};

static EFFECT_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bEFFECT\b|(?i:\b(?:the\s+)?effect\s*[:\x{2014}])")
        .expect("effect marker pattern is valid")
});

static METHOD_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bMETHOD\b|(?i:\b(?:the\s+)?(?:method|secret|working)\s*[:\x{2014}])")
        .expect("method marker pattern is valid")
});

/// Section headings that end a method section
static SECTION_END: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:EFFECT|PRESENTATION|PERFORMANCE|PATTER|NOTES?|REMARKS)\b|(?i:\b(?:presentation|performance|patter|notes?|remarks)\s*:)")
        .expect("section end pattern is valid")
});

/// Words a title needs before it earns full title quality
const NAMED_TITLE_WORDS: usize = 2;

/// Titles longer than this read as sentences
const SENTENCE_TITLE_WORDS: usize = 12;

/// Trick Classifier
pub struct TrickClassifier {
    config: ClassifierConfig,

    /// Structure marker weight (default 0.40)
    structure_weight: f64,

    /// Body length weight (default 0.30)
    length_weight: f64,

    /// Title quality weight (default 0.30)
    title_weight: f64,
}

impl TrickClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            config,
            structure_weight: 0.40,
            length_weight: 0.30,
            title_weight: 0.30,
        }
    }

    /// Classify every candidate, preserving order
    pub fn classify_all(&self, candidates: Vec<TrickCandidate>) -> Vec<ClassifiedCandidate> {
        candidates
            .into_iter()
            .map(|candidate| self.classify_candidate(candidate))
            .collect()
    }

    /// Classify one candidate and extract its method and props
    pub fn classify_candidate(&self, candidate: TrickCandidate) -> ClassifiedCandidate {
        let classification = self.classify(&candidate);
        let method = extract_method(&candidate.body);
        let props = extract_props(&candidate.body);

        tracing::debug!(
            position = candidate.position,
            title = %candidate.title_guess,
            category = classification.category.key(),
            difficulty = %classification.difficulty,
            confidence = classification.confidence,
            "Classified candidate"
        );

        ClassifiedCandidate {
            candidate,
            classification,
            method,
            props,
        }
    }

    pub fn classify(&self, candidate: &TrickCandidate) -> Classification {
        Classification {
            category: self.effect_category(&candidate.title_guess, &candidate.body),
            difficulty: difficulty_tier(&candidate.body),
            confidence: self.confidence(candidate),
        }
    }

    /// First matching effect rule over title + body lead; `CloseUp` otherwise
    pub fn effect_category(&self, title: &str, body: &str) -> EffectCategory {
        let title_words = upper_words(title);
        let mut lead_words = title_words.clone();
        lead_words.extend(upper_words(take_chars(body, self.config.lead_chars)));

        EFFECT_RULES
            .iter()
            .find(|rule| {
                let words = if rule.title_only {
                    &title_words
                } else {
                    &lead_words
                };
                rule.triggers.iter().any(|t| contains_phrase(words, t))
            })
            .map(|rule| rule.category)
            .unwrap_or(EffectCategory::CloseUp)
    }

    /// Blend of structure markers, length and title quality, in [0, 1]
    ///
    /// Unanchored candidates always score 0.0.
    pub fn confidence(&self, candidate: &TrickCandidate) -> f64 {
        if candidate.is_unanchored() {
            return 0.0;
        }

        let structure = structure_score(&candidate.body);
        let length = (candidate.body.chars().count() as f64
            / self.config.target_length.max(1) as f64)
            .min(1.0);
        let title = title_quality(&candidate.title_guess);

        let score = self.structure_weight * structure
            + self.length_weight * length
            + self.title_weight * title;

        // Rounded so persisted values compare exactly across runs
        (score.clamp(0.0, 1.0) * 10_000.0).round() / 10_000.0
    }
}

impl Default for TrickClassifier {
    fn default() -> Self {
        Self::new(ClassifierConfig::default())
    }
}

/// First matching difficulty tier over the whole body; `Intermediate` otherwise
pub fn difficulty_tier(body: &str) -> Difficulty {
    let words = upper_words(body);
    DIFFICULTY_RULES
        .iter()
        .find(|rule| rule.triggers.iter().any(|t| contains_word_stems(&words, t)))
        .map(|rule| rule.difficulty)
        .unwrap_or(Difficulty::Intermediate)
}

/// 0.5 for an effect marker plus 0.5 for a method marker
fn structure_score(body: &str) -> f64 {
    let mut score = 0.0;
    if EFFECT_MARKER.is_match(body) {
        score += 0.5;
    }
    if METHOD_MARKER.is_match(body) {
        score += 0.5;
    }
    score
}

fn title_quality(title: &str) -> f64 {
    if is_positional_label(title) {
        return 0.0;
    }
    let words = upper_words(title)
        .into_iter()
        .filter(|w| w.chars().any(|c| c.is_alphabetic()))
        .count();
    match words {
        0 => 0.0,
        n if n > SENTENCE_TITLE_WORDS => 0.4,
        n if n >= NAMED_TITLE_WORDS => 1.0,
        _ => 0.6,
    }
}

/// Text of the method section, up to the next section heading
pub fn extract_method(body: &str) -> Option<String> {
    let marker = METHOD_MARKER.find(body)?;
    let rest = body[marker.end()..].trim_start_matches(|c: char| {
        c.is_whitespace() || matches!(c, ':' | '.' | '-' | '\u{2014}' | '\u{2013}')
    });
    let section = match SECTION_END.find(rest) {
        Some(end) => &rest[..end.start()],
        None => rest,
    };

    let method = section.split_whitespace().collect::<Vec<_>>().join(" ");
    if method.is_empty() {
        None
    } else {
        Some(method)
    }
}

/// Props mentioned anywhere in the body, in table order, without duplicates
pub fn extract_props(body: &str) -> Vec<String> {
    let words = upper_words(body);
    PROP_RULES
        .iter()
        .filter(|(_, phrase)| contains_phrase(&words, phrase))
        .map(|(label, _)| label.to_string())
        .collect()
}
