//! Trick segmentation
//!
//! Splits raw OCR text into candidate passages at structural anchors. Three
//! kinds of anchor are recognised, strongest first:
//!
//! 1. Chapter or section headings ("CHAPTER ONE. THE AMBITIOUS CARD")
//! 2. Page-break markers ("--- Page 12 ---")
//! 3. Title-like lines opening a paragraph
//!
//! Only the strongest kind present in a text is used. A text with no anchor
//! at all becomes a single unanchored candidate. Page-break marker lines are
//! removed from passage bodies but still drive page estimates.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::config::SegmenterConfig;
use crate::models::{AnchorKind, TrickCandidate};
use crate::utils::text::{contains_phrase, is_ordinal_word, upper_words};

/// Longest line accepted as a title
const MAX_TITLE_CHARS: usize = 80;

/// Longest paragraph title, in words
const MAX_TITLE_WORDS: usize = 10;

/// Title used for an unanchored text without a usable first line
const UNTITLED: &str = "Untitled passage";

static CHAPTER_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?im)^[ \t]*(?:chapter|section)[ \t]+([0-9]+|[a-z]+(?:-[a-z]+)*)\b[ \t]*[.:\x{2014}\x{2013}-]*[ \t]*([^\r\n]*)",
    )
    .expect("chapter heading pattern is valid")
});

static PAGE_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^[ \t]*-{2,}[ \t]*page[ \t]+(\d+)[ \t]*-{2,}[ \t\r]*$")
        .expect("page marker pattern is valid")
});

static BLANK_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n[ \t\r]*\n(?:[ \t\r]*\n)+").expect("blank run pattern is valid"));

/// Structural words that open sections inside a trick, never a new trick
const SECTION_WORDS: &[&str] = &[
    "EFFECT",
    "THE EFFECT",
    "METHOD",
    "THE METHOD",
    "PRESENTATION",
    "PREPARATION",
    "PERFORMANCE",
    "REQUIREMENTS",
    "PROPS",
    "PROPS NEEDED",
    "PATTER",
    "ROUTINE",
    "NOTES",
    "NOTE",
    "REMARKS",
];

/// Lowercase words allowed inside a title-case line
const MINOR_WORDS: &[&str] = &[
    "a", "an", "and", "as", "at", "by", "for", "from", "in", "into", "of", "on", "or", "the",
    "to", "with",
];

/// Located anchor before its passage is cut out
#[derive(Debug, Clone)]
struct Anchor {
    kind: AnchorKind,
    /// Byte offset of the heading line
    start: usize,
    /// Byte offset where the passage body begins
    body_start: usize,
    title: String,
}

/// Line of the source text with its byte span (newline excluded)
#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    start: usize,
    end: usize,
    text: &'a str,
}

fn lines_with_offsets(text: &str) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    let mut start = 0;
    for piece in text.split_inclusive('\n') {
        let content = piece.trim_end_matches(['\n', '\r']);
        lines.push(Line {
            start,
            end: start + content.len(),
            text: content,
        });
        start += piece.len();
    }
    lines
}

/// Offset just past the newline ending the line that contains `offset`
fn end_of_line(text: &str, offset: usize) -> usize {
    match text[offset..].find('\n') {
        Some(idx) => offset + idx + 1,
        None => text.len(),
    }
}

fn clean_title(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches(['.', ':', ',', ';', ' '])
        .to_string()
}

fn is_page_marker(line: &str) -> bool {
    PAGE_MARKER.is_match(line)
}

/// Whether a line reads as a usable title (short, has letters, not a marker)
fn is_usable_title(line: &str) -> bool {
    let trimmed = line.trim();
    let chars = trimmed.chars().count();
    (3..=MAX_TITLE_CHARS).contains(&chars)
        && trimmed.chars().any(|c| c.is_alphabetic())
        && !is_page_marker(trimmed)
}

/// Split a hyphenated chapter token such as "ONE-THE" into ("ONE", "THE")
fn split_ordinal(token: &str) -> Option<(&str, &str)> {
    if is_ordinal_word(token) {
        return Some((token, ""));
    }
    token
        .match_indices('-')
        .map(|(idx, _)| (&token[..idx], &token[idx + 1..]))
        .filter(|(head, _)| is_ordinal_word(head))
        .last()
}

/// Trick Segmenter
///
/// Pure function of its configuration and the input text.
pub struct TrickSegmenter {
    config: SegmenterConfig,
    /// Upper-cased skip titles, single-spaced
    skip_phrases: Vec<String>,
}

impl TrickSegmenter {
    pub fn new(config: SegmenterConfig) -> Self {
        let skip_phrases = config
            .skip_titles
            .iter()
            .map(|t| upper_words(t))
            .filter(|words| !words.is_empty())
            .map(|words| words.join(" "))
            .collect();
        Self {
            config,
            skip_phrases,
        }
    }

    /// Segment `text` into ordered, non-overlapping candidates
    ///
    /// Passages shorter than `min_content_chars` and passages whose title
    /// contains a skip-list heading anywhere are dropped. Positions are assigned to
    /// the surviving candidates in text order.
    pub fn segment(&self, text: &str) -> Vec<TrickCandidate> {
        let markers: Vec<usize> = PAGE_MARKER.find_iter(text).map(|m| m.start()).collect();

        let mut anchors = self.chapter_anchors(text);
        if anchors.is_empty() {
            anchors = self.page_anchors(text);
        }
        if anchors.is_empty() {
            anchors = self.paragraph_anchors(text);
        }

        if anchors.is_empty() {
            return self.unanchored(text, &markers).into_iter().collect();
        }

        let anchors = drop_overlapping(anchors);
        debug!(
            kind = ?anchors[0].kind,
            count = anchors.len(),
            "Structural anchors found"
        );

        let mut candidates = Vec::new();
        for (idx, anchor) in anchors.iter().enumerate() {
            let end = anchors
                .get(idx + 1)
                .map(|next| next.start)
                .unwrap_or(text.len());

            if self.is_skipped(&anchor.title) {
                debug!(title = %anchor.title, "Skipping front/back-matter section");
                continue;
            }

            let body = clean_body(&text[anchor.body_start.min(end)..end]);
            let content_chars = body.chars().count();
            if content_chars < self.config.min_content_chars {
                debug!(
                    title = %anchor.title,
                    content_chars,
                    min = self.config.min_content_chars,
                    "Dropping short passage"
                );
                continue;
            }

            let page_start = page_at(&markers, anchor.start);
            let page_end = page_at(&markers, end).max(page_start);

            candidates.push(TrickCandidate {
                position: candidates.len(),
                start_offset: anchor.start,
                end_offset: end,
                title_guess: anchor.title.clone(),
                body,
                page_start,
                page_end,
                anchor: anchor.kind,
            });
        }

        candidates
    }

    fn is_skipped(&self, title: &str) -> bool {
        let words = upper_words(title);
        self.skip_phrases
            .iter()
            .any(|phrase| contains_phrase(&words, phrase))
    }

    fn chapter_anchors(&self, text: &str) -> Vec<Anchor> {
        let mut anchors = Vec::new();

        for caps in CHAPTER_HEADING.captures_iter(text) {
            let (Some(whole), Some(number), Some(rest)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };

            let Some((_, spill)) = split_ordinal(number.as_str()) else {
                // "Section of the deck..." is prose, not a heading
                continue;
            };

            let inline = clean_title(&format!("{} {}", spill, rest.as_str()));
            if inline.chars().count() > MAX_TITLE_CHARS {
                continue;
            }

            let heading_end = end_of_line(text, whole.end());
            let (title, body_start) = if inline.is_empty() {
                match next_title_line(text, heading_end) {
                    Some((title, after)) => (title, after),
                    None => (clean_title(whole.as_str()), heading_end),
                }
            } else {
                (inline, heading_end)
            };

            anchors.push(Anchor {
                kind: AnchorKind::Chapter,
                start: whole.start(),
                body_start,
                title,
            });
        }

        anchors
    }

    fn page_anchors(&self, text: &str) -> Vec<Anchor> {
        PAGE_MARKER
            .find_iter(text)
            .map(|m| {
                let marker_end = end_of_line(text, m.end());
                let (title, body_start) = match next_title_line(text, marker_end) {
                    Some((title, after)) => (title, after),
                    None => (clean_title(m.as_str()), marker_end),
                };
                Anchor {
                    kind: AnchorKind::PageBreak,
                    start: m.start(),
                    body_start,
                    title,
                }
            })
            .collect()
    }

    fn paragraph_anchors(&self, text: &str) -> Vec<Anchor> {
        let lines = lines_with_offsets(text);
        let mut anchors = Vec::new();

        for (idx, line) in lines.iter().enumerate() {
            let opens_paragraph = idx == 0 || lines[idx - 1].text.trim().is_empty();
            if !opens_paragraph || !looks_like_title(line.text) {
                continue;
            }

            // A title is followed by a longer line of prose
            let Some(next) = lines[idx + 1..].iter().find(|l| !l.text.trim().is_empty()) else {
                continue;
            };
            if next.text.trim().chars().count() <= line.text.trim().chars().count() {
                continue;
            }

            anchors.push(Anchor {
                kind: AnchorKind::Paragraph,
                start: line.start,
                body_start: end_of_line(text, line.end),
                title: clean_title(line.text),
            });
        }

        anchors
    }

    fn unanchored(&self, text: &str, markers: &[usize]) -> Option<TrickCandidate> {
        let body = clean_body(text);
        if body.is_empty() {
            return None;
        }

        warn!(
            chars = body.chars().count(),
            "No structural anchors found; treating the whole text as one candidate"
        );

        let title = body
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .filter(|l| is_usable_title(l))
            .map(clean_title)
            .unwrap_or_else(|| UNTITLED.to_string());

        let page_start = page_at(markers, 0);
        let page_end = page_at(markers, text.len()).max(page_start);

        Some(TrickCandidate {
            position: 0,
            start_offset: 0,
            end_offset: text.len(),
            title_guess: title,
            body,
            page_start,
            page_end,
            anchor: AnchorKind::Unanchored,
        })
    }
}

impl Default for TrickSegmenter {
    fn default() -> Self {
        Self::new(SegmenterConfig::default())
    }
}

/// First non-blank line at or after `from`, if it reads as a title
///
/// Returns the cleaned title and the offset just past its line.
fn next_title_line(text: &str, from: usize) -> Option<(String, usize)> {
    let mut offset = from;
    while offset < text.len() {
        let line_end = end_of_line(text, offset);
        let line = text[offset..line_end].trim();
        if !line.is_empty() {
            if is_usable_title(line) && !is_section_word(line) {
                return Some((clean_title(line), line_end));
            }
            return None;
        }
        offset = line_end;
    }
    None
}

fn is_section_word(line: &str) -> bool {
    let words = upper_words(line).join(" ");
    SECTION_WORDS.contains(&words.as_str())
}

/// Title-case or all-caps short line that does not end like a sentence fragment
fn looks_like_title(line: &str) -> bool {
    let trimmed = line.trim();
    if !is_usable_title(trimmed) || is_section_word(trimmed) {
        return false;
    }
    if trimmed.ends_with([',', ';', ':']) {
        return false;
    }
    if !trimmed.chars().next().is_some_and(|c| c.is_uppercase()) {
        return false;
    }

    let words: Vec<&str> = trimmed
        .split_whitespace()
        .filter(|w| w.chars().next().is_some_and(|c| c.is_alphabetic()))
        .collect();
    if words.is_empty() || words.len() > MAX_TITLE_WORDS {
        return false;
    }

    let significant: Vec<&&str> = words
        .iter()
        .filter(|w| !MINOR_WORDS.contains(&w.to_lowercase().as_str()))
        .collect();
    if significant.is_empty() {
        return false;
    }
    let capitalized = significant
        .iter()
        .filter(|w| w.chars().next().is_some_and(|c| c.is_uppercase()))
        .count();

    capitalized * 10 >= significant.len() * 6
}

/// Keep anchors whose heading starts after the previous anchor's body begins
fn drop_overlapping(mut anchors: Vec<Anchor>) -> Vec<Anchor> {
    anchors.sort_by_key(|a| a.start);
    let mut kept: Vec<Anchor> = Vec::with_capacity(anchors.len());
    for anchor in anchors {
        if kept.last().is_some_and(|prev| anchor.start < prev.body_start) {
            continue;
        }
        kept.push(anchor);
    }
    kept
}

/// Remove page-marker lines, squeeze blank runs and trim
fn clean_body(raw: &str) -> String {
    let without_markers = PAGE_MARKER.replace_all(raw, "");
    BLANK_RUNS
        .replace_all(&without_markers, "\n\n")
        .trim()
        .to_string()
}

/// 1-based page at `offset`: page-break markers strictly before it, minimum 1
fn page_at(markers: &[usize], offset: usize) -> u32 {
    let count = markers.partition_point(|&m| m < offset);
    u32::try_from(count).unwrap_or(u32::MAX).max(1)
}
