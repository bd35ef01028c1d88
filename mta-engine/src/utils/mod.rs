//! Utility modules for mta-engine

pub mod db_retry;
pub mod text;

pub use db_retry::retry_on_lock;
pub use text::{
    content_tokens, contains_phrase, is_positional_label, jaccard, normalize_name, take_chars,
    title_case, truncate_with_ellipsis, upper_words,
};
