//! Test Helper Utilities
//!
//! Shared setup and sample book texts for mta-engine integration tests

#![allow(dead_code)]

use mta_common::Book;
use mta_engine::{EngineConfig, NewBook, TrickEngine};
use tempfile::TempDir;

pub const AMBITIOUS_CARD: &str = "EFFECT: A selected card is signed and placed in the middle of the deck, \
yet it rises to the top again and again. METHOD: A double lift shows the card, and the top card is \
slipped into the centre. The move requires practice to make it invisible to the audience.";

pub const VANISHING_COIN: &str = "EFFECT: A borrowed coin is held at the fingertips and vanishes \
completely, only to reappear from the spectator's pocket. METHOD: The coin is retained in a classic \
palm while the empty hand closes. This is an easy sleight that any beginner can learn in an afternoon.";

pub const LINKING_RINGS: &str = "EFFECT: Eight solid steel rings are shown separately, then linked \
and unlinked at the performer's command in a flowing sequence. METHOD: One ring has a gap that is \
covered by the hand, while two further rings are permanently joined. Presentation matters more than \
the apparatus.";

pub const CUT_ROPE: &str = "EFFECT: A length of rope is cut through the centre by a spectator, the \
ends are tied together and the knot dissolves, leaving the rope whole again. METHOD: A short loop is \
pulled up in place of the true centre, so only a small piece is cut and later hidden in the hand.";

/// Three tricks on pages 1 to 3, plus a foreword and a bare page-label chapter
pub fn three_trick_text() -> String {
    format!(
        "CHAPTER ONE. FOREWORD\n{}\n\
         --- Page 1 ---\nCHAPTER TWO. THE AMBITIOUS CARD\n{}\n\
         --- Page 2 ---\nCHAPTER THREE. THE VANISHING COIN\n{}\n\
         --- Page 3 ---\nCHAPTER FOUR. THE LINKING RINGS\n{}\n",
        "This book collects the tricks its author performed for forty years at clubs and parties. "
            .repeat(3),
        AMBITIOUS_CARD,
        VANISHING_COIN,
        LINKING_RINGS
    )
}

/// One rope trick followed by a chapter titled only by its page label
pub fn rope_text() -> String {
    format!(
        "CHAPTER ONE. THE CUT AND RESTORED ROPE\n{}\nCHAPTER TWO. PAGE 42\n{}\n",
        CUT_ROPE,
        "The performer now turns to the audience and explains what has happened so far in detail. "
            .repeat(3)
    )
}

/// Engine over a fresh on-disk database (keep the TempDir alive for the test)
pub async fn create_test_engine() -> (TempDir, TrickEngine) {
    create_test_engine_with(EngineConfig::default()).await
}

pub async fn create_test_engine_with(config: EngineConfig) -> (TempDir, TrickEngine) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test_tricks.db");
    let pool = mta_common::db::init_database(&db_path).await.unwrap();
    (temp_dir, TrickEngine::new(pool, config))
}

pub async fn register(
    engine: &TrickEngine,
    title: &str,
    author: &str,
    year: Option<i32>,
    text: &str,
) -> Book {
    engine
        .register_book(NewBook {
            title: title.to_string(),
            author: author.to_string(),
            publication_year: year,
            ocr_confidence: Some(0.95),
            text: text.to_string(),
        })
        .await
        .unwrap()
}
