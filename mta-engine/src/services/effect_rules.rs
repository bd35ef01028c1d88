//! Keyword rule tables for effect category, difficulty and props
//!
//! Rules are evaluated in table order and the first match wins, so more
//! specific categories (cups and balls, linking rings) sit above the generic
//! ones that share their vocabulary. Triggers are uppercase word phrases
//! matched with [`contains_phrase`](crate::utils::contains_phrase).

use mta_common::Difficulty;
use serde::{Deserialize, Serialize};

/// Effect category assigned by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectCategory {
    CupsAndBalls,
    LinkingRings,
    Card,
    Money,
    Coin,
    Mentalism,
    Rope,
    Silk,
    Ring,
    Paper,
    Ball,
    Stage,
    /// Fallback when no rule matches
    CloseUp,
}

impl EffectCategory {
    /// Stable key used in logs
    pub fn key(&self) -> &'static str {
        match self {
            EffectCategory::CupsAndBalls => "cups_and_balls",
            EffectCategory::LinkingRings => "linking_rings",
            EffectCategory::Card => "card",
            EffectCategory::Money => "money",
            EffectCategory::Coin => "coin",
            EffectCategory::Mentalism => "mentalism",
            EffectCategory::Rope => "rope",
            EffectCategory::Silk => "silk",
            EffectCategory::Ring => "ring",
            EffectCategory::Paper => "paper",
            EffectCategory::Ball => "ball",
            EffectCategory::Stage => "stage",
            EffectCategory::CloseUp => "close_up",
        }
    }

    /// Name of the canonical effect type this category maps to
    pub fn canonical_name(&self) -> &'static str {
        match self {
            EffectCategory::CupsAndBalls => "Stage Magic",
            EffectCategory::LinkingRings => "Ring",
            EffectCategory::Card => "Card",
            EffectCategory::Money => "Money",
            EffectCategory::Coin => "Coin",
            EffectCategory::Mentalism => "Mentalism",
            EffectCategory::Rope => "Rope",
            EffectCategory::Silk => "Silk",
            EffectCategory::Ring => "Ring",
            EffectCategory::Paper => "Paper",
            EffectCategory::Ball => "Ball",
            EffectCategory::Stage => "Stage Magic",
            EffectCategory::CloseUp => "Close-Up",
        }
    }

    /// Alternative effect-type names tried when the canonical name is missing
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            EffectCategory::CupsAndBalls => &["Cups and Balls", "Ball", "Close-Up"],
            EffectCategory::LinkingRings => &["Linking Rings", "Stage Magic"],
            EffectCategory::Card => &["Card Magic", "Cards"],
            EffectCategory::Money => &["Coin", "Coin Magic"],
            EffectCategory::Coin => &["Coin Magic", "Coins", "Money"],
            EffectCategory::Mentalism => &["Mind Reading", "Mental Magic"],
            EffectCategory::Rope => &["Rope Magic", "Ropes"],
            EffectCategory::Silk => &["Silks", "Handkerchief"],
            EffectCategory::Ring => &["Rings"],
            EffectCategory::Paper => &["Paper Magic"],
            EffectCategory::Ball => &["Balls"],
            EffectCategory::Stage => &["Stage", "Stage Illusion"],
            EffectCategory::CloseUp => &["Close Up", "Closeup", "General"],
        }
    }
}

/// One effect-category rule
#[derive(Debug, Clone, Copy)]
pub struct EffectRule {
    pub category: EffectCategory,
    pub triggers: &'static [&'static str],
    /// Only the title is scanned (short, ambiguous triggers)
    pub title_only: bool,
}

/// Ordered effect rules; [`EffectCategory::CloseUp`] applies when none match
pub static EFFECT_RULES: &[EffectRule] = &[
    EffectRule {
        category: EffectCategory::CupsAndBalls,
        triggers: &["CUPS AND BALLS", "CUP AND BALL", "CHOP CUP"],
        title_only: false,
    },
    EffectRule {
        category: EffectCategory::LinkingRings,
        triggers: &["LINKING RING", "CHINESE RING"],
        title_only: false,
    },
    EffectRule {
        category: EffectCategory::Card,
        triggers: &["CARD", "ACE", "DECK", "DOUBLE LIFT", "AMBITIOUS", "PACK"],
        title_only: false,
    },
    EffectRule {
        category: EffectCategory::Money,
        triggers: &["BILL", "BANKNOTE", "CURRENCY", "PAPER MONEY"],
        title_only: false,
    },
    EffectRule {
        category: EffectCategory::Coin,
        triggers: &["COIN", "SILVER", "HALF DOLLAR", "PENNY", "MONEY", "PALM"],
        title_only: false,
    },
    EffectRule {
        category: EffectCategory::Mentalism,
        triggers: &[
            "MENTAL",
            "MENTALISM",
            "MIND",
            "THOUGHT",
            "PREDICTION",
            "TELEPATHY",
            "PSYCHIC",
            "CLAIRVOYANCE",
        ],
        title_only: false,
    },
    EffectRule {
        category: EffectCategory::Rope,
        triggers: &["ROPE", "STRING", "CORD"],
        title_only: false,
    },
    EffectRule {
        category: EffectCategory::Silk,
        triggers: &["SILK", "HANDKERCHIEF", "SCARF", "HANKY"],
        title_only: false,
    },
    EffectRule {
        category: EffectCategory::Ring,
        triggers: &["RING"],
        title_only: true,
    },
    EffectRule {
        category: EffectCategory::Paper,
        triggers: &["PAPER", "NEWSPAPER", "ORIGAMI"],
        title_only: false,
    },
    EffectRule {
        category: EffectCategory::Ball,
        triggers: &["BALL", "SPONGE BALL", "BILLIARD BALL"],
        title_only: false,
    },
    EffectRule {
        category: EffectCategory::Stage,
        triggers: &["STAGE", "ILLUSION", "LEVITATION", "PLATFORM"],
        title_only: false,
    },
];

/// One difficulty tier rule
#[derive(Debug, Clone, Copy)]
pub struct DifficultyRule {
    pub difficulty: Difficulty,
    pub triggers: &'static [&'static str],
}

/// Ordered difficulty rules; `Intermediate` applies when none match
///
/// Triggers are word stems: a body word matches when it starts with the trigger.
pub static DIFFICULTY_RULES: &[DifficultyRule] = &[
    DifficultyRule {
        difficulty: Difficulty::Advanced,
        triggers: &[
            "DIFFICULT",
            "ADVANCED",
            "EXPERT",
            "SKILL",
            "PRACTICE",
            "PRACTISE",
            "COMPLEX",
            "PROFESSIONAL",
        ],
    },
    DifficultyRule {
        difficulty: Difficulty::Beginner,
        triggers: &[
            "EASY",
            "EASILY",
            "SIMPLE",
            "SIMPLY",
            "BEGINNER",
            "BASIC",
            "ELEMENTARY",
            "SELF WORKING",
        ],
    },
];

/// Prop label and the phrase that reveals it
pub static PROP_RULES: &[(&str, &str)] = &[
    ("Deck of cards", "DECK"),
    ("Cards", "CARD"),
    ("Coins", "COIN"),
    ("Bills", "BILL"),
    ("Rings", "RING"),
    ("Rope", "ROPE"),
    ("Silk", "SILK"),
    ("Handkerchief", "HANDKERCHIEF"),
    ("Rubber bands", "RUBBER BAND"),
    ("Cups", "CUP"),
    ("Balls", "BALL"),
    ("Wand", "WAND"),
    ("Top hat", "TOP HAT"),
    ("Envelope", "ENVELOPE"),
    ("Glass", "GLASS"),
    ("Box", "BOX"),
    ("Table", "TABLE"),
    ("Chair", "CHAIR"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_specific_categories_precede_generic_ones() {
        let position = |category| {
            EFFECT_RULES
                .iter()
                .position(|r| r.category == category)
                .unwrap()
        };
        assert!(position(EffectCategory::CupsAndBalls) < position(EffectCategory::Ball));
        assert!(position(EffectCategory::LinkingRings) < position(EffectCategory::Ring));
        assert!(position(EffectCategory::Money) < position(EffectCategory::Coin));
    }

    #[test]
    fn test_fallback_is_not_a_rule() {
        assert!(EFFECT_RULES
            .iter()
            .all(|r| r.category != EffectCategory::CloseUp));
    }

    #[test]
    fn test_triggers_are_uppercase() {
        for rule in EFFECT_RULES {
            for trigger in rule.triggers {
                assert_eq!(*trigger, trigger.to_uppercase());
            }
        }
        for rule in DIFFICULTY_RULES {
            for trigger in rule.triggers {
                assert_eq!(*trigger, trigger.to_uppercase());
            }
        }
    }

    #[test]
    fn test_canonical_names_are_seeded() {
        let seeded: Vec<&str> = mta_common::db::DEFAULT_EFFECT_TYPES
            .iter()
            .map(|(name, _)| *name)
            .collect();
        for rule in EFFECT_RULES {
            assert!(seeded.contains(&rule.category.canonical_name()));
        }
        assert!(seeded.contains(&EffectCategory::CloseUp.canonical_name()));
    }
}
