//! Engine tuning parameters
//!
//! Read from the `[segmenter]`, `[classifier]`, `[filter]` and `[extraction]`
//! sections of the module TOML file. Every field has a compiled default, so an
//! absent file or section is fine. Similarity weights and relationship
//! thresholds are constants in their services, not configuration.

use mta_common::config::{load_toml_or_default, LoggingConfig};
use mta_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Module name used for the config file (`mta-engine.toml`) and root folder resolution
pub const MODULE_NAME: &str = "mta-engine";

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub segmenter: SegmenterConfig,

    #[serde(default)]
    pub classifier: ClassifierConfig,

    #[serde(default)]
    pub filter: FilterConfig,

    #[serde(default)]
    pub extraction: ExtractionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Passage segmentation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmenterConfig {
    /// Passages with fewer body characters are dropped (default: 200)
    #[serde(default = "default_min_content_chars")]
    pub min_content_chars: usize,

    /// Front/back-matter headings never treated as tricks (matched case-insensitively)
    #[serde(default = "default_skip_titles")]
    pub skip_titles: Vec<String>,
}

/// Classification parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Body characters scanned together with the title for effect keywords (default: 500)
    #[serde(default = "default_lead_chars")]
    pub lead_chars: usize,

    /// Body length that earns the full length component of confidence (default: 1000)
    #[serde(default = "default_target_length")]
    pub target_length: usize,
}

/// Quality filter parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Minimum description length in characters (default: 100)
    #[serde(default = "default_min_description_chars")]
    pub min_description_chars: usize,

    /// Persisted descriptions are capped at this many characters (default: 1000)
    #[serde(default = "default_description_cap")]
    pub description_cap: usize,

    /// Persisted method sections are capped at this many characters (default: 500)
    #[serde(default = "default_method_cap")]
    pub method_cap: usize,
}

/// Whole-book extraction parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Texts shorter than this produce no tricks and no writes (default: 200)
    #[serde(default = "default_min_text_chars")]
    pub min_text_chars: usize,

    /// Longest total wait when retrying a write on a locked database (default: 5000 ms)
    #[serde(default = "default_max_lock_wait_ms")]
    pub max_lock_wait_ms: u64,
}

fn default_min_content_chars() -> usize {
    200
}

fn default_skip_titles() -> Vec<String> {
    [
        "BACKGROUND TO A LEGEND",
        "THE VERNON TOUCH",
        "FOREWORD",
        "PREFACE",
        "INTRODUCTION",
        "ACKNOWLEDGMENTS",
        "CONTENTS",
        "INDEX",
        "BIBLIOGRAPHY",
        "APPENDIX",
        "ABOUT THE AUTHOR",
        "TIPS ON KNOTS",
        "POT POURRI",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_lead_chars() -> usize {
    500
}

fn default_target_length() -> usize {
    1000
}

fn default_min_description_chars() -> usize {
    100
}

fn default_description_cap() -> usize {
    1000
}

fn default_method_cap() -> usize {
    500
}

fn default_min_text_chars() -> usize {
    200
}

fn default_max_lock_wait_ms() -> u64 {
    5000
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            min_content_chars: default_min_content_chars(),
            skip_titles: default_skip_titles(),
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            lead_chars: default_lead_chars(),
            target_length: default_target_length(),
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_description_chars: default_min_description_chars(),
            description_cap: default_description_cap(),
            method_cap: default_method_cap(),
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_text_chars: default_min_text_chars(),
            max_lock_wait_ms: default_max_lock_wait_ms(),
        }
    }
}

impl EngineConfig {
    /// Load from a TOML file (defaults when `path` is `None` or missing), then validate
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config: EngineConfig = load_toml_or_default(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the pipeline meaningless
    pub fn validate(&self) -> Result<()> {
        if self.classifier.target_length == 0 {
            return Err(Error::Config(
                "classifier.target_length must be greater than 0".to_string(),
            ));
        }
        if self.filter.description_cap == 0 {
            return Err(Error::Config(
                "filter.description_cap must be greater than 0".to_string(),
            ));
        }
        if self.filter.method_cap == 0 {
            return Err(Error::Config("filter.method_cap must be greater than 0".to_string()));
        }
        if self.filter.min_description_chars > self.filter.description_cap {
            return Err(Error::Config(format!(
                "filter.min_description_chars ({}) exceeds filter.description_cap ({})",
                self.filter.min_description_chars, self.filter.description_cap
            )));
        }
        Ok(())
    }
}
