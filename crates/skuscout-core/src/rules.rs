//! Extraction rules used to pull candidate codes out of page text.
//!
//! Rules have a textual form so they can be passed on the command line:
//! `regex:<pattern>` is a regular expression, anything else is a literal
//! marker (e.g. `SKU`, `Part Number`) whose surrounding context is searched
//! for code tokens.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

const REGEX_PREFIX: &str = "regex:";

/// A single extraction rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ExtractionRule {
    /// Case-insensitive regular expression applied to the whole text.
    Regex(String),
    /// Literal marker; codes are captured from the text around it.
    Literal(String),
}

impl ExtractionRule {
    pub fn regex(pattern: impl Into<String>) -> Self {
        ExtractionRule::Regex(pattern.into())
    }

    pub fn literal(text: impl Into<String>) -> Self {
        ExtractionRule::Literal(text.into())
    }

    /// The pattern or literal text, without the `regex:` prefix.
    pub fn value(&self) -> &str {
        match self {
            ExtractionRule::Regex(p) | ExtractionRule::Literal(p) => p,
        }
    }
}

impl fmt::Display for ExtractionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionRule::Regex(p) => write!(f, "{REGEX_PREFIX}{p}"),
            ExtractionRule::Literal(t) => write!(f, "{t}"),
        }
    }
}

impl FromStr for ExtractionRule {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let rule = match s.strip_prefix(REGEX_PREFIX) {
            Some(pattern) => ExtractionRule::Regex(pattern.to_string()),
            None => ExtractionRule::Literal(s.to_string()),
        };
        if rule.value().is_empty() {
            return Err(AppError::InvalidRule {
                rule: s.to_string(),
                message: "rule is empty".into(),
            });
        }
        Ok(rule)
    }
}

/// The built-in SKU and barcode shapes.
pub fn default_rules() -> Vec<ExtractionRule> {
    vec![
        ExtractionRule::regex("[0-9]{2}-[0-9]{2}"),
        ExtractionRule::regex("[0-9]{3}-[0-9]{2}"),
        ExtractionRule::regex("[0-9]{2}-[0-9]{3}"),
        ExtractionRule::regex("[0-9]{3}-[0-9]{3}"),
        // 13-digit barcode with a fixed manufacturer prefix
        ExtractionRule::regex("501192191[0-9]{4}"),
    ]
}
