//! Pattern matcher: applies extraction rules to a block of text.
//!
//! Regex rules are searched case-insensitively over the whole text. Literal
//! rules act as markers: when the marker occurs, every code token that starts
//! within [`CONTEXT_WINDOW`] characters after it, or ends within the same
//! distance before it, is captured. A code token is a maximal run of
//! uppercase ASCII letters and digits, 4 to 15 characters long. The window
//! never crosses a line break.

use std::collections::BTreeSet;

use regex::{Regex, RegexBuilder};
use serde::Serialize;

use crate::error::AppError;
use crate::rules::ExtractionRule;

/// Maximum number of characters between a literal marker and a code token.
pub const CONTEXT_WINDOW: usize = 50;

const MIN_TOKEN_LEN: usize = 4;
const MAX_TOKEN_LEN: usize = 15;

/// A rule that could not be compiled and was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleFailure {
    pub rule: String,
    pub error: String,
}

enum CompiledRule {
    Regex(Regex),
    Literal(Regex),
}

/// A set of extraction rules compiled once and applied to many pages.
pub struct CodeMatcher {
    rules: Vec<CompiledRule>,
    failures: Vec<RuleFailure>,
}

impl CodeMatcher {
    /// Compile `rules`. Rules that fail to compile are logged and skipped;
    /// the remaining rules are still applied.
    pub fn new(rules: &[ExtractionRule]) -> Self {
        let mut compiled = Vec::with_capacity(rules.len());
        let mut failures = Vec::new();

        for rule in rules {
            match compile(rule) {
                Ok(c) => compiled.push(c),
                Err(e) => {
                    tracing::warn!(rule = %rule, error = %e, "Skipping extraction rule");
                    failures.push(RuleFailure {
                        rule: rule.to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }

        Self {
            rules: compiled,
            failures,
        }
    }

    /// Rules that were skipped because they failed to compile.
    pub fn failures(&self) -> &[RuleFailure] {
        &self.failures
    }

    /// Extract every candidate code from `text`.
    pub fn extract(&self, text: &str) -> BTreeSet<String> {
        let mut codes = BTreeSet::new();
        for rule in &self.rules {
            match rule {
                CompiledRule::Regex(re) => collect_regex(re, text, &mut codes),
                CompiledRule::Literal(marker) => collect_context(marker, text, &mut codes),
            }
        }
        codes
    }
}

/// Compile `rules` and extract codes from `text` in one go.
pub fn extract_codes(text: &str, rules: &[ExtractionRule]) -> BTreeSet<String> {
    CodeMatcher::new(rules).extract(text)
}

fn compile(rule: &ExtractionRule) -> Result<CompiledRule, AppError> {
    let invalid = |message: String| AppError::InvalidRule {
        rule: rule.to_string(),
        message,
    };

    match rule {
        ExtractionRule::Regex(pattern) => RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map(CompiledRule::Regex)
            .map_err(|e| invalid(e.to_string())),
        ExtractionRule::Literal(text) => {
            if text.is_empty() {
                return Err(invalid("literal is empty".into()));
            }
            RegexBuilder::new(&regex::escape(text))
                .case_insensitive(true)
                .build()
                .map(CompiledRule::Literal)
                .map_err(|e| invalid(e.to_string()))
        }
    }
}

/// Whole matches for patterns without groups, otherwise every participating group.
fn collect_regex(re: &Regex, text: &str, codes: &mut BTreeSet<String>) {
    for caps in re.captures_iter(text) {
        let groups: Vec<_> = if caps.len() > 1 {
            caps.iter().skip(1).flatten().collect()
        } else {
            caps.get(0).into_iter().collect()
        };
        for m in groups {
            if !m.as_str().is_empty() {
                codes.insert(m.as_str().to_string());
            }
        }
    }
}

fn collect_context(marker: &Regex, text: &str, codes: &mut BTreeSet<String>) {
    // Non-overlapping matches, so sorted by both start and end.
    let markers: Vec<(usize, usize)> = marker
        .find_iter(text)
        .map(|m| (m.start(), m.end()))
        .collect();
    if markers.is_empty() {
        return;
    }

    // Only the closest marker on each side can be within the window.
    for (start, end) in code_tokens(text) {
        let before = markers.partition_point(|&(_, m_end)| m_end <= start);
        let after = markers.partition_point(|&(m_start, _)| m_start < end);

        let near = before
            .checked_sub(1)
            .is_some_and(|i| within_window(&text[markers[i].1..start]))
            || markers
                .get(after)
                .is_some_and(|&(m_start, _)| within_window(&text[end..m_start]));
        if near {
            codes.insert(text[start..end].to_string());
        }
    }
}

fn within_window(gap: &str) -> bool {
    // A char is at most 4 bytes in UTF-8.
    gap.len() <= CONTEXT_WINDOW * 4
        && !gap.contains('\n')
        && gap.chars().count() <= CONTEXT_WINDOW
}

/// Byte ranges of maximal `[A-Z0-9]` runs with an acceptable length.
fn code_tokens(text: &str) -> Vec<(usize, usize)> {
    let mut tokens = Vec::new();
    let mut run_start = None;

    for (i, c) in text.char_indices() {
        let in_token = c.is_ascii_uppercase() || c.is_ascii_digit();
        match (in_token, run_start) {
            (true, None) => run_start = Some(i),
            (false, Some(s)) => {
                tokens.push((s, i));
                run_start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = run_start {
        tokens.push((s, text.len()));
    }

    // Runs are ASCII, so byte length equals character length.
    tokens.retain(|&(s, e)| (MIN_TOKEN_LEN..=MAX_TOKEN_LEN).contains(&(e - s)));
    tokens
}
