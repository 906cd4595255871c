//! Bias Scorer — applies a `BiasRuleSet` to a text and produces a `BiasReport`.
//!
//! Pure and total: no I/O, never fails. A text with no hits simply yields
//! empty collections and a zero score.
//!
//! Scoring:
//! 1. Lexical scan — every configured term that occurs as a substring of the
//!    lower-cased text counts once, recorded as `"<term> (<category>)"`.
//!    Matching is not word-boundary aware, so a term embedded in a longer word
//!    is flagged too.
//! 2. Pattern scan — every pattern that matches at least once counts once.
//! 3. score = min((terms × 2 + patterns × 3) / word_count × 100, 1.0), rounded
//!    to 4 decimals. A zero word count scores 0.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::bias::rules::BiasRuleSet;

const GENDERED_WEIGHT: f64 = 2.0;
const PATTERN_WEIGHT: f64 = 3.0;

/// Scores strictly below this are "minor"; at or above are "significant".
const SIGNIFICANT_THRESHOLD: f64 = 0.05;

/// Shown instead of a replacement when the rule set has no alternative.
pub const MANUAL_REWORDING_MARKER: &str = "needs manual rewording (no automatic alternative)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiasTier {
    None,
    Minor,
    Significant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Replacement {
    Alternative(String),
    ManualRewording,
}

impl fmt::Display for Replacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Replacement::Alternative(text) => f.write_str(text),
            Replacement::ManualRewording => f.write_str(MANUAL_REWORDING_MARKER),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub term: String,
    pub replacement: Replacement,
}

/// Result of one analysis. Built once by `analyze` and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiasReport {
    pub gendered_words_found: Vec<String>,
    pub discriminatory_patterns_found: Vec<String>,
    /// Density-normalised penalty in [0, 1]; not a probability.
    pub bias_score: f64,
    /// One entry per unique flagged term, in detection order.
    pub suggestions: Vec<Suggestion>,
    pub tier: BiasTier,
    pub summary: String,
}

pub fn detect_gendered_words(rules: &BiasRuleSet, text: &str) -> Vec<String> {
    let text_lower = text.to_lowercase();
    let mut found = Vec::new();
    for category in rules.categories() {
        for term in &category.terms {
            if text_lower.contains(term.as_str()) {
                found.push(format!("{term} ({})", category.name));
            }
        }
    }
    found
}

pub fn detect_discriminatory_patterns(rules: &BiasRuleSet, text: &str) -> Vec<String> {
    let text_lower = text.to_lowercase();
    rules
        .patterns()
        .iter()
        .filter(|pattern| pattern.is_match(&text_lower))
        .map(|pattern| pattern.source.clone())
        .collect()
}

pub fn compute_bias_score(gendered: &[String], discriminatory: &[String], total_words: usize) -> f64 {
    if total_words == 0 {
        return 0.0;
    }
    let penalty = gendered.len() as f64 * GENDERED_WEIGHT + discriminatory.len() as f64 * PATTERN_WEIGHT;
    let raw = penalty / total_words as f64 * 100.0;
    round4(raw.min(1.0))
}

/// Maps every unique flagged term (category suffix stripped) to its inclusive
/// alternative, or to the manual-rewording marker.
pub fn generate_suggestions(rules: &BiasRuleSet, gendered: &[String]) -> Vec<Suggestion> {
    let mut seen = HashSet::new();
    gendered
        .iter()
        .map(|entry| strip_category(entry))
        .filter(|term| seen.insert(*term))
        .map(|term| Suggestion {
            term: term.to_string(),
            replacement: match rules.alternative_for(term) {
                Some(alt) => Replacement::Alternative(alt.to_string()),
                None => Replacement::ManualRewording,
            },
        })
        .collect()
}

pub fn classify(score: f64, gendered_count: usize) -> (BiasTier, String) {
    if score == 0.0 {
        (
            BiasTier::None,
            "No bias detected. The posting appears inclusive.".to_string(),
        )
    } else if score < SIGNIFICANT_THRESHOLD {
        (
            BiasTier::Minor,
            format!("Minor bias detected ({gendered_count} gendered terms)."),
        )
    } else {
        (
            BiasTier::Significant,
            "Significant bias detected, rewrite recommended.".to_string(),
        )
    }
}

/// Runs the full analysis of one text.
pub fn analyze(rules: &BiasRuleSet, text: &str) -> BiasReport {
    let gendered_words_found = detect_gendered_words(rules, text);
    let discriminatory_patterns_found = detect_discriminatory_patterns(rules, text);

    let total_words = text.split_whitespace().count();
    let bias_score = compute_bias_score(
        &gendered_words_found,
        &discriminatory_patterns_found,
        total_words,
    );

    let suggestions = generate_suggestions(rules, &gendered_words_found);
    let (tier, summary) = classify(bias_score, gendered_words_found.len());

    BiasReport {
        gendered_words_found,
        discriminatory_patterns_found,
        bias_score,
        suggestions,
        tier,
        summary,
    }
}

fn strip_category(entry: &str) -> &str {
    entry.split(" (").next().unwrap_or(entry)
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> BiasRuleSet {
        BiasRuleSet::builtin().unwrap()
    }

    fn entries(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("term{i} (masculine-coded)")).collect()
    }

    #[test]
    fn test_detect_gendered_words_found() {
        let found = detect_gendered_words(&rules(), "Nous cherchons un ninja rockstar ambitieux.");
        assert!(found.iter().any(|w| w.contains("ninja")));
        assert!(found.contains(&"rockstar (masculine-coded)".to_string()));
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn test_detect_gendered_words_clean() {
        let found = detect_gendered_words(&rules(), "Nous cherchons un développeur Python expérimenté.");
        assert!(found.is_empty());
    }

    #[test]
    fn test_detect_gendered_words_is_case_insensitive() {
        let found = detect_gendered_words(&rules(), "NINJA recherché");
        assert_eq!(found, vec!["ninja (masculine-coded)".to_string()]);
    }

    #[test]
    fn test_substring_match_flags_embedded_terms() {
        // "impatient" contains "patient": known false positive of substring matching
        let found = detect_gendered_words(&rules(), "Client impatient");
        assert_eq!(found, vec!["patient (feminine-coded)".to_string()]);
    }

    #[test]
    fn test_detect_discriminatory_age_range() {
        let found = detect_discriminatory_patterns(&rules(), "Candidat entre 25 et 35 ans requis.");
        assert!(!found.is_empty());
    }

    #[test]
    fn test_pattern_counts_once_regardless_of_occurrences() {
        let found = detect_discriminatory_patterns(&rules(), "photo, photo, photo");
        assert_eq!(found, vec!["photos?".to_string()]);
    }

    #[test]
    fn test_compute_bias_score_zero() {
        assert_eq!(compute_bias_score(&[], &[], 100), 0.0);
    }

    #[test]
    fn test_compute_bias_score_zero_words_does_not_divide() {
        assert_eq!(compute_bias_score(&entries(3), &[], 0), 0.0);
    }

    #[test]
    fn test_compute_bias_score_positive() {
        let score = compute_bias_score(&entries(2), &[], 5000);
        // (2*2) / 5000 * 100 = 0.08
        assert!((score - 0.08).abs() < 1e-9, "score was {score}");
    }

    #[test]
    fn test_compute_bias_score_is_capped_at_one() {
        let score = compute_bias_score(&entries(5), &["x".to_string()], 10);
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_compute_bias_score_rounds_to_four_decimals() {
        // 2 / 70000 * 100 = 0.0028571...
        let score = compute_bias_score(&entries(1), &[], 70_000);
        assert_eq!(score, 0.0029);
    }

    #[test]
    fn test_compute_bias_score_monotonic_in_hits() {
        let words = 10_000;
        let patterns = |p: usize| -> Vec<String> { (0..p).map(|i| format!("p{i}")).collect() };
        for g in 0..6 {
            for p in 0..4 {
                let score = compute_bias_score(&entries(g), &patterns(p), words);
                assert!((0.0..=1.0).contains(&score));
                assert!(compute_bias_score(&entries(g + 1), &patterns(p), words) >= score);
                assert!(compute_bias_score(&entries(g), &patterns(p + 1), words) >= score);
            }
        }
    }

    #[test]
    fn test_generate_suggestions_uses_table_and_marker() {
        let gendered = vec![
            "ninja (masculine-coded)".to_string(),
            "empathique (feminine-coded)".to_string(),
        ];
        let suggestions = generate_suggestions(&rules(), &gendered);
        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].term, "ninja");
        assert_eq!(
            suggestions[0].replacement,
            Replacement::Alternative("expert".to_string())
        );
        assert_eq!(suggestions[1].term, "empathique");
        assert_eq!(suggestions[1].replacement, Replacement::ManualRewording);
        assert_eq!(suggestions[1].replacement.to_string(), MANUAL_REWORDING_MARKER);
    }

    #[test]
    fn test_generate_suggestions_deduplicates_terms() {
        let gendered = vec![
            "guru (masculine-coded)".to_string(),
            "guru (feminine-coded)".to_string(),
        ];
        assert_eq!(generate_suggestions(&rules(), &gendered).len(), 1);
    }

    #[test]
    fn test_classify_tiers() {
        assert_eq!(classify(0.0, 0).0, BiasTier::None);
        let (tier, summary) = classify(0.04, 2);
        assert_eq!(tier, BiasTier::Minor);
        assert!(summary.contains("2 gendered terms"));
        assert_eq!(classify(0.05, 1).0, BiasTier::Significant);
        assert_eq!(classify(1.0, 0).0, BiasTier::Significant);
    }

    #[test]
    fn test_analyze_biased_posting() {
        let report = analyze(
            &rules(),
            "Cherchons ninja rockstar ambitieux entre 25 et 35 ans.",
        );
        assert!(report.bias_score > 0.0);
        assert!(report.gendered_words_found.iter().any(|w| w.contains("ninja")));
        assert!(!report.discriminatory_patterns_found.is_empty());
        assert_eq!(report.tier, BiasTier::Significant);
        assert!(!report.summary.is_empty());
    }

    #[test]
    fn test_analyze_clean_posting() {
        let report = analyze(&rules(), "Nous recrutons un développeur Python motivé.");
        assert_eq!(report.bias_score, 0.0);
        assert_eq!(report.tier, BiasTier::None);
        assert!(report.summary.contains("No bias"));
        assert!(report.suggestions.is_empty());
    }

    #[test]
    fn test_analyze_short_experience_requirement_is_clean() {
        let report = analyze(
            &rules(),
            "Nous recrutons un développeur Python motivé avec 3 ans d'expérience.",
        );
        assert_eq!(report.bias_score, 0.0);
    }

    #[test]
    fn test_analyze_empty_text() {
        let report = analyze(&rules(), "");
        assert_eq!(report.bias_score, 0.0);
        assert!(report.gendered_words_found.is_empty());
        assert!(report.discriminatory_patterns_found.is_empty());
        assert_eq!(report.tier, BiasTier::None);
    }

    #[test]
    fn test_report_serializes_replacement_kind() {
        let report = analyze(&rules(), "Ninja recherché");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["suggestions"][0]["term"], "ninja");
        assert_eq!(json["suggestions"][0]["replacement"]["kind"], "alternative");
        assert_eq!(json["suggestions"][0]["replacement"]["text"], "expert");
        assert_eq!(json["tier"], "significant");
    }
}
