//! Bias rule set — the fixed lexical categories, discriminatory patterns and
//! inclusive alternatives the scorer applies.
//!
//! Rules are plain data (JSON). The French rule set ships inside the binary;
//! `BIAS_RULES_PATH` can point to a replacement file. Once loaded the set is
//! immutable and shared behind an `Arc`.

use std::collections::HashMap;
use std::path::Path;

use regex::Regex;
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;

const BUILTIN_RULES: &str = include_str!("../../rules/bias_rules_fr.json");

/// On-disk shape of a rule set.
#[derive(Debug, Deserialize)]
struct RuleSetDefinition {
    categories: Vec<CategoryDefinition>,
    patterns: Vec<String>,
    #[serde(default)]
    alternatives: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct CategoryDefinition {
    name: String,
    terms: Vec<String>,
}

/// A named family of coded terms, e.g. "masculine-coded".
#[derive(Debug, Clone)]
pub struct LexicalCategory {
    pub name: String,
    /// Lower-cased at load time.
    pub terms: Vec<String>,
}

/// A compiled discriminatory pattern, reported by its source text.
#[derive(Debug, Clone)]
pub struct DiscriminatoryPattern {
    pub source: String,
    regex: Regex,
}

impl DiscriminatoryPattern {
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

#[derive(Debug, Clone)]
pub struct BiasRuleSet {
    categories: Vec<LexicalCategory>,
    patterns: Vec<DiscriminatoryPattern>,
    alternatives: HashMap<String, String>,
}

impl BiasRuleSet {
    /// The French rule set compiled into the binary.
    pub fn builtin() -> Result<Self, AppError> {
        Self::from_json(BUILTIN_RULES)
    }

    /// Loads the rule set from `path`, or the built-in one when no path is given.
    pub async fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let Some(path) = path else {
            return Self::builtin();
        };

        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::NotFound(format!("bias rule file not found: {}", path.display()))
            } else {
                AppError::Internal(anyhow::anyhow!(
                    "failed to read bias rule file {}: {e}",
                    path.display()
                ))
            }
        })?;
        let rules = Self::from_json(&raw)?;
        info!("Loaded bias rules from {}", path.display());
        Ok(rules)
    }

    pub fn from_json(raw: &str) -> Result<Self, AppError> {
        let definition: RuleSetDefinition = serde_json::from_str(raw)
            .map_err(|e| AppError::InvalidInput(format!("malformed bias rule set: {e}")))?;

        let categories = definition
            .categories
            .into_iter()
            .map(|c| LexicalCategory {
                name: c.name,
                terms: c.terms.iter().map(|t| t.to_lowercase()).collect(),
            })
            .collect();

        let patterns = definition
            .patterns
            .into_iter()
            .map(|source| {
                Regex::new(&source)
                    .map(|regex| DiscriminatoryPattern { source: source.clone(), regex })
                    .map_err(|e| {
                        AppError::InvalidInput(format!("invalid bias pattern {source:?}: {e}"))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let alternatives = definition
            .alternatives
            .into_iter()
            .map(|(term, alt)| (term.to_lowercase(), alt))
            .collect();

        Ok(Self {
            categories,
            patterns,
            alternatives,
        })
    }

    pub fn categories(&self) -> &[LexicalCategory] {
        &self.categories
    }

    pub fn patterns(&self) -> &[DiscriminatoryPattern] {
        &self.patterns
    }

    pub fn alternative_for(&self, term: &str) -> Option<&str> {
        self.alternatives.get(term).map(String::as_str)
    }
}
