use crate::bias::scorer::BiasReport;

const RULE: &str = "==================================================";

/// Renders a report as a fixed-layout text block: header, score, summary,
/// then each non-empty section.
pub fn format_report(report: &BiasReport) -> String {
    let mut lines = vec![
        RULE.to_string(),
        "BIAS ANALYSIS REPORT".to_string(),
        RULE.to_string(),
        format!("\nBias score: {}", report.bias_score),
        format!("Summary: {}", report.summary),
    ];

    if !report.gendered_words_found.is_empty() {
        lines.push("\nGendered terms detected:".to_string());
        lines.extend(report.gendered_words_found.iter().map(|w| format!("  - {w}")));
    }

    if !report.discriminatory_patterns_found.is_empty() {
        lines.push("\nDiscriminatory patterns:".to_string());
        lines.extend(
            report
                .discriminatory_patterns_found
                .iter()
                .map(|p| format!("  - {p}")),
        );
    }

    if !report.suggestions.is_empty() {
        lines.push("\nSuggested replacements:".to_string());
        lines.extend(
            report
                .suggestions
                .iter()
                .map(|s| format!("  - '{}' -> '{}'", s.term, s.replacement)),
        );
    }

    lines.push(RULE.to_string());
    lines.join("\n")
}
