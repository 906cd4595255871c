// Bias detection for job postings.
// A fixed lexical/pattern rule set, not a trained classifier.

pub mod handlers;
pub mod report;
pub mod rules;
pub mod scorer;
