// Prompt constants for the Report Generator.
// Reuses cross-cutting fragments from llm_client::prompts.

use serde::Deserialize;

use crate::llm_client::prompts::{wrap_instruction, EXTRACTS_ONLY_INSTRUCTION};
use crate::models::DocumentKind;

/// Selects the persona the model answers as.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptMode {
    #[default]
    General,
    Matching,
    Bias,
}

const GENERAL_PERSONA: &str = "Tu es un assistant RH expert.";

const MATCHING_PERSONA: &str = "Tu es un expert RH spécialisé dans l'analyse de CV et d'offres d'emploi. \
    Évalue objectivement l'adéquation entre un candidat et un poste.";

const BIAS_PERSONA: &str = "Tu es un expert en diversité et inclusion dans le recrutement. \
    Repère les biais potentiels d'une offre d'emploi :\n\
    - langage genré (par exemple \"ninja\", \"rockstar\", adjectifs connotés masculins)\n\
    - critères sans rapport avec le poste (âge, apparence)\n\
    - formulations excluantes\n\
    Reste factuel et propose des alternatives inclusives.";

pub const CV_SUMMARY_QUESTION: &str =
    "Résume ce CV : compétences clés, expériences, formation, points forts.";

pub const JOB_SUMMARY_QUESTION: &str =
    "Résume cette offre d'emploi : intitulé du poste, compétences requises, contexte.";

pub const MATCHING_QUESTION: &str = "Analyse l'adéquation entre ce candidat et ce poste.";

/// Four-part layout requested for every matching report.
pub const MATCHING_STRUCTURE: &str = "Structure ta réponse ainsi :\n\
    1. **Score d'adéquation estimé** (sur 10)\n\
    2. **Points forts du candidat** pour ce poste\n\
    3. **Points manquants ou à développer**\n\
    4. **Recommandation finale**";

fn system_prompt(mode: PromptMode) -> String {
    match mode {
        PromptMode::General => format!(
            "{GENERAL_PERSONA}\n{EXTRACTS_ONLY_INSTRUCTION}\n\
             Si l'information n'est pas dans les extraits, dis-le clairement."
        ),
        PromptMode::Matching => format!(
            "{MATCHING_PERSONA}\n{EXTRACTS_ONLY_INSTRUCTION}\n\
             Sois précis, structuré et cite les éléments des documents qui justifient ton analyse."
        ),
        PromptMode::Bias => BIAS_PERSONA.to_string(),
    }
}

/// Builds the instruction sent to the model for `question` over `context`.
pub fn build_prompt(question: &str, context: &str, mode: PromptMode) -> String {
    let body = format!("### Extraits du document :\n{context}\n\n### Question :\n{question}");
    wrap_instruction(&system_prompt(mode), &body)
}

pub fn summary_question(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::Cv => CV_SUMMARY_QUESTION,
        DocumentKind::Job => JOB_SUMMARY_QUESTION,
    }
}

/// Matching prompt: both contexts labelled separately, then the four-part layout.
pub fn build_matching_prompt(cv_context: &str, job_context: &str) -> String {
    let context = format!(
        "### CV DU CANDIDAT :\n{cv_context}\n\n### OFFRE D'EMPLOI :\n{job_context}"
    );
    format!(
        "{}\n\n{MATCHING_STRUCTURE}",
        build_prompt(MATCHING_QUESTION, &context, PromptMode::Matching)
    )
}
