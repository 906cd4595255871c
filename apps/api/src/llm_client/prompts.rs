// Shared prompt fragments and the instruction wrapper understood by Mistral.
// Each service that needs LLM calls defines its own prompts.rs alongside it.

/// Keeps the model anchored on the retrieved extracts.
pub const EXTRACTS_ONLY_INSTRUCTION: &str = "Réponds uniquement à partir des extraits fournis.";

/// Closing instruction appended to every question.
pub const STRUCTURED_ANSWER_INSTRUCTION: &str = "Réponds de manière structurée et précise.";

/// Wraps a system persona and a body in Mistral's `[INST]` instruction block.
pub fn wrap_instruction(system: &str, body: &str) -> String {
    format!("<s>[INST] {system}\n\n{body}\n\n{STRUCTURED_ANSWER_INSTRUCTION} [/INST]")
}
