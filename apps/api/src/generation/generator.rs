//! Report Generator — turns retrieved context into summaries and matching
//! narratives through the text-generation service.
//!
//! Stateless apart from the external call. Failures come back as
//! `ServiceUnreachable`, `ServiceTimeout` or `GenerationFailed` and are never
//! retried here; retry policy belongs to the caller.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::errors::AppError;
use crate::generation::prompts::{
    build_matching_prompt, build_prompt, summary_question, PromptMode,
};
use crate::llm_client::{GenerationOptions, LlmClient};
use crate::models::DocumentKind;

/// Request/response text generation: model id, prompt and sampling options in,
/// one completion out.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn complete(
        &self,
        model: &str,
        prompt: &str,
        options: GenerationOptions,
    ) -> Result<String, AppError>;
}

#[async_trait]
impl Generator for LlmClient {
    async fn complete(
        &self,
        model: &str,
        prompt: &str,
        options: GenerationOptions,
    ) -> Result<String, AppError> {
        Ok(self.generate(model, prompt, options).await?)
    }
}

pub struct ReportGenerator {
    generator: Arc<dyn Generator>,
    model: String,
    temperature: f32,
    top_p: f32,
}

impl ReportGenerator {
    pub fn new(
        generator: Arc<dyn Generator>,
        model: impl Into<String>,
        temperature: f32,
        top_p: f32,
    ) -> Self {
        Self {
            generator,
            model: model.into(),
            temperature,
            top_p,
        }
    }

    /// Answers `question` from `context` in the persona of `mode`.
    pub async fn answer(
        &self,
        question: &str,
        context: &str,
        mode: PromptMode,
    ) -> Result<String, AppError> {
        let prompt = build_prompt(question, context, mode);
        let options = GenerationOptions {
            temperature: self.temperature,
            top_p: Some(self.top_p),
        };
        self.call(&prompt, options).await
    }

    /// Résumé or posting summary of an already formatted context block.
    pub async fn summarize(&self, context: &str, kind: DocumentKind) -> Result<String, AppError> {
        info!("Generating {kind} summary");
        self.answer(summary_question(kind), context, PromptMode::General)
            .await
    }

    /// Four-part matching analysis: score out of 10, strengths, gaps, recommendation.
    pub async fn generate_matching_report(
        &self,
        cv_context: &str,
        job_context: &str,
    ) -> Result<String, AppError> {
        info!("Generating matching report");
        let prompt = build_matching_prompt(cv_context, job_context);
        let options = GenerationOptions {
            temperature: self.temperature,
            top_p: None,
        };
        self.call(&prompt, options).await
    }

    async fn call(&self, prompt: &str, options: GenerationOptions) -> Result<String, AppError> {
        let text = self.generator.complete(&self.model, prompt, options).await?;
        Ok(text.trim().to_string())
    }
}
