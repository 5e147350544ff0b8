//! Grading collaborator contract and the LLM-backed implementation.
//!
//! The controller only ever sees the [`Grader`] trait; the shipped
//! implementation judges answers through an OpenAI-compatible chat API and
//! parses a strict JSON verdict out of the response.

use crate::question::Question;
use anyhow::{Context, Result, anyhow};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The verdict for one answered question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grade {
    /// 0 for an incorrect or irrelevant answer, otherwise 1..=10.
    pub score: u8,
    pub is_correct: bool,
    pub correct_answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl Grade {
    /// Enforces the scoring rule: incorrect answers score exactly 0, correct
    /// answers land in 1..=10 regardless of what the grader returned.
    pub fn normalized(mut self) -> Self {
        if self.is_correct {
            self.score = self.score.clamp(1, 10);
        } else {
            self.score = 0;
        }
        self
    }

    /// Fallback verdict recorded when grading is unavailable after a retry.
    pub fn ungraded() -> Self {
        Grade {
            score: 0,
            is_correct: false,
            correct_answer: String::new(),
            feedback: Some(
                "Automatic grading was unavailable for this answer; it was recorded with a score of 0.".to_string(),
            ),
        }
    }
}

/// Defines the contract for any service that can grade an interview answer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Grader: Send + Sync {
    /// Judges `answer` against `question`, returning a raw verdict.
    ///
    /// Callers normalize the verdict before recording it.
    async fn grade(&self, question: &Question, answer: &str) -> Result<Grade>;
}

#[derive(Debug, thiserror::Error)]
pub enum GradeParseError {
    #[error("grader response contained no JSON object")]
    MissingJson,
    #[error("grader response was not a valid verdict: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// An implementation of [`Grader`] backed by an OpenAI-compatible API.
pub struct LlmGrader {
    client: Client<OpenAIConfig>,
    model: String,
}

const GRADING_RUBRIC: &str = "You are grading one answer from an MBA mock interview.\n\
Rules:\n\
- Judge only whether the answer is logical and accurate for the question asked; wording need not match any reference text.\n\
- Ignore spelling and grammar mistakes entirely.\n\
- If the answer is incorrect or irrelevant, the score is exactly 0.\n\
- If the answer is acceptable, score it from 1 (barely acceptable) to 10 (excellent).\n\
Respond with a single JSON object and nothing else:\n\
{\"score\": <0-10>, \"is_correct\": <bool>, \"correct_answer\": \"<concise model answer>\", \"feedback\": \"<one or two sentences on strengths and what to improve>\"}";

impl LlmGrader {
    pub fn new(config: OpenAIConfig, model: String) -> Self {
        Self {
            client: Client::with_config(config),
            model,
        }
    }
}

#[async_trait]
impl Grader for LlmGrader {
    async fn grade(&self, question: &Question, answer: &str) -> Result<Grade> {
        let mut user_prompt = format!(
            "Question ({}): {}\nSource: {}\n",
            question.category,
            question.text,
            question.citation.markdown()
        );
        if question.is_multiple_choice() {
            let options = question
                .options
                .iter()
                .map(|o| format!("{}: {}", o.id, o.text))
                .collect::<Vec<_>>()
                .join("\n");
            user_prompt.push_str(&format!("Options:\n{options}\n"));
        }
        user_prompt.push_str(&format!("Candidate answer: {answer}"));

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(GRADING_RUBRIC)
                    .build()?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(user_prompt)
                    .build()?
                    .into(),
            ])
            .build()?;

        let response = self.client.chat().create(request).await?;
        let content = response
            .choices
            .first()
            .context("No response choice from grader")?
            .message
            .content
            .as_ref()
            .ok_or_else(|| anyhow!("Grader response had no content"))?;

        Ok(parse_grade(content)?)
    }
}

/// Extracts the verdict object from a model response, tolerating code fences
/// and surrounding prose.
fn parse_grade(content: &str) -> Result<Grade, GradeParseError> {
    let start = content.find('{').ok_or(GradeParseError::MissingJson)?;
    let end = content.rfind('}').ok_or(GradeParseError::MissingJson)?;
    if end < start {
        return Err(GradeParseError::MissingJson);
    }
    let grade: Grade = serde_json::from_str(&content[start..=end])?;
    Ok(grade)
}
