//! LLM-backed capability clients.
//!
//! `OpenAICompatibleClient` implements generation, validation and evaluation
//! against any OpenAI-compatible chat completions API. Each call renders a
//! prompt template, asks for a JSON object, and deserializes it into the
//! capability's response type; a missing field or an unparseable body is a
//! capability failure. `MockInterviewModel` is a deterministic stand-in for
//! development without an API key.

use crate::capability::{
    AnswerEvaluation, GeneratedQuestion, OverallAssessment, QuestionGeneration,
    QuestionValidation, RawEvaluation, ValidationVerdict,
};
use crate::difficulty::Difficulty;
use anyhow::{Context, Result, anyhow};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, ResponseFormat,
    },
};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

pub const GENERATE_PROMPT: &str = "generate_question";
pub const VALIDATE_PROMPT: &str = "validate_question";
pub const EVALUATE_PROMPT: &str = "evaluate_answer";

/// Prompt templates that must be present for the client to work.
pub const REQUIRED_PROMPTS: [&str; 3] = [GENERATE_PROMPT, VALIDATE_PROMPT, EVALUATE_PROMPT];

/// An implementation of all three capabilities for any OpenAI-compatible API.
pub struct OpenAICompatibleClient {
    client: Client<OpenAIConfig>,
    model: String,
    prompts: HashMap<String, String>,
    timeout: Duration,
}

impl OpenAICompatibleClient {
    /// Creates a new client.
    ///
    /// # Arguments
    ///
    /// * `config` - The configuration for the OpenAI client, including API key and base URL.
    /// * `model` - The model identifier to use for chat completions (e.g., "gpt-4o").
    /// * `prompts` - Template strings keyed by name; must contain every key in
    ///   [`REQUIRED_PROMPTS`].
    /// * `timeout` - Upper bound on a single capability call.
    pub fn new(
        config: OpenAIConfig,
        model: String,
        prompts: HashMap<String, String>,
        timeout: Duration,
    ) -> Result<Self> {
        for key in REQUIRED_PROMPTS {
            if !prompts.contains_key(key) {
                return Err(anyhow!("Missing prompt template: '{}'", key));
            }
        }
        Ok(Self {
            client: Client::with_config(config),
            model,
            prompts,
            timeout,
        })
    }

    /// Renders a template, sends it, and parses the JSON reply into `T`.
    async fn complete_json<T>(&self, prompt_key: &str, vars: &[(&str, &str)]) -> Result<T>
    where
        T: DeserializeOwned + JsonSchema,
    {
        let template = self
            .prompts
            .get(prompt_key)
            .with_context(|| format!("Missing prompt template: '{}'", prompt_key))?;
        let format_instructions = format_instructions::<T>()?;
        let mut vars = vars.to_vec();
        vars.push(("format_instructions", format_instructions.as_str()));
        let prompt = render_prompt(template, &vars);

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .response_format(ResponseFormat::JsonObject)
            .messages(vec![
                ChatCompletionRequestSystemMessageArgs::default()
                    .content("You are an expert technical interviewer. Always reply with a single JSON object.")
                    .build()?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(prompt)
                    .build()?
                    .into(),
            ])
            .build()?;

        let response = tokio::time::timeout(self.timeout, self.client.chat().create(request))
            .await
            .map_err(|_| {
                anyhow!(
                    "'{}' call timed out after {}s",
                    prompt_key,
                    self.timeout.as_secs()
                )
            })?
            .with_context(|| format!("'{}' call failed", prompt_key))?;

        let content = response
            .choices
            .first()
            .context("No response choice from LLM")?
            .message
            .content
            .as_ref()
            .context("No content in LLM response")?;
        debug!(prompt = prompt_key, response = %content, "LLM responded");

        parse_json_reply(content).with_context(|| format!("Malformed '{}' response", prompt_key))
    }
}

#[async_trait]
impl QuestionGeneration for OpenAICompatibleClient {
    async fn generate(&self, difficulty: Difficulty, tech_stack: &str) -> Result<GeneratedQuestion> {
        self.complete_json(
            GENERATE_PROMPT,
            &[("difficulty", difficulty.as_str()), ("tech_stack", tech_stack)],
        )
        .await
    }
}

#[async_trait]
impl QuestionValidation for OpenAICompatibleClient {
    async fn validate(&self, question_text: &str, tech_stack: &str) -> Result<ValidationVerdict> {
        self.complete_json(
            VALIDATE_PROMPT,
            &[("question_text", question_text), ("tech_stack", tech_stack)],
        )
        .await
    }
}

#[async_trait]
impl AnswerEvaluation for OpenAICompatibleClient {
    async fn evaluate(&self, question: &str, answer: &str, tech_stack: &str) -> Result<RawEvaluation> {
        self.complete_json(
            EVALUATE_PROMPT,
            &[
                ("question", question),
                ("answer", answer),
                ("tech_stack", tech_stack),
            ],
        )
        .await
    }
}

/// Replaces each `{name}` placeholder with its value in a single pass over
/// the template. Substituted text is never scanned again, so a candidate's
/// answer containing `{tech_stack}` is sent verbatim. Unknown placeholders
/// are left as they are.
pub fn render_prompt(template: &str, vars: &[(&str, &str)]) -> String {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        rendered.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let substitution = after.find('}').and_then(|close| {
            let name = &after[..close];
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (close, *value))
        });
        match substitution {
            Some((close, value)) => {
                rendered.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                rendered.push('{');
                rest = after;
            }
        }
    }
    rendered.push_str(rest);
    rendered
}

/// The JSON schema of `T`, appended to prompts so the model knows the expected shape.
fn format_instructions<T: JsonSchema>() -> Result<String> {
    let schema = schemars::schema_for!(T);
    Ok(format!(
        "Respond with a JSON object that conforms to this JSON schema:\n{}",
        serde_json::to_string_pretty(&schema)?
    ))
}

/// Parses a model reply, tolerating surrounding prose or markdown code fences.
pub fn parse_json_reply<T: DeserializeOwned>(content: &str) -> Result<T> {
    let trimmed = content.trim();
    if let Ok(value) = serde_json::from_str(trimmed) {
        return Ok(value);
    }

    let start = trimmed.find('{').context("No JSON object in response")?;
    let end = trimmed.rfind('}').context("No JSON object in response")?;
    if end < start {
        return Err(anyhow!("No JSON object in response"));
    }
    Ok(serde_json::from_str(&trimmed[start..=end])?)
}

/// Deterministic capabilities for local development and demos.
///
/// Questions are templated from the tech stack, validation accepts any
/// question mentioning the stack, and answers are scored by length.
pub struct MockInterviewModel;

#[async_trait]
impl QuestionGeneration for MockInterviewModel {
    async fn generate(&self, difficulty: Difficulty, tech_stack: &str) -> Result<GeneratedQuestion> {
        let question_text = match difficulty {
            Difficulty::Easy => format!("What is {} typically used for?", tech_stack),
            Difficulty::Medium => format!(
                "How would you structure error handling in a medium-sized {} service?",
                tech_stack
            ),
            Difficulty::Hard => format!(
                "Design a horizontally scalable job queue in {}. How do you handle retries and ordering?",
                tech_stack
            ),
        };
        Ok(GeneratedQuestion {
            question_text,
            difficulty,
        })
    }
}

#[async_trait]
impl QuestionValidation for MockInterviewModel {
    async fn validate(&self, question_text: &str, tech_stack: &str) -> Result<ValidationVerdict> {
        let relevant = question_text
            .to_lowercase()
            .contains(&tech_stack.to_lowercase());
        Ok(ValidationVerdict {
            is_valid: relevant,
            reasoning: if relevant {
                "Clear and relevant to the tech stack.".to_string()
            } else {
                format!("Not relevant to {}.", tech_stack)
            },
        })
    }
}

#[async_trait]
impl AnswerEvaluation for MockInterviewModel {
    async fn evaluate(&self, _question: &str, answer: &str, _tech_stack: &str) -> Result<RawEvaluation> {
        let words = answer.split_whitespace().count() as i64;
        let score = (words / 10).min(5);
        let overall_assessment = match score {
            5 => OverallAssessment::Excellent,
            4 => OverallAssessment::Good,
            2 | 3 => OverallAssessment::Average,
            _ => OverallAssessment::NeedsImprovement,
        };
        Ok(RawEvaluation {
            score_correctness: score,
            score_efficiency: score,
            score_clarity: score,
            feedback: format!("Your answer used {} words; elaborate with concrete examples.", words),
            overall_assessment,
        })
    }
}
