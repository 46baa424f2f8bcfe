//! Scripted capability fakes shared by the unit tests.

use crate::capability::{
    AnswerEvaluation, GeneratedQuestion, OverallAssessment, QuestionGeneration,
    QuestionValidation, RawEvaluation, ValidationVerdict,
};
use crate::difficulty::Difficulty;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Pops one scripted response per call and records the call arguments.
/// A `Err(String)` entry becomes a capability failure.
struct Script<T, A> {
    responses: Mutex<VecDeque<Result<T, String>>>,
    calls: Mutex<Vec<A>>,
}

impl<T, A> Script<T, A> {
    fn new(responses: Vec<Result<T, String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn next(&self, args: A) -> Result<T> {
        self.calls.lock().unwrap().push(args);
        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(value)) => Ok(value),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Err(anyhow!("script exhausted")),
        }
    }
}

pub struct ScriptedGenerator {
    script: Script<GeneratedQuestion, (Difficulty, String)>,
}

impl ScriptedGenerator {
    pub fn new(responses: Vec<Result<GeneratedQuestion, String>>) -> Self {
        Self {
            script: Script::new(responses),
        }
    }

    /// Scripts `count` numbered `Medium` questions.
    pub fn numbered(count: usize) -> Self {
        Self::new(
            (1..=count)
                .map(|n| Ok(question(&format!("Question {n}"), Difficulty::Medium)))
                .collect(),
        )
    }

    pub fn calls(&self) -> Vec<(Difficulty, String)> {
        self.script.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl QuestionGeneration for ScriptedGenerator {
    async fn generate(&self, difficulty: Difficulty, tech_stack: &str) -> Result<GeneratedQuestion> {
        self.script.next((difficulty, tech_stack.to_string()))
    }
}

pub struct ScriptedValidator {
    script: Script<ValidationVerdict, (String, String)>,
}

impl ScriptedValidator {
    pub fn new(responses: Vec<Result<ValidationVerdict, String>>) -> Self {
        Self {
            script: Script::new(responses),
        }
    }

    pub fn always_valid(count: usize) -> Self {
        Self::new((0..count).map(|_| Ok(verdict(true, "looks good"))).collect())
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.script.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl QuestionValidation for ScriptedValidator {
    async fn validate(&self, question_text: &str, tech_stack: &str) -> Result<ValidationVerdict> {
        self.script
            .next((question_text.to_string(), tech_stack.to_string()))
    }
}

pub struct ScriptedEvaluator {
    script: Script<RawEvaluation, (String, String, String)>,
}

impl ScriptedEvaluator {
    pub fn new(responses: Vec<Result<RawEvaluation, String>>) -> Self {
        Self {
            script: Script::new(responses),
        }
    }

    pub fn calls(&self) -> Vec<(String, String, String)> {
        self.script.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnswerEvaluation for ScriptedEvaluator {
    async fn evaluate(&self, question: &str, answer: &str, tech_stack: &str) -> Result<RawEvaluation> {
        self.script.next((
            question.to_string(),
            answer.to_string(),
            tech_stack.to_string(),
        ))
    }
}

pub fn question(text: &str, difficulty: Difficulty) -> GeneratedQuestion {
    GeneratedQuestion {
        question_text: text.to_string(),
        difficulty,
    }
}

pub fn verdict(is_valid: bool, reasoning: &str) -> ValidationVerdict {
    ValidationVerdict {
        is_valid,
        reasoning: reasoning.to_string(),
    }
}

pub fn evaluation(correctness: i64, efficiency: i64, clarity: i64) -> RawEvaluation {
    RawEvaluation {
        score_correctness: correctness,
        score_efficiency: efficiency,
        score_clarity: clarity,
        feedback: "Consider the edge cases.".to_string(),
        overall_assessment: OverallAssessment::Good,
    }
}
