//! Adaptive mock-interview pipeline.
//!
//! Generates interview questions through an external language model, screens
//! each candidate with a second validation call, scores answers with a third
//! evaluation call, and adapts the next question's difficulty to the latest
//! score.

pub mod capability;
pub mod difficulty;
pub mod error;
pub mod evaluator;
pub mod generator;
pub mod llm_client;
pub mod orchestrator;
pub mod scoring;
pub mod session;
pub mod store;
pub mod validator;

#[cfg(test)]
mod test_support;

pub use error::{InterviewError, Result};
pub use orchestrator::InterviewOrchestrator;
