//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds the interview
//! orchestrator shared by all handlers.

use interviewer_core::InterviewOrchestrator;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: InterviewOrchestrator,
}
