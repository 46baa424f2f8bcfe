//! Interviewer API Library Crate
//!
//! This library contains the web-facing side of the interview service:
//! configuration, the PostgreSQL store, API handlers, and routing. The `api`
//! binary is a thin wrapper around this library.

pub mod config;
pub mod db;
pub mod handlers;
pub mod models;
pub mod router;
pub mod state;
