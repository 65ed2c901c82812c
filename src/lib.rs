//! Deskroute - triage, routing, and guardrail pipeline for LLM-backed support replies
//!
//! This library routes a free-form support request through a classifier, a
//! specialized responder, and a safety reviewer, and always returns a
//! non-empty plain-text reply no matter how badly the underlying model calls
//! misbehave.

pub mod agent;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod flow;
pub mod telemetry;
