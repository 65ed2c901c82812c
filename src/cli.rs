//! Command-line interface for Deskroute
//!
//! Provides argument parsing and subcommand handling for the Deskroute binary.

use clap::{Parser, Subcommand};

/// Triage, routing, and guardrail pipeline for LLM-backed support replies
#[derive(Parser)]
#[command(name = "deskroute")]
#[command(version)]
#[command(about = "Triage, routing, and guardrail pipeline for LLM-backed support replies")]
#[command(
    long_about = "Deskroute classifies a support request, routes it to a specialized \
    responder agent, reviews the draft reply, and always prints a usable answer even \
    when the model backend misbehaves."
)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate a template configuration file
    Config {
        /// Output file path (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,
    },
}

/// Generate template configuration content
pub fn generate_config_template() -> &'static str {
    r#"# Deskroute Configuration
# =======================
#
# This file configures the model provider, output validation, safe-fallback
# contacts, and observability settings for Deskroute.

# ─────────────────────────────────────────────────────────────────────────────
# MODEL PROVIDER
# ─────────────────────────────────────────────────────────────────────────────
#
# Any OpenAI-compatible chat-completions endpoint works here. The API key is
# never stored in this file; api_key_env names the environment variable that
# carries it.

[provider]
base_url = "https://generativelanguage.googleapis.com/v1beta/openai"
model = "gemini-2.5-flash"
api_key_env = "GEMINI_API_KEY"

# Per-call timeout in seconds (1-300)
request_timeout_seconds = 30

# ─────────────────────────────────────────────────────────────────────────────
# OUTPUT VALIDATION
# ─────────────────────────────────────────────────────────────────────────────

[validation]
# Substrings that indicate extraction returned an internal object's debug
# rendering instead of real text. Stage output containing any of these is
# discarded and recovered (keyword fallback, safe template, or pass-through).
leak_markers = ["RunResult", "CallEnvelope", "object at 0x"]

# Triage labels longer than this many words are treated as unusable
max_label_words = 50

# ─────────────────────────────────────────────────────────────────────────────
# SAFE FALLBACK REPLY
# ─────────────────────────────────────────────────────────────────────────────
#
# Self-service contacts embedded in the reply used when a responder produces
# no usable text.

[fallback]
help_center_url = "https://help.example.com"
support_email = "support@example.com"

# ─────────────────────────────────────────────────────────────────────────────
# OBSERVABILITY
# ─────────────────────────────────────────────────────────────────────────────

[observability]
# Log level: "trace", "debug", "info", "warn", "error"
log_level = "info"
"#
}
