//! All AI/LLM functionality: retrieval context, prompt template and model client

pub mod client;
pub mod context;
pub mod prompt_builder;

// Re-export main types for convenience
pub use client::{LlmClient, estimate_tokens};
pub use context::{AssembledContext, RetrievalContext, build_context};
pub use prompt_builder::{ParsedResponse, SUMMARY_BULLETS, build_prompt, parse_summary_response};
