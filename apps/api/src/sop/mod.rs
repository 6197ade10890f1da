// Statement of Purpose pipeline.
// Implements: profile validation, CV extraction, prompt composition, the generation
// workflow, session results and export.
// All model calls go through llm_client; nothing here talks HTTP to the model directly.

pub mod composer;
pub mod export;
pub mod extractor;
pub mod handlers;
pub mod profile;
pub mod prompts;
pub mod session;
pub mod workflow;
