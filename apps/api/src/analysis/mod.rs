// CV analysis: upload validation, PDF text extraction, prompt rendering,
// the AI service call and validation of its reply.
// All AI calls go through llm_client.

pub mod extractor;
pub mod handlers;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod prompts;

pub use pipeline::{AnalysisError, FailureKind, InvalidUpload, Stage};
