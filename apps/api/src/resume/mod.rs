// Resume analysis: document text extraction and LLM-derived search parameters.

pub mod extract;
pub mod handlers;
pub mod prompts;
pub mod service;

pub use service::{ResumeAnalysisService, ResumeSearchParams};
