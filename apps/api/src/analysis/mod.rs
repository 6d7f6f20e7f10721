// Job analysis: cache-then-validate orchestration over the LLM client.

pub mod handlers;
pub mod service;

pub use service::JobAnalysisService;
