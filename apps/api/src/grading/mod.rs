// Handoff grading: similarity check, prompt construction, tolerant parsing of
// the model's answer, and rubric aggregation.
// All model calls go through llm_client — no provider calls here.

pub mod handlers;
pub mod parser;
pub mod pipeline;
pub mod prompts;
pub mod rubric;
pub mod similarity;
pub mod store;
