// ATS scanner: keyword extraction, matching, weighted scoring and tip synthesis.
// Scoring is pure and synchronous; only tip phrasing reaches the LLM, through
// llm_client and behind the TipPhraser trait.

pub mod engine;
pub mod extraction;
pub mod handlers;
pub mod matching;
pub mod prompts;
pub mod scoring;
pub mod sections;
pub mod text;
pub mod tips;
pub mod vocabulary;
