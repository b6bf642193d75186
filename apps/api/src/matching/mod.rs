// Semantic matching: retrieval, category scoring, missing skills, suggestions, caching.
// All model calls go through llm_client and all embeddings through the embedding module.

pub mod cache;
pub mod engine;
pub mod handlers;
pub mod jd_parser;
pub mod missing_skills;
pub mod prompts;
pub mod retriever;
pub mod scoring;
pub mod suggestions;
