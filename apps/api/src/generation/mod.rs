// CV generation: component selection, focus variants and the renderer document.
// All model calls go through llm_client.

pub mod document;
pub mod focus;
pub mod generator;
pub mod handlers;
pub mod prompts;
pub mod selector;
pub mod variants;
