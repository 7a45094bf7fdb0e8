// Resume analysis: prompt construction, model reply normalization,
// text extraction, per-user persistence and the HTTP handlers tying them together.
// All LLM calls go through llm_client — no direct Gemini calls here.

pub mod extract;
pub mod handlers;
pub mod models;
pub mod normalize;
pub mod prompts;
pub mod store;
