// Shared prompt fragments.
// Each feature that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// Closing instruction for every prompt that expects a structured reply.
pub const JSON_ONLY_INSTRUCTION: &str =
    "Return ONLY the JSON object, no markdown or explanation.";

/// Asks the model to keep every key even when the input lacks the data.
pub const DEFAULTS_INSTRUCTION: &str = "If you do not have data for a field, return a reasonable default (empty array, 0, or empty string).";

/// Wraps user-supplied text in the triple-quote block the prompts use.
///
/// The text is inserted verbatim: a `"""` inside it is not escaped.
pub fn quoted_block(label: &str, text: &str) -> String {
    format!("{label}:\n\"\"\"\n{text}\n\"\"\"")
}
