// Prompt templates for resume analysis, resume building and the career-coach chat.
// Every builder here is pure: same input, same prompt.

use crate::analysis::models::{AnalysisRecord, PromptMode};
use crate::llm_client::prompts::{quoted_block, DEFAULTS_INSTRUCTION, JSON_ONLY_INSTRUCTION};

/// Analysis prompt header. The resume block and closing instruction are appended.
pub const ANALYZE_PROMPT_HEADER: &str = r#"You are an expert career consultant. Analyze the following resume text and return a JSON object with these exact keys:

{
  "overallScore": number (0-100, ATS score based on resume quality),
  "skills": [ { "name": string, "level": "Beginner|Intermediate|Advanced|Expert", "category": "Technical|Soft|Language|Certification" } ],
  "experienceLevel": "Entry|Mid|Senior|Executive",
  "strengths": [string],
  "weaknesses": [string],
  "suggestions": [
    {
      "category": string,
      "priority": "High|Medium|Low",
      "suggestion": string,
      "impact": string
    }
  ],
  "job_roles": [
    {
      "title": string,
      "reasoning": string
    }
  ],
  "keywordDensity": { [keyword: string]: number },
  "atsCompatibility": number (0-100)
}"#;

/// Build prompt header. The user-details block and closing instruction are appended.
pub const BUILD_PROMPT_HEADER: &str = r#"You are an expert resume writer and career coach. Using the following user-provided details, generate a complete, ATS-optimized resume in professional format.

Return a JSON object with these keys:
{
  "name": string,
  "title": string,
  "contact": string,
  "summary": string,
  "skills": [
    { "name": string, "category": string }
  ],
  "experience": [
    { "title": string, "company": string, "location": string, "date": string, "details": [string] }
  ],
  "education": [
    { "degree": string, "school": string, "date": string }
  ],
  "projects": [
    { "name": string, "description": string }
  ],
  "certifications": [string],
  "suggestions": [string],
  "atsScore": number (0-100, estimate of ATS compatibility)
}

For the "skills" field, return an array of objects with:
  { "name": string, "category": string }
If the user is a Software Engineer, use categories like "Frontend", "Backend", "Cloud/DevOps", "Tools", "Testing", etc. If another profession, use categories relevant to that field.

- Fill in any missing sections with reasonable, generic content and highlight them for the user to edit (e.g., [ADD YOUR EXPERIENCE HERE]).
- Suggest improvements for any weak or missing areas, especially those that would improve ATS score."#;

pub const CHAT_INSTRUCTION: &str =
    "You are an AI Career Coach. Respond conversationally and helpfully to the user's message below.";

/// Builds the structured prompt for `mode`, embedding `resume_text` verbatim.
pub fn build_prompt(mode: PromptMode, resume_text: &str) -> String {
    match mode {
        PromptMode::Analyze => format!(
            "{ANALYZE_PROMPT_HEADER}\n\n{DEFAULTS_INSTRUCTION}\n{JSON_ONLY_INSTRUCTION}\n\n{}\n",
            quoted_block("Resume", resume_text)
        ),
        PromptMode::Build => format!(
            "{BUILD_PROMPT_HEADER}\n\n{}\n{JSON_ONLY_INSTRUCTION}\n",
            quoted_block("User Details", resume_text)
        ),
    }
}

/// Builds the career-coach prompt. A stored analysis, when present, is
/// prepended as compact JSON context.
pub fn build_chat_prompt(analysis: Option<&AnalysisRecord>, message: &str) -> String {
    let context = analysis
        .and_then(|a| serde_json::to_string(a).ok())
        .map(|json| format!("Here is the user's resume analysis: {json}\n"))
        .unwrap_or_default();

    format!("{context}\n{CHAT_INSTRUCTION}\n\nUser: \"{message}\"\n")
}
