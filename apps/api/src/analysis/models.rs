use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, Serializer};

/// Which prompt/record pair a request runs through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptMode {
    /// Score and critique an existing resume. Produces an `AnalysisRecord`.
    Analyze,
    /// Synthesize a resume from free-form details. Produces a `BuildRecord`.
    Build,
}

impl PromptMode {
    /// `"build"` selects Build; anything else, including no mode, is Analyze.
    pub fn from_request(mode: Option<&str>) -> Self {
        match mode {
            Some("build") => PromptMode::Build,
            _ => PromptMode::Analyze,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// AnalysisRecord
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillAssessment {
    pub name: String,
    /// Beginner | Intermediate | Advanced | Expert
    pub level: String,
    /// Technical | Soft | Language | Certification
    pub category: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub category: String,
    /// High | Medium | Low
    pub priority: String,
    pub suggestion: String,
    pub impact: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobRole {
    pub title: String,
    pub reasoning: String,
}

/// Structured resume analysis. Every field is always present after normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    #[serde(serialize_with = "serialize_number")]
    pub overall_score: f64, // 0 – 100
    pub skills: Vec<SkillAssessment>,
    /// Entry | Mid | Senior | Executive, but not restricted: the model's string is kept.
    pub experience_level: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub suggestions: Vec<Suggestion>,
    #[serde(rename = "job_roles")]
    pub job_roles: Vec<JobRole>,
    #[serde(serialize_with = "serialize_number_map")]
    pub keyword_density: BTreeMap<String, f64>,
    #[serde(serialize_with = "serialize_number")]
    pub ats_compatibility: f64, // 0 – 100
}

// ────────────────────────────────────────────────────────────────────────────
// BuildRecord
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildSkill {
    pub name: String,
    pub category: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceItem {
    pub title: String,
    pub company: String,
    pub location: String,
    pub date: String,
    pub details: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationItem {
    pub degree: String,
    pub school: String,
    pub date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectItem {
    pub name: String,
    pub description: String,
}

/// A generated resume. Sections the user did not supply carry bracketed placeholders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildRecord {
    pub name: String,
    pub title: String,
    pub contact: String,
    pub summary: String,
    pub skills: Vec<BuildSkill>,
    pub experience: Vec<ExperienceItem>,
    pub education: Vec<EducationItem>,
    pub projects: Vec<ProjectItem>,
    pub certifications: Vec<String>,
    pub suggestions: Vec<String>,
    #[serde(serialize_with = "serialize_number")]
    pub ats_score: f64,
}

// ────────────────────────────────────────────────────────────────────────────
// Number serialization
// ────────────────────────────────────────────────────────────────────────────

/// Largest magnitude at which every integer is exactly representable as `f64`.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0; // 2^53

/// Whole numbers go out as integers (`77`, not `77.0`) so a record parsed
/// from a model reply serializes back to the same text.
fn serialize_number<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() <= MAX_EXACT_INTEGER {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

struct Number(f64);

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_number(&self.0, serializer)
    }
}

fn serialize_number_map<S: Serializer>(
    map: &BTreeMap<String, f64>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(map.iter().map(|(k, v)| (k, Number(*v))))
}
