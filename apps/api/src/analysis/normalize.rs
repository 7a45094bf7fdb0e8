//! Response normalization — turns untrusted model text into complete records.
//!
//! The prompt's schema is a request, not a guarantee. Everything here is
//! infallible: a reply that cannot be parsed becomes the all-default record,
//! and every field is type-checked individually before it reaches a caller.
//!
//! Flow: locate candidate JSON → parse (failure ⇒ `{}`) → build the typed
//! record field-by-field, substituting zero values for absent or mistyped keys.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::analysis::models::{
    AnalysisRecord, BuildRecord, BuildSkill, EducationItem, ExperienceItem, JobRole, ProjectItem,
    SkillAssessment, Suggestion,
};

fn fenced_json_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)```json\s*(.*?)```").expect("valid fenced-json pattern"))
}

fn bare_object_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("valid bare-object pattern"))
}

/// Picks the text most likely to hold the JSON payload.
///
/// Priority: interior of the first ```json fence, then the greedy span from the
/// first `{` to the last `}`, then the whole reply.
pub fn extract_json_candidate(reply: &str) -> &str {
    if let Some(inner) = fenced_json_re().captures(reply).and_then(|c| c.get(1)) {
        return inner.as_str();
    }
    if let Some(span) = bare_object_re().find(reply) {
        return span.as_str();
    }
    reply
}

/// Parses the reply into a JSON object. Any failure, or a non-object payload,
/// yields an empty map.
pub fn parse_reply_object(reply: &str) -> Map<String, Value> {
    match serde_json::from_str::<Value>(extract_json_candidate(reply)) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

/// Normalizes a model reply into an `AnalysisRecord`. Never fails.
pub fn normalize_analysis(reply: &str) -> AnalysisRecord {
    analysis_from_object(&parse_reply_object(reply))
}

/// Normalizes a model reply into a `BuildRecord`. Never fails.
pub fn normalize_build(reply: &str) -> BuildRecord {
    build_from_object(&parse_reply_object(reply))
}

/// Rebuilds an `AnalysisRecord` from an already-decoded JSON value
/// (e.g. a stored document) with the same backfill rules.
pub fn analysis_from_value(value: &Value) -> AnalysisRecord {
    match value.as_object() {
        Some(obj) => analysis_from_object(obj),
        None => AnalysisRecord::default(),
    }
}

fn analysis_from_object(obj: &Map<String, Value>) -> AnalysisRecord {
    AnalysisRecord {
        overall_score: number_field(obj, "overallScore"),
        skills: object_list(obj, "skills", |s| SkillAssessment {
            name: string_field(s, "name"),
            level: string_field(s, "level"),
            category: string_field(s, "category"),
        }),
        experience_level: string_field(obj, "experienceLevel"),
        strengths: string_list(obj, "strengths"),
        weaknesses: string_list(obj, "weaknesses"),
        suggestions: object_list(obj, "suggestions", |s| Suggestion {
            category: string_field(s, "category"),
            priority: string_field(s, "priority"),
            suggestion: string_field(s, "suggestion"),
            impact: string_field(s, "impact"),
        }),
        job_roles: object_list(obj, "job_roles", |r| JobRole {
            title: string_field(r, "title"),
            reasoning: string_field(r, "reasoning"),
        }),
        keyword_density: obj
            .get("keywordDensity")
            .and_then(Value::as_object)
            .map(|density| {
                density
                    .iter()
                    .filter_map(|(k, v)| v.as_f64().map(|n| (k.clone(), n)))
                    .collect()
            })
            .unwrap_or_default(),
        ats_compatibility: number_field(obj, "atsCompatibility"),
    }
}

fn build_from_object(obj: &Map<String, Value>) -> BuildRecord {
    BuildRecord {
        name: string_field(obj, "name"),
        title: string_field(obj, "title"),
        contact: string_field(obj, "contact"),
        summary: string_field(obj, "summary"),
        // Skills are the one list where partial entries are dropped, not backfilled.
        skills: array_field(obj, "skills")
            .iter()
            .filter_map(|s| {
                let name = s.get("name")?.as_str()?;
                let category = s.get("category")?.as_str()?;
                Some(BuildSkill {
                    name: name.to_string(),
                    category: category.to_string(),
                })
            })
            .collect(),
        experience: object_list(obj, "experience", |e| ExperienceItem {
            title: string_field(e, "title"),
            company: string_field(e, "company"),
            location: string_field(e, "location"),
            date: string_field(e, "date"),
            details: string_list(e, "details"),
        }),
        education: object_list(obj, "education", |e| EducationItem {
            degree: string_field(e, "degree"),
            school: string_field(e, "school"),
            date: string_field(e, "date"),
        }),
        projects: object_list(obj, "projects", |p| ProjectItem {
            name: string_field(p, "name"),
            description: string_field(p, "description"),
        }),
        certifications: string_list(obj, "certifications"),
        suggestions: string_list(obj, "suggestions"),
        ats_score: number_field(obj, "atsScore"),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Field coercion helpers
// ────────────────────────────────────────────────────────────────────────────

fn string_field(obj: &Map<String, Value>, key: &str) -> String {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default()
}

fn number_field(obj: &Map<String, Value>, key: &str) -> f64 {
    obj.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

fn array_field<'a>(obj: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    obj.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn string_list(obj: &Map<String, Value>, key: &str) -> Vec<String> {
    array_field(obj, key)
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
}

fn object_list<T>(
    obj: &Map<String, Value>,
    key: &str,
    convert: impl Fn(&Map<String, Value>) -> T,
) -> Vec<T> {
    array_field(obj, key)
        .iter()
        .filter_map(Value::as_object)
        .map(convert)
        .collect()
}
