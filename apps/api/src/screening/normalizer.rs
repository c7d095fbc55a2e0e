//! Flattens an hh.ru resume payload into a prompt-ready text block.
//!
//! Sections are emitted in a fixed order (experience, education, skills, salary)
//! and skipped entirely when their source data is empty. Leaf values are never
//! type-checked: strings render as-is, numbers in their JSON form, missing or
//! `null` values as the empty string. A section of the wrong shape is read as
//! absent, and list items of the wrong shape are dropped.

use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Returned when the resume carries nothing to evaluate.
pub const NO_DATA_SENTINEL: &str = "No data available for analysis.";

const PRESENT: &str = "present";

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Resume as returned by the job-board API. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResumeRecord {
    #[serde(default, deserialize_with = "lenient_list")]
    pub experience: Option<Vec<ExperienceEntry>>,
    #[serde(default, deserialize_with = "lenient")]
    pub education: Option<EducationField>,
    #[serde(default, alias = "skills", deserialize_with = "lenient_list")]
    pub skill_set: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "lenient")]
    pub salary: Option<Salary>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExperienceEntry {
    #[serde(default)]
    pub position: Option<Value>,
    #[serde(default)]
    pub company: Option<Value>,
    #[serde(default)]
    pub start: Option<Value>,
    #[serde(default)]
    pub end: Option<Value>,
    #[serde(default)]
    pub description: Option<Value>,
}

/// hh.ru nests education under `primary`; other callers send a bare list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EducationField {
    Entries(Vec<EducationEntry>),
    Levels(EducationLevels),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EducationLevels {
    #[serde(default, deserialize_with = "lenient_list")]
    pub primary: Option<Vec<EducationEntry>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EducationEntry {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub year: Option<Value>,
    #[serde(default)]
    pub result: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Salary {
    #[serde(default)]
    pub amount: Option<Value>,
    #[serde(default)]
    pub currency: Option<Value>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn lenient_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(Some(
            items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
        )),
        _ => Ok(None),
    }
}

impl EducationField {
    pub fn entries(&self) -> &[EducationEntry] {
        match self {
            EducationField::Entries(entries) => entries,
            EducationField::Levels(levels) => levels.primary.as_deref().unwrap_or_default(),
        }
    }
}

/// Renders a resume as plain text for the verdict prompt.
pub fn normalize(resume: &ResumeRecord) -> String {
    let sections: Vec<String> = [
        experience_section(resume),
        education_section(resume),
        skills_section(resume),
        salary_section(resume),
    ]
    .into_iter()
    .flatten()
    .collect();

    if sections.is_empty() {
        return NO_DATA_SENTINEL.to_string();
    }
    sections.join("\n\n")
}

/// Removes every `<tag>`-like fragment and collapses the whitespace left behind.
pub fn strip_markup(text: &str) -> String {
    let without_tags = TAG_RE.replace_all(text, " ");
    WHITESPACE_RE
        .replace_all(&without_tags, " ")
        .trim()
        .to_string()
}

fn experience_section(resume: &ResumeRecord) -> Option<String> {
    let entries = resume.experience.as_deref().filter(|e| !e.is_empty())?;

    let mut lines = vec!["Work experience:".to_string()];
    for entry in entries {
        let end = match text_of(&entry.end) {
            end if end.trim().is_empty() => PRESENT.to_string(),
            end => end,
        };
        lines.push(format!(
            "- {} at {} ({} - {})",
            text_of(&entry.position),
            text_of(&entry.company),
            text_of(&entry.start),
            end
        ));

        let description = strip_markup(&text_of(&entry.description));
        if !description.is_empty() {
            lines.push(format!("  Description: {description}"));
        }
    }
    Some(lines.join("\n"))
}

fn education_section(resume: &ResumeRecord) -> Option<String> {
    let entries = resume
        .education
        .as_ref()
        .map(EducationField::entries)
        .filter(|e| !e.is_empty())?;

    let mut lines = vec!["Education:".to_string()];
    lines.extend(entries.iter().map(|edu| {
        format!(
            "- {} ({}, {})",
            text_of(&edu.name),
            text_of(&edu.year),
            text_of(&edu.result)
        )
    }));
    Some(lines.join("\n"))
}

fn skills_section(resume: &ResumeRecord) -> Option<String> {
    let skills: Vec<String> = resume
        .skill_set
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(value_text)
        .filter(|s| !s.trim().is_empty())
        .collect();

    if skills.is_empty() {
        return None;
    }
    Some(format!("Skills:\n{}", skills.join(", ")))
}

fn salary_section(resume: &ResumeRecord) -> Option<String> {
    let salary = resume.salary.as_ref()?;
    let line = format!("{} {}", text_of(&salary.amount), text_of(&salary.currency));
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    Some(format!("Desired salary:\n{line}"))
}

fn text_of(value: &Option<Value>) -> String {
    value.as_ref().map(value_text).unwrap_or_default()
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
