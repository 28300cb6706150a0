//! Tailoring data model and the strict parser for AI tailoring responses.
//!
//! The AI is asked for a JSON object with four keys. Parsing is all-or-nothing:
//! a response either becomes a complete `TailoringAttempt` or a `ParseFailure`
//! naming what was wrong. Empty required fields are rejected, never defaulted.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

use crate::llm_client::strip_json_fences;

/// JSON keys every tailoring response must carry.
pub const REQUIRED_KEYS: [&str; 4] = [
    "tailored_summary",
    "relevant_experience_title",
    "tailored_bullets",
    "skill_categories",
];

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Everything the loop knows about one job. Built once, read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TailoringRequest {
    pub base_resume_text: String,
    pub job_description: String,
    pub recommendations: String,
}

/// One skill category with its skills in display order.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillCategory {
    pub name: String,
    pub skills: Vec<String>,
}

/// Category name → skills, in the order the AI emitted the categories.
///
/// Serialized as a JSON object; a plain `HashMap` would lose the ordering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillCategories(pub Vec<SkillCategory>);

/// Parsed output of one AI tailoring call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TailoringAttempt {
    #[serde(rename = "tailored_summary")]
    pub summary: String,
    #[serde(rename = "relevant_experience_title")]
    pub experience_title: String,
    #[serde(rename = "tailored_bullets")]
    pub bullets: Vec<String>,
    pub skill_categories: SkillCategories,
}

/// Why an AI response could not become a `TailoringAttempt`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseFailure {
    #[error("response is not valid JSON: {0}")]
    MalformedJson(String),

    #[error("response JSON is not an object")]
    NotAnObject,

    #[error("response is missing required key '{0}'")]
    MissingKey(&'static str),

    #[error("response has the wrong shape: {0}")]
    WrongShape(String),

    #[error("required field '{0}' is empty")]
    EmptyField(String),
}

// ────────────────────────────────────────────────────────────────────────────
// Parsing
// ────────────────────────────────────────────────────────────────────────────

/// Parses raw AI output into a `TailoringAttempt`.
///
/// Steps: strip code fences → JSON value → object check → required keys →
/// typed deserialization → non-empty validation.
///
/// The typed pass reads the text, not the `Value`: `serde_json::Map` sorts its
/// keys, which would reorder the skill categories.
pub fn parse_attempt(raw: &str) -> Result<TailoringAttempt, ParseFailure> {
    let text = strip_json_fences(raw);
    let value: Value =
        serde_json::from_str(text).map_err(|e| ParseFailure::MalformedJson(e.to_string()))?;

    let object = value.as_object().ok_or(ParseFailure::NotAnObject)?;
    if let Some(missing) = REQUIRED_KEYS.iter().find(|key| !object.contains_key(**key)) {
        return Err(ParseFailure::MissingKey(missing));
    }

    let attempt: TailoringAttempt =
        serde_json::from_str(text).map_err(|e| ParseFailure::WrongShape(e.to_string()))?;
    attempt.validate()?;
    Ok(attempt)
}

impl TailoringAttempt {
    fn validate(&self) -> Result<(), ParseFailure> {
        if self.summary.trim().is_empty() {
            return Err(ParseFailure::EmptyField("tailored_summary".to_string()));
        }
        if self.experience_title.trim().is_empty() {
            return Err(ParseFailure::EmptyField(
                "relevant_experience_title".to_string(),
            ));
        }
        if self.bullets.is_empty() {
            return Err(ParseFailure::EmptyField("tailored_bullets".to_string()));
        }
        if let Some(idx) = self.bullets.iter().position(|b| b.trim().is_empty()) {
            return Err(ParseFailure::EmptyField(format!("tailored_bullets[{idx}]")));
        }
        if self.skill_categories.0.is_empty() {
            return Err(ParseFailure::EmptyField("skill_categories".to_string()));
        }
        for category in &self.skill_categories.0 {
            if category.name.trim().is_empty() {
                return Err(ParseFailure::EmptyField("skill_categories name".to_string()));
            }
            if category.skills.iter().all(|s| s.trim().is_empty()) {
                return Err(ParseFailure::EmptyField(format!(
                    "skill_categories['{}']",
                    category.name
                )));
            }
        }
        Ok(())
    }

    /// Pretty JSON in the same shape the AI produced, for condensation prompts.
    pub fn to_prompt_json(&self) -> String {
        // Serializing plain strings and vectors cannot fail.
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Total words of generated text, logged to show condensation progress.
    pub fn word_count(&self) -> usize {
        let skills = self
            .skill_categories
            .0
            .iter()
            .flat_map(|c| c.skills.iter().map(String::as_str));
        std::iter::once(self.summary.as_str())
            .chain(self.bullets.iter().map(String::as_str))
            .chain(skills)
            .map(|s| s.split_whitespace().count())
            .sum()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Ordered map serde for SkillCategories
// ────────────────────────────────────────────────────────────────────────────

impl Serialize for SkillCategories {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for category in &self.0 {
            map.serialize_entry(&category.name, &category.skills)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SkillCategories {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CategoriesVisitor;

        impl<'de> Visitor<'de> for CategoriesVisitor {
            type Value = SkillCategories;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping category names to lists of skills")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut categories = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, skills)) = access.next_entry::<String, Vec<String>>()? {
                    categories.push(SkillCategory { name, skills });
                }
                Ok(SkillCategories(categories))
            }
        }

        deserializer.deserialize_map(CategoriesVisitor)
    }
}
