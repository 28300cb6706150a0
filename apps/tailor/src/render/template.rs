//! HTML resume template backed by tera. Used when the base resume is not HTML,
//! so there is no document to inject into.
//!
//! The template sees four variables:
//! - `summary`: string
//! - `experience_title`: string
//! - `bullets`: list of strings
//! - `skill_categories`: list of `{ name, skills }` in the order the AI emitted them
//!
//! AI text carries inline `<strong>` markup. Autoescaping stays on, so templates
//! opt in with `| safe` where that markup should render. The experience title is
//! matched against the base resume as plain text and is always escaped.

use std::path::Path;

use serde::Serialize;
use tera::{Context, Tera};

use crate::render::RenderError;
use crate::tailoring::attempt::TailoringAttempt;

const TEMPLATE_NAME: &str = "resume.html";

/// Turns one tailoring attempt into the HTML that gets converted to PDF.
pub trait ResumeComposer: Send + Sync {
    fn compose(&self, attempt: &TailoringAttempt) -> Result<String, RenderError>;
}

pub struct ResumeTemplate {
    tera: Tera,
}

#[derive(Serialize)]
struct CategoryView<'a> {
    name: &'a str,
    skills: &'a [String],
}

impl ResumeTemplate {
    pub fn from_file(path: &Path) -> Result<Self, RenderError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_source(&source)
    }

    pub fn from_source(source: &str) -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        tera.add_raw_template(TEMPLATE_NAME, source)?;
        Ok(Self { tera })
    }

    pub fn render(&self, attempt: &TailoringAttempt) -> Result<String, RenderError> {
        let categories: Vec<CategoryView<'_>> = attempt
            .skill_categories
            .0
            .iter()
            .map(|c| CategoryView {
                name: &c.name,
                skills: &c.skills,
            })
            .collect();

        let mut context = Context::new();
        context.insert("summary", &attempt.summary);
        context.insert("experience_title", &attempt.experience_title);
        context.insert("bullets", &attempt.bullets);
        context.insert("skill_categories", &categories);

        Ok(self.tera.render(TEMPLATE_NAME, &context)?)
    }
}

impl ResumeComposer for ResumeTemplate {
    fn compose(&self, attempt: &TailoringAttempt) -> Result<String, RenderError> {
        self.render(attempt)
    }
}
