//! Injects tailored content into the user's own HTML resume.
//!
//! The base resume keeps its layout and every section the AI does not touch.
//! Sections are found by their `h2` heading text (case-insensitive):
//! - summary: the next sibling `div` is replaced by one `<p>` holding the summary
//! - experience: among the `h3` headings after the Experience heading, the first
//!   whose text contains the experience title has its next sibling `ul` refilled
//! - skills: the next sibling `div.skills-container` gets one column per category
//!
//! A section that cannot be located is logged and left as it was. AI text is
//! parsed as an HTML fragment so its `<strong>` markup renders; category names
//! and the experience title are treated as plain text.

use std::path::Path;

use ego_tree::{NodeId, NodeRef, Tree};
use scraper::{ElementRef, Html, Node, Selector};
use tracing::{debug, warn};

use crate::render::text::strip_html_tags;
use crate::render::{RenderError, ResumeComposer};
use crate::tailoring::attempt::TailoringAttempt;

const SUMMARY_HEADING: &str = "summary";
const EXPERIENCE_HEADING: &str = "experience";
const SKILLS_HEADING: &str = "skills";
const SKILLS_CONTAINER_CLASS: &str = "skills-container";

/// The base resume HTML, re-parsed for every attempt.
pub struct BaseResumeInjector {
    source: String,
}

impl BaseResumeInjector {
    pub fn from_file(path: &Path) -> Result<Self, RenderError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_source(source)
    }

    /// Fails when the document has none of the summary, experience or skills headings.
    pub fn from_source(source: impl Into<String>) -> Result<Self, RenderError> {
        let source = source.into();
        let document = Html::parse_document(&source);
        let found = [SUMMARY_HEADING, EXPERIENCE_HEADING, SKILLS_HEADING]
            .iter()
            .any(|needle| section_heading(&document, needle).is_some());
        if !found {
            return Err(RenderError::Injection(
                "base resume has no section headings to inject into".to_string(),
            ));
        }
        Ok(Self { source })
    }

    pub fn inject(&self, attempt: &TailoringAttempt) -> Result<String, RenderError> {
        let mut document = Html::parse_document(&self.source);
        // Locate everything before the first edit; detached nodes stay in the arena.
        let summary = summary_target(&document);
        let experience = experience_target(&document, &attempt.experience_title);
        let skills = skills_target(&document);
        let mut replaced = 0;

        match summary {
            Some(id) => {
                replace_children(&mut document, id, &format!("<p>{}</p>", attempt.summary));
                replaced += 1;
            }
            None => warn!("Summary section not found in base resume; left unchanged"),
        }

        match experience {
            Some(id) => {
                let items: String = attempt
                    .bullets
                    .iter()
                    .map(|b| b.trim())
                    .filter(|b| !b.is_empty())
                    .map(|b| format!("<li>{b}</li>"))
                    .collect();
                replace_children(&mut document, id, &items);
                replaced += 1;
            }
            None => warn!(
                title = %attempt.experience_title,
                "Experience entry not found in base resume; left unchanged"
            ),
        }

        match skills {
            Some(id) => {
                replace_children(&mut document, id, &skill_columns(attempt));
                replaced += 1;
            }
            None => warn!("Skills container not found in base resume; left unchanged"),
        }

        if replaced == 0 {
            return Err(RenderError::Injection(
                "no section of the base resume could be updated".to_string(),
            ));
        }
        debug!(replaced, "Tailored content injected into base resume");
        Ok(document.html())
    }
}

impl ResumeComposer for BaseResumeInjector {
    fn compose(&self, attempt: &TailoringAttempt) -> Result<String, RenderError> {
        self.inject(attempt)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Locating sections
// ────────────────────────────────────────────────────────────────────────────

fn select_all<'a>(document: &'a Html, selector: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(selector) {
        Ok(selector) => document.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

fn lower_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().to_lowercase()
}

/// First `h2` whose text contains `needle`.
fn section_heading<'a>(document: &'a Html, needle: &str) -> Option<ElementRef<'a>> {
    select_all(document, "h2")
        .into_iter()
        .find(|h2| lower_text(*h2).contains(needle))
}

/// First following sibling element named `tag`, optionally carrying `class`.
fn next_sibling_element(
    element: ElementRef<'_>,
    tag: &str,
    class: Option<&str>,
) -> Option<NodeId> {
    element
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|sibling| {
            let value = sibling.value();
            value.name() == tag && class.map_or(true, |c| value.classes().any(|have| have == c))
        })
        .map(|sibling| sibling.id())
}

fn summary_target(document: &Html) -> Option<NodeId> {
    let heading = section_heading(document, SUMMARY_HEADING)?;
    next_sibling_element(heading, "div", None)
}

/// The `ul` following the first `h3` after the Experience heading that names `title`.
fn experience_target(document: &Html, title: &str) -> Option<NodeId> {
    let title = strip_html_tags(title).to_lowercase();
    if title.is_empty() {
        return None;
    }
    let heading = section_heading(document, EXPERIENCE_HEADING)?.id();

    let entry = document
        .tree
        .root()
        .descendants()
        .skip_while(|node| node.id() != heading)
        .filter_map(ElementRef::wrap)
        .filter(|element| element.value().name() == "h3")
        .find(|h3| lower_text(*h3).contains(&title))?;
    next_sibling_element(entry, "ul", None)
}

fn skills_target(document: &Html) -> Option<NodeId> {
    let heading = section_heading(document, SKILLS_HEADING)?;
    next_sibling_element(heading, "div", Some(SKILLS_CONTAINER_CLASS))
}

// ────────────────────────────────────────────────────────────────────────────
// Rewriting
// ────────────────────────────────────────────────────────────────────────────

fn skill_columns(attempt: &TailoringAttempt) -> String {
    attempt
        .skill_categories
        .0
        .iter()
        .map(|category| {
            let items: String = category
                .skills
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(|s| format!("<li>{s}</li>"))
                .collect();
            format!(
                "<div class=\"skills-column\"><h4>{}</h4><ul class=\"skills-list\">{items}</ul></div>",
                escape_text(&category.name)
            )
        })
        .collect()
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Replaces the children of `target` with the nodes parsed from `fragment`.
fn replace_children(document: &mut Html, target: NodeId, fragment: &str) {
    let Some(mut node) = document.tree.get_mut(target) else {
        return;
    };
    while let Some(mut child) = node.first_child() {
        child.detach();
    }

    let parsed = Html::parse_fragment(fragment);
    for child in parsed.root_element().children() {
        graft(&mut document.tree, target, child);
    }
}

/// Appends a copy of `source` and its subtree under `parent`.
fn graft(tree: &mut Tree<Node>, parent: NodeId, source: NodeRef<'_, Node>) {
    let copied = match tree.get_mut(parent) {
        Some(mut node) => node.append(source.value().clone()).id(),
        None => return,
    };
    for child in source.children() {
        graft(tree, copied, child);
    }
}
