//! Plain-text views of HTML documents, built on scraper.
//!
//! Text nodes are trimmed and joined one per line with blank lines dropped.

use std::path::Path;

use anyhow::{bail, Context, Result};
use scraper::{Html, Selector};

/// Selectors tried in order when reading the base resume.
const RESUME_ROOTS: [&str; 2] = ["div.container", "body"];

pub fn parse_selector(selector: &str) -> Result<Selector, String> {
    Selector::parse(selector).map_err(|e| format!("invalid CSS selector '{selector}': {e:?}"))
}

fn join_text<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Text of the first element matching `selector`, if any.
pub fn element_text(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .next()
        .map(|element| join_text(element.text()))
}

/// Text of the first match among `roots`, falling back to the whole document.
pub fn html_to_text(html: &str, roots: &[&str]) -> String {
    let document = Html::parse_document(html);
    roots
        .iter()
        .filter_map(|root| parse_selector(root).ok())
        .find_map(|selector| element_text(&document, &selector))
        .unwrap_or_else(|| join_text(document.root_element().text()))
}

pub fn extract_resume_text(html: &str) -> String {
    html_to_text(html, &RESUME_ROOTS)
}

/// Removes markup from an AI-generated fragment and collapses whitespace.
pub fn strip_html_tags(fragment: &str) -> String {
    let parsed = Html::parse_fragment(fragment);
    let text: String = parsed.root_element().text().collect();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Loads the base resume as plain text: `.pdf` through pdf-extract, `.html`/`.htm`
/// through the resume roots above, anything else as UTF-8 text.
pub fn load_base_resume(path: &Path) -> Result<String> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let text = match extension.as_deref() {
        Some("pdf") => pdf_extract::extract_text(path)
            .with_context(|| format!("Failed to extract text from {}", path.display()))?,
        Some("html") | Some("htm") => {
            let html = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            extract_resume_text(&html)
        }
        _ => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
    };

    if text.trim().is_empty() {
        bail!("Base resume {} contains no text", path.display());
    }
    Ok(text.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESUME: &str = r#"<html><head><title>CV</title></head><body>
        <nav>Menu</nav>
        <div class="container">
            <h1>Jane Doe</h1>
            <p>Engineer with <strong>Rust</strong> experience</p>

            <ul><li>Built things</li></ul>
        </div>
    </body></html>"#;

    #[test]
    fn test_resume_text_prefers_container() {
        let text = extract_resume_text(RESUME);
        assert_eq!(
            text,
            "Jane Doe\nEngineer with\nRust\nexperience\nBuilt things"
        );
        assert!(!text.contains("Menu"));
    }

    #[test]
    fn test_resume_text_falls_back_to_body() {
        let text = extract_resume_text("<html><body><p>Only body</p></body></html>");
        assert_eq!(text, "Only body");
    }

    #[test]
    fn test_custom_root_selector() {
        let html = r#"<div id="job-details"><h2>About</h2><p>Build APIs</p></div><footer>x</footer>"#;
        assert_eq!(html_to_text(html, &["div#job-details", "body"]), "About\nBuild APIs");
    }

    #[test]
    fn test_invalid_selector_is_reported() {
        assert!(parse_selector("div[").is_err());
    }

    #[test]
    fn test_strip_html_tags_from_ai_fragment() {
        assert_eq!(
            strip_html_tags("Led <strong>Kafka</strong>  migration &amp; cutover"),
            "Led Kafka migration & cutover"
        );
    }

    #[test]
    fn test_load_base_resume_reads_html_and_plain_text() {
        let dir = tempfile::tempdir().unwrap();
        let html = dir.path().join("resume.html");
        std::fs::write(&html, RESUME).unwrap();
        assert!(load_base_resume(&html).unwrap().starts_with("Jane Doe"));

        let txt = dir.path().join("resume.txt");
        std::fs::write(&txt, "  plain resume  \n").unwrap();
        assert_eq!(load_base_resume(&txt).unwrap(), "plain resume");
    }

    #[test]
    fn test_load_base_resume_rejects_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.html");
        std::fs::write(&path, "<html><body>   </body></html>").unwrap();
        assert!(load_base_resume(&path).is_err());
    }
}
