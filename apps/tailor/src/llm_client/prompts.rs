// Shared prompt fragments. Each module that talks to the LLM keeps its own prompts.rs;
// this file only holds the cross-cutting pieces.

/// Appended to every system prompt that expects a JSON object back.
pub const JSON_ONLY_INSTRUCTION: &str = "\
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Applied to all resume-writing prompts.
pub const HONESTY_INSTRUCTION: &str = "\
    CRITICAL: Only use experience, skills and results that appear in the base resume. \
    Rephrase and reorder freely, but never invent employers, titles, metrics or tools.";

/// Fills `{name}` placeholders in a prompt template in a single pass.
///
/// Values are inserted verbatim and never re-scanned, so a job description that
/// happens to contain `{base_resume}` cannot pull another input into the prompt.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let extra: usize = values.iter().map(|(_, v)| v.len()).sum();
    let mut out = String::with_capacity(template.len() + extra);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        let matched = values.iter().find(|(name, _)| {
            tail.len() > name.len() + 1
                && tail[1..].starts_with(name)
                && tail[1 + name.len()..].starts_with('}')
        });
        match matched {
            Some((name, value)) => {
                out.push_str(value);
                rest = &tail[name.len() + 2..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_template_replaces_every_placeholder() {
        let filled = fill_template("a={a}, b={b}, a again={a}", &[("a", "1"), ("b", "2")]);
        assert_eq!(filled, "a=1, b=2, a again=1");
    }

    #[test]
    fn test_fill_template_leaves_unknown_braces_alone() {
        let filled = fill_template(r#"{"key": "{v}"} {unknown}"#, &[("v", "x")]);
        assert_eq!(filled, r#"{"key": "x"} {unknown}"#);
    }

    #[test]
    fn test_fill_template_does_not_rescan_inserted_values() {
        let filled = fill_template("{a}|{b}", &[("a", "{b}"), ("b", "B")]);
        assert_eq!(filled, "{b}|B");
    }
}
