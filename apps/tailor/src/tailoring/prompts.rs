// LLM prompt constants for the tailoring loop. One template per strategy.
// Filled with `llm_client::prompts::fill_template`; inputs are embedded whole.

/// System prompt shared by all tailoring strategies.
pub const TAILORING_SYSTEM: &str = "You are an expert resume writer who tailors an existing \
    resume to a specific job posting. You edit wording, ordering and emphasis; you never \
    invent experience. Your output is consumed by a program that parses it as JSON.";

/// The JSON shape every strategy must return.
pub const OUTPUT_SHAPE: &str = r#"{
  "tailored_summary": "2-4 sentence summary with <strong>key terms</strong>",
  "relevant_experience_title": "Exact job title heading from the base resume",
  "tailored_bullets": ["Bullet one", "Bullet two"],
  "skill_categories": {
    "Languages & Databases": ["Skill", "Skill"],
    "Tools & Technologies": ["Skill", "Skill"]
  }
}"#;

/// Attempt 1. Replace: {base_resume}, {job_description}, {recommendations},
/// {honesty_instruction}, {json_instruction}, {output_shape}
pub const INITIAL_PROMPT_TEMPLATE: &str = r#"OBJECTIVE: Generate tailored resume content (summary, experience bullets, skills) for the target job.

BASE RESUME (source of truth for experience, style and tone):
```
{base_resume}
```

TARGET JOB DESCRIPTION (primary source for keywords and requirements):
```
{job_description}
```

PREVIOUS AI ANALYSIS & RECOMMENDATIONS (areas to address):
```
{recommendations}
```

INSTRUCTIONS:
1. tailored_summary: 2-4 concise sentences highlighting the qualifications from the base resume most relevant to THIS job. Wrap key JD terms in <strong> tags.
2. relevant_experience_title: the single most relevant job title heading from the base resume. Use the EXACT heading text.
3. tailored_bullets: 3-5 bullets for that experience. Action verbs, quantified results where the base resume supports them, JD keywords woven in naturally, key terms in <strong> tags.
4. skill_categories: category name -> list of skills relevant to the JD. Prioritize skills the JD names; wrap required ones in <strong> tags. Drop less relevant skills if space is tight.
5. Keep the generated text to roughly 400-550 words in total.

{honesty_instruction}

Return a JSON object with EXACTLY these keys:
{output_shape}

{json_instruction}"#;

/// Attempt 2. Replace: {job_description}, {recommendations}, {previous_output},
/// {base_resume}, {length_status}, {length_instructions}, {honesty_instruction},
/// {json_instruction}, {output_shape}
pub const RETAILOR_PROMPT_TEMPLATE: &str = r#"OBJECTIVE: Re-tailor the resume content so the rendered resume lands on the page target.

PAGE LENGTH: {length_status}

TARGET JOB DESCRIPTION:
```
{job_description}
```

ORIGINAL AI RECOMMENDATIONS:
```
{recommendations}
```

PREVIOUS GENERATED CONTENT:
```
{previous_output}
```

BASE RESUME (source of truth):
```
{base_resume}
```

INSTRUCTIONS:
1. Start again from the base resume and the job description; use the previous content only as a reference.
{length_instructions}
4. Preserve <strong> tags around key JD terms.

{honesty_instruction}

Return a JSON object with EXACTLY these keys:
{output_shape}

{json_instruction}"#;

/// Re-tailor steps 2-3 when the last render was over the target.
pub const RETAILOR_SHORTEN: &str = "2. The previous version was too long. Keep the summary to 2-3 sentences and the bullets to at most 4, each one line where possible.
3. Keep only the skill categories and skills the job description actually asks for.";

/// Re-tailor steps 2-3 when the last render was under the target.
pub const RETAILOR_LENGTHEN: &str = "2. The previous version was too short. Lengthen it: a 3-4 sentence summary and 4-6 bullets that spell out the scope, tools and results the base resume states.
3. Bring back relevant skills from the base resume that the previous version left out. Add nothing the base resume does not support.";

/// Re-tailor steps 2-3 when no render was measured yet.
pub const RETAILOR_REFIT: &str = "2. Size the content for the page target: a 2-4 sentence summary and 3-5 bullets.
3. Keep the skill categories and skills the job description asks for.";

/// Attempt 3+. Replace: {latest_attempt_json}, {length_status},
/// {length_instructions}, {json_instruction}
pub const CONDENSE_PROMPT_TEMPLATE: &str = r#"OBJECTIVE: Adjust the length of the resume content below so it fits the page target. This is a minor edit, not a rewrite.

PAGE LENGTH: {length_status}

CURRENT CONTENT (JSON):
```json
{latest_attempt_json}
```

INSTRUCTIONS:
{length_instructions}
3. Keep relevant_experience_title exactly as it is.
4. Preserve <strong> tags and the most impactful metrics.
5. Keep the JSON structure and keys identical to the input.

{json_instruction}"#;

/// Condensation steps 1-2 when the last render was over the target.
pub const CONDENSE_SHORTEN: &str = "1. The content is too long. Shorten the summary and the longest bullets first. Rephrase for brevity; merge very short adjacent bullets only if logical.
2. Do NOT remove skill categories. Trim the least relevant skills inside them if needed.";

/// Condensation steps 1-2 when the last render was under the target.
pub const CONDENSE_LENGTHEN: &str = "1. The content is too short. Lengthen the summary and the shortest bullets by spelling out detail they already state. Do not add employers, metrics or skills that are not in the content.
2. Do NOT remove skill categories or skills.";

/// Condensation steps 1-2 when no render was measured yet.
pub const CONDENSE_REFIT: &str = "1. Tighten the wording where it helps the page target without dropping content.
2. Do NOT remove skill categories.";

/// Stands in for the previous output when no attempt has produced a response yet.
pub const NO_PREVIOUS_OUTPUT: &str = "(no previous output: the last attempt produced no response)";
