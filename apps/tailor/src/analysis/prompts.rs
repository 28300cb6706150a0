// LLM prompt constants for job analysis. Filled with `fill_template`.

/// System prompt for job-detail extraction.
pub const EXTRACTION_SYSTEM: &str = "You are a precise information-extraction assistant. \
    You read job postings and report exactly what they state, nothing more.";

/// Replace: {job_description}, {json_instruction}
pub const EXTRACTION_PROMPT_TEMPLATE: &str = r#"Analyze the following job description text and extract the requested information.
Format the output strictly as a single JSON object with EXACTLY these keys:
- "Key Responsibilities": list of strings summarizing the main duties, or a single concise string.
- "Required Skills": list of specific technical and soft skills explicitly mentioned as REQUIRED.
- "Preferred Skills": list of skills mentioned as PREFERRED, "nice-to-have", or advantageous. Use [] if none.
- "Required Experience Level": string summarizing years/level (e.g. "3-5 years", "Senior", "Entry-level"). Use "Not Specified" if not found.
- "Key Qualifications": list of specific degrees, certifications, or crucial non-skill qualifications. Use [] if none.
- "Concise Company Description": 1-2 sentence summary of the company IF described within this text. Use "Not Specified" if not found.

Job Description Text:
---
{job_description}
---

{json_instruction}"#;

/// System prompt for resume-fit scoring.
pub const FIT_SYSTEM: &str = "You are an experienced technical recruiter and resume reviewer. \
    You score resumes against job descriptions using a fixed rubric and plain-text output.";

/// Replace: {resume_text}, {job_description}
pub const FIT_PROMPT_TEMPLATE: &str = r#"Task: Evaluate the provided resume against the given job description. Give a 5-star rating and detailed feedback, including a scoring breakdown.

Resume Text:
```
{resume_text}
```

Job Description Text:
```
{job_description}
```

Evaluation Criteria & Scoring (Total 5 Stars Possible):
1. Keyword and Skill Match (Max 1 Star): 1.0★ (90-100% match), 0.75★ (75-89%), 0.5★ (50-74%), 0.25★ (<50%)
2. Quantifiable Achievements (Max 1 Star): 1.0★ (5+ results), 0.75★ (3-4 results), 0.5★ (1-2 results), 0.25★ (0 results)
3. Professional Summary and Content Quality (Max 1 Star): 1.0★ (tailored, impactful, concise), 0.75★ (mostly tailored), 0.5★ (generic), 0.25★ (poor)
4. Resume Structure and Formatting (Max 1 Star): 1.0★ (well-structured, clear, ATS-friendly), 0.75★ (minor issues), 0.5★ (several issues), 0.25★ (poor)
5. Relevant Tools and Certifications (Max 1 Star): 1.0★ (100% relevant mentioned), 0.75★ (75-99%), 0.5★ (50-74%), 0.25★ (<50%)

Final Rating: sum of the five scores (max 5.0).
Star Rating Scale: 5★ 4.75-5.00 (Exceptional), 4★ 3.75-4.74 (Strong), 3★ 2.75-3.74 (Moderate), 2★ 1.75-2.74 (Below average), 1★ 0.00-1.74 (Poor fit)

Output Format: Start EXACTLY with "Overall Star Rating:". Follow with Strengths, Areas for Improvement, Actionable Recommendations. Conclude with the full "Evaluation Breakdown:" section; each of its 5 numbered lines MUST include the score (e.g. 0.75★) followed by a concise justification. No markdown formatting.

Output Structure Example:
Overall Star Rating: [Score] out of 5 Stars ([Category])

Strengths:
- [Highlight 1]
- [...]

Areas for Improvement:
- [Suggestion 1]
- [...]

Actionable Recommendations:
- [Action 1]
- [...]

Evaluation Breakdown:
1. Keyword and Skill Match: [Score]★ - [Justification]
2. Quantifiable Achievements: [Score]★ - [Justification]
3. Professional Summary and Content Quality: [Score]★ - [Justification]
4. Resume Structure and Formatting: [Score]★ - [Justification]
5. Relevant Tools and Certifications: [Score]★ - [Justification]"#;
