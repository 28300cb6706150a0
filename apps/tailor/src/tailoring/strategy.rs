//! Prompt strategy per attempt: initial → full re-tailor → condensation-only.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::llm_client::prompts::{fill_template, HONESTY_INSTRUCTION, JSON_ONLY_INSTRUCTION};
use crate::tailoring::attempt::{TailoringAttempt, TailoringRequest};
use crate::tailoring::prompts::{
    CONDENSE_LENGTHEN, CONDENSE_PROMPT_TEMPLATE, CONDENSE_REFIT, CONDENSE_SHORTEN,
    INITIAL_PROMPT_TEMPLATE, NO_PREVIOUS_OUTPUT, OUTPUT_SHAPE, RETAILOR_LENGTHEN,
    RETAILOR_PROMPT_TEMPLATE, RETAILOR_REFIT, RETAILOR_SHORTEN, TAILORING_SYSTEM,
};
use crate::tailoring::tailor_loop::{page_phrase, PageTarget};

const NO_RECOMMENDATIONS: &str = "None provided.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TailoringStrategy {
    Initial,
    ReTailor,
    Condensation,
}

impl TailoringStrategy {
    /// 1 → Initial, 2 → ReTailor, 3 and later → Condensation.
    pub fn for_attempt(index: u32) -> Self {
        match index {
            0 | 1 => Self::Initial,
            2 => Self::ReTailor,
            _ => Self::Condensation,
        }
    }
}

impl fmt::Display for TailoringStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Initial => "initial",
            Self::ReTailor => "re-tailor",
            Self::Condensation => "condensation",
        })
    }
}

/// Which way the next attempt should move the page count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthAdjustment {
    Shorten,
    Lengthen,
    /// Nothing measured yet, or the last render was already inside the target.
    Refit,
}

/// Page measurement fed back into the ReTailor and Condensation prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageFeedback {
    pub target: PageTarget,
    /// Page count of the most recent attempt that rendered.
    pub last_page_count: Option<u32>,
}

impl PageFeedback {
    pub fn adjustment(&self) -> LengthAdjustment {
        match self.last_page_count {
            Some(pages) if pages > self.target.max_pages => LengthAdjustment::Shorten,
            Some(pages) if pages < self.target.min_pages => LengthAdjustment::Lengthen,
            _ => LengthAdjustment::Refit,
        }
    }

    fn status(&self) -> String {
        match self.last_page_count {
            Some(pages) => format!(
                "The previous version rendered to {}. The target is {}.",
                page_phrase(pages),
                self.target
            ),
            None => format!(
                "No previous version has been measured yet. The target is {}.",
                self.target
            ),
        }
    }
}

/// System prompt for every tailoring call.
pub fn system_prompt() -> String {
    format!("{TAILORING_SYSTEM}\n\n{JSON_ONLY_INSTRUCTION}")
}

/// Builds the user prompt for `strategy`.
///
/// `previous_output` is the raw text of the most recent AI response, parsed or not.
/// `latest_attempt` is the most recent successfully parsed attempt.
/// `feedback` tells the later strategies the target and the last measured length,
/// so they shorten or lengthen as needed.
/// Returns `None` when the strategy's input does not exist yet (condensation
/// before anything has parsed).
pub fn build_prompt(
    strategy: TailoringStrategy,
    request: &TailoringRequest,
    previous_output: Option<&str>,
    latest_attempt: Option<&TailoringAttempt>,
    feedback: PageFeedback,
) -> Option<String> {
    let recommendations = if request.recommendations.trim().is_empty() {
        NO_RECOMMENDATIONS
    } else {
        request.recommendations.as_str()
    };
    let adjustment = feedback.adjustment();
    let length_status = feedback.status();

    match strategy {
        TailoringStrategy::Initial => Some(fill_template(
            INITIAL_PROMPT_TEMPLATE,
            &[
                ("base_resume", request.base_resume_text.as_str()),
                ("job_description", request.job_description.as_str()),
                ("recommendations", recommendations),
                ("honesty_instruction", HONESTY_INSTRUCTION),
                ("output_shape", OUTPUT_SHAPE),
                ("json_instruction", JSON_ONLY_INSTRUCTION),
            ],
        )),
        TailoringStrategy::ReTailor => Some(fill_template(
            RETAILOR_PROMPT_TEMPLATE,
            &[
                ("job_description", request.job_description.as_str()),
                ("recommendations", recommendations),
                ("previous_output", previous_output.unwrap_or(NO_PREVIOUS_OUTPUT)),
                ("base_resume", request.base_resume_text.as_str()),
                ("length_status", length_status.as_str()),
                (
                    "length_instructions",
                    match adjustment {
                        LengthAdjustment::Shorten => RETAILOR_SHORTEN,
                        LengthAdjustment::Lengthen => RETAILOR_LENGTHEN,
                        LengthAdjustment::Refit => RETAILOR_REFIT,
                    },
                ),
                ("honesty_instruction", HONESTY_INSTRUCTION),
                ("output_shape", OUTPUT_SHAPE),
                ("json_instruction", JSON_ONLY_INSTRUCTION),
            ],
        )),
        TailoringStrategy::Condensation => {
            let latest_json = latest_attempt?.to_prompt_json();
            Some(fill_template(
                CONDENSE_PROMPT_TEMPLATE,
                &[
                    ("latest_attempt_json", latest_json.as_str()),
                    ("length_status", length_status.as_str()),
                    (
                        "length_instructions",
                        match adjustment {
                            LengthAdjustment::Shorten => CONDENSE_SHORTEN,
                            LengthAdjustment::Lengthen => CONDENSE_LENGTHEN,
                            LengthAdjustment::Refit => CONDENSE_REFIT,
                        },
                    ),
                    ("json_instruction", JSON_ONLY_INSTRUCTION),
                ],
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tailoring::attempt::{SkillCategories, SkillCategory};

    fn request() -> TailoringRequest {
        TailoringRequest {
            base_resume_text: "BASE-RESUME: Jane Doe, Staff Engineer at Initech".to_string(),
            job_description: "JD-TEXT: Senior Rust engineer, {base_resume} in braces".to_string(),
            recommendations: "RECS: highlight Kafka".to_string(),
        }
    }

    fn latest() -> TailoringAttempt {
        TailoringAttempt {
            summary: "LATEST-SUMMARY".to_string(),
            experience_title: "Staff Engineer".to_string(),
            bullets: vec!["LATEST-BULLET".to_string()],
            skill_categories: SkillCategories(vec![SkillCategory {
                name: "Languages".to_string(),
                skills: vec!["Rust".to_string()],
            }]),
        }
    }

    fn unmeasured() -> PageFeedback {
        PageFeedback {
            target: PageTarget::default(),
            last_page_count: None,
        }
    }

    fn measured(min: u32, max: u32, pages: u32) -> PageFeedback {
        PageFeedback {
            target: PageTarget::new(min, max).unwrap(),
            last_page_count: Some(pages),
        }
    }

    #[test]
    fn test_strategy_escalates_with_attempt_index() {
        assert_eq!(TailoringStrategy::for_attempt(1), TailoringStrategy::Initial);
        assert_eq!(TailoringStrategy::for_attempt(2), TailoringStrategy::ReTailor);
        assert_eq!(TailoringStrategy::for_attempt(3), TailoringStrategy::Condensation);
        assert_eq!(TailoringStrategy::for_attempt(7), TailoringStrategy::Condensation);
    }

    #[test]
    fn test_initial_prompt_embeds_all_inputs_verbatim() {
        let req = request();
        let prompt =
            build_prompt(TailoringStrategy::Initial, &req, None, None, unmeasured()).unwrap();
        assert!(prompt.contains(&req.base_resume_text));
        assert!(prompt.contains(&req.job_description));
        assert!(prompt.contains(&req.recommendations));
        for key in crate::tailoring::attempt::REQUIRED_KEYS {
            assert!(prompt.contains(key), "prompt should name key {key}");
        }
    }

    #[test]
    fn test_retailor_prompt_embeds_previous_output_and_inputs() {
        let req = request();
        let prompt = build_prompt(
            TailoringStrategy::ReTailor,
            &req,
            Some("PREVIOUS-RAW-OUTPUT"),
            Some(&latest()),
            unmeasured(),
        )
        .unwrap();
        assert!(prompt.contains(&req.base_resume_text));
        assert!(prompt.contains(&req.job_description));
        assert!(prompt.contains(&req.recommendations));
        assert!(prompt.contains("PREVIOUS-RAW-OUTPUT"));
    }

    #[test]
    fn test_retailor_prompt_without_previous_output_uses_marker() {
        let prompt = build_prompt(TailoringStrategy::ReTailor, &request(), None, None, unmeasured())
            .unwrap();
        assert!(prompt.contains(NO_PREVIOUS_OUTPUT));
    }

    #[test]
    fn test_condensation_prompt_embeds_only_latest_attempt() {
        let req = request();
        let latest = latest();
        let prompt = build_prompt(
            TailoringStrategy::Condensation,
            &req,
            Some("PREVIOUS-RAW-OUTPUT"),
            Some(&latest),
            unmeasured(),
        )
        .unwrap();
        assert!(prompt.contains(&latest.to_prompt_json()));
        assert!(!prompt.contains(&req.base_resume_text));
        assert!(!prompt.contains(&req.job_description));
        assert!(!prompt.contains("PREVIOUS-RAW-OUTPUT"));
    }

    #[test]
    fn test_condensation_without_parsed_attempt_has_no_prompt() {
        assert!(build_prompt(
            TailoringStrategy::Condensation,
            &request(),
            Some("raw"),
            None,
            unmeasured()
        )
        .is_none());
    }

    #[test]
    fn test_blank_recommendations_are_labelled() {
        let mut req = request();
        req.recommendations = "  ".to_string();
        let prompt =
            build_prompt(TailoringStrategy::Initial, &req, None, None, unmeasured()).unwrap();
        assert!(prompt.contains(NO_RECOMMENDATIONS));
    }

    #[test]
    fn test_adjustment_follows_last_page_count() {
        assert_eq!(measured(1, 1, 2).adjustment(), LengthAdjustment::Shorten);
        assert_eq!(measured(2, 2, 1).adjustment(), LengthAdjustment::Lengthen);
        assert_eq!(measured(1, 2, 2).adjustment(), LengthAdjustment::Refit);
        assert_eq!(unmeasured().adjustment(), LengthAdjustment::Refit);
    }

    #[test]
    fn test_short_render_asks_for_longer_content() {
        let req = request();
        let feedback = measured(2, 2, 1);

        let retailor =
            build_prompt(TailoringStrategy::ReTailor, &req, Some("raw"), None, feedback).unwrap();
        assert!(retailor.contains(RETAILOR_LENGTHEN));
        assert!(retailor.contains("rendered to 1 page. The target is 2 pages."));
        assert!(!retailor.contains("too long"));

        let condense = build_prompt(
            TailoringStrategy::Condensation,
            &req,
            None,
            Some(&latest()),
            feedback,
        )
        .unwrap();
        assert!(condense.contains(CONDENSE_LENGTHEN));
        assert!(condense.contains("The target is 2 pages."));
        assert!(!condense.contains("too long"));
    }

    #[test]
    fn test_long_render_asks_for_shorter_content() {
        let feedback = measured(1, 1, 3);
        let prompt = build_prompt(
            TailoringStrategy::Condensation,
            &request(),
            None,
            Some(&latest()),
            feedback,
        )
        .unwrap();
        assert!(prompt.contains(CONDENSE_SHORTEN));
        assert!(prompt.contains("rendered to 3 pages. The target is 1 page."));
    }

    #[test]
    fn test_range_target_is_stated_in_prompt() {
        let prompt = build_prompt(
            TailoringStrategy::ReTailor,
            &request(),
            None,
            None,
            PageFeedback {
                target: PageTarget::new(1, 2).unwrap(),
                last_page_count: None,
            },
        )
        .unwrap();
        assert!(prompt.contains("The target is 1-2 pages."));
        assert!(prompt.contains(RETAILOR_REFIT));
    }
}
