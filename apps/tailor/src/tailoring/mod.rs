// Tailoring — the iterative loop that rewrites resume content until the rendered
// PDF fits the page target.
// ARCHITECTURAL RULE: the loop depends only on the `TextGenerator`, `PdfRenderer`,
// `PageCounter` and `ResumeComposer` traits, bundled in `TailoringServices`.

pub mod attempt;
pub mod handlers;
pub mod prompts;
pub mod strategy;
pub mod tailor_loop;

// Re-export the public API consumed by the job workflow, handlers and config.
pub use attempt::{TailoringAttempt, TailoringRequest};
pub use strategy::TailoringStrategy;
pub use tailor_loop::{
    run_tailoring_loop, AttemptStatus, FailureKind, Outcome, PageTarget, TailoringPolicy,
    TailoringReport, TailoringServices,
};
