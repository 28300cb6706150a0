// Jobs — the CSV job table and the batch workflow that walks it through
// fetch → analyze → tailor.
// ARCHITECTURAL RULE: rows change only through `Workflow`; every phase records
// per-row failures in the row and moves on to the next job.

pub mod record;
pub mod source;
pub mod table;
pub mod workflow;

pub use source::HttpPostingSource;
pub use table::JobTable;
pub use workflow::{Phase, Workflow, WorkflowSettings};
