use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::TextGenerator;
use crate::tailoring::{TailoringPolicy, TailoringServices};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Text generation for extraction and fit scoring. Same client the loop uses.
    pub generator: Arc<dyn TextGenerator>,
    pub tailoring: TailoringServices,
    pub policy: TailoringPolicy,
    /// Configured base resume; requests may carry their own instead.
    pub base_resume: Option<Arc<str>>,
}

impl AppState {
    pub fn resume_text<'a>(&'a self, from_request: Option<&'a str>) -> Option<&'a str> {
        from_request
            .filter(|s| !s.trim().is_empty())
            .or(self.base_resume.as_deref())
    }
}
