//! Posting source: turns a posting URL into plain job-description text.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use thiserror::Error;
use tracing::debug;

use crate::render::text::{element_text, parse_selector};

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum PostingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("posting returned status {0}")]
    Status(u16),

    #[error("{0}")]
    InvalidSelector(String),

    #[error("no text found at {0}")]
    Empty(String),
}

#[async_trait]
pub trait PostingSource: Send + Sync {
    async fn fetch_description(&self, url: &str) -> Result<String, PostingError>;
}

/// Plain HTTP GET plus CSS selection. Pages that need a logged-in browser are out of reach.
pub struct HttpPostingSource {
    client: Client,
    selector: Selector,
    fallback: Selector,
}

impl HttpPostingSource {
    pub fn new(selector: &str) -> Result<Self, PostingError> {
        Ok(Self {
            client: Client::builder()
                .timeout(FETCH_TIMEOUT)
                .user_agent(USER_AGENT)
                .build()?,
            selector: parse_selector(selector).map_err(PostingError::InvalidSelector)?,
            fallback: parse_selector("body").map_err(PostingError::InvalidSelector)?,
        })
    }

    /// Text of the configured element, or of `<body>` when it is absent.
    pub fn extract(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        element_text(&document, &self.selector)
            .filter(|t| !t.is_empty())
            .or_else(|| element_text(&document, &self.fallback))
            .filter(|t| !t.is_empty())
    }
}

#[async_trait]
impl PostingSource for HttpPostingSource {
    async fn fetch_description(&self, url: &str) -> Result<String, PostingError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PostingError::Status(status.as_u16()));
        }
        let body = response.text().await?;
        debug!(url, bytes = body.len(), "Posting downloaded");

        self.extract(&body)
            .ok_or_else(|| PostingError::Empty(url.to_string()))
    }
}
