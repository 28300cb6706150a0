pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as jobs;
use crate::state::AppState;
use crate::tailoring::handlers as resumes;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Jobs API
        .route("/api/v1/jobs/extract", post(jobs::handle_extract))
        .route("/api/v1/jobs/fit-score", post(jobs::handle_fit_score))
        // Resumes API
        .route("/api/v1/resumes/tailor", post(resumes::handle_tailor))
        .route("/api/v1/resumes/:id/pdf", get(resumes::handle_get_pdf))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::llm_client::{LlmError, TextGenerator};
    use crate::render::{PageCounter, PdfRenderer, RenderError, ResumeTemplate};
    use crate::tailoring::{TailoringPolicy, TailoringServices};

    const EXTRACTION_REPLY: &str = r#"{
        "Key Responsibilities": ["Build services"],
        "Required Skills": ["Rust"],
        "Preferred Skills": [],
        "Required Experience Level": "Mid",
        "Key Qualifications": [],
        "Concise Company Description": "Not Specified"
    }"#;

    const TAILORING_REPLY: &str = r#"{
        "tailored_summary": "Rust engineer",
        "relevant_experience_title": "Software Engineer",
        "tailored_bullets": ["Shipped things"],
        "skill_categories": {"Languages": ["Rust"]}
    }"#;

    struct CannedGenerator;

    #[async_trait]
    impl TextGenerator for CannedGenerator {
        async fn generate(&self, prompt: &str, _system: &str) -> Result<String, LlmError> {
            if prompt.contains("Concise Company Description") {
                Ok(EXTRACTION_REPLY.to_string())
            } else {
                Ok(TAILORING_REPLY.to_string())
            }
        }
    }

    struct CopyRenderer;

    #[async_trait]
    impl PdfRenderer for CopyRenderer {
        async fn render_pdf(&self, html: &str, output: &Path) -> Result<(), RenderError> {
            tokio::fs::write(output, html).await?;
            Ok(())
        }
    }

    struct OnePage;

    impl PageCounter for OnePage {
        fn page_count(&self, _pdf: &Path) -> Result<u32, RenderError> {
            Ok(1)
        }
    }

    fn test_state(output_dir: &Path) -> AppState {
        let mut config = Config::from_lookup(|key| match key {
            "ANTHROPIC_API_KEY" => Some("sk-test".to_string()),
            _ => None,
        })
        .unwrap();
        config.output_dir = output_dir.to_path_buf();
        let generator: Arc<dyn TextGenerator> = Arc::new(CannedGenerator);
        AppState {
            policy: TailoringPolicy::default(),
            tailoring: TailoringServices {
                generator: generator.clone(),
                composer: Arc::new(ResumeTemplate::from_source("<p>{{ summary }}</p>").unwrap()),
                renderer: Arc::new(CopyRenderer),
                page_counter: Arc::new(OnePage),
            },
            generator,
            base_resume: Some(Arc::from("Jane Doe, software engineer. ".repeat(5).as_str())),
            config,
        }
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    const JD: &str = "Senior Rust engineer to build low-latency trading services with Kafka.";

    #[tokio::test]
    async fn test_health_reports_service_name() {
        let dir = tempfile::tempdir().unwrap();
        let response = build_router(test_state(dir.path()))
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["service"], "tailor");
    }

    #[tokio::test]
    async fn test_extract_returns_job_details() {
        let dir = tempfile::tempdir().unwrap();
        let response = build_router(test_state(dir.path()))
            .oneshot(post_json(
                "/api/v1/jobs/extract",
                serde_json::json!({ "jd_text": JD }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["job_details"]["Required Skills"][0], "Rust");
    }

    #[tokio::test]
    async fn test_short_job_description_is_a_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let response = build_router(test_state(dir.path()))
            .oneshot(post_json(
                "/api/v1/jobs/extract",
                serde_json::json!({ "jd_text": "too short" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_tailor_then_download_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let router = build_router(test_state(dir.path()));

        let response = router
            .clone()
            .oneshot(post_json(
                "/api/v1/resumes/tailor",
                serde_json::json!({ "jd_text": JD }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["report"]["outcome"], "target_met");
        let resume_id = body["resume_id"].as_str().unwrap().to_string();

        let response = router
            .oneshot(
                Request::get(format!("/api/v1/resumes/{resume_id}/pdf"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "application/pdf");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"<p>Rust engineer</p>");
    }

    #[tokio::test]
    async fn test_unknown_pdf_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let response = build_router(test_state(dir.path()))
            .oneshot(
                Request::get(format!("/api/v1/resumes/{}/pdf", uuid::Uuid::new_v4()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
