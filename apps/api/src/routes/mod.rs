pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::chat::handlers::handle_chat;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/upload",
            post(handlers::handle_upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/analyze", post(handlers::handle_analyze))
        .route("/api/chat", post(handle_chat))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::analysis::catalog::SkillCatalog;
    use crate::analysis::gap::{GapAnalyzer, MatchMode};
    use crate::analysis::role::RolePredictor;
    use crate::config::Config;
    use crate::embedding::hashing::HashingEmbedder;
    use crate::embedding::{DegradedEmbedder, EmbeddingProvider};

    const BOUNDARY: &str = "skillgap-test-boundary";

    async fn test_router() -> Router {
        router_with(Arc::new(HashingEmbedder::new(128))).await
    }

    async fn router_with(embedder: Arc<dyn EmbeddingProvider>) -> Router {
        let predictor = RolePredictor::initialize(embedder.clone(), None).await;
        let analyzer = GapAnalyzer::new(
            Arc::new(SkillCatalog::builtin()),
            Arc::new(predictor),
            embedder,
            0.75,
            MatchMode::LexicalOnly,
        );
        let config = Config {
            port: 0,
            rust_log: "info".to_string(),
            skill_catalog_path: None,
            skill_catalog_fallback: true,
            role_model_path: None,
            remote_embedding: None,
            embedding_dimension: 128,
            similarity_threshold: 0.75,
            match_mode: MatchMode::LexicalOnly,
            max_upload_bytes: 1024 * 1024,
        };
        build_router(AppState {
            config,
            analyzer: Arc::new(analyzer),
        })
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn json_post(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn multipart_post(parts: &[(&str, Option<&str>, &str)]) -> Request<Body> {
        let mut body = String::new();
        for (name, file_name, content) in parts {
            body.push_str(&format!("--{BOUNDARY}\r\n"));
            match file_name {
                Some(file_name) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n"
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
                )),
            }
            body.push_str(content);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));

        Request::post("/api/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_components() {
        let request = Request::get("/health").body(Body::empty()).unwrap();
        let (status, body) = send(test_router().await, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["catalog_source"], "builtin");
        assert_eq!(body["embedder"], "hashing");
        assert_eq!(body["embedder_degraded"], false);
        assert!(body["embedder_degraded_reason"].is_null());
        assert_eq!(body["role_predictor_degraded"], false);
    }

    #[tokio::test]
    async fn test_health_explains_degraded_embedder() {
        let router = router_with(Arc::new(DegradedEmbedder::new(128, "connection refused"))).await;
        let request = Request::get("/health").body(Body::empty()).unwrap();
        let (status, body) = send(router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["embedder"], "degraded");
        assert_eq!(body["embedder_degraded"], true);
        assert_eq!(body["embedder_degraded_reason"], "connection refused");
        assert_eq!(body["role_predictor_degraded"], true);
    }

    #[tokio::test]
    async fn test_analyze_returns_gap_report() {
        let request = json_post(
            "/api/analyze",
            json!({
                "resume_text": "Experienced Python developer with React and Docker skills",
                "job_description": "Looking for Python, AWS, Kubernetes expert"
            }),
        );
        let (status, body) = send(test_router().await, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["match_score"], 33);
        assert_eq!(body["missing_skills"], json!(["Aws", "Kubernetes"]));
        assert_eq!(body["job_description_skills"], json!(["Python", "Aws", "Kubernetes"]));
    }

    #[tokio::test]
    async fn test_analyze_without_job_description_is_degraded() {
        let request = json_post(
            "/api/analyze",
            json!({
                "resume_text": "Experienced Python developer with React and Docker skills",
                "mode": "lexical_plus_semantic"
            }),
        );
        let (status, body) = send(test_router().await, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["match_score"], 50);
        assert_eq!(body["notices"], json!(["missing_job_description"]));
    }

    #[tokio::test]
    async fn test_chat_answers_skill_question() {
        let request = json_post(
            "/api/chat",
            json!({
                "question": "What skills should I learn?",
                "job_role": "Web Developer",
                "missing_skills": ["Aws", "Docker"]
            }),
        );
        let (status, body) = send(test_router().await, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["intent"], "skill_gap");
        assert_eq!(body["answer"], "You should focus on learning: Aws, Docker");
    }

    #[tokio::test]
    async fn test_chat_requires_question() {
        let request = json_post("/api/chat", json!({ "question": "   " }));
        let (status, body) = send(test_router().await, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_upload_requires_resume_file() {
        let request = multipart_post(&[("job_description", None, "Python developer")]);
        let (status, body) = send(test_router().await, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Resume file missing");
    }

    #[tokio::test]
    async fn test_upload_rejects_non_pdf() {
        let request = multipart_post(&[
            ("resume", Some("resume.docx"), "binary"),
            ("job_description", None, "Python developer"),
        ]);
        let (status, body) = send(test_router().await, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Only PDF files are allowed");
    }

    #[tokio::test]
    async fn test_upload_unreadable_pdf_is_degraded() {
        let request = multipart_post(&[
            ("resume", Some("Resume.PDF"), "this is not a real pdf"),
            ("job_description", None, "Looking for Python, AWS, Kubernetes expert"),
        ]);
        let (status, body) = send(test_router().await, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "degraded");
        assert!(body["notices"]
            .as_array()
            .unwrap()
            .contains(&json!("insufficient_resume_text")));
    }

    #[tokio::test]
    async fn test_upload_rejects_unknown_mode() {
        let request = multipart_post(&[
            ("resume", Some("cv.pdf"), "x"),
            ("mode", None, "fuzzy"),
        ]);
        let (status, _) = send(test_router().await, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
