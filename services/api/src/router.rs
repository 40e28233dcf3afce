//! Axum Router Configuration
//!
//! This module defines the complete HTTP routing for the application and the
//! OpenAPI document describing it.

use crate::{
    handlers,
    models::{
        AnswerPayload, CatalogView, CreateSessionPayload, ErrorResponse, Feedback,
        FeedbackResponse, HealthResponse, SessionState, SessionView, TextResponse,
    },
    state::AppState,
};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::get_catalog,
        handlers::create_session,
        handlers::list_sessions,
        handlers::get_session,
        handlers::delete_session,
        handlers::next_question,
        handlers::followup,
        handlers::feedback,
        handlers::summary,
    ),
    components(
        schemas(SessionView, SessionState, Feedback, CreateSessionPayload, AnswerPayload, TextResponse, FeedbackResponse, CatalogView, HealthResponse, ErrorResponse)
    ),
    tags(
        (name = "Interview API", description = "Mock interview sessions: questions, follow-ups, feedback and summaries")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/catalog", get(handlers::get_catalog))
        .route(
            "/sessions",
            get(handlers::list_sessions).post(handlers::create_session),
        )
        .route(
            "/sessions/{id}",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        .route("/sessions/{id}/question", post(handlers::next_question))
        .route("/sessions/{id}/followup", post(handlers::followup))
        .route("/sessions/{id}/feedback", post(handlers::feedback))
        .route("/sessions/{id}/summary", post(handlers::summary))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::sessions::SessionStore;
    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use interview_core::generator::{
        CannedGenerator, GenerationParams, Generator, GeneratorSettings, Provider,
    };
    use interview_core::loader::load_from_dir;
    use interview_core::GenerationError;
    use serde_json::{Value, json};
    use std::path::{Path, PathBuf};
    use std::time::Duration;
    use tower::ServiceExt;

    struct FailingGenerator;

    #[async_trait]
    impl Generator for FailingGenerator {
        async fn generate(
            &self,
            _prompt: &str,
            _params: &GenerationParams,
        ) -> Result<String, GenerationError> {
            Err(GenerationError::Request("connection refused".to_string()))
        }
    }

    fn app(generator: Arc<dyn Generator>) -> Router {
        let data = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data");
        let config = Config {
            bind_address: "127.0.0.1:0".parse().unwrap(),
            generator: GeneratorSettings {
                provider: Provider::Mock,
                model: "canned".to_string(),
                ollama_url: "http://localhost:11434".to_string(),
                openai_api_key: None,
                openai_base_url: "https://api.openai.com/v1".to_string(),
            },
            log_level: tracing::Level::INFO,
            data_path: PathBuf::from(&data),
            session_ttl: Duration::from_secs(3600),
        };
        let state = AppState {
            profiles: Arc::new(load_from_dir(&data).unwrap()),
            generator,
            sessions: Arc::new(SessionStore::new(config.session_ttl)),
            config: Arc::new(config),
        };
        create_router(Arc::new(state))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-user-id", "alice")
            .header("content-type", "application/json");
        let request = match body {
            Some(body) => builder.body(Body::from(body.to_string())).unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn create(app: &Router, domain: &str) -> (StatusCode, Value) {
        send(
            app,
            "POST",
            "/sessions",
            Some(json!({
                "role": "Software Engineer",
                "seniority": "Mid",
                "domain": domain,
                "persona": "Efficient"
            })),
        )
        .await
    }

    #[tokio::test]
    async fn test_full_interview_flow() {
        let app = app(Arc::new(CannedGenerator::new(
            r#"{"scores":{"clarity":4},"strengths":["clear"],"improvements":[]}"#,
        )));

        let (status, session) = create(&app, "ML").await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(session["domain"], "backend");
        assert_eq!(session["state"], "question");
        let id = session["id"].as_str().unwrap().to_string();

        let (status, question) = send(&app, "POST", &format!("/sessions/{id}/question"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(question["state"], "followup");

        let answer = json!({ "answer": "I would shard the table by tenant." });
        let (status, reply) =
            send(&app, "POST", &format!("/sessions/{id}/followup"), Some(answer.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reply["state"], "feedback");

        let (status, feedback) =
            send(&app, "POST", &format!("/sessions/{id}/feedback"), Some(answer)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(feedback["state"], "question");
        assert_eq!(feedback["feedback"]["scores"]["clarity"], 4.0);
        assert_eq!(feedback["feedback"]["strengths"], json!(["clear"]));
        assert!(!feedback["feedback"]["improvements"].as_array().unwrap().is_empty());

        let (status, summary) = send(&app, "POST", &format!("/sessions/{id}/summary"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(summary["state"], "end");

        let (status, view) = send(&app, "GET", &format!("/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["answers"].as_array().unwrap().len(), 1);
        assert_eq!(view["average_scores"]["clarity"], 4.0);
    }

    #[tokio::test]
    async fn test_unknown_role_is_not_found() {
        let app = app(Arc::new(CannedGenerator::default()));
        let (status, body) = send(
            &app,
            "POST",
            "/sessions",
            Some(json!({"role": "astronaut", "seniority": "senior", "domain": "orbit", "persona": "efficient"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Unknown role 'astronaut'");
    }

    #[tokio::test]
    async fn test_generation_failure_is_bad_gateway() {
        let app = app(Arc::new(FailingGenerator));
        let (_, session) = create(&app, "backend").await;
        let id = session["id"].as_str().unwrap().to_string();

        let (status, body) = send(&app, "POST", &format!("/sessions/{id}/question"), None).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["message"].as_str().unwrap().contains("connection refused"));

        // The answer is still recorded when the follow-up fails.
        let (status, _) = send(
            &app,
            "POST",
            &format!("/sessions/{id}/followup"),
            Some(json!({"answer": "my answer"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        let (_, view) = send(&app, "GET", &format!("/sessions/{id}"), None).await;
        assert_eq!(view["answers"], json!(["my answer"]));
    }

    #[tokio::test]
    async fn test_empty_answer_is_rejected() {
        let app = app(Arc::new(CannedGenerator::default()));
        let (_, session) = create(&app, "backend").await;
        let id = session["id"].as_str().unwrap().to_string();

        let (status, _) = send(
            &app,
            "POST",
            &format!("/sessions/{id}/followup"),
            Some(json!({"answer": "   "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_user_header_is_bad_request() {
        let app = app(Arc::new(CannedGenerator::default()));
        let request = Request::builder()
            .method("GET")
            .uri("/sessions")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_session() {
        let app = app(Arc::new(CannedGenerator::default()));
        let (_, session) = create(&app, "frontend").await;
        let id = session["id"].as_str().unwrap().to_string();

        let (status, _) = send(&app, "DELETE", &format!("/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, "GET", &format!("/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_catalog_lists_roles_and_personas() {
        let app = app(Arc::new(CannedGenerator::default()));
        let (status, catalog) = send(&app, "GET", "/catalog", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            catalog["roles"]["software_engineer"],
            json!(["backend", "frontend", "devops"])
        );
        assert!(
            catalog["personas"]
                .as_array()
                .unwrap()
                .contains(&json!("efficient"))
        );
    }

    #[test]
    fn test_openapi_document_lists_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/sessions/{id}/feedback"));
        assert!(doc.paths.paths.contains_key("/health"));
    }
}
