pub mod health;

use std::path::Path;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::services::{ServeDir, ServeFile};

use crate::mail::handlers as mail;
use crate::proxy::handlers as proxy;
use crate::records::handlers as records;
use crate::screening::handlers as screening;
use crate::state::AppState;

/// Uploaded resumes are read into memory whole.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Web app pages and the file each one is served from.
const PAGES: [(&str, &str); 6] = [
    ("/test", "index.html"),
    ("/upload", "upload.html"),
    ("/dashboard", "dashboard.html"),
    ("/vacancies", "vacancies.html"),
    ("/settings", "settings.html"),
    ("/vacancy-detail", "vacancy-detail.html"),
];

fn static_routes(static_dir: &str) -> Router<AppState> {
    let dir = Path::new(static_dir);
    PAGES
        .iter()
        .fold(Router::new(), |router, (route, file)| {
            router.route_service(route, ServeFile::new(dir.join(file)))
        })
        .nest_service("/static", ServeDir::new(dir))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        // hh.ru relay
        .route(
            "/proxy/hh_api/*path",
            get(proxy::handle_hh_api)
                .post(proxy::handle_hh_api)
                .put(proxy::handle_hh_api)
                .delete(proxy::handle_hh_api),
        )
        .route("/proxy/hh_oauth/oauth/token", post(proxy::handle_hh_token))
        // Profiles
        .route(
            "/api/profile/:user_id",
            get(records::handle_get_profile).put(records::handle_update_profile),
        )
        // Vacancies
        .route("/api/vacancies", post(records::handle_save_vacancy))
        .route("/api/vacancies/generate", post(screening::handle_generate_vacancy))
        .route("/api/vacancies/list/:user_id", get(records::handle_list_vacancies))
        .route("/api/vacancies/:vacancy_id/:user_id", get(records::handle_get_vacancy))
        // Candidates
        .route("/api/candidates", post(records::handle_save_candidate))
        .route(
            "/api/candidates/list/:user_id/:vacancy_id",
            get(records::handle_list_candidates),
        )
        .route(
            "/api/candidates/:candidate_id/:user_id",
            get(records::handle_get_candidate),
        )
        // Screening
        .route("/api/analyze", post(screening::handle_analyze))
        .route(
            "/api/upload_resume",
            post(screening::handle_upload_resume).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/api/dashboard/stats/:user_id", get(records::handle_dashboard_stats))
        // Mail
        .route("/oauth/:provider/start", get(mail::handle_oauth_start))
        .route("/oauth/:provider/callback", get(mail::handle_oauth_callback))
        .route("/api/send_email", post(mail::handle_send_email))
        .merge(static_routes(&state.config.static_dir))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
        Json,
    };
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::db::testing::temp_pool;
    use crate::llm_client::testing::ScriptedCompletion;
    use crate::proxy::testing::spawn_upstream;
    use crate::screening::extraction::testing::{build_docx, build_pdf};
    use crate::screening::normalizer::NO_DATA_SENTINEL;

    const BOUNDARY: &str = "hr-api-test-boundary";

    struct TestApp {
        state: AppState,
        llm: Arc<ScriptedCompletion>,
        _dir: TempDir,
    }

    impl TestApp {
        async fn new(llm: ScriptedCompletion) -> Self {
            Self::with_config(llm, |_| {}).await
        }

        async fn with_config(llm: ScriptedCompletion, adjust: impl FnOnce(&mut Config)) -> Self {
            let (db, dir) = temp_pool().await;
            let mut config = Config::for_tests("sqlite::memory:");
            adjust(&mut config);
            let llm = Arc::new(llm);
            let state = AppState {
                db,
                llm: llm.clone(),
                http: reqwest::Client::new(),
                config,
            };
            TestApp {
                state,
                llm,
                _dir: dir,
            }
        }

        async fn send(&self, request: Request<Body>) -> Response {
            build_router(self.state.clone()).oneshot(request).await.unwrap()
        }

        async fn get(&self, uri: &str) -> Response {
            self.send(Request::get(uri).body(Body::empty()).unwrap()).await
        }

        async fn send_json(&self, method: &str, uri: &str, body: Value) -> Response {
            let request = Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap();
            self.send(request).await
        }

        async fn seed_vacancy(&self, id: i64, criteria: Option<&str>) {
            let response = self
                .send_json(
                    "POST",
                    "/api/vacancies",
                    json!({"id": id, "user_id": "u1", "title": "Rust Engineer", "pro_talk_criteria": criteria}),
                )
                .await;
            assert_eq!(response.status(), StatusCode::OK);
        }
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn multipart_upload(filename: &str, file: &[u8], user_id: &str, vacancy_id: &str) -> Request<Body> {
        let mut body = Vec::new();
        for (name, value) in [("user_id", user_id), ("vacancy_id", vacancy_id)] {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(file);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::post("/api/upload_resume")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    const ACCEPT_FOUR: &str = r#"{"verdict": "accept", "reason": "Strong match", "matches_count": 4, "matched_criteria": ["Rust", "SQL", "Docker", "English"]}"#;

    #[tokio::test]
    async fn test_root_and_health() {
        let app = TestApp::new(ScriptedCompletion::default()).await;

        let root = body_json(app.get("/").await).await;
        assert_eq!(root["message"], "HR Assistant backend is running");

        let health = app.get("/health").await;
        assert_eq!(health.status(), StatusCode::OK);
        let health = body_json(health).await;
        assert_eq!(health["status"], "ok");
        assert_eq!(health["service"], "hr-api");
    }

    #[tokio::test]
    async fn test_profile_is_created_on_first_read_and_updated() {
        let app = TestApp::new(ScriptedCompletion::default()).await;

        let profile = body_json(app.get("/api/profile/u1").await).await;
        assert_eq!(profile["id"], "u1");
        assert_eq!(profile["telegram_chat_ids"], json!([]));
        assert_eq!(profile["is_paid"], false);

        let updated = app
            .send_json(
                "PUT",
                "/api/profile/u1",
                json!({"company_name": "Acme", "telegram_chat_ids": [1001], "is_paid": true}),
            )
            .await;
        assert_eq!(updated.status(), StatusCode::OK);
        let updated = body_json(updated).await;
        assert_eq!(updated["company_name"], "Acme");
        assert_eq!(updated["telegram_chat_ids"], json!([1001]));
        assert_eq!(updated["is_paid"], true);
        assert!(updated.get("email_access_token").is_none());
    }

    #[tokio::test]
    async fn test_vacancy_crud() {
        let app = TestApp::new(ScriptedCompletion::default()).await;
        app.seed_vacancy(101, Some("1. Rust")).await;

        let list = body_json(app.get("/api/vacancies/list/u1").await).await;
        assert_eq!(list.as_array().unwrap().len(), 1);

        let vacancy = body_json(app.get("/api/vacancies/101/u1").await).await;
        assert_eq!(vacancy["title"], "Rust Engineer");
        assert_eq!(vacancy["pro_talk_criteria"], "1. Rust");

        let missing = app.get("/api/vacancies/999/u1").await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(missing).await["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_candidate_analysis_round_trips_as_object() {
        let app = TestApp::new(ScriptedCompletion::default()).await;
        let saved = app
            .send_json(
                "POST",
                "/api/candidates",
                json!({
                    "id": 555,
                    "user_id": "u1",
                    "vacancy_id": 101,
                    "full_name": "Ivan Petrov",
                    "analysis_result": {"status": "success", "verdict": "reject"}
                }),
            )
            .await;
        assert_eq!(body_json(saved).await, json!({"success": true}));

        let candidate = body_json(app.get("/api/candidates/555/u1").await).await;
        assert_eq!(candidate["full_name"], "Ivan Petrov");
        assert_eq!(candidate["analysis_result"]["verdict"], "reject");

        let list = body_json(app.get("/api/candidates/list/u1/101").await).await;
        assert_eq!(list.as_array().unwrap().len(), 1);

        assert_eq!(app.get("/api/candidates/555/u2").await.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_analyze_requires_full_resume() {
        let app = TestApp::new(ScriptedCompletion::default()).await;
        for body in [json!({}), json!({"full_resume": null, "criteria": "Rust"})] {
            let response = app.send_json("POST", "/api/analyze", body).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
        assert!(app.llm.requests().is_empty());
    }

    #[tokio::test]
    async fn test_analyze_applies_policy() {
        let app = TestApp::new(ScriptedCompletion::with_replies([
            r#"{"verdict": "accept", "reason": "ok", "matches_count": 2, "matched_criteria": ["Rust", "SQL"]}"#,
        ]))
        .await;

        let response = app
            .send_json(
                "POST",
                "/api/analyze",
                json!({
                    "full_resume": {"skill_set": ["Rust", "SQL"]},
                    "criteria": "1. Rust\n2. SQL\n3. Kafka"
                }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let result = body_json(response).await;
        assert_eq!(result["status"], "success");
        assert_eq!(result["verdict"], "reject");
        assert_eq!(result["matches_count"], 2);

        let prompt = &app.llm.requests()[0].prompt;
        assert!(prompt.contains("Rust, SQL"));
        assert!(prompt.contains("3. Kafka"));
    }

    #[tokio::test]
    async fn test_analyze_tolerates_wrong_section_types() {
        let app = TestApp::new(ScriptedCompletion::with_replies([r#"{"verdict": "reject"}"#])).await;
        let response = app
            .send_json(
                "POST",
                "/api/analyze",
                json!({"full_resume": {"skill_set": "Rust", "experience": {"position": "Dev"}}}),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["verdict"], "reject");
        assert!(app.llm.requests()[0].prompt.contains(NO_DATA_SENTINEL));
    }

    #[tokio::test]
    async fn test_analyze_model_failure_is_still_200() {
        let app = TestApp::new(ScriptedCompletion::with_replies(["not json"])).await;
        let response = app
            .send_json("POST", "/api/analyze", json!({"full_resume": {}}))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let result = body_json(response).await;
        assert_eq!(result["status"], "error");
        assert_eq!(result["verdict"], "error");
    }

    #[tokio::test]
    async fn test_generate_vacancy() {
        let app = TestApp::new(ScriptedCompletion::with_replies([
            r#"{"hard_skills": ["Rust", "Tokio"], "soft_skills": ["Ownership"], "description": "Backend", "criteria": ["1. Rust", "2. Tokio"]}"#,
        ]))
        .await;

        let blank = app
            .send_json("POST", "/api/vacancies/generate", json!({"title": "  "}))
            .await;
        assert_eq!(blank.status(), StatusCode::BAD_REQUEST);

        let profile = body_json(
            app.send_json("POST", "/api/vacancies/generate", json!({"title": "Rust Engineer"}))
                .await,
        )
        .await;
        assert_eq!(profile["status"], "success");
        assert_eq!(profile["hard_skills"], "Rust, Tokio");
        assert_eq!(profile["criteria"], "1. Rust\n2. Tokio");
        assert_eq!(app.llm.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_upload_screens_and_stores_candidate() {
        let app = TestApp::new(ScriptedCompletion::with_replies([ACCEPT_FOUR])).await;
        app.seed_vacancy(101, Some("1. Rust\n2. SQL\n3. Docker")).await;

        let docx = build_docx(&["Ivan Petrov", "Senior Rust developer"]);
        let response = app.send(multipart_upload("ivan.docx", &docx, "u1", "101")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["filename"], "ivan.docx");
        assert_eq!(body["text"], "Ivan Petrov\nSenior Rust developer...");
        assert_eq!(body["analysis"]["verdict"], "accept");

        let prompt = &app.llm.requests()[0].prompt;
        assert!(prompt.contains("Senior Rust developer"));
        assert!(prompt.contains("3. Docker"));

        let candidates = body_json(app.get("/api/candidates/list/u1/101").await).await;
        let candidates = candidates.as_array().unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0]["full_name"], "ivan.docx");
        assert_eq!(candidates[0]["resume_url"], "local_file");
        assert_eq!(candidates[0]["analysis_result"]["matches_count"], 4);

        let stats = body_json(app.get("/api/dashboard/stats/u1").await).await;
        assert_eq!(
            stats,
            json!({"vacancies": 1, "candidates": 1, "accepted": 1, "rejected": 0})
        );
    }

    #[tokio::test]
    async fn test_back_to_back_uploads_keep_both_candidates() {
        let app = TestApp::new(ScriptedCompletion::with_replies([
            r#"{"verdict": "reject"}"#,
            r#"{"verdict": "reject"}"#,
        ]))
        .await;
        app.seed_vacancy(101, None).await;

        let docx = build_docx(&["First resume"]);
        let pdf = build_pdf(&["Second resume", "Page two"]);
        for (filename, bytes) in [("first.docx", docx), ("second.pdf", pdf)] {
            let response = app.send(multipart_upload(filename, &bytes, "u1", "101")).await;
            assert_eq!(response.status(), StatusCode::OK);
        }

        let candidates = body_json(app.get("/api/candidates/list/u1/101").await).await;
        let mut names: Vec<&str> = candidates
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["full_name"].as_str().unwrap())
            .collect();
        names.sort();
        assert_eq!(names, vec!["first.docx", "second.pdf"]);
        assert!(app.llm.requests()[1].prompt.contains("Second resume\nPage two"));
    }

    #[tokio::test]
    async fn test_upload_rejects_unsupported_format() {
        let app = TestApp::new(ScriptedCompletion::default()).await;
        app.seed_vacancy(101, None).await;

        let response = app.send(multipart_upload("cv.txt", b"plain", "u1", "101")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"]["message"].as_str().unwrap().contains("PDF"));
        assert!(app.llm.requests().is_empty());
    }

    #[tokio::test]
    async fn test_upload_for_unknown_vacancy_is_404() {
        let app = TestApp::new(ScriptedCompletion::default()).await;
        let docx = build_docx(&["Resume"]);
        let response = app.send(multipart_upload("cv.docx", &docx, "u1", "404")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(app.llm.requests().is_empty());
    }

    #[tokio::test]
    async fn test_upload_without_criteria_uses_default() {
        let app = TestApp::new(ScriptedCompletion::with_replies([r#"{"verdict": "reject"}"#])).await;
        app.seed_vacancy(101, None).await;

        let docx = build_docx(&["Resume"]);
        let response = app.send(multipart_upload("cv.docx", &docx, "u1", "101")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(app.llm.requests()[0]
            .prompt
            .contains(crate::screening::prompts::DEFAULT_CRITERIA));
    }

    #[tokio::test]
    async fn test_oauth_start_redirects_to_provider() {
        let app = TestApp::new(ScriptedCompletion::default()).await;

        let response = app.get("/oauth/google/start?state=u1").await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        let location = response.headers()[header::LOCATION].to_str().unwrap();
        assert!(location.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(location.contains("state=u1"));

        let unknown = app.get("/oauth/outlook/start").await;
        assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_oauth_callback_failure_redirects_with_error() {
        let app = TestApp::new(ScriptedCompletion::default()).await;
        let response = app
            .get("/oauth/google/callback?error=access_denied&state=u1")
            .await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        let location = response.headers()[header::LOCATION].to_str().unwrap();
        assert!(location.starts_with("http://localhost:8000/settings?error="));
        assert!(location.contains("access_denied"));
    }

    #[tokio::test]
    async fn test_send_email_requires_connected_mailbox() {
        let app = TestApp::new(ScriptedCompletion::default()).await;
        app.get("/api/profile/u1").await;

        let response = app
            .send_json(
                "POST",
                "/api/send_email",
                json!({"user_id": "u1", "to_email": "ivan@example.com", "subject": "Hi", "body": "Hello"}),
            )
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("mailbox not connected"));
    }

    #[tokio::test]
    async fn test_hh_proxy_relays_status_and_body() {
        let upstream = Router::new().route(
            "/vacancies",
            get(|headers: axum::http::HeaderMap| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                (StatusCode::ACCEPTED, Json(json!({"items": [], "auth": auth})))
            }),
        );
        let base = spawn_upstream(upstream).await;
        let app = TestApp::with_config(ScriptedCompletion::default(), |config| {
            config.hh_api_base = base;
        })
        .await;

        let request = Request::get("/proxy/hh_api/vacancies?text=rust")
            .header(header::AUTHORIZATION, "Bearer hh")
            .body(Body::empty())
            .unwrap();
        let response = app.send(request).await;
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let body = body_json(response).await;
        assert_eq!(body["auth"], "Bearer hh");
        assert_eq!(body["items"], json!([]));
    }

    #[tokio::test]
    async fn test_static_pages_are_served() {
        let pages = tempfile::tempdir().unwrap();
        std::fs::write(pages.path().join("upload.html"), "<h1>Upload</h1>").unwrap();
        let static_dir = pages.path().to_string_lossy().to_string();
        let app = TestApp::with_config(ScriptedCompletion::default(), |config| {
            config.static_dir = static_dir;
        })
        .await;

        let page = app.get("/upload").await;
        assert_eq!(page.status(), StatusCode::OK);
        let bytes = to_bytes(page.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"<h1>Upload</h1>");

        let asset = app.get("/static/upload.html").await;
        assert_eq!(asset.status(), StatusCode::OK);

        assert_eq!(app.get("/dashboard").await.status(), StatusCode::NOT_FOUND);
    }
}
