//! Shared harness for the API integration suites: an in-process router over
//! temp directories, plus request and fixture helpers.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::util::ServiceExt;

use jobhub_api::{create_router, ApiConfig, AppState};

pub struct TestServer {
    pub app: Router,
    pub state: AppState,
    _dir: TempDir,
}

pub async fn server() -> TestServer {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = ApiConfig {
        port: 0,
        cors_origins: vec!["*".to_string()],
        jwt_secret: "integration-test-secret".to_string(),
        token_ttl_hours: 1,
        data_dir: dir.path().join("data"),
        uploads_dir: dir.path().join("uploads"),
    };
    let state = AppState::new(config).expect("app state");
    TestServer {
        app: create_router(state.clone()),
        state,
        _dir: dir,
    }
}

impl TestServer {
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .expect("request"),
            None => builder.body(Body::empty()).expect("request"),
        };

        let response = self.app.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(
        &self,
        uri: &str,
        token: Option<&str>,
        body: Value,
    ) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, token, None).await
    }

    /// Send a multipart apply request with a resume file.
    pub async fn apply_multipart(
        &self,
        token: &str,
        job_id: &str,
        cover_letter: &str,
        file_name: &str,
        file_bytes: &[u8],
    ) -> (StatusCode, Value) {
        let boundary = "integration-test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"coverLetter\"\r\n\r\n{cover_letter}\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"resume\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(file_bytes);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        let request = Request::builder()
            .method(Method::POST)
            .uri(format!("/api/jobs/{job_id}/apply"))
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .expect("request");

        let response = self.app.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    /// Register an account; returns (token, user id).
    pub async fn register(&self, name: &str, email: &str, role: &str) -> (String, String) {
        let (status, body) = self
            .post(
                "/api/users/register",
                None,
                json!({
                    "name": name,
                    "email": email,
                    "password": "secret123",
                    "role": role,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        (
            body["token"].as_str().expect("token").to_string(),
            body["user"]["id"].as_str().expect("user id").to_string(),
        )
    }

    pub async fn register_employer(&self, email: &str) -> (String, String) {
        self.register("Erin Employer", email, "employer").await
    }

    pub async fn register_seeker(&self, email: &str) -> (String, String) {
        self.register("Sam Seeker", email, "job_seeker").await
    }

    /// Create a minimal active job; returns its id.
    pub async fn create_job(&self, token: &str, title: &str, category: &str) -> String {
        let (status, body) = self
            .post(
                "/api/jobs",
                Some(token),
                json!({
                    "title": title,
                    "description": "Build and run the service",
                    "location": "Berlin",
                    "type": "full-time",
                    "category": category,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create job failed: {body}");
        body["id"].as_str().expect("job id").to_string()
    }

    /// Apply with a resume URL; returns the application body.
    pub async fn apply_with_url(
        &self,
        token: &str,
        job_id: &str,
        cover_letter: &str,
        resume_url: &str,
    ) -> Value {
        let (status, body) = self
            .post(
                &format!("/api/jobs/{job_id}/apply"),
                Some(token),
                json!({ "coverLetter": cover_letter, "resume": resume_url }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "apply failed: {body}");
        body
    }
}
