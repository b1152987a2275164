//! The API client.

use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use jobhub_models::{Job, PublicUser};

use crate::error::{ClientError, ClientResult};
use crate::types::{
    ApplicationRow, ApplicationWithScreening, AuthResponse, CreateJobRequest, DashboardResponse,
    JobFilter, JobRow, LoginRequest, MyApplication, RegisterRequest, ResumeUpload,
    ScreeningRecord, UpdateJobRequest, UpdateProfileRequest, UpsertScreeningRequest,
};

/// Client for the JobHub API.
///
/// The bearer token is part of the client value: [`ApiClient::authorized`]
/// returns a client for that session, and unauthorized clients simply have
/// no token to send. Cloning is cheap; the underlying connection pool is
/// shared.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: Client,
    token: Option<String>,
}

impl ApiClient {
    /// Create an unauthorized client for a base URL such as
    /// `http://localhost:5000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
            token: None,
        }
    }

    /// A client for the session behind `token`.
    pub fn authorized(&self, token: impl Into<String>) -> Self {
        Self {
            base_url: self.base_url.clone(),
            http: self.http.clone(),
            token: Some(token.into()),
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn bearer(&self, builder: RequestBuilder) -> ClientResult<RequestBuilder> {
        let token = self.token.as_deref().ok_or(ClientError::MissingToken)?;
        Ok(builder.bearer_auth(token))
    }

    async fn handle<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let message = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|body| {
                body.get("message")
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| status.to_string());

        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn expect_ok(response: Response) -> ClientResult<()> {
        let _: serde_json::Value = Self::handle(response).await?;
        Ok(())
    }

    // ---- Accounts -------------------------------------------------------

    /// Register an account. Call [`ApiClient::authorized`] with the returned
    /// token to act as the new user.
    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<AuthResponse> {
        let response = self
            .http
            .post(self.url("/api/users/register"))
            .json(request)
            .send()
            .await?;
        Self::handle(response).await
    }

    /// Log in with email and password.
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<AuthResponse> {
        let response = self
            .http
            .post(self.url("/api/users/login"))
            .json(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;
        Self::handle(response).await
    }

    /// The caller's own profile.
    pub async fn profile(&self) -> ClientResult<PublicUser> {
        let builder = self.http.get(self.url("/api/users/profile"));
        let response = self.bearer(builder)?.send().await?;
        Self::handle(response).await
    }

    pub async fn update_profile(
        &self,
        request: &UpdateProfileRequest,
    ) -> ClientResult<PublicUser> {
        let builder = self.http.put(self.url("/api/users/profile")).json(request);
        let response = self.bearer(builder)?.send().await?;
        Self::handle(response).await
    }

    /// Promote a user to admin. The endpoint is the server's bootstrap path
    /// and takes no authorization.
    pub async fn make_admin(&self, user_id: &str) -> ClientResult<PublicUser> {
        let response = self
            .http
            .put(self.url(&format!("/api/users/make-admin/{user_id}")))
            .send()
            .await?;
        Self::handle(response).await
    }

    // ---- Jobs -----------------------------------------------------------

    /// Publicly listed jobs, optionally filtered.
    pub async fn jobs(&self, filter: &JobFilter) -> ClientResult<Vec<JobRow>> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(category) = &filter.category {
            query.push(("category", category.clone()));
        }
        if let Some(job_type) = &filter.job_type {
            query.push(("type", job_type.clone()));
        }
        if let Some(location) = &filter.location {
            query.push(("location", location.clone()));
        }
        if let Some(search) = &filter.search {
            query.push(("search", search.clone()));
        }
        if let Some(limit) = filter.limit {
            query.push(("limit", limit.to_string()));
        }

        let response = self
            .http
            .get(self.url("/api/jobs"))
            .query(&query)
            .send()
            .await?;
        Self::handle(response).await
    }

    /// One job with owner fields and applications joined in.
    pub async fn job(&self, id: &str) -> ClientResult<serde_json::Value> {
        let response = self.http.get(self.url(&format!("/api/jobs/{id}"))).send().await?;
        Self::handle(response).await
    }

    pub async fn create_job(&self, request: &CreateJobRequest) -> ClientResult<Job> {
        let builder = self.http.post(self.url("/api/jobs")).json(request);
        let response = self.bearer(builder)?.send().await?;
        Self::handle(response).await
    }

    pub async fn update_job(&self, id: &str, request: &UpdateJobRequest) -> ClientResult<Job> {
        let builder = self
            .http
            .put(self.url(&format!("/api/jobs/{id}")))
            .json(request);
        let response = self.bearer(builder)?.send().await?;
        Self::handle(response).await
    }

    pub async fn delete_job(&self, id: &str) -> ClientResult<()> {
        let builder = self.http.delete(self.url(&format!("/api/jobs/{id}")));
        let response = self.bearer(builder)?.send().await?;
        Self::expect_ok(response).await
    }

    /// Apply to a job. Files go up as multipart; a URL resume goes as JSON.
    pub async fn apply(
        &self,
        job_id: &str,
        cover_letter: &str,
        resume: ResumeUpload,
    ) -> ClientResult<ApplicationRow> {
        debug!(job = job_id, "Submitting application");
        let url = self.url(&format!("/api/jobs/{job_id}/apply"));

        let builder = match resume {
            ResumeUpload::File { name, bytes } => {
                let form = Form::new()
                    .text("coverLetter", cover_letter.to_string())
                    .part("resume", Part::bytes(bytes).file_name(name));
                self.http.post(url).multipart(form)
            }
            ResumeUpload::Url(resume_url) => self.http.post(url).json(&serde_json::json!({
                "coverLetter": cover_letter,
                "resume": resume_url,
            })),
        };

        let response = self.bearer(builder)?.send().await?;
        Self::handle(response).await
    }

    // ---- Applications ---------------------------------------------------

    /// The caller's own applications.
    pub async fn my_applications(&self) -> ClientResult<Vec<MyApplication>> {
        let builder = self.http.get(self.url("/api/applications/my-applications"));
        let response = self.bearer(builder)?.send().await?;
        Self::handle(response).await
    }

    /// Applications for one of the caller's jobs, applicant profiles joined.
    pub async fn job_applications(&self, job_id: &str) -> ClientResult<Vec<serde_json::Value>> {
        let builder = self
            .http
            .get(self.url(&format!("/api/applications/job/{job_id}")));
        let response = self.bearer(builder)?.send().await?;
        Self::handle(response).await
    }

    pub async fn set_application_status(
        &self,
        id: &str,
        status: &str,
    ) -> ClientResult<ApplicationRow> {
        let builder = self
            .http
            .put(self.url(&format!("/api/applications/{id}/status")))
            .json(&serde_json::json!({ "status": status }));
        let response = self.bearer(builder)?.send().await?;
        Self::handle(response).await
    }

    pub async fn add_application_note(
        &self,
        id: &str,
        text: &str,
    ) -> ClientResult<ApplicationRow> {
        let builder = self
            .http
            .post(self.url(&format!("/api/applications/{id}/notes")))
            .json(&serde_json::json!({ "text": text }));
        let response = self.bearer(builder)?.send().await?;
        Self::handle(response).await
    }

    // ---- Screening ------------------------------------------------------

    /// Every application for a job with its screening (or the pending stub).
    pub async fn job_screenings(
        &self,
        job_id: &str,
    ) -> ClientResult<Vec<ApplicationWithScreening>> {
        let builder = self
            .http
            .get(self.url(&format!("/api/screening/jobs/{job_id}/screenings")));
        let response = self.bearer(builder)?.send().await?;
        Self::handle(response).await
    }

    pub async fn application_screening(
        &self,
        application_id: &str,
    ) -> ClientResult<ApplicationWithScreening> {
        let builder = self.http.get(self.url(&format!(
            "/api/screening/applications/{application_id}/screening"
        )));
        let response = self.bearer(builder)?.send().await?;
        Self::handle(response).await
    }

    pub async fn upsert_screening(
        &self,
        application_id: &str,
        request: &UpsertScreeningRequest,
    ) -> ClientResult<ScreeningRecord> {
        let builder = self
            .http
            .put(self.url(&format!(
                "/api/screening/applications/{application_id}/screening"
            )))
            .json(request);
        let response = self.bearer(builder)?.send().await?;
        Self::handle(response).await
    }

    pub async fn delete_screening(&self, application_id: &str) -> ClientResult<()> {
        let builder = self.http.delete(self.url(&format!(
            "/api/screening/applications/{application_id}/screening"
        )));
        let response = self.bearer(builder)?.send().await?;
        Self::expect_ok(response).await
    }

    // ---- Admin ----------------------------------------------------------

    pub async fn admin_dashboard(&self) -> ClientResult<DashboardResponse> {
        let builder = self.http.get(self.url("/api/admin/dashboard"));
        let response = self.bearer(builder)?.send().await?;
        Self::handle(response).await
    }

    pub async fn admin_users(&self) -> ClientResult<Vec<PublicUser>> {
        let builder = self.http.get(self.url("/api/admin/users"));
        let response = self.bearer(builder)?.send().await?;
        Self::handle(response).await
    }

    pub async fn admin_delete_user(&self, id: &str) -> ClientResult<()> {
        let builder = self.http.delete(self.url(&format!("/api/admin/users/{id}")));
        let response = self.bearer(builder)?.send().await?;
        Self::expect_ok(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:5000/");
        assert_eq!(client.url("/health"), "http://localhost:5000/health");
    }

    #[test]
    fn test_unauthorized_client_has_no_token() {
        let client = ApiClient::new("http://localhost:5000");
        assert!(client.token().is_none());

        let session = client.authorized("abc");
        assert_eq!(session.token(), Some("abc"));
        // The original client is untouched; credentials never leak between
        // sessions.
        assert!(client.token().is_none());
    }
}
