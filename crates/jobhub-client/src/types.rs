//! API request/response types as the client sees them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use jobhub_models::{
    ApplicationStatus, Education, Experience, JobStatus, JobType, PublicUser, Role, Salary,
    ScreeningStatus,
};

/// Token plus public account fields, as returned by register and login.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: PublicUser,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<Vec<Experience>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education: Option<Vec<Education>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_website: Option<String>,
}

/// Filters for the public job listing.
#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    pub category: Option<String>,
    pub job_type: Option<String>,
    pub location: Option<String>,
    pub search: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanySummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub company_name: Option<String>,
}

/// One row of the public job listing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRow {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub company: Option<CompanySummary>,
    pub location: String,
    #[serde(rename = "type")]
    pub job_type: JobType,
    #[serde(default)]
    pub salary: Option<Salary>,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    pub category: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    pub title: String,
    pub description: String,
    pub location: String,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<Salary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub requirements: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub job_type: Option<JobType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<Salary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
}

/// Resume input for an application: a file to upload, or a URL.
#[derive(Debug, Clone)]
pub enum ResumeUpload {
    File { name: String, bytes: Vec<u8> },
    Url(String),
}

/// An application as returned by apply and the review endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRow {
    pub id: String,
    pub job: String,
    pub applicant: String,
    #[serde(default)]
    pub cover_letter: String,
    pub resume: String,
    #[serde(default)]
    pub resume_file_name: String,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub screening_status: ScreeningStatus,
    pub applied_at: DateTime<Utc>,
}

/// Job fields joined onto the seeker's own applications.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedJobSummary {
    pub id: String,
    pub title: String,
    pub location: String,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub status: JobStatus,
    #[serde(default)]
    pub company_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MyApplication {
    pub id: String,
    #[serde(default)]
    pub cover_letter: String,
    pub resume: String,
    #[serde(default)]
    pub resume_file_name: String,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    #[serde(default)]
    pub job: Option<AppliedJobSummary>,
}

/// Screening fields as joined onto an application.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreeningView {
    pub status: ScreeningStatus,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub screened_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationWithScreening {
    pub id: String,
    pub job: String,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    pub screening: ScreeningView,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpsertScreeningRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreeningRecord {
    pub id: String,
    pub application_id: String,
    pub status: ScreeningStatus,
    #[serde(default)]
    pub notes: String,
    pub screened_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: usize,
    pub total_jobs: usize,
    pub total_applications: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub stats: DashboardStats,
    pub recent_users: Vec<PublicUser>,
    pub recent_jobs: Vec<serde_json::Value>,
    pub recent_applications: Vec<serde_json::Value>,
}
