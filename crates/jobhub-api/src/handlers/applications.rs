//! Application handlers: the employer's per-job view and review actions,
//! and the seeker's own-application view.

use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use jobhub_models::{
    Application, ApplicationNote, ApplicationStatus, Education, Experience, Job, JobStatus,
    JobType, UserId,
};

use crate::auth::{Employer, JobSeeker};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Applicant fields an employer sees when reviewing.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub skills: Vec<String>,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
}

impl ApplicantProfile {
    pub(crate) fn from_user(user: jobhub_models::User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            skills: user.skills,
            experience: user.experience,
            education: user.education,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationWithApplicant {
    pub id: String,
    pub job: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicant: Option<ApplicantProfile>,
    pub cover_letter: String,
    pub resume: String,
    pub resume_file_name: String,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
}

impl ApplicationWithApplicant {
    fn new(app: Application, applicant: Option<ApplicantProfile>) -> Self {
        Self {
            id: app.id.to_string(),
            job: app.job.to_string(),
            applicant,
            cover_letter: app.cover_letter,
            resume: app.resume,
            resume_file_name: app.resume_file_name,
            status: app.status,
            applied_at: app.applied_at,
        }
    }
}

/// Load a job and refuse callers other than its owner.
async fn owned_job(state: &AppState, job_id: &str, owner: &UserId) -> ApiResult<Job> {
    let job = state
        .store
        .jobs
        .get(job_id)
        .await
        .ok_or_else(|| ApiError::not_found("Job not found"))?;
    if !job.is_owned_by(owner) {
        return Err(ApiError::forbidden("Not authorized"));
    }
    Ok(job)
}

/// List every application for one of the caller's jobs, applicant profiles
/// joined in.
pub async fn job_applications(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    Employer(user): Employer,
) -> ApiResult<Json<Vec<ApplicationWithApplicant>>> {
    let job = owned_job(&state, &job_id, &user.id).await?;

    let mut rows = Vec::new();
    for app in state.store.applications_for_job(&job.id).await {
        let applicant = state
            .store
            .users
            .get(app.applicant.as_str())
            .await
            .map(ApplicantProfile::from_user);
        rows.push(ApplicationWithApplicant::new(app, applicant));
    }
    rows.sort_by(|a, b| b.applied_at.cmp(&a.applied_at));

    Ok(Json(rows))
}

/// Job fields a seeker sees on their own applications.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedJobSummary {
    pub id: String,
    pub title: String,
    pub location: String,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MyApplication {
    pub id: String,
    pub cover_letter: String,
    pub resume: String,
    pub resume_file_name: String,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job: Option<AppliedJobSummary>,
}

/// List the caller's own applications, newest first, with the job and its
/// company name joined in.
pub async fn my_applications(
    State(state): State<AppState>,
    JobSeeker(user): JobSeeker,
) -> ApiResult<Json<Vec<MyApplication>>> {
    let mut apps = state.store.applications_by_applicant(&user.id).await;
    apps.sort_by(|a, b| b.applied_at.cmp(&a.applied_at));

    let mut rows = Vec::with_capacity(apps.len());
    for app in apps {
        let job = match state.store.jobs.get(app.job.as_str()).await {
            Some(job) => {
                let company_name = state
                    .store
                    .users
                    .get(job.company.as_str())
                    .await
                    .and_then(|owner| owner.company_name);
                Some(AppliedJobSummary {
                    id: job.id.to_string(),
                    title: job.title,
                    location: job.location,
                    job_type: job.job_type,
                    status: job.status,
                    company_name,
                })
            }
            None => None,
        };
        rows.push(MyApplication {
            id: app.id.to_string(),
            cover_letter: app.cover_letter,
            resume: app.resume,
            resume_file_name: app.resume_file_name,
            status: app.status,
            applied_at: app.applied_at,
            job,
        });
    }

    Ok(Json(rows))
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// Overwrite an application's status. Any of the five values may replace
/// any other; there is no transition graph.
pub async fn update_application_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Employer(user): Employer,
    Json(request): Json<UpdateStatusRequest>,
) -> ApiResult<Json<Application>> {
    let status: ApplicationStatus = request.status.parse().map_err(|_| {
        let allowed: Vec<&str> = ApplicationStatus::ALL.iter().map(|s| s.as_str()).collect();
        ApiError::validation(format!(
            "Invalid status. Must be one of: {}",
            allowed.join(", ")
        ))
    })?;

    let mut application = state
        .store
        .applications
        .get(&id)
        .await
        .ok_or_else(|| ApiError::not_found("Application not found"))?;

    owned_job(&state, application.job.as_str(), &user.id).await?;

    application.status = status;
    let application = state.store.applications.put(application).await?;
    info!(application = %application.id, status = %application.status, "Updated application status");

    Ok(Json(application))
}

#[derive(Deserialize)]
pub struct AddNoteRequest {
    pub text: String,
}

/// Append a note to an application; only the owning employer may.
pub async fn add_application_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Employer(user): Employer,
    Json(request): Json<AddNoteRequest>,
) -> ApiResult<Json<Application>> {
    if request.text.is_empty() {
        return Err(ApiError::validation("Note text is required"));
    }

    let mut application = state
        .store
        .applications
        .get(&id)
        .await
        .ok_or_else(|| ApiError::not_found("Application not found"))?;

    owned_job(&state, application.job.as_str(), &user.id).await?;

    application.notes.push(ApplicationNote {
        text: request.text,
        added_by: user.id,
        added_at: Utc::now(),
    });
    let application = state.store.applications.put(application).await?;

    Ok(Json(application))
}
