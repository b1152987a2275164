//! Job posting handlers: public listing/detail, employer CRUD, and the
//! job seeker's apply flow.

use axum::extract::{FromRequest, Multipart, Path, Query, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use jobhub_models::{
    Application, ApplicationStatus, Job, JobStatus, JobType, Salary, UserId,
};

use crate::auth::{Employer, JobSeeker};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Owner fields attached to each public listing row.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanySummary {
    pub id: UserId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListItem {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<CompanySummary>,
    pub location: String,
    #[serde(rename = "type")]
    pub job_type: JobType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<Salary>,
    pub requirements: Vec<String>,
    pub skills: Vec<String>,
    pub category: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl JobListItem {
    fn from_job(job: Job, company: Option<CompanySummary>) -> Self {
        Self {
            id: job.id.to_string(),
            title: job.title,
            description: job.description,
            company,
            location: job.location,
            job_type: job.job_type,
            salary: job.salary,
            requirements: job.requirements,
            skills: job.skills,
            category: job.category,
            status: job.status,
            created_at: job.created_at,
            expires_at: job.expires_at,
        }
    }
}

#[derive(Deserialize)]
pub struct JobsQuery {
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub job_type: Option<String>,
    pub location: Option<String>,
    pub search: Option<String>,
    pub limit: Option<usize>,
}

/// List publicly visible jobs, newest first. Only active postings appear;
/// category and type match exactly, location by case-insensitive substring,
/// search across title and description.
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobsQuery>,
) -> ApiResult<Json<Vec<JobListItem>>> {
    let location = query.location.as_deref().map(str::to_lowercase);
    let search = query.search.as_deref().map(str::to_lowercase);

    let mut jobs = state
        .store
        .jobs
        .find(|job| {
            job.status == JobStatus::Active
                && query
                    .category
                    .as_deref()
                    .map_or(true, |c| job.category == c)
                && query
                    .job_type
                    .as_deref()
                    .map_or(true, |t| job.job_type.as_str() == t)
                && location
                    .as_deref()
                    .map_or(true, |l| job.location.to_lowercase().contains(l))
                && search.as_deref().map_or(true, |s| {
                    job.title.to_lowercase().contains(s)
                        || job.description.to_lowercase().contains(s)
                })
        })
        .await;

    jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    if let Some(limit) = query.limit {
        jobs.truncate(limit);
    }

    let mut rows = Vec::with_capacity(jobs.len());
    for job in jobs {
        let company = company_summary(&state, &job.company).await;
        rows.push(JobListItem::from_job(job, company));
    }

    Ok(Json(rows))
}

async fn company_summary(state: &AppState, owner: &UserId) -> Option<CompanySummary> {
    state.store.users.get(owner.as_str()).await.map(|user| CompanySummary {
        id: user.id,
        name: user.name,
        company_name: user.company_name,
    })
}

/// Owner fields on the public detail view.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    pub id: UserId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_website: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantSummary {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulatedApplication {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicant: Option<ApplicantSummary>,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDetail {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<CompanyProfile>,
    pub location: String,
    #[serde(rename = "type")]
    pub job_type: JobType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<Salary>,
    pub requirements: Vec<String>,
    pub skills: Vec<String>,
    pub category: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub applications: Vec<PopulatedApplication>,
}

/// Fetch one job with its owner's public company fields and the
/// applications received so far.
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<JobDetail>> {
    let job = state
        .store
        .jobs
        .get(&id)
        .await
        .ok_or_else(|| ApiError::not_found("Job not found"))?;

    let company = state
        .store
        .users
        .get(job.company.as_str())
        .await
        .map(|user| CompanyProfile {
            id: user.id,
            name: user.name,
            company_name: user.company_name,
            company_description: user.company_description,
            company_website: user.company_website,
        });

    let mut applications = Vec::new();
    for app in state.store.applications_for_job(&job.id).await {
        let applicant = state
            .store
            .users
            .get(app.applicant.as_str())
            .await
            .map(|user| ApplicantSummary {
                id: user.id,
                name: user.name,
                email: user.email,
            });
        applications.push(PopulatedApplication {
            id: app.id.to_string(),
            applicant,
            status: app.status,
            applied_at: app.applied_at,
        });
    }
    applications.sort_by(|a, b| b.applied_at.cmp(&a.applied_at));

    Ok(Json(JobDetail {
        id: job.id.to_string(),
        title: job.title,
        description: job.description,
        company,
        location: job.location,
        job_type: job.job_type,
        salary: job.salary,
        requirements: job.requirements,
        skills: job.skills,
        category: job.category,
        status: job.status,
        created_at: job.created_at,
        expires_at: job.expires_at,
        applications,
    }))
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[validate(length(min = 1, message = "Location is required"))]
    pub location: String,
    #[serde(rename = "type")]
    pub job_type: JobType,
    #[validate(length(min = 1, message = "Category is required"))]
    pub category: String,
    #[serde(default)]
    pub salary: Option<Salary>,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub status: Option<JobStatus>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Create a job owned by the calling employer.
pub async fn create_job(
    State(state): State<AppState>,
    Employer(user): Employer,
    Json(request): Json<CreateJobRequest>,
) -> ApiResult<(StatusCode, Json<Job>)> {
    request.validate()?;

    let mut job = Job::new(
        request.title,
        request.description,
        user.id,
        request.location,
        request.job_type,
        request.category,
    );
    job.salary = request.salary;
    job.requirements = request.requirements;
    job.skills = request.skills;
    if let Some(status) = request.status {
        job.status = status;
    }
    job.expires_at = request.expires_at;

    let job = state.store.jobs.insert(job).await?;
    info!(job = %job.id, owner = %job.company, "Created job");

    Ok((StatusCode::CREATED, Json(job)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub job_type: Option<JobType>,
    pub category: Option<String>,
    pub salary: Option<Salary>,
    pub requirements: Option<Vec<String>>,
    pub skills: Option<Vec<String>>,
    pub status: Option<JobStatus>,
    pub expires_at: Option<DateTime<Utc>>,
}

fn apply_job_update(job: &mut Job, request: UpdateJobRequest) {
    if let Some(title) = request.title {
        job.title = title;
    }
    if let Some(description) = request.description {
        job.description = description;
    }
    if let Some(location) = request.location {
        job.location = location;
    }
    if let Some(job_type) = request.job_type {
        job.job_type = job_type;
    }
    if let Some(category) = request.category {
        job.category = category;
    }
    if let Some(salary) = request.salary {
        job.salary = Some(salary);
    }
    if let Some(requirements) = request.requirements {
        job.requirements = requirements;
    }
    if let Some(skills) = request.skills {
        job.skills = skills;
    }
    if let Some(status) = request.status {
        job.status = status;
    }
    if let Some(expires_at) = request.expires_at {
        job.expires_at = Some(expires_at);
    }
}

/// Update a job; only its owner may.
pub async fn update_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Employer(user): Employer,
    Json(request): Json<UpdateJobRequest>,
) -> ApiResult<Json<Job>> {
    let mut job = state
        .store
        .jobs
        .get(&id)
        .await
        .ok_or_else(|| ApiError::not_found("Job not found"))?;

    if !job.is_owned_by(&user.id) {
        return Err(ApiError::forbidden("Not authorized to update this job"));
    }

    apply_job_update(&mut job, request);
    let job = state.store.jobs.put(job).await?;
    Ok(Json(job))
}

/// Delete a job; only its owner may.
pub async fn delete_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Employer(user): Employer,
) -> ApiResult<Json<serde_json::Value>> {
    let job = state
        .store
        .jobs
        .get(&id)
        .await
        .ok_or_else(|| ApiError::not_found("Job not found"))?;

    if !job.is_owned_by(&user.id) {
        return Err(ApiError::forbidden("Not authorized to delete this job"));
    }

    state.store.jobs.remove(&id).await?;
    Ok(Json(serde_json::json!({ "message": "Job removed" })))
}

/// Resume input for an application: an uploaded file, or a URL fallback.
struct ResumeInput {
    cover_letter: Option<String>,
    file: Option<(String, Vec<u8>)>,
    url: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApplyJson {
    cover_letter: Option<String>,
    resume: Option<String>,
}

/// The apply endpoint accepts either multipart (file upload) or plain JSON
/// (resume URL); both carry an optional cover letter.
async fn read_resume_input(state: &AppState, request: Request) -> ApiResult<ResumeInput> {
    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map_or(false, |ct| ct.starts_with("multipart/form-data"));

    if is_multipart {
        let mut multipart = Multipart::from_request(request, state)
            .await
            .map_err(|e| ApiError::validation(format!("Invalid multipart body: {e}")))?;

        let mut input = ResumeInput {
            cover_letter: None,
            file: None,
            url: None,
        };
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::validation(format!("Invalid multipart body: {e}")))?
        {
            match field.name() {
                Some("coverLetter") => {
                    input.cover_letter = Some(field.text().await.map_err(|e| {
                        ApiError::validation(format!("Invalid multipart body: {e}"))
                    })?);
                }
                Some("resume") => {
                    let file_name = field.file_name().map(str::to_string);
                    match file_name {
                        Some(name) => {
                            let bytes = field.bytes().await.map_err(|e| {
                                ApiError::validation(format!("Invalid multipart body: {e}"))
                            })?;
                            input.file = Some((name, bytes.to_vec()));
                        }
                        None => {
                            input.url = Some(field.text().await.map_err(|e| {
                                ApiError::validation(format!("Invalid multipart body: {e}"))
                            })?);
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(input)
    } else {
        let Json(body): Json<ApplyJson> = Json::from_request(request, state)
            .await
            .map_err(|e| ApiError::validation(format!("Invalid request body: {e}")))?;
        Ok(ResumeInput {
            cover_letter: body.cover_letter,
            file: None,
            url: body.resume,
        })
    }
}

/// Apply to a job.
///
/// A still-pending application by the same seeker is overwritten in place
/// (same id, refreshed timestamp); one that has already been decided refuses
/// further edits. The resume file is stored before the application document
/// is written, so a failed document write can orphan the file.
pub async fn apply_for_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JobSeeker(user): JobSeeker,
    request: Request,
) -> ApiResult<Json<Application>> {
    let mut job = state
        .store
        .jobs
        .get(&id)
        .await
        .ok_or_else(|| ApiError::not_found("Job not found"))?;

    let input = read_resume_input(&state, request).await?;

    if let Some(mut existing) = state.store.application_for(&job.id, &user.id).await {
        if !existing.is_pending() {
            return Err(ApiError::conflict(
                "Cannot update application. Application has already been processed.",
            ));
        }

        if let Some((name, bytes)) = &input.file {
            let stored = state.uploads.save_resume(name, bytes).await?;
            existing.resume = stored.public_path;
            existing.resume_file_name = stored.file_name;
        } else if let Some(url) = input.url {
            existing.resume = url;
        }
        if let Some(cover_letter) = input.cover_letter {
            existing.cover_letter = cover_letter;
        }
        existing.applied_at = Utc::now();

        let updated = state.store.applications.put(existing).await?;
        return Ok(Json(updated));
    }

    let (resume, resume_file_name) = match (&input.file, &input.url) {
        (Some((name, bytes)), _) => {
            let stored = state.uploads.save_resume(name, bytes).await?;
            (stored.public_path, stored.file_name)
        }
        (None, Some(url)) => (url.clone(), String::new()),
        (None, None) => return Err(ApiError::validation("Resume is required")),
    };

    let application = Application::new(
        job.id.clone(),
        user.id,
        input.cover_letter.unwrap_or_default(),
        resume,
        resume_file_name,
    );
    let application = state.store.applications.insert(application).await?;

    job.applications.push(application.id.clone());
    state.store.jobs.put(job).await?;

    info!(application = %application.id, job = %application.job, "Received application");
    Ok(Json(application))
}
