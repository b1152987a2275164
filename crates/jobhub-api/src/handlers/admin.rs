//! Admin handlers: dashboard aggregation and unrestricted CRUD over users,
//! jobs, and applications. Every handler takes the [`Admin`] guard; that is
//! the single authorization gate for the whole surface.

use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use jobhub_models::{
    Application, ApplicationStatus, Job, JobStatus, JobType, PublicUser, Role, Salary, UserId,
};

use crate::auth::Admin;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: usize,
    pub total_jobs: usize,
    pub total_applications: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentApplication {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicant: Option<UserSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job: Option<JobSummary>,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSummary {
    pub id: String,
    pub title: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub stats: DashboardStats,
    pub recent_users: Vec<PublicUser>,
    pub recent_jobs: Vec<Job>,
    pub recent_applications: Vec<RecentApplication>,
}

const RECENT_LIMIT: usize = 5;

/// Totals plus the five most recent of each record kind.
pub async fn dashboard(
    State(state): State<AppState>,
    Admin(_): Admin,
) -> ApiResult<Json<DashboardResponse>> {
    let stats = DashboardStats {
        total_users: state.store.users.count().await,
        total_jobs: state.store.jobs.count().await,
        total_applications: state.store.applications.count().await,
    };

    let mut users = state.store.users.all().await;
    users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let recent_users = users
        .iter()
        .take(RECENT_LIMIT)
        .map(|user| user.public())
        .collect();

    let mut jobs = state.store.jobs.all().await;
    jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    jobs.truncate(RECENT_LIMIT);

    let mut apps = state.store.applications.all().await;
    apps.sort_by(|a, b| b.applied_at.cmp(&a.applied_at));
    apps.truncate(RECENT_LIMIT);

    let mut recent_applications = Vec::with_capacity(apps.len());
    for app in apps {
        let applicant = state
            .store
            .users
            .get(app.applicant.as_str())
            .await
            .map(|user| UserSummary {
                id: user.id,
                name: user.name,
                email: user.email,
            });
        let job = state
            .store
            .jobs
            .get(app.job.as_str())
            .await
            .map(|job| JobSummary {
                id: job.id.to_string(),
                title: job.title,
            });
        recent_applications.push(RecentApplication {
            id: app.id.to_string(),
            applicant,
            job,
            status: app.status,
            applied_at: app.applied_at,
        });
    }

    Ok(Json(DashboardResponse {
        stats,
        recent_users,
        recent_jobs: jobs,
        recent_applications,
    }))
}

/// List every account, hashes excluded.
pub async fn list_users(
    State(state): State<AppState>,
    Admin(_): Admin,
) -> ApiResult<Json<Vec<PublicUser>>> {
    let mut users = state.store.users.all().await;
    users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(Json(users.iter().map(|user| user.public()).collect()))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Admin(_): Admin,
) -> ApiResult<Json<PublicUser>> {
    let user = state
        .store
        .users
        .get(&id)
        .await
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(user.public()))
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AdminUpdateUserRequest {
    pub name: Option<String>,
    #[validate(email(message = "A valid email is required"))]
    pub email: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
}

/// Update an account. The admin role can only be *kept* here, never
/// granted: promotion goes through make-admin alone.
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Admin(_): Admin,
    Json(request): Json<AdminUpdateUserRequest>,
) -> ApiResult<Json<AdminUserResponse>> {
    request.validate()?;

    let mut user = state
        .store
        .users
        .get(&id)
        .await
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if request.role == Some(Role::Admin) && user.role != Role::Admin {
        return Err(ApiError::forbidden(
            "Cannot assign admin role to non-admin users",
        ));
    }

    if let Some(name) = request.name {
        user.name = name;
    }
    if let Some(email) = request.email {
        let email = email.to_lowercase();
        let taken = state
            .store
            .user_by_email(&email)
            .await
            .is_some_and(|other| other.id != user.id);
        if taken {
            return Err(ApiError::conflict(
                "An account with this email already exists",
            ));
        }
        user.email = email;
    }
    if let Some(role) = request.role {
        user.role = role;
    }
    if let Some(is_active) = request.is_active {
        user.is_active = is_active;
    }

    let user = state.store.users.put(user).await?;
    Ok(Json(AdminUserResponse {
        id: user.id,
        name: user.name,
        email: user.email,
        role: user.role,
        is_active: user.is_active,
    }))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Admin(_): Admin,
) -> ApiResult<Json<serde_json::Value>> {
    if state.store.users.get(&id).await.is_none() {
        return Err(ApiError::not_found("User not found"));
    }
    state.store.users.remove(&id).await?;
    info!(user = %id, "Admin removed user");
    Ok(Json(serde_json::json!({ "message": "User removed" })))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminJobRow {
    #[serde(flatten)]
    pub job: Job,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<UserSummary>,
}

/// List every job with its owner joined in, regardless of status.
pub async fn list_jobs(
    State(state): State<AppState>,
    Admin(_): Admin,
) -> ApiResult<Json<Vec<AdminJobRow>>> {
    let mut jobs = state.store.jobs.all().await;
    jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let mut rows = Vec::with_capacity(jobs.len());
    for job in jobs {
        let owner = state
            .store
            .users
            .get(job.company.as_str())
            .await
            .map(|user| UserSummary {
                id: user.id,
                name: user.name,
                email: user.email,
            });
        rows.push(AdminJobRow { job, owner });
    }
    Ok(Json(rows))
}

pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Admin(_): Admin,
) -> ApiResult<Json<AdminJobRow>> {
    let job = state
        .store
        .jobs
        .get(&id)
        .await
        .ok_or_else(|| ApiError::not_found("Job not found"))?;
    let owner = state
        .store
        .users
        .get(job.company.as_str())
        .await
        .map(|user| UserSummary {
            id: user.id,
            name: user.name,
            email: user.email,
        });
    Ok(Json(AdminJobRow { job, owner }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryUpdate {
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub currency: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUpdateJobRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub job_type: Option<JobType>,
    pub category: Option<String>,
    pub requirements: Option<Vec<String>>,
    pub skills: Option<Vec<String>>,
    pub salary: Option<SalaryUpdate>,
    pub status: Option<JobStatus>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Overwrite any job field, nested salary fields included, regardless of
/// who owns the posting.
pub async fn update_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Admin(_): Admin,
    Json(request): Json<AdminUpdateJobRequest>,
) -> ApiResult<Json<Job>> {
    let mut job = state
        .store
        .jobs
        .get(&id)
        .await
        .ok_or_else(|| ApiError::not_found("Job not found"))?;

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
    if let Some(requirements) = request.requirements {
        job.requirements = requirements;
    }
    if let Some(skills) = request.skills {
        job.skills = skills;
    }
    if let Some(update) = request.salary {
        let salary = job.salary.get_or_insert_with(Salary::default);
        if update.min.is_some() {
            salary.min = update.min;
        }
        if update.max.is_some() {
            salary.max = update.max;
        }
        if update.currency.is_some() {
            salary.currency = update.currency;
        }
    }
    if let Some(status) = request.status {
        job.status = status;
    }
    if let Some(expires_at) = request.expires_at {
        job.expires_at = Some(expires_at);
    }

    let job = state.store.jobs.put(job).await?;
    Ok(Json(job))
}

pub async fn delete_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Admin(_): Admin,
) -> ApiResult<Json<serde_json::Value>> {
    if state.store.jobs.get(&id).await.is_none() {
        return Err(ApiError::not_found("Job not found"));
    }
    state.store.jobs.remove(&id).await?;
    info!(job = %id, "Admin removed job");
    Ok(Json(serde_json::json!({ "message": "Job removed" })))
}

/// List every application with applicant/job summaries joined in.
pub async fn list_applications(
    State(state): State<AppState>,
    Admin(_): Admin,
) -> ApiResult<Json<Vec<RecentApplication>>> {
    let mut apps = state.store.applications.all().await;
    apps.sort_by(|a, b| b.applied_at.cmp(&a.applied_at));

    let mut rows = Vec::with_capacity(apps.len());
    for app in apps {
        rows.push(admin_application_row(&state, app).await);
    }
    Ok(Json(rows))
}

async fn admin_application_row(state: &AppState, app: Application) -> RecentApplication {
    let applicant = state
        .store
        .users
        .get(app.applicant.as_str())
        .await
        .map(|user| UserSummary {
            id: user.id,
            name: user.name,
            email: user.email,
        });
    let job = state
        .store
        .jobs
        .get(app.job.as_str())
        .await
        .map(|job| JobSummary {
            id: job.id.to_string(),
            title: job.title,
        });
    RecentApplication {
        id: app.id.to_string(),
        applicant,
        job,
        status: app.status,
        applied_at: app.applied_at,
    }
}

pub async fn get_application(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Admin(_): Admin,
) -> ApiResult<Json<RecentApplication>> {
    let app = state
        .store
        .applications
        .get(&id)
        .await
        .ok_or_else(|| ApiError::not_found("Application not found"))?;
    Ok(Json(admin_application_row(&state, app).await))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUpdateApplicationRequest {
    pub status: Option<String>,
    pub admin_notes: Option<String>,
}

/// Update an application's status and admin notes.
pub async fn update_application(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Admin(_): Admin,
    Json(request): Json<AdminUpdateApplicationRequest>,
) -> ApiResult<Json<Application>> {
    let mut application = state
        .store
        .applications
        .get(&id)
        .await
        .ok_or_else(|| ApiError::not_found("Application not found"))?;

    if let Some(status) = request.status {
        let status: ApplicationStatus = status.parse().map_err(|_| {
            let allowed: Vec<&str> =
                ApplicationStatus::ALL.iter().map(|s| s.as_str()).collect();
            ApiError::validation(format!(
                "Invalid status. Must be one of: {}",
                allowed.join(", ")
            ))
        })?;
        application.status = status;
    }
    if let Some(admin_notes) = request.admin_notes {
        application.admin_notes = admin_notes;
    }

    let application = state.store.applications.put(application).await?;
    Ok(Json(application))
}

pub async fn delete_application(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Admin(_): Admin,
) -> ApiResult<Json<serde_json::Value>> {
    if state.store.applications.get(&id).await.is_none() {
        return Err(ApiError::not_found("Application not found"));
    }
    state.store.applications.remove(&id).await?;
    info!(application = %id, "Admin removed application");
    Ok(Json(serde_json::json!({ "message": "Application removed" })))
}
