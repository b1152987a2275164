//! Screening handlers.
//!
//! A screening is the employer's review verdict on an application, kept as
//! a separate 1:1 record. Reads left-join it onto the application, falling
//! back to a pending stub when no record exists yet.

use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use jobhub_models::{Application, ApplicationStatus, Screening, ScreeningStatus, UserId};

use crate::auth::{AuthUser, Employer};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Screening fields as joined onto an application. `screened_at == None`
/// distinguishes the not-yet-screened stub from a real record.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreeningView {
    pub status: ScreeningStatus,
    pub notes: String,
    pub screened_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screened_by: Option<ReviewerSummary>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewerSummary {
    pub id: UserId,
    pub name: String,
}

impl ScreeningView {
    fn stub() -> Self {
        Self {
            status: ScreeningStatus::Pending,
            notes: String::new(),
            screened_at: None,
            screened_by: None,
        }
    }

    async fn from_record(state: &AppState, screening: Screening) -> Self {
        let screened_by = state
            .store
            .users
            .get(screening.screened_by.as_str())
            .await
            .map(|user| ReviewerSummary {
                id: user.id,
                name: user.name,
            });
        Self {
            status: screening.status,
            notes: screening.notes,
            screened_at: Some(screening.screened_at),
            screened_by,
        }
    }
}

/// Applicant subset shown on screening rows.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreeningApplicant {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub skills: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationWithScreening {
    pub id: String,
    pub job: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicant: Option<ScreeningApplicant>,
    pub cover_letter: String,
    pub resume: String,
    pub resume_file_name: String,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    pub screening: ScreeningView,
}

impl ApplicationWithScreening {
    async fn build(state: &AppState, app: Application) -> Self {
        let applicant = state
            .store
            .users
            .get(app.applicant.as_str())
            .await
            .map(|user| ScreeningApplicant {
                id: user.id,
                name: user.name,
                email: user.email,
                skills: user.skills,
            });
        let screening = match state.store.screening_for(&app.id).await {
            Some(record) => ScreeningView::from_record(state, record).await,
            None => ScreeningView::stub(),
        };
        Self {
            id: app.id.to_string(),
            job: app.job.to_string(),
            applicant,
            cover_letter: app.cover_letter,
            resume: app.resume,
            resume_file_name: app.resume_file_name,
            status: app.status,
            applied_at: app.applied_at,
            screening,
        }
    }
}

/// Every application for a job, each with its screening or the pending
/// stub. Owning employer only.
pub async fn job_screenings(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    Employer(user): Employer,
) -> ApiResult<Json<Vec<ApplicationWithScreening>>> {
    let job = state
        .store
        .jobs
        .get(&job_id)
        .await
        .ok_or_else(|| ApiError::not_found("Job not found"))?;
    if !job.is_owned_by(&user.id) {
        return Err(ApiError::forbidden(
            "Not authorized to view these screenings",
        ));
    }

    let mut apps = state.store.applications_for_job(&job.id).await;
    apps.sort_by(|a, b| b.applied_at.cmp(&a.applied_at));

    let mut rows = Vec::with_capacity(apps.len());
    for app in apps {
        rows.push(ApplicationWithScreening::build(&state, app).await);
    }

    Ok(Json(rows))
}

/// One application with its screening; visible to the applicant and the
/// owning employer.
pub async fn get_application_screening(
    State(state): State<AppState>,
    Path(application_id): Path<String>,
    user: AuthUser,
) -> ApiResult<Json<ApplicationWithScreening>> {
    let application = state
        .store
        .applications
        .get(&application_id)
        .await
        .ok_or_else(|| ApiError::not_found("Application not found"))?;

    let job = state
        .store
        .jobs
        .get(application.job.as_str())
        .await
        .ok_or_else(|| ApiError::not_found("Job not found"))?;

    let is_applicant = application.applicant == user.id;
    let is_owner = job.is_owned_by(&user.id);
    if !is_applicant && !is_owner {
        return Err(ApiError::forbidden("Not authorized to view this screening"));
    }

    Ok(Json(ApplicationWithScreening::build(&state, application).await))
}

#[derive(Deserialize)]
pub struct UpsertScreeningRequest {
    pub status: Option<String>,
    pub notes: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreeningResponse {
    pub id: String,
    pub application_id: String,
    pub status: ScreeningStatus,
    pub notes: String,
    pub screened_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screened_by: Option<ReviewerSummary>,
}

/// Create or update the screening for an application, then mirror its
/// status onto the application document.
///
/// The mirror write is a second, separate document write: a crash between
/// the two leaves `screeningStatus` stale relative to the screening record.
pub async fn upsert_screening(
    State(state): State<AppState>,
    Path(application_id): Path<String>,
    Employer(user): Employer,
    Json(request): Json<UpsertScreeningRequest>,
) -> ApiResult<Json<ScreeningResponse>> {
    let status = request
        .status
        .as_deref()
        .map(|s| {
            s.parse::<ScreeningStatus>()
                .map_err(|_| ApiError::validation("Invalid screening status"))
        })
        .transpose()?;

    let mut application = state
        .store
        .applications
        .get(&application_id)
        .await
        .ok_or_else(|| ApiError::not_found("Application not found"))?;

    let job = state
        .store
        .jobs
        .get(application.job.as_str())
        .await
        .ok_or_else(|| ApiError::not_found("Job not found"))?;
    if !job.is_owned_by(&user.id) {
        return Err(ApiError::forbidden(
            "Not authorized to update this screening",
        ));
    }

    let screening = match state.store.screening_for(&application.id).await {
        Some(mut existing) => {
            if let Some(status) = status {
                existing.status = status;
            }
            if let Some(notes) = request.notes {
                existing.notes = notes;
            }
            existing.screened_by = user.id.clone();
            existing.screened_at = Utc::now();
            state.store.screenings.put(existing).await?
        }
        None => {
            state
                .store
                .screenings
                .insert(Screening::new(
                    application.id.clone(),
                    status.unwrap_or_default(),
                    request.notes.unwrap_or_default(),
                    user.id.clone(),
                ))
                .await?
        }
    };

    // Mirror write; see the doc comment above for the consistency window.
    application.screening_status = screening.status;
    state.store.applications.put(application).await?;

    info!(
        application = %screening.application_id,
        status = %screening.status,
        "Saved screening"
    );

    let screened_by = state
        .store
        .users
        .get(screening.screened_by.as_str())
        .await
        .map(|reviewer| ReviewerSummary {
            id: reviewer.id,
            name: reviewer.name,
        });

    Ok(Json(ScreeningResponse {
        id: screening.id.to_string(),
        application_id: screening.application_id.to_string(),
        status: screening.status,
        notes: screening.notes,
        screened_at: screening.screened_at,
        screened_by,
    }))
}

/// Remove the screening record. The application document is left as-is,
/// stale `screeningStatus` included.
pub async fn delete_screening(
    State(state): State<AppState>,
    Path(application_id): Path<String>,
    Employer(user): Employer,
) -> ApiResult<Json<serde_json::Value>> {
    let application = state
        .store
        .applications
        .get(&application_id)
        .await
        .ok_or_else(|| ApiError::not_found("Application not found"))?;

    let job = state
        .store
        .jobs
        .get(application.job.as_str())
        .await
        .ok_or_else(|| ApiError::not_found("Job not found"))?;
    if !job.is_owned_by(&user.id) {
        return Err(ApiError::forbidden(
            "Not authorized to delete this screening",
        ));
    }

    state
        .store
        .screenings
        .remove(application.id.as_str())
        .await?;

    Ok(Json(serde_json::json!({
        "message": "Screening deleted successfully"
    })))
}
