//! User account handlers: registration, login, profile, promotion.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use jobhub_models::{Education, Experience, PublicUser, Role, User};

use crate::auth::{hash_password, verify_password, AuthUser};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Token plus public account fields, returned by register and login.
#[derive(Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: PublicUser,
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    pub role: Role,
    #[serde(default)]
    pub company_name: Option<String>,
}

/// Register a new account. Emails are unique case-insensitively; the admin
/// role cannot be self-assigned here.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    request.validate()?;
    if request.role == Role::Admin {
        return Err(ApiError::validation(
            "Role must be job_seeker or employer",
        ));
    }

    let mut user = User::new(
        request.name,
        request.email.to_lowercase(),
        hash_password(&request.password)?,
        request.role,
    );
    user.company_name = request.company_name.filter(|_| request.role == Role::Employer);

    let user = state
        .store
        .users
        .insert_unique(user, "email", |u| u.email.to_lowercase())
        .await
        .map_err(|e| {
            if e.is_duplicate() {
                ApiError::conflict("An account with this email already exists")
            } else {
                e.into()
            }
        })?;

    info!(user = %user.id, role = %user.role, "Registered account");

    let token = state.tokens.mint(&user)?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: user.public(),
        }),
    ))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Log in with email and password.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let user = state
        .store
        .user_by_email(&request.email)
        .await
        .ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;

    if !verify_password(&request.password, &user.password_hash)? {
        return Err(ApiError::unauthorized("Invalid email or password"));
    }
    if !user.is_active {
        return Err(ApiError::unauthorized("Account is deactivated"));
    }

    let token = state.tokens.mint(&user)?;
    Ok(Json(AuthResponse {
        token,
        user: user.public(),
    }))
}

/// Return the caller's own profile.
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<PublicUser>> {
    let user = state
        .store
        .users
        .get(user.id.as_str())
        .await
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(user.public()))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub skills: Option<Vec<String>>,
    pub experience: Option<Vec<Experience>>,
    pub education: Option<Vec<Education>>,
    pub company_name: Option<String>,
    pub company_description: Option<String>,
    pub company_website: Option<String>,
}

/// Update the caller's own profile. Email is immutable here; password has
/// its own endpoint requiring the current credential.
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<UpdateProfileRequest>,
) -> ApiResult<Json<PublicUser>> {
    let mut user = state
        .store
        .users
        .get(auth.id.as_str())
        .await
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if let Some(name) = request.name {
        if name.is_empty() {
            return Err(ApiError::validation("Name cannot be empty"));
        }
        user.name = name;
    }
    if let Some(skills) = request.skills {
        user.skills = skills;
    }
    if let Some(experience) = request.experience {
        user.experience = experience;
    }
    if let Some(education) = request.education {
        user.education = education;
    }
    if let Some(company_name) = request.company_name {
        user.company_name = Some(company_name);
    }
    if let Some(company_description) = request.company_description {
        user.company_description = Some(company_description);
    }
    if let Some(company_website) = request.company_website {
        user.company_website = Some(company_website);
    }

    let user = state.store.users.put(user).await?;
    Ok(Json(user.public()))
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub new_password: String,
}

/// Change the caller's password; the current password must verify first.
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<ChangePasswordRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    request.validate()?;

    let mut user = state
        .store
        .users
        .get(auth.id.as_str())
        .await
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if !verify_password(&request.current_password, &user.password_hash)? {
        return Err(ApiError::unauthorized("Current password is incorrect"));
    }

    user.password_hash = hash_password(&request.new_password)?;
    state.store.users.put(user).await?;

    Ok(Json(serde_json::json!({ "message": "Password updated" })))
}

/// Promote a user to admin.
///
/// Deliberately unguarded: this is the bootstrap path for the first admin
/// (there is also a `create-admin` binary that does the same against the
/// store directly).
pub async fn make_admin(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<PublicUser>> {
    let mut user = state
        .store
        .users
        .get(&id)
        .await
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    user.role = Role::Admin;
    let user = state.store.users.put(user).await?;
    info!(user = %user.id, "Promoted user to admin");

    Ok(Json(user.public()))
}
