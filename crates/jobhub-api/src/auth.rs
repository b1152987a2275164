//! Bearer-token authentication and the role guards.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use jobhub_models::{Role, User, UserId};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Signed token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    /// Role at mint time; the extractor re-reads the live role anyway.
    pub role: Role,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expiration (unix seconds).
    pub exp: i64,
}

/// HS256 mint/verify key pair.
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenKeys {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Mint a bearer token for a user.
    pub fn mint(&self, user: &User) -> ApiResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.as_str().to_string(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| ApiError::internal(format!("Failed to sign token: {e}")))
    }

    /// Verify a bearer token and return its claims.
    pub fn verify(&self, token: &str) -> ApiResult<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| ApiError::unauthorized(format!("Invalid token: {e}")))
    }
}

/// Hash a password for storage.
pub fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a stored hash.
pub fn verify_password(password: &str, stored: &str) -> ApiResult<bool> {
    let parsed = PasswordHash::new(stored)
        .map_err(|e| ApiError::internal(format!("Corrupt credential hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Authenticated caller, resolved against the live user document so role
/// changes and deactivation take effect immediately.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: UserId,
    pub role: Role,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::unauthorized("Invalid Authorization header format"))?;

        let claims = state.tokens.verify(token)?;

        let user = state
            .store
            .users
            .get(&claims.sub)
            .await
            .ok_or_else(|| ApiError::unauthorized("Account no longer exists"))?;
        if !user.is_active {
            return Err(ApiError::unauthorized("Account is deactivated"));
        }

        Ok(AuthUser {
            id: user.id,
            role: user.role,
        })
    }
}

/// The one role check, shared by the three guard extractors below. Routes
/// state their requirement by the extractor they take; the predicate itself
/// lives here only.
fn require_role(user: AuthUser, role: Role) -> ApiResult<AuthUser> {
    if user.role == role {
        Ok(user)
    } else {
        Err(ApiError::forbidden(format!(
            "This action requires the {role} role"
        )))
    }
}

/// Guard: caller must be an employer.
pub struct Employer(pub AuthUser);

#[axum::async_trait]
impl FromRequestParts<AppState> for Employer {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        require_role(user, Role::Employer).map(Employer)
    }
}

/// Guard: caller must be a job seeker.
pub struct JobSeeker(pub AuthUser);

#[axum::async_trait]
impl FromRequestParts<AppState> for JobSeeker {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        require_role(user, Role::JobSeeker).map(JobSeeker)
    }
}

/// Guard: caller must be an admin.
pub struct Admin(pub AuthUser);

#[axum::async_trait]
impl FromRequestParts<AppState> for Admin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        require_role(user, Role::Admin).map(Admin)
    }
}
