//! Screening records.
//!
//! A screening is the employer-maintained review verdict attached 1:1 to an
//! application. It is created lazily on the first screening update and keyed
//! by the application id, which is what enforces the 1:1 relationship.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::application::ApplicationId;
use crate::user::UserId;

/// Unique screening identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScreeningId(String);

impl ScreeningId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ScreeningId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ScreeningId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Screening verdict. Distinct from [`crate::ApplicationStatus`]: the
/// verdict says what the screener concluded, the application status says
/// where the candidacy stands overall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScreeningStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ScreeningStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScreeningStatus::Pending => "pending",
            ScreeningStatus::Approved => "approved",
            ScreeningStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ScreeningStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ScreeningStatus {
    type Err = ScreeningStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ScreeningStatus::Pending),
            "approved" => Ok(ScreeningStatus::Approved),
            "rejected" => Ok(ScreeningStatus::Rejected),
            _ => Err(ScreeningStatusParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown screening status: {0}")]
pub struct ScreeningStatusParseError(String);

/// The 1:1 companion record to an application.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Screening {
    pub id: ScreeningId,
    pub application_id: ApplicationId,
    #[serde(default)]
    pub status: ScreeningStatus,
    #[serde(default)]
    pub notes: String,
    pub screened_by: UserId,
    pub screened_at: DateTime<Utc>,
}

impl Screening {
    pub fn new(
        application_id: ApplicationId,
        status: ScreeningStatus,
        notes: impl Into<String>,
        screened_by: UserId,
    ) -> Self {
        Self {
            id: ScreeningId::new(),
            application_id,
            status,
            notes: notes.into(),
            screened_by,
            screened_at: Utc::now(),
        }
    }
}
