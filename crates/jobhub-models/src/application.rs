//! Applications and their review lifecycle.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::job::JobId;
use crate::screening::ScreeningStatus;
use crate::user::UserId;

/// Unique application identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(String);

impl ApplicationId {
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

impl Default for ApplicationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Review state of an application. Any value may be overwritten with any
/// other by the owning employer; there is no transition graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Reviewed,
    Shortlisted,
    Rejected,
    Hired,
}

impl ApplicationStatus {
    /// All accepted values, in the order they are reported to callers.
    pub const ALL: &'static [ApplicationStatus] = &[
        ApplicationStatus::Pending,
        ApplicationStatus::Reviewed,
        ApplicationStatus::Shortlisted,
        ApplicationStatus::Rejected,
        ApplicationStatus::Hired,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Reviewed => "reviewed",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Hired => "hired",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = ApplicationStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApplicationStatus::Pending),
            "reviewed" => Ok(ApplicationStatus::Reviewed),
            "shortlisted" => Ok(ApplicationStatus::Shortlisted),
            "rejected" => Ok(ApplicationStatus::Rejected),
            "hired" => Ok(ApplicationStatus::Hired),
            _ => Err(ApplicationStatusParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown application status: {0}")]
pub struct ApplicationStatusParseError(String);

/// A free-text note left by the owning employer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationNote {
    pub text: String,
    pub added_by: UserId,
    pub added_at: DateTime<Utc>,
}

/// One job seeker's application to one job.
///
/// At most one application exists per (job, applicant) pair: re-applying
/// while the first is still pending overwrites it in place, and re-applying
/// after a decision is refused.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: ApplicationId,
    pub job: JobId,
    pub applicant: UserId,
    #[serde(default)]
    pub cover_letter: String,
    /// Stored upload path (`/uploads/...`) or an external URL.
    pub resume: String,
    #[serde(default)]
    pub resume_file_name: String,
    #[serde(default)]
    pub status: ApplicationStatus,
    /// Mirror of the screening record's status; see the screening service
    /// for the (non-transactional) write that maintains it.
    #[serde(default)]
    pub screening_status: ScreeningStatus,
    #[serde(default)]
    pub admin_notes: String,
    #[serde(default)]
    pub notes: Vec<ApplicationNote>,
    pub applied_at: DateTime<Utc>,
}

impl Application {
    pub fn new(
        job: JobId,
        applicant: UserId,
        cover_letter: impl Into<String>,
        resume: impl Into<String>,
        resume_file_name: impl Into<String>,
    ) -> Self {
        Self {
            id: ApplicationId::new(),
            job,
            applicant,
            cover_letter: cover_letter.into(),
            resume: resume.into(),
            resume_file_name: resume_file_name.into(),
            status: ApplicationStatus::default(),
            screening_status: ScreeningStatus::default(),
            admin_notes: String::new(),
            notes: Vec::new(),
            applied_at: Utc::now(),
        }
    }

    /// Whether a re-apply may still overwrite this record.
    pub fn is_pending(&self) -> bool {
        self.status == ApplicationStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in ApplicationStatus::ALL {
            assert_eq!(status.as_str().parse::<ApplicationStatus>().unwrap(), *status);
        }
        assert!("accepted".parse::<ApplicationStatus>().is_err());
    }

    #[test]
    fn test_new_application_is_pending() {
        let app = Application::new(JobId::new(), UserId::new(), "", "/uploads/cv.pdf", "cv.pdf");
        assert!(app.is_pending());
        assert_eq!(app.screening_status, ScreeningStatus::Pending);
    }

    #[test]
    fn test_wire_field_names() {
        let app = Application::new(JobId::new(), UserId::new(), "hi", "/uploads/cv.pdf", "cv.pdf");
        let json = serde_json::to_value(&app).unwrap();
        assert_eq!(json["coverLetter"], "hi");
        assert_eq!(json["resumeFileName"], "cv.pdf");
        assert_eq!(json["screeningStatus"], "pending");
    }
}
