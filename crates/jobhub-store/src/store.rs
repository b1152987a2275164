//! The store facade and the documents it keeps.

use std::path::Path;

use jobhub_models::{Application, ApplicationId, Job, JobId, Screening, User, UserId};

use crate::collection::{Collection, Document};
use crate::error::StoreResult;

impl Document for User {
    const NAME: &'static str = "users";

    fn key(&self) -> String {
        self.id.as_str().to_string()
    }
}

impl Document for Job {
    const NAME: &'static str = "jobs";

    fn key(&self) -> String {
        self.id.as_str().to_string()
    }
}

impl Document for Application {
    const NAME: &'static str = "applications";

    fn key(&self) -> String {
        self.id.as_str().to_string()
    }
}

// Screenings are keyed by application id: that key IS the unique index
// guaranteeing at most one screening per application.
impl Document for Screening {
    const NAME: &'static str = "screenings";

    fn key(&self) -> String {
        self.application_id.as_str().to_string()
    }
}

/// The four collections the backend reads and writes.
pub struct Store {
    pub users: Collection<User>,
    pub jobs: Collection<Job>,
    pub applications: Collection<Application>,
    pub screenings: Collection<Screening>,
}

impl Store {
    /// Open the store under a data directory, creating it if needed.
    pub fn open(dir: impl AsRef<Path>) -> StoreResult<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            users: Collection::open(dir)?,
            jobs: Collection::open(dir)?,
            applications: Collection::open(dir)?,
            screenings: Collection::open(dir)?,
        })
    }

    /// A store with no backing files.
    pub fn in_memory() -> Self {
        Self {
            users: Collection::in_memory(),
            jobs: Collection::in_memory(),
            applications: Collection::in_memory(),
            screenings: Collection::in_memory(),
        }
    }

    /// Look up a user by email, case-insensitively.
    pub async fn user_by_email(&self, email: &str) -> Option<User> {
        let needle = email.to_lowercase();
        self.users
            .find_one(|user| user.email.to_lowercase() == needle)
            .await
    }

    /// All applications received for a job.
    pub async fn applications_for_job(&self, job: &JobId) -> Vec<Application> {
        self.applications.find(|app| &app.job == job).await
    }

    /// All applications submitted by a user.
    pub async fn applications_by_applicant(&self, applicant: &UserId) -> Vec<Application> {
        self.applications
            .find(|app| &app.applicant == applicant)
            .await
    }

    /// The one application a seeker has for a job, if any.
    pub async fn application_for(&self, job: &JobId, applicant: &UserId) -> Option<Application> {
        self.applications
            .find_one(|app| &app.job == job && &app.applicant == applicant)
            .await
    }

    /// The screening attached to an application, if one exists yet.
    pub async fn screening_for(&self, application: &ApplicationId) -> Option<Screening> {
        self.screenings.get(application.as_str()).await
    }
}
