//! Shared data models for the JobHub backend.
//!
//! This crate provides Serde-serializable types for:
//! - User accounts and roles
//! - Job postings
//! - Applications and their review lifecycle
//! - Screening records

pub mod application;
pub mod job;
pub mod screening;
pub mod user;

// Re-export common types
pub use application::{Application, ApplicationId, ApplicationNote, ApplicationStatus};
pub use job::{Job, JobId, JobStatus, JobType, Salary};
pub use screening::{Screening, ScreeningId, ScreeningStatus};
pub use user::{Education, Experience, PublicUser, Role, User, UserId};
