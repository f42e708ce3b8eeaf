//! Job board entities
//!
//! Each entity implements [`Resource`](crate::repository::Resource): its
//! collection, listing policy, references and validation rules live next
//! to the struct. Audit fields (`created_time`, `updated_time`,
//! `created_by`, `updated_by`) are written by the repository and ignored
//! on input.

mod application;
mod candidate;
mod candidate_skill;
mod company;
mod job;
mod job_category;
mod job_skill;
mod recruiter;
mod resume;
mod skill;
mod user;

pub use application::Application;
pub use candidate::Candidate;
pub use candidate_skill::CandidateSkill;
pub use company::Company;
pub use job::Job;
pub use job_category::JobCategory;
pub use job_skill::JobSkill;
pub use recruiter::Recruiter;
pub use resume::Resume;
pub use skill::Skill;
pub use user::User;

/// Accepted `Job::job_type` values
pub const JOB_TYPES: &[&str] = &["full-time", "part-time", "contract", "freelance"];

/// Accepted `Job::status` values
pub const JOB_STATUSES: &[&str] = &["active", "closed", "draft"];

/// Skill strength shared by candidate and job skills
pub const PROFICIENCY_LEVELS: &[&str] = &["beginner", "intermediate", "advanced", "expert"];

/// Accepted `Application::status` values
pub const APPLICATION_STATUSES: &[&str] =
    &["applied", "under_review", "rejected", "accepted", "withdrawn"];

/// Audit timestamp as carried on every entity
pub type Timestamp = Option<chrono::DateTime<chrono::Utc>>;
