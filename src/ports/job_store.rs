//! Job Store Port - persistence boundary for postings and experiences.

use async_trait::async_trait;

use crate::domain::foundation::{CoreError, JobPostingId, OwnerId};
use crate::domain::jobs::{JobPosting, StructuredRequirements};
use crate::domain::matching::Experience;

/// Port for loading job postings and saving analysis results.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Loads a job posting by id.
    ///
    /// # Errors
    /// Returns `CoreError::NotFound` for an unknown id.
    async fn load_job_posting(&self, id: JobPostingId) -> Result<JobPosting, CoreError>;

    /// Persists a posting (including a recorded scrape failure).
    async fn save_job_posting(&self, posting: &JobPosting) -> Result<(), CoreError>;

    /// Persists the structured requirements extracted for a posting.
    async fn save_job_analysis(
        &self,
        id: JobPostingId,
        requirements: &StructuredRequirements,
    ) -> Result<(), CoreError>;
}

/// Port for reading a user's recorded experiences.
#[async_trait]
pub trait ExperienceReader: Send + Sync {
    /// Loads all experiences recorded by an owner.
    async fn load_experiences(&self, owner: &OwnerId) -> Result<Vec<Experience>, CoreError>;
}
