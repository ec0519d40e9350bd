use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::candidate::Candidate;
use crate::models::candidate_match::{CandidateMatch, MatchStatus, MatchUpsert};
use crate::models::job_posting::JobPosting;

/// Storage seam for the matching service. `PgMatchRepository` backs the
/// running service; `InMemoryMatchRepository` backs tests and demos.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MatchRepository: Send + Sync {
    async fn find_candidate(&self, id: Uuid) -> Result<Option<Candidate>>;

    async fn find_job_posting(&self, id: Uuid) -> Result<Option<JobPosting>>;

    async fn list_active_candidates(&self) -> Result<Vec<Candidate>>;

    async fn list_open_job_postings(&self) -> Result<Vec<JobPosting>>;

    /// Insert-or-update keyed by `(candidate_id, job_posting_id)`. New rows
    /// start as `pending`; existing rows keep their status unless
    /// `reset_status` is set.
    async fn upsert_match(&self, upsert: MatchUpsert) -> Result<CandidateMatch>;

    async fn find_match(&self, id: Uuid) -> Result<Option<CandidateMatch>>;

    async fn update_match_status(
        &self,
        id: Uuid,
        status: MatchStatus,
    ) -> Result<Option<CandidateMatch>>;

    /// Ordered by `match_score` descending.
    async fn list_matches_for_candidate(&self, candidate_id: Uuid) -> Result<Vec<CandidateMatch>>;

    /// Ordered by `match_score` descending.
    async fn list_matches_for_job_posting(
        &self,
        job_posting_id: Uuid,
    ) -> Result<Vec<CandidateMatch>>;
}
