use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::database::repository::MatchRepository;
use crate::error::{Error, Result};
use crate::models::candidate::CandidateProfile;
use crate::models::candidate_match::{CandidateMatch, MatchDetails, MatchStatus, MatchUpsert};
use crate::models::job_posting::JobRequirements;
use crate::services::match_scorer::MatchScorer;
use crate::utils::time;

/// What happens to an existing match's status when the pair is scored again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RescorePolicy {
    #[default]
    PreserveStatus,
    ResetToPending,
}

impl FromStr for RescorePolicy {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "preserve" | "preserve_status" => Ok(RescorePolicy::PreserveStatus),
            "reset" | "reset_to_pending" => Ok(RescorePolicy::ResetToPending),
            other => Err(format!(
                "unknown rescore policy '{}', expected 'preserve' or 'reset'",
                other
            )),
        }
    }
}

impl fmt::Display for RescorePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RescorePolicy::PreserveStatus => f.write_str("preserve"),
            RescorePolicy::ResetToPending => f.write_str("reset"),
        }
    }
}

/// Runs the scorer across candidates and open postings and persists matches
/// through the injected repository.
#[derive(Clone)]
pub struct MatchingService {
    repo: Arc<dyn MatchRepository>,
    rescore_policy: RescorePolicy,
}

impl MatchingService {
    pub fn new(repo: Arc<dyn MatchRepository>, rescore_policy: RescorePolicy) -> Self {
        Self {
            repo,
            rescore_policy,
        }
    }

    pub fn rescore_policy(&self) -> RescorePolicy {
        self.rescore_policy
    }

    /// Scores one pair without writing anything.
    pub async fn score_pair(&self, candidate_id: Uuid, job_posting_id: Uuid) -> Result<MatchDetails> {
        self.score_pair_at(candidate_id, job_posting_id, time::now())
            .await
    }

    pub async fn score_pair_at(
        &self,
        candidate_id: Uuid,
        job_posting_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<MatchDetails> {
        let profile = self.load_profile(candidate_id).await?;
        let requirements = self.load_requirements(job_posting_id).await?;
        Ok(MatchScorer::compute_at(&profile, &requirements, now))
    }

    /// Scores a candidate against every open posting. Postings that fail to
    /// score or persist are logged and skipped.
    #[instrument(skip(self))]
    pub async fn match_candidate(&self, candidate_id: Uuid) -> Result<Vec<CandidateMatch>> {
        let profile = self.load_profile(candidate_id).await?;
        let postings = self.repo.list_open_job_postings().await?;
        let now = time::now();

        let mut matches = Vec::with_capacity(postings.len());
        let mut skipped = 0usize;
        for posting in &postings {
            let outcome = match posting.parsed_requirements() {
                Ok(requirements) => {
                    self.score_and_store(candidate_id, posting.id, &profile, &requirements, now)
                        .await
                }
                Err(e) => Err(e),
            };
            match outcome {
                Ok(record) => matches.push(record),
                Err(e) => {
                    skipped += 1;
                    warn!(
                        %candidate_id,
                        job_posting_id = %posting.id,
                        error = %e,
                        "Skipping job posting during candidate matching"
                    );
                }
            }
        }

        info!(
            %candidate_id,
            postings = postings.len(),
            scored = matches.len(),
            skipped,
            "Candidate matching finished"
        );
        Ok(matches)
    }

    /// Scores every active candidate against one posting. Candidates that
    /// fail to score or persist are logged and skipped.
    #[instrument(skip(self))]
    pub async fn match_job_posting(&self, job_posting_id: Uuid) -> Result<Vec<CandidateMatch>> {
        let requirements = self.load_requirements(job_posting_id).await?;
        let candidates = self.repo.list_active_candidates().await?;
        let now = time::now();

        let mut matches = Vec::with_capacity(candidates.len());
        let mut skipped = 0usize;
        for candidate in &candidates {
            let outcome = match candidate.profile() {
                Ok(profile) => {
                    self.score_and_store(candidate.id, job_posting_id, &profile, &requirements, now)
                        .await
                }
                Err(e) => Err(e),
            };
            match outcome {
                Ok(record) => matches.push(record),
                Err(e) => {
                    skipped += 1;
                    warn!(
                        %job_posting_id,
                        candidate_id = %candidate.id,
                        error = %e,
                        "Skipping candidate during job posting matching"
                    );
                }
            }
        }

        info!(
            %job_posting_id,
            candidates = candidates.len(),
            scored = matches.len(),
            skipped,
            "Job posting matching finished"
        );
        Ok(matches)
    }

    /// Moves a match to any status in the set. Unknown values are rejected
    /// before the store is touched.
    pub async fn update_match_status(&self, match_id: Uuid, status: &str) -> Result<CandidateMatch> {
        let status: MatchStatus = status.parse()?;
        let updated = self
            .repo
            .update_match_status(match_id, status)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Match {} not found", match_id)))?;
        info!(%match_id, status = %updated.status, "Match status updated");
        Ok(updated)
    }

    pub async fn get_match(&self, match_id: Uuid) -> Result<CandidateMatch> {
        self.repo
            .find_match(match_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Match {} not found", match_id)))
    }

    pub async fn get_candidate_matches(&self, candidate_id: Uuid) -> Result<Vec<CandidateMatch>> {
        self.repo.list_matches_for_candidate(candidate_id).await
    }

    pub async fn get_job_posting_matches(
        &self,
        job_posting_id: Uuid,
    ) -> Result<Vec<CandidateMatch>> {
        self.repo.list_matches_for_job_posting(job_posting_id).await
    }

    async fn load_profile(&self, candidate_id: Uuid) -> Result<CandidateProfile> {
        self.repo
            .find_candidate(candidate_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Candidate {} not found", candidate_id)))?
            .profile()
    }

    async fn load_requirements(&self, job_posting_id: Uuid) -> Result<JobRequirements> {
        self.repo
            .find_job_posting(job_posting_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Job posting {} not found", job_posting_id)))?
            .parsed_requirements()
    }

    async fn score_and_store(
        &self,
        candidate_id: Uuid,
        job_posting_id: Uuid,
        profile: &CandidateProfile,
        requirements: &JobRequirements,
        now: DateTime<Utc>,
    ) -> Result<CandidateMatch> {
        let details = MatchScorer::compute_at(profile, requirements, now);
        self.repo
            .upsert_match(MatchUpsert {
                candidate_id,
                job_posting_id,
                details,
                reset_status: self.rescore_policy == RescorePolicy::ResetToPending,
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::repository::MockMatchRepository;
    use crate::models::candidate::Candidate;
    use crate::models::job_posting::JobPosting;
    use chrono::TimeZone;
    use mockall::predicate::eq;
    use serde_json::json;

    fn candidate() -> Candidate {
        Candidate::active(
            "Grace",
            "grace@example.com",
            json!([{ "name": "Rust", "level": 4 }]),
            4,
            Some("Berlin".into()),
            "immediately",
        )
    }

    fn posting(requirements: serde_json::Value) -> JobPosting {
        JobPosting::open(Uuid::new_v4(), "Engineer", requirements)
    }

    fn valid_requirements() -> serde_json::Value {
        json!({
            "requiredSkills": [{ "name": "Rust", "level": 4, "required": true }],
            "preferredSkills": [],
            "experience": 2,
            "location": "Berlin"
        })
    }

    fn stored(upsert: MatchUpsert) -> CandidateMatch {
        let now = Utc::now();
        CandidateMatch {
            id: Uuid::new_v4(),
            candidate_id: upsert.candidate_id,
            job_posting_id: upsert.job_posting_id,
            match_score: upsert.match_score(),
            match_details: upsert.details,
            status: MatchStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn rescore_policy_parses_aliases() {
        assert_eq!(
            "preserve".parse::<RescorePolicy>(),
            Ok(RescorePolicy::PreserveStatus)
        );
        assert_eq!(
            "RESET".parse::<RescorePolicy>(),
            Ok(RescorePolicy::ResetToPending)
        );
        assert!("sometimes".parse::<RescorePolicy>().is_err());
    }

    #[tokio::test]
    async fn score_pair_reports_missing_candidate() {
        let mut repo = MockMatchRepository::new();
        repo.expect_find_candidate().returning(|_| Ok(None));
        repo.expect_find_job_posting().never();

        let service = MatchingService::new(Arc::new(repo), RescorePolicy::default());
        let err = service
            .score_pair(Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn score_pair_propagates_malformed_requirements() {
        let candidate = candidate();
        let broken = posting(json!({ "requiredSkills": "Rust" }));
        let broken_id = broken.id;

        let mut repo = MockMatchRepository::new();
        repo.expect_find_candidate()
            .returning(move |_| Ok(Some(candidate.clone())));
        repo.expect_find_job_posting()
            .with(eq(broken_id))
            .returning(move |_| Ok(Some(broken.clone())));

        let service = MatchingService::new(Arc::new(repo), RescorePolicy::default());
        let err = service
            .score_pair(Uuid::new_v4(), broken_id)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MalformedRequirements(_)));
    }

    #[tokio::test]
    async fn score_pair_is_deterministic_for_fixed_time() {
        let candidate = candidate();
        let open = posting(valid_requirements());

        let mut repo = MockMatchRepository::new();
        repo.expect_find_candidate()
            .returning(move |_| Ok(Some(candidate.clone())));
        repo.expect_find_job_posting()
            .returning(move |_| Ok(Some(open.clone())));
        repo.expect_upsert_match().never();

        let service = MatchingService::new(Arc::new(repo), RescorePolicy::default());
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let first = service
            .score_pair_at(Uuid::new_v4(), Uuid::new_v4(), at)
            .await
            .unwrap();
        let second = service
            .score_pair_at(Uuid::new_v4(), Uuid::new_v4(), at)
            .await
            .unwrap();
        assert_eq!(first, second);
        assert!((first.total_score - 100.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn match_candidate_skips_malformed_and_failed_postings() {
        let candidate = candidate();
        let candidate_id = candidate.id;
        let good = posting(valid_requirements());
        let good_id = good.id;
        let malformed = posting(json!({ "experience": "lots" }));
        let failing = posting(valid_requirements());
        let failing_id = failing.id;

        let mut repo = MockMatchRepository::new();
        repo.expect_find_candidate()
            .with(eq(candidate_id))
            .returning(move |_| Ok(Some(candidate.clone())));
        repo.expect_list_open_job_postings()
            .returning(move || Ok(vec![good.clone(), malformed.clone(), failing.clone()]));
        repo.expect_upsert_match()
            .times(2)
            .returning(move |upsert| {
                if upsert.job_posting_id == failing_id {
                    Err(Error::Internal("write failed".into()))
                } else {
                    Ok(stored(upsert))
                }
            });

        let service = MatchingService::new(Arc::new(repo), RescorePolicy::default());
        let matches = service.match_candidate(candidate_id).await.unwrap();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].job_posting_id, good_id);
        assert_eq!(matches[0].match_score, matches[0].match_details.total_score);
    }

    #[tokio::test]
    async fn match_candidate_fails_when_postings_cannot_be_listed() {
        let candidate = candidate();
        let candidate_id = candidate.id;

        let mut repo = MockMatchRepository::new();
        repo.expect_find_candidate()
            .returning(move |_| Ok(Some(candidate.clone())));
        repo.expect_list_open_job_postings()
            .returning(|| Err(Error::Internal("connection refused".into())));

        let service = MatchingService::new(Arc::new(repo), RescorePolicy::default());
        assert!(service.match_candidate(candidate_id).await.is_err());
    }

    #[tokio::test]
    async fn reset_policy_requests_status_reset() {
        let open = posting(valid_requirements());
        let open_id = open.id;
        let candidate = candidate();

        let mut repo = MockMatchRepository::new();
        repo.expect_find_job_posting()
            .returning(move |_| Ok(Some(open.clone())));
        repo.expect_list_active_candidates()
            .returning(move || Ok(vec![candidate.clone()]));
        repo.expect_upsert_match()
            .withf(|upsert| upsert.reset_status)
            .times(1)
            .returning(|upsert| Ok(stored(upsert)));

        let service = MatchingService::new(Arc::new(repo), RescorePolicy::ResetToPending);
        let matches = service.match_job_posting(open_id).await.unwrap();
        assert_eq!(matches.len(), 1);
    }

    #[tokio::test]
    async fn invalid_status_never_reaches_the_store() {
        let mut repo = MockMatchRepository::new();
        repo.expect_update_match_status().never();

        let service = MatchingService::new(Arc::new(repo), RescorePolicy::default());
        let err = service
            .update_match_status(Uuid::new_v4(), "archived")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidStatus(_)));
    }

    #[tokio::test]
    async fn update_of_unknown_match_is_not_found() {
        let mut repo = MockMatchRepository::new();
        repo.expect_update_match_status()
            .with(mockall::predicate::always(), eq(MatchStatus::Reviewed))
            .returning(|_, _| Ok(None));

        let service = MatchingService::new(Arc::new(repo), RescorePolicy::default());
        let err = service
            .update_match_status(Uuid::new_v4(), "reviewed")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
