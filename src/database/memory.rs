use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;

use crate::database::repository::MatchRepository;
use crate::error::{Error, Result};
use crate::models::candidate::{Candidate, CANDIDATE_STATUS_ACTIVE};
use crate::models::candidate_match::{CandidateMatch, MatchStatus, MatchUpsert};
use crate::models::job_posting::{JobPosting, JOB_POSTING_STATUS_OPEN};
use crate::utils::time;

#[derive(Debug, Default)]
struct MemoryState {
    candidates: BTreeMap<Uuid, Candidate>,
    job_postings: BTreeMap<Uuid, JobPosting>,
    matches: BTreeMap<(Uuid, Uuid), CandidateMatch>,
}

/// Process-local store. Matches are keyed by `(candidate_id, job_posting_id)`.
#[derive(Debug, Default)]
pub struct InMemoryMatchRepository {
    state: Mutex<MemoryState>,
}

impl InMemoryMatchRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| Error::Internal("in-memory store mutex poisoned".to_string()))
    }

    pub fn insert_candidate(&self, candidate: Candidate) -> Result<Uuid> {
        let id = candidate.id;
        self.lock()?.candidates.insert(id, candidate);
        Ok(id)
    }

    pub fn insert_job_posting(&self, posting: JobPosting) -> Result<Uuid> {
        let id = posting.id;
        self.lock()?.job_postings.insert(id, posting);
        Ok(id)
    }

    pub fn match_count(&self) -> Result<usize> {
        Ok(self.lock()?.matches.len())
    }
}

fn sorted_by_score(mut matches: Vec<CandidateMatch>) -> Vec<CandidateMatch> {
    matches.sort_by(|a, b| {
        b.match_score
            .total_cmp(&a.match_score)
            .then_with(|| b.updated_at.cmp(&a.updated_at))
    });
    matches
}

#[async_trait]
impl MatchRepository for InMemoryMatchRepository {
    async fn find_candidate(&self, id: Uuid) -> Result<Option<Candidate>> {
        Ok(self.lock()?.candidates.get(&id).cloned())
    }

    async fn find_job_posting(&self, id: Uuid) -> Result<Option<JobPosting>> {
        Ok(self.lock()?.job_postings.get(&id).cloned())
    }

    async fn list_active_candidates(&self) -> Result<Vec<Candidate>> {
        Ok(self
            .lock()?
            .candidates
            .values()
            .filter(|c| c.status == CANDIDATE_STATUS_ACTIVE)
            .cloned()
            .collect())
    }

    async fn list_open_job_postings(&self) -> Result<Vec<JobPosting>> {
        Ok(self
            .lock()?
            .job_postings
            .values()
            .filter(|p| p.status == JOB_POSTING_STATUS_OPEN)
            .cloned()
            .collect())
    }

    async fn upsert_match(&self, upsert: MatchUpsert) -> Result<CandidateMatch> {
        let now = time::now();
        let match_score = upsert.match_score();
        let mut state = self.lock()?;
        let record = state
            .matches
            .entry((upsert.candidate_id, upsert.job_posting_id))
            .and_modify(|existing| {
                existing.match_score = match_score;
                existing.match_details = upsert.details.clone();
                if upsert.reset_status {
                    existing.status = MatchStatus::Pending;
                }
                existing.updated_at = now;
            })
            .or_insert_with(|| CandidateMatch {
                id: Uuid::new_v4(),
                candidate_id: upsert.candidate_id,
                job_posting_id: upsert.job_posting_id,
                match_score,
                match_details: upsert.details.clone(),
                status: MatchStatus::Pending,
                created_at: now,
                updated_at: now,
            });
        Ok(record.clone())
    }

    async fn find_match(&self, id: Uuid) -> Result<Option<CandidateMatch>> {
        Ok(self
            .lock()?
            .matches
            .values()
            .find(|m| m.id == id)
            .cloned())
    }

    async fn update_match_status(
        &self,
        id: Uuid,
        status: MatchStatus,
    ) -> Result<Option<CandidateMatch>> {
        let mut state = self.lock()?;
        let Some(record) = state.matches.values_mut().find(|m| m.id == id) else {
            return Ok(None);
        };
        record.status = status;
        record.updated_at = time::now();
        Ok(Some(record.clone()))
    }

    async fn list_matches_for_candidate(&self, candidate_id: Uuid) -> Result<Vec<CandidateMatch>> {
        let matches = self
            .lock()?
            .matches
            .values()
            .filter(|m| m.candidate_id == candidate_id)
            .cloned()
            .collect();
        Ok(sorted_by_score(matches))
    }

    async fn list_matches_for_job_posting(
        &self,
        job_posting_id: Uuid,
    ) -> Result<Vec<CandidateMatch>> {
        let matches = self
            .lock()?
            .matches
            .values()
            .filter(|m| m.job_posting_id == job_posting_id)
            .cloned()
            .collect();
        Ok(sorted_by_score(matches))
    }
}
