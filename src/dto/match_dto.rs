use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::candidate_match::{CandidateMatch, MatchDetails, MatchStatus};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateMatchStatusPayload {
    #[validate(length(min = 1, max = 32))]
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorePairQuery {
    pub candidate_id: Uuid,
    pub job_posting_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResponse {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub job_posting_id: Uuid,
    pub match_score: f64,
    pub match_details: MatchDetails,
    pub status: MatchStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchListResponse {
    pub items: Vec<MatchResponse>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorePairResponse {
    pub candidate_id: Uuid,
    pub job_posting_id: Uuid,
    pub match_score: f64,
    pub match_details: MatchDetails,
}

impl From<CandidateMatch> for MatchResponse {
    fn from(value: CandidateMatch) -> Self {
        Self {
            id: value.id,
            candidate_id: value.candidate_id,
            job_posting_id: value.job_posting_id,
            match_score: value.match_score,
            match_details: value.match_details,
            status: value.status,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl From<Vec<CandidateMatch>> for MatchListResponse {
    fn from(value: Vec<CandidateMatch>) -> Self {
        let items: Vec<MatchResponse> = value.into_iter().map(Into::into).collect();
        Self {
            total: items.len(),
            items,
        }
    }
}

impl ScorePairResponse {
    pub fn new(candidate_id: Uuid, job_posting_id: Uuid, details: MatchDetails) -> Self {
        Self {
            candidate_id,
            job_posting_id,
            match_score: details.total_score,
            match_details: details,
        }
    }
}
