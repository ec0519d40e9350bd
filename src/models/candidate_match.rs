use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::Error;

/// Review state of a match. Any state may move to any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    #[default]
    Pending,
    Reviewed,
    Contacted,
    Rejected,
}

impl MatchStatus {
    pub const ALL: [MatchStatus; 4] = [
        MatchStatus::Pending,
        MatchStatus::Reviewed,
        MatchStatus::Contacted,
        MatchStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Pending => "pending",
            MatchStatus::Reviewed => "reviewed",
            MatchStatus::Contacted => "contacted",
            MatchStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchStatus {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim();
        MatchStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(normalized))
            .ok_or_else(|| Error::InvalidStatus(value.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillMatch {
    pub skill: String,
    pub required: bool,
    pub level: i32,
    #[serde(rename = "match")]
    pub is_match: bool,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchDetails {
    pub skill_matches: Vec<SkillMatch>,
    pub experience_match: f64,
    pub location_match: bool,
    pub availability_match: bool,
    pub total_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateMatch {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub job_posting_id: Uuid,
    pub match_score: f64,
    pub match_details: MatchDetails,
    pub status: MatchStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Write request for the `(candidate_id, job_posting_id)` upsert. The stored
/// `match_score` is always taken from `details.total_score`.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchUpsert {
    pub candidate_id: Uuid,
    pub job_posting_id: Uuid,
    pub details: MatchDetails,
    pub reset_status: bool,
}

impl MatchUpsert {
    pub fn match_score(&self) -> f64 {
        self.details.total_score
    }
}
