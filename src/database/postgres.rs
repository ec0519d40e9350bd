use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow, PgPool};
use uuid::Uuid;

use crate::database::repository::MatchRepository;
use crate::error::{Error, Result};
use crate::models::candidate::{Candidate, CANDIDATE_STATUS_ACTIVE};
use crate::models::candidate_match::{CandidateMatch, MatchDetails, MatchStatus, MatchUpsert};
use crate::models::job_posting::{JobPosting, JOB_POSTING_STATUS_OPEN};

const CANDIDATE_COLUMNS: &str = "id, name, email, skills, experience_years, location, availability, status, created_at, updated_at";
const JOB_POSTING_COLUMNS: &str =
    "id, company_id, title, status, requirements, created_at, updated_at";
const MATCH_COLUMNS: &str = "id, candidate_id, job_posting_id, match_score, match_details, status, created_at, updated_at";

#[derive(Clone)]
pub struct PgMatchRepository {
    pool: PgPool,
}

#[derive(Debug, FromRow)]
struct MatchRow {
    id: Uuid,
    candidate_id: Uuid,
    job_posting_id: Uuid,
    match_score: f64,
    match_details: Json<MatchDetails>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<MatchRow> for CandidateMatch {
    type Error = Error;

    fn try_from(row: MatchRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            candidate_id: row.candidate_id,
            job_posting_id: row.job_posting_id,
            match_score: row.match_score,
            match_details: row.match_details.0,
            status: row.status.parse()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_matches(rows: Vec<MatchRow>) -> Result<Vec<CandidateMatch>> {
    rows.into_iter().map(CandidateMatch::try_from).collect()
}

impl PgMatchRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MatchRepository for PgMatchRepository {
    async fn find_candidate(&self, id: Uuid) -> Result<Option<Candidate>> {
        let query = format!("SELECT {} FROM candidates WHERE id = $1", CANDIDATE_COLUMNS);
        let candidate = sqlx::query_as::<_, Candidate>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(candidate)
    }

    async fn find_job_posting(&self, id: Uuid) -> Result<Option<JobPosting>> {
        let query = format!(
            "SELECT {} FROM job_postings WHERE id = $1",
            JOB_POSTING_COLUMNS
        );
        let posting = sqlx::query_as::<_, JobPosting>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(posting)
    }

    async fn list_active_candidates(&self) -> Result<Vec<Candidate>> {
        let query = format!(
            "SELECT {} FROM candidates WHERE status = $1 ORDER BY created_at",
            CANDIDATE_COLUMNS
        );
        let candidates = sqlx::query_as::<_, Candidate>(&query)
            .bind(CANDIDATE_STATUS_ACTIVE)
            .fetch_all(&self.pool)
            .await?;
        Ok(candidates)
    }

    async fn list_open_job_postings(&self) -> Result<Vec<JobPosting>> {
        let query = format!(
            "SELECT {} FROM job_postings WHERE status = $1 ORDER BY created_at",
            JOB_POSTING_COLUMNS
        );
        let postings = sqlx::query_as::<_, JobPosting>(&query)
            .bind(JOB_POSTING_STATUS_OPEN)
            .fetch_all(&self.pool)
            .await?;
        Ok(postings)
    }

    async fn upsert_match(&self, upsert: MatchUpsert) -> Result<CandidateMatch> {
        let query = format!(
            r#"
            INSERT INTO candidate_matches (candidate_id, job_posting_id, match_score, match_details, status)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (candidate_id, job_posting_id) DO UPDATE SET
                match_score = EXCLUDED.match_score,
                match_details = EXCLUDED.match_details,
                status = CASE WHEN $6 THEN EXCLUDED.status ELSE candidate_matches.status END,
                updated_at = NOW()
            RETURNING {}
            "#,
            MATCH_COLUMNS
        );
        let row = sqlx::query_as::<_, MatchRow>(&query)
            .bind(upsert.candidate_id)
            .bind(upsert.job_posting_id)
            .bind(upsert.match_score())
            .bind(Json(&upsert.details))
            .bind(MatchStatus::Pending.as_str())
            .bind(upsert.reset_status)
            .fetch_one(&self.pool)
            .await?;
        row.try_into()
    }

    async fn find_match(&self, id: Uuid) -> Result<Option<CandidateMatch>> {
        let query = format!("SELECT {} FROM candidate_matches WHERE id = $1", MATCH_COLUMNS);
        let row = sqlx::query_as::<_, MatchRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(CandidateMatch::try_from).transpose()
    }

    async fn update_match_status(
        &self,
        id: Uuid,
        status: MatchStatus,
    ) -> Result<Option<CandidateMatch>> {
        let query = format!(
            r#"
            UPDATE candidate_matches
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            MATCH_COLUMNS
        );
        let row = sqlx::query_as::<_, MatchRow>(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.map(CandidateMatch::try_from).transpose()
    }

    async fn list_matches_for_candidate(&self, candidate_id: Uuid) -> Result<Vec<CandidateMatch>> {
        let query = format!(
            "SELECT {} FROM candidate_matches WHERE candidate_id = $1 ORDER BY match_score DESC, updated_at DESC",
            MATCH_COLUMNS
        );
        let rows = sqlx::query_as::<_, MatchRow>(&query)
            .bind(candidate_id)
            .fetch_all(&self.pool)
            .await?;
        into_matches(rows)
    }

    async fn list_matches_for_job_posting(
        &self,
        job_posting_id: Uuid,
    ) -> Result<Vec<CandidateMatch>> {
        let query = format!(
            "SELECT {} FROM candidate_matches WHERE job_posting_id = $1 ORDER BY match_score DESC, updated_at DESC",
            MATCH_COLUMNS
        );
        let rows = sqlx::query_as::<_, MatchRow>(&query)
            .bind(job_posting_id)
            .fetch_all(&self.pool)
            .await?;
        into_matches(rows)
    }
}
