use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::error::{Error, Result};

pub const CANDIDATE_STATUS_ACTIVE: &str = "active";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Candidate {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub skills: JsonValue,
    pub experience_years: i32,
    pub location: Option<String>,
    pub availability: String,
    pub status: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A proficiency claim, `level` on the 1-5 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CandidateSkill {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(range(min = 1, max = 5))]
    pub level: i32,
}

/// The parts of a candidate record the scorer reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CandidateProfile {
    #[validate(nested)]
    pub skills: Vec<CandidateSkill>,
    pub experience: u32,
    pub location: Option<String>,
    pub availability: String,
}

impl Candidate {
    pub fn active(
        name: impl Into<String>,
        email: impl Into<String>,
        skills: JsonValue,
        experience_years: i32,
        location: Option<String>,
        availability: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            skills,
            experience_years,
            location,
            availability: availability.into(),
            status: CANDIDATE_STATUS_ACTIVE.to_string(),
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    pub fn profile(&self) -> Result<CandidateProfile> {
        let skills: Vec<CandidateSkill> = serde_json::from_value(self.skills.clone())
            .map_err(|e| Error::MalformedProfile(format!("candidate {}: {}", self.id, e)))?;
        let experience = u32::try_from(self.experience_years).map_err(|_| {
            Error::MalformedProfile(format!(
                "candidate {}: negative experience {}",
                self.id, self.experience_years
            ))
        })?;

        let profile = CandidateProfile {
            skills,
            experience,
            location: self.location.clone(),
            availability: self.availability.clone(),
        };
        profile
            .validate()
            .map_err(|e| Error::MalformedProfile(format!("candidate {}: {}", self.id, e)))?;
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn profile_reads_skills_from_json() {
        let candidate = Candidate::active(
            "Ada",
            "ada@example.com",
            json!([{ "name": "Rust", "level": 5 }, { "name": "SQL", "level": 3 }]),
            7,
            Some("Berlin".into()),
            "immediately",
        );

        let profile = candidate.profile().unwrap();
        assert_eq!(profile.skills.len(), 2);
        assert_eq!(profile.skills[0].name, "Rust");
        assert_eq!(profile.experience, 7);
    }

    #[test]
    fn profile_rejects_out_of_range_level() {
        let candidate = Candidate::active(
            "Ada",
            "ada@example.com",
            json!([{ "name": "Rust", "level": 9 }]),
            1,
            None,
            "immediately",
        );

        assert!(matches!(candidate.profile(), Err(Error::MalformedProfile(_))));
    }

    #[test]
    fn profile_rejects_negative_experience() {
        let candidate = Candidate::active("Ada", "ada@example.com", json!([]), -2, None, "immediately");
        assert!(matches!(candidate.profile(), Err(Error::MalformedProfile(_))));
    }
}
