use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::error::{Error, Result};

pub const JOB_POSTING_STATUS_OPEN: &str = "open";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobPosting {
    pub id: Uuid,
    pub company_id: Uuid,
    pub title: String,
    pub status: String,
    pub requirements: JsonValue,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SkillRequirement {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(range(min = 1, max = 5))]
    pub level: i32,
    #[serde(default)]
    pub required: bool,
}

/// Requirements block stored on a posting. `remote` is carried for readers
/// and is not part of the score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct JobRequirements {
    #[validate(nested)]
    pub required_skills: Vec<SkillRequirement>,
    #[serde(default)]
    #[validate(nested)]
    pub preferred_skills: Vec<SkillRequirement>,
    pub experience: u32,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub remote: bool,
}

impl JobPosting {
    pub fn open(company_id: Uuid, title: impl Into<String>, requirements: JsonValue) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            company_id,
            title: title.into(),
            status: JOB_POSTING_STATUS_OPEN.to_string(),
            requirements,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    pub fn parsed_requirements(&self) -> Result<JobRequirements> {
        let requirements: JobRequirements = serde_json::from_value(self.requirements.clone())
            .map_err(|e| Error::MalformedRequirements(format!("job posting {}: {}", self.id, e)))?;
        requirements
            .validate()
            .map_err(|e| Error::MalformedRequirements(format!("job posting {}: {}", self.id, e)))?;
        Ok(requirements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_camel_case_requirements() {
        let posting = JobPosting::open(
            Uuid::new_v4(),
            "Backend Engineer",
            json!({
                "requiredSkills": [{ "name": "Rust", "level": 4, "required": true }],
                "preferredSkills": [{ "name": "Kafka", "level": 2, "required": false }],
                "experience": 3,
                "location": "Berlin",
                "remote": true
            }),
        );

        let requirements = posting.parsed_requirements().unwrap();
        assert_eq!(requirements.required_skills[0].name, "Rust");
        assert_eq!(requirements.preferred_skills[0].level, 2);
        assert_eq!(requirements.location.as_deref(), Some("Berlin"));
        assert!(requirements.remote);
    }

    #[test]
    fn missing_experience_is_malformed() {
        let posting = JobPosting::open(
            Uuid::new_v4(),
            "Backend Engineer",
            json!({ "requiredSkills": [] }),
        );
        assert!(matches!(
            posting.parsed_requirements(),
            Err(Error::MalformedRequirements(_))
        ));
    }

    #[test]
    fn zero_skill_level_is_malformed() {
        let posting = JobPosting::open(
            Uuid::new_v4(),
            "Backend Engineer",
            json!({
                "requiredSkills": [{ "name": "Rust", "level": 0 }],
                "experience": 1
            }),
        );
        assert!(matches!(
            posting.parsed_requirements(),
            Err(Error::MalformedRequirements(_))
        ));
    }
}
