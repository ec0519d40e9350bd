use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::models::candidate::CandidateProfile;
use crate::models::candidate_match::{MatchDetails, SkillMatch};
use crate::models::job_posting::{JobRequirements, SkillRequirement};
use crate::utils::time;

/// Availability values that mean "can start now".
pub const IMMEDIATE_AVAILABILITY: [&str; 2] = ["immediately", "available immediately"];

pub const REQUIRED_SKILL_SCALE: f64 = 100.0;
pub const PREFERRED_SKILL_SCALE: f64 = 50.0;
pub const MAX_SCORE: f64 = 100.0;

pub const SCORE_WEIGHTS: Weights = Weights {
    skills: 0.6,
    experience: 0.2,
    location: 0.1,
    availability: 0.1,
};

#[derive(Debug, Clone, Copy)]
pub struct Weights {
    pub skills: f64,
    pub experience: f64,
    pub location: f64,
    pub availability: f64,
}

impl Weights {
    pub fn sum(&self) -> f64 {
        self.skills + self.experience + self.location + self.availability
    }
}

/// Weighted candidate/job compatibility scoring.
///
/// Missing required skills lower the score but never reject the candidate.
/// Per-skill scores are not capped, a candidate well above a requirement can
/// score over 100 on that entry; only `total_score` is clamped.
pub struct MatchScorer;

impl MatchScorer {
    pub fn compute(candidate: &CandidateProfile, requirements: &JobRequirements) -> MatchDetails {
        Self::compute_at(candidate, requirements, time::now())
    }

    pub fn compute_at(
        candidate: &CandidateProfile,
        requirements: &JobRequirements,
        now: DateTime<Utc>,
    ) -> MatchDetails {
        let mut levels: HashMap<String, i32> = HashMap::with_capacity(candidate.skills.len());
        for skill in &candidate.skills {
            levels.entry(skill.name.to_lowercase()).or_insert(skill.level);
        }

        let skill_matches: Vec<SkillMatch> = requirements
            .required_skills
            .iter()
            .map(|req| score_skill(&levels, req, true, REQUIRED_SKILL_SCALE))
            .chain(
                requirements
                    .preferred_skills
                    .iter()
                    .map(|req| score_skill(&levels, req, false, PREFERRED_SKILL_SCALE)),
            )
            .collect();

        let skill_term = if skill_matches.is_empty() {
            0.0
        } else {
            let total_skill_score: f64 = skill_matches.iter().map(|m| m.score).sum();
            total_skill_score / skill_matches.len() as f64
        };

        let experience_match = experience_score(candidate.experience, requirements.experience);
        let location_match =
            location_matches(candidate.location.as_deref(), requirements.location.as_deref());
        let availability_match = is_available(&candidate.availability, now);

        let total_score = (skill_term * SCORE_WEIGHTS.skills
            + experience_match * SCORE_WEIGHTS.experience
            + flag_score(location_match) * SCORE_WEIGHTS.location
            + flag_score(availability_match) * SCORE_WEIGHTS.availability)
            .min(MAX_SCORE);

        MatchDetails {
            skill_matches,
            experience_match,
            location_match,
            availability_match,
            total_score,
        }
    }
}

fn score_skill(
    levels: &HashMap<String, i32>,
    requirement: &SkillRequirement,
    required: bool,
    scale: f64,
) -> SkillMatch {
    let candidate_level = levels.get(&requirement.name.to_lowercase()).copied();
    let is_match = matches!(candidate_level, Some(level) if level >= requirement.level);
    let score = match candidate_level {
        Some(level) if is_match => level as f64 / requirement.level as f64 * scale,
        _ => 0.0,
    };

    SkillMatch {
        skill: requirement.name.clone(),
        required,
        level: requirement.level,
        is_match,
        score,
    }
}

fn experience_score(candidate_years: u32, required_years: u32) -> f64 {
    if required_years == 0 {
        return MAX_SCORE;
    }
    (candidate_years as f64 / required_years as f64 * 100.0).min(MAX_SCORE)
}

fn location_matches(candidate: Option<&str>, required: Option<&str>) -> bool {
    match required {
        None => true,
        Some(required) if required.is_empty() => true,
        Some(required) => {
            candidate.is_some_and(|location| location.to_lowercase() == required.to_lowercase())
        }
    }
}

fn is_available(availability: &str, now: DateTime<Utc>) -> bool {
    let trimmed = availability.trim();
    if IMMEDIATE_AVAILABILITY
        .iter()
        .any(|sentinel| sentinel.eq_ignore_ascii_case(trimmed))
    {
        return true;
    }
    time::parse_date_or_datetime(trimmed).is_some_and(|from| from <= now)
}

fn flag_score(flag: bool) -> f64 {
    if flag {
        100.0
    } else {
        0.0
    }
}
