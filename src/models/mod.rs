pub mod candidate;
pub mod candidate_match;
pub mod job_posting;
