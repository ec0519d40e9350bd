pub mod match_scorer;
pub mod matching_service;
