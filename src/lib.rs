pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use crate::database::{MatchRepository, PgMatchRepository};
use crate::services::matching_service::{MatchingService, RescorePolicy};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub matching_service: MatchingService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();
        Self::with_repository(
            Arc::new(PgMatchRepository::new(pool)),
            config.rescore_policy,
        )
    }

    pub fn with_repository(repo: Arc<dyn MatchRepository>, rescore_policy: RescorePolicy) -> Self {
        Self {
            matching_service: MatchingService::new(repo, rescore_policy),
        }
    }
}
