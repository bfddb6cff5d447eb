pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod models;
pub mod services;
pub mod telemetry;
pub mod utils;

use std::sync::Arc;

use crate::database::PgStore;
use crate::services::matching_service::MatchingService;
use sqlx::PgPool;

/// Shared handles for request handlers. Cheap to clone; holds no per-request
/// state, everything current lives in the database.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub matching: MatchingService<PgStore>,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let store = Arc::new(PgStore::new(pool.clone()));
        let matching = MatchingService::new(store);

        Self { pool, matching }
    }
}
