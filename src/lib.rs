pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

use crate::config::Config;
use crate::database::candidate_store::SqliteCandidateStore;
use crate::services::{
    candidate_repository::CandidateRepository,
    currency_service::{CurrencyRepository, CurrencyService, ExchangeRateClient},
};
use reqwest::Client;
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub candidate_repository: CandidateRepository,
    pub currency_repository: CurrencyRepository,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: &Config) -> error::Result<Self> {
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.http_timeout_secs))
            .build()?;
        let currency_service = CurrencyService::new(config.currency_api_url.clone(), http_client);
        Ok(Self::with_rate_client(pool, Arc::new(currency_service)))
    }

    pub fn with_rate_client(pool: SqlitePool, rate_client: Arc<dyn ExchangeRateClient>) -> Self {
        let store = SqliteCandidateStore::new(pool.clone());
        Self {
            pool,
            candidate_repository: CandidateRepository::new(Arc::new(store)),
            currency_repository: CurrencyRepository::new(rate_client),
        }
    }
}
