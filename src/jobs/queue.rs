//! PostgreSQL-backed job storages shared by the server and the worker.

use apalis_sql::postgres::PostgresStorage;
use apalis_sql::sqlx::postgres::{PgPool, PgPoolOptions};
use apalis_sql::Config as QueueConfig;

use super::{EmailJob, SmsJob};
use crate::config::{Config, JOB_NAME_EMAIL, JOB_NAME_SMS};
use crate::errors::{AppError, AppResult};

/// Email and SMS storages over one pool.
#[derive(Clone)]
pub struct JobQueues {
    pub email: PostgresStorage<EmailJob>,
    pub sms: PostgresStorage<SmsJob>,
}

impl JobQueues {
    /// Connect and make sure the apalis tables exist.
    pub async fn connect(config: &Config) -> AppResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&config.database_url)
            .await
            .map_err(|e| AppError::internal(format!("Failed to connect to job queue: {}", e)))?;

        PostgresStorage::setup(&pool)
            .await
            .map_err(|e| AppError::internal(format!("Failed to setup job storage: {}", e)))?;

        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            email: PostgresStorage::new_with_config(pool.clone(), QueueConfig::new(JOB_NAME_EMAIL)),
            sms: PostgresStorage::new_with_config(pool, QueueConfig::new(JOB_NAME_SMS)),
        }
    }
}
