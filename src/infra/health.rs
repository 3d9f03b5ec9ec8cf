//! Connectivity probes for the health endpoint.

use async_trait::async_trait;

use super::{Cache, Database};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Reachability of the backing services. Errors are human-readable.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn database(&self) -> Result<(), String>;

    async fn redis(&self) -> Result<(), String>;
}

/// The live PostgreSQL and Redis connections.
pub struct Infrastructure {
    database: Database,
    cache: Cache,
}

impl Infrastructure {
    pub fn new(database: Database, cache: Cache) -> Self {
        Self { database, cache }
    }
}

#[async_trait]
impl HealthProbe for Infrastructure {
    async fn database(&self) -> Result<(), String> {
        self.database.ping().await.map_err(|e| e.to_string())
    }

    async fn redis(&self) -> Result<(), String> {
        self.cache.ping().await.map_err(|e| e.to_string())
    }
}
