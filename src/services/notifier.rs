//! Outbound notifications.
//!
//! Services hand email and SMS jobs to a [`Notifier`]; the production
//! implementation enqueues them on the apalis PostgreSQL queue, which the
//! `jobs work` command drains.

use apalis::prelude::Storage;
use apalis_sql::postgres::PostgresStorage;
use async_trait::async_trait;

use crate::errors::{AppError, AppResult};
use crate::jobs::{EmailJob, SmsJob};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Delivery seam for email and SMS jobs.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_email(&self, job: EmailJob) -> AppResult<()>;

    async fn send_sms(&self, job: SmsJob) -> AppResult<()>;
}

/// Enqueues jobs on the PostgreSQL-backed apalis queues.
#[derive(Clone)]
pub struct QueueNotifier {
    email: PostgresStorage<EmailJob>,
    sms: PostgresStorage<SmsJob>,
}

impl QueueNotifier {
    pub fn new(email: PostgresStorage<EmailJob>, sms: PostgresStorage<SmsJob>) -> Self {
        Self { email, sms }
    }
}

fn queue_error(e: impl std::fmt::Display) -> AppError {
    AppError::internal(format!("Failed to enqueue job: {}", e))
}

#[async_trait]
impl Notifier for QueueNotifier {
    async fn send_email(&self, job: EmailJob) -> AppResult<()> {
        let mut storage = self.email.clone();
        storage.push(job).await.map_err(queue_error)?;
        Ok(())
    }

    async fn send_sms(&self, job: SmsJob) -> AppResult<()> {
        let mut storage = self.sms.clone();
        storage.push(job).await.map_err(queue_error)?;
        Ok(())
    }
}

/// Send without letting a delivery failure reach the caller.
pub(crate) async fn email_best_effort(notifier: &dyn Notifier, job: EmailJob) {
    let to = job.to.clone();
    if let Err(e) = notifier.send_email(job).await {
        tracing::warn!(to = %to, error = %e, "Email notification not queued");
    }
}

/// SMS counterpart of [`email_best_effort`]; `None` is skipped silently.
pub(crate) async fn sms_best_effort(notifier: &dyn Notifier, job: Option<SmsJob>) {
    let Some(job) = job else { return };
    let to = job.to.clone();
    if let Err(e) = notifier.send_sms(job).await {
        tracing::warn!(to = %to, error = %e, "SMS notification not queued");
    }
}
