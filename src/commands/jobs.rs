//! Jobs command - runs the notification workers and inspects their queues.
//!
//! ```bash
//! storefront jobs work    # deliver queued email and SMS until Ctrl+C
//! storefront jobs list    # per-queue counts by status
//! storefront jobs clear   # drop failed notifications
//! ```

use std::collections::BTreeMap;

use apalis::prelude::*;
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};

use crate::cli::args::{JobsAction, JobsArgs};
use crate::config::{Config, JOB_NAME_EMAIL, JOB_NAME_SMS};
use crate::errors::{AppError, AppResult};
use crate::infra::Database;
use crate::jobs::{email_job_handler, sms_job_handler, JobQueues};

pub async fn execute(args: JobsArgs, config: Config) -> AppResult<()> {
    match args.action {
        JobsAction::Work => run_workers(&config).await,
        JobsAction::List => list_jobs(&config).await,
        JobsAction::Clear => clear_failed_jobs(&config).await,
    }
}

async fn run_workers(config: &Config) -> AppResult<()> {
    let queues = JobQueues::connect(config).await?;

    let email_worker = WorkerBuilder::new("email-worker")
        .backend(queues.email)
        .build_fn(email_job_handler);
    let sms_worker = WorkerBuilder::new("sms-worker")
        .backend(queues.sms)
        .build_fn(sms_job_handler);

    tracing::info!("Notification workers started, Ctrl+C to stop");

    tokio::select! {
        result = Monitor::new().register(email_worker).register(sms_worker).run() => {
            result.map_err(|e| AppError::internal(format!("Worker failed: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown requested");
        }
    }

    tracing::info!("Notification workers stopped");
    Ok(())
}

fn query_error(e: sea_orm::DbErr) -> AppError {
    AppError::internal(format!("Job query failed: {}", e))
}

/// Connection for queue inspection, or `None` before the first worker
/// has created the apalis schema.
async fn queue_database(config: &Config) -> AppResult<Option<DatabaseConnection>> {
    let db = Database::open(config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?
        .get_connection();

    let row = db
        .query_one(Statement::from_string(
            DatabaseBackend::Postgres,
            "SELECT EXISTS(SELECT 1 FROM information_schema.schemata \
             WHERE schema_name = 'apalis') AS present"
                .to_string(),
        ))
        .await
        .map_err(query_error)?;

    let present = match row {
        Some(row) => row.try_get::<bool>("", "present").map_err(query_error)?,
        None => false,
    };
    Ok(present.then_some(db))
}

fn storefront_queues() -> [sea_orm::Value; 2] {
    [JOB_NAME_EMAIL.into(), JOB_NAME_SMS.into()]
}

async fn list_jobs(config: &Config) -> AppResult<()> {
    let Some(db) = queue_database(config).await? else {
        println!("No job queue yet. Start `jobs work` once to create it.");
        return Ok(());
    };

    let rows = db
        .query_all(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            "SELECT job_type, status::text AS status, COUNT(*)::bigint AS total \
             FROM apalis.jobs WHERE job_type IN ($1, $2) GROUP BY job_type, status",
            storefront_queues(),
        ))
        .await
        .map_err(query_error)?;

    let mut counts: BTreeMap<String, BTreeMap<String, i64>> = BTreeMap::new();
    for row in rows {
        let queue: String = row.try_get("", "job_type").map_err(query_error)?;
        let status: String = row.try_get("", "status").map_err(query_error)?;
        let total: i64 = row.try_get("", "total").map_err(query_error)?;
        counts.entry(queue).or_default().insert(status, total);
    }

    for queue in [JOB_NAME_EMAIL, JOB_NAME_SMS] {
        let by_status = counts.remove(queue).unwrap_or_default();
        let summary: Vec<String> = ["Pending", "Running", "Failed", "Done"]
            .iter()
            .map(|status| {
                let total = by_status.get(*status).copied().unwrap_or(0);
                format!("{} {}", status.to_lowercase(), total)
            })
            .collect();
        println!("{:<20} {}", queue, summary.join(", "));
    }

    Ok(())
}

async fn clear_failed_jobs(config: &Config) -> AppResult<()> {
    let Some(db) = queue_database(config).await? else {
        println!("No job queue yet. Nothing to clear.");
        return Ok(());
    };

    let result = db
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            "DELETE FROM apalis.jobs WHERE status = 'Failed' AND job_type IN ($1, $2)",
            storefront_queues(),
        ))
        .await
        .map_err(query_error)?;

    tracing::info!(removed = result.rows_affected(), "Failed notifications cleared");
    println!("Removed {} failed job(s).", result.rows_affected());
    Ok(())
}
