//! SMS background job.
//!
//! Messages are logged unless an SMS gateway key is configured.

use serde::{Deserialize, Serialize};
use std::env;

use crate::errors::AppError;

/// SMS job payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsJob {
    /// Recipient in international format (`+<country><number>`)
    pub to: String,
    pub body: String,
}

impl SmsJob {
    pub fn new(to: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            body: body.into(),
        }
    }
}

/// SMS job handler
pub async fn sms_job_handler(job: SmsJob) -> Result<(), AppError> {
    let gateway_key = env::var("SMS_API_KEY").ok().filter(|k| !k.is_empty());

    tracing::info!(to = %job.to, "Processing SMS job");

    if gateway_key.is_none() {
        tracing::warn!("SMS gateway not configured - logging message instead of sending");
        tracing::info!("=== SMS (not sent) ===\nTo: {}\n{}\n======================", job.to, job.body);
        return Ok(());
    }

    // TODO: call the SMS gateway HTTP API once a provider is selected
    tracing::warn!(to = %job.to, "SMS gateway key set but no provider client is wired in");
    Ok(())
}
