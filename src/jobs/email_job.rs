//! Outbound email, delivered by the `jobs work` worker.
//!
//! With no `SMTP_HOST` the worker writes each message to the log, which is
//! how reset codes are read in local development.

use std::env;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

const DEFAULT_SENDER: &str = "noreply@storefront.example.com";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailJob {
    pub to: String,
    pub subject: String,
    /// HTML body
    pub body: String,
    /// Overrides `SMTP_FROM`
    #[serde(default)]
    pub from: Option<String>,
}

impl EmailJob {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
            from: None,
        }
    }

    fn sender(&self) -> String {
        self.from
            .clone()
            .or_else(|| env::var("SMTP_FROM").ok().filter(|s| !s.is_empty()))
            .unwrap_or_else(|| DEFAULT_SENDER.to_string())
    }
}

pub async fn email_job_handler(job: EmailJob) -> Result<(), AppError> {
    let from = job.sender();
    tracing::info!(to = %job.to, from = %from, subject = %job.subject, "Delivering email");

    match env::var("SMTP_HOST").ok().filter(|h| !h.is_empty()) {
        None => {
            tracing::info!(
                to = %job.to,
                subject = %job.subject,
                body = %job.body,
                "SMTP_HOST unset, email logged only"
            );
        }
        Some(host) => {
            // TODO: hand the message to an SMTP transport once one is added to the stack
            tracing::warn!(%host, to = %job.to, "No SMTP transport wired in; email dropped");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_ok;

    #[tokio::test]
    async fn test_logged_delivery_succeeds() {
        let job = EmailJob::new("a@example.com", "Hello", "<p>Body</p>");
        assert_ok!(email_job_handler(job).await);
    }

    #[test]
    fn test_explicit_sender_wins() {
        let mut job = EmailJob::new("a@example.com", "s", "b");
        job.from = Some("orders@shop.test".into());
        assert_eq!(job.sender(), "orders@shop.test");
    }

    #[test]
    fn test_sender_is_optional_in_payload() {
        let job: EmailJob =
            serde_json::from_str(r#"{"to":"a@b.c","subject":"s","body":"b"}"#).unwrap();
        assert_eq!(job.from, None);
    }
}
