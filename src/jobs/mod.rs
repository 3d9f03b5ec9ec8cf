//! Background jobs drained by the `jobs work` command.

mod email_job;
mod queue;
mod sms_job;

pub use email_job::{email_job_handler, EmailJob};
pub use queue::JobQueues;
pub use sms_job::{sms_job_handler, SmsJob};
