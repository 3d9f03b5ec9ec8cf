//! Small helpers shared by services and jobs.

pub mod phone;
pub mod templates;

pub use phone::format_phone;
