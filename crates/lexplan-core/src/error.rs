//! Core error types.
//!
//! Only malformed configuration is fatal here. Scheduling-policy
//! conditions (pool exhaustion, review deferral) are resolved internally
//! and never surface as errors; persistence errors live in
//! `lexplan-store`.

use chrono::NaiveDate;
use thiserror::Error;

/// A learning plan that cannot be scheduled against.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A plan field holds a value the scheduler cannot work with.
    #[error("plan field `{field}` is invalid: {reason}")]
    InvalidField { field: String, reason: String },

    /// Proportions that must form a distribution do not sum to 1.0.
    #[error("plan field `{field}` proportions sum to {sum:.4}, expected 1.0")]
    BadProportions { field: String, sum: f64 },

    /// The requested date precedes the plan's start date.
    #[error("target date {date} is before plan start {start}")]
    DateBeforePlanStart { date: NaiveDate, start: NaiveDate },
}

impl ConfigError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidField {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}
