//! Error types for the analytics core

use thiserror::Error;

/// Errors surfaced by the report builders and engines
///
/// Out-of-range reference lookups are deliberately NOT errors: the
/// engines extrapolate from the nearest anchor and flag the result as
/// low-confidence instead of aborting the report.
#[derive(Error, Debug)]
pub enum AnalyticsError {
    /// No growth report can be produced: every metric series is empty
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// No nutrition report can be produced: the meal history is empty
    #[error("empty meal history: {0}")]
    EmptyHistory(String),

    /// Malformed input escaped upstream validation; the core fails
    /// closed rather than producing a misleading result
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for analytics operations
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;
