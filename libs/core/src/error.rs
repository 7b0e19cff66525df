//! Error types for policy parsing and snapshot ingestion.
//!
//! The taxonomy is narrow: the core is largely pure, and not-found
//! conditions (unknown ASG names, unknown zones, empty candidate sets)
//! are empty results rather than errors.

use thiserror::Error;

/// Errors produced when parsing a max-unavailable specification.
///
/// Raised at the configuration boundary, before any budget math runs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StrategyError {
    /// The specification string is empty.
    #[error("max-unavailable value cannot be empty")]
    Empty,

    /// The percentage portion is not an unsigned integer.
    #[error("invalid percentage: {0:?}")]
    InvalidPercentage(String),

    /// The percentage is outside 0..=100.
    #[error("percentage out of range: {0}%")]
    PercentageOutOfRange(u32),

    /// The absolute count is not an unsigned integer.
    #[error("invalid count: {0:?}")]
    InvalidCount(String),
}

impl StrategyError {
    /// Returns true if this error indicates a syntactically valid but
    /// out-of-range percentage.
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, StrategyError::PercentageOutOfRange(_))
    }
}

/// Errors produced when strictly parsing a provider lifecycle state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StateError {
    /// The state string is not one the provider documents.
    #[error("unknown lifecycle state: {0:?}")]
    UnknownState(String),
}
