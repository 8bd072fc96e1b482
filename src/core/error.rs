//! Client-side error categories.
//!
//! Transport failures live with the API contract in [`crate::core::api`].
//! The two kinds here never come from the network: bad user input, and
//! payloads that break the analytics service's own contract.

use thiserror::Error;

/// User input rejected before any request is made.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Amount must be greater than zero, got {0}")]
    NonPositiveAmount(f64),
    #[error("Unsupported duration: {0} years (allowed: 1, 2, 3, 5, 10, 15, 20)")]
    UnsupportedDuration(u32),
    #[error("An asset must be selected")]
    EmptyAssetId,
    #[error("Invalid frequency: {0} (allowed: daily, weekly, biweekly, monthly)")]
    InvalidFrequency(String),
    #[error("Days must be between {min} and {max}, got {value}")]
    DaysOutOfRange { value: u32, min: u32, max: u32 },
}

/// A payload that breaks an invariant the analytics service promises.
///
/// This is a defect upstream, not a transient condition, so it is never
/// retried, truncated or padded over.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaViolation {
    #[error("Series '{series}' has {actual} entries, expected {expected}")]
    LengthMismatch {
        series: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("Timestamps are not strictly increasing at index {index}")]
    NonIncreasingTimestamps { index: usize },
    #[error("Year {year}: {band} band is not ordered low <= mid <= high")]
    InvertedBand { year: u32, band: &'static str },
    #[error("Projection year {year} at index {index} is not 1-based and increasing")]
    NonIncreasingYears { index: usize, year: u32 },
    #[error("Year {year}: total invested decreased")]
    DecreasingInvestment { year: u32 },
}
