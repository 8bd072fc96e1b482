//! Core abstractions: data model, API contract, errors and configuration

pub mod api;
pub mod config;
pub mod error;
pub mod log;
pub mod model;

// Re-export main types for cleaner imports
pub use api::{AnalyticsApi, ApiError};
pub use error::{SchemaViolation, ValidationError};
pub use model::{
    AssetDescriptor, AssetKind, AthPrediction, DateRange, DayRange, DcaRequest, Frequency,
    IndicatorReport, IndicatorSeries, PricePoint, ProjectionPoint, ProjectionResult, SignalSet,
};
