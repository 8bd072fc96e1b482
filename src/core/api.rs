//! Analytics API abstraction

use crate::core::model::{
    AssetDescriptor, AthPrediction, DcaRequest, IndicatorReport, PricePoint, ProjectionResult,
};
use async_trait::async_trait;
use thiserror::Error;

/// A failed round trip to the analytics service.
///
/// `status` is `None` when no HTTP response was received at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", describe(.status, .message))]
pub struct ApiError {
    pub status: Option<u16>,
    pub message: String,
}

fn describe(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("API error {code}: {message}"),
        None => format!("Network error: {message}"),
    }
}

impl ApiError {
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }
}

/// One operation per analytics endpoint. Each call is exactly one request:
/// no retries and no caching happen behind this trait.
#[async_trait]
pub trait AnalyticsApi: Send + Sync {
    async fn list_assets(&self) -> Result<Vec<AssetDescriptor>, ApiError>;

    async fn asset_price(&self, asset_id: &str) -> Result<AssetDescriptor, ApiError>;

    async fn asset_history(&self, asset_id: &str, days: u32) -> Result<Vec<PricePoint>, ApiError>;

    async fn indicators(&self, asset_id: &str, days: u32) -> Result<IndicatorReport, ApiError>;

    async fn dca_projection(&self, request: &DcaRequest) -> Result<ProjectionResult, ApiError>;

    async fn ath_prediction(&self, asset_id: &str) -> Result<AthPrediction, ApiError>;
}
