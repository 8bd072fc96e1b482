use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::core::api::{AnalyticsApi, ApiError};
use crate::core::model::{
    AssetDescriptor, AthPrediction, DcaRequest, IndicatorReport, PricePoint, ProjectionResult,
};

/// `AnalyticsApi` over HTTP/JSON.
pub struct HttpAnalyticsClient {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpAnalyticsClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ApiError::network(format!("Invalid API base URL '{base_url}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::network(format!(
                "Invalid API base URL '{base_url}': cannot hold a path"
            )));
        }
        let client = reqwest::Client::builder()
            .user_agent(concat!("assetscope/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::network(format!("Failed to build HTTP client: {e}")))?;
        Ok(HttpAnalyticsClient { base_url, client })
    }

    /// Appends `segments` to the base path, percent-encoding each one, so an
    /// asset id can never add path components or a query of its own.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::network(format!("Invalid API base URL '{}'", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn endpoint_with_days(&self, segments: &[&str], days: u32) -> Result<Url, ApiError> {
        let mut url = self.endpoint(segments)?;
        url.query_pairs_mut().append_pair("days", &days.to_string());
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(&self, path: &str, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::network(format!("Request error: {e} for {path}")))?;

        debug!(status = %response.status(), "Received analytics response");

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::network(format!("Failed to read response body for {path}: {e}")))?;

        serde_json::from_str(&text)
            .map_err(|e| ApiError::http(status, format!("Failed to parse JSON response for {path}: {e}")))
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        debug!("Requesting {}", url);
        let path = url.path().to_string();
        self.send(&path, self.client.get(url)).await
    }
}

/// FastAPI puts the reason in `detail`; other servers use `message`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
    message: Option<String>,
}

async fn error_from_response(response: Response) -> ApiError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    let server_message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| match b.detail {
            Some(serde_json::Value::String(detail)) => Some(detail),
            Some(other) => Some(other.to_string()),
            None => b.message,
        })
        .filter(|m| !m.trim().is_empty());

    let message = server_message.unwrap_or_else(|| {
        format!(
            "HTTP {} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown Status")
        )
    });
    ApiError::http(status.as_u16(), message)
}

#[async_trait]
impl AnalyticsApi for HttpAnalyticsClient {
    #[instrument(name = "ListAssets", skip(self))]
    async fn list_assets(&self) -> Result<Vec<AssetDescriptor>, ApiError> {
        self.get(self.endpoint(&["assets"])?).await
    }

    #[instrument(name = "AssetPrice", skip(self), fields(asset = %asset_id))]
    async fn asset_price(&self, asset_id: &str) -> Result<AssetDescriptor, ApiError> {
        self.get(self.endpoint(&["assets", asset_id, "price"])?)
            .await
    }

    #[instrument(name = "AssetHistory", skip(self), fields(asset = %asset_id, days))]
    async fn asset_history(&self, asset_id: &str, days: u32) -> Result<Vec<PricePoint>, ApiError> {
        self.get(self.endpoint_with_days(&["assets", asset_id, "history"], days)?)
            .await
    }

    #[instrument(name = "Indicators", skip(self), fields(asset = %asset_id, days))]
    async fn indicators(&self, asset_id: &str, days: u32) -> Result<IndicatorReport, ApiError> {
        self.get(self.endpoint_with_days(&["analysis", asset_id, "indicators"], days)?)
            .await
    }

    #[instrument(name = "DcaProjection", skip(self, request), fields(asset = %request.asset_id))]
    async fn dca_projection(&self, request: &DcaRequest) -> Result<ProjectionResult, ApiError> {
        let url = self.endpoint(&["projections", "dca"])?;
        debug!("Posting projection request to {}", url);
        let path = url.path().to_string();
        self.send(&path, self.client.post(url).json(request)).await
    }

    #[instrument(name = "AthPrediction", skip(self), fields(asset = %asset_id))]
    async fn ath_prediction(&self, asset_id: &str) -> Result<AthPrediction, ApiError> {
        self.get(self.endpoint(&["ath", asset_id, "prediction"])?)
            .await
    }
}
