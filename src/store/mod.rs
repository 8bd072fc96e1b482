pub mod keys;
pub mod query;

use crate::core::api::AnalyticsApi;
use crate::core::model::{AssetDescriptor, AthPrediction, IndicatorReport, PricePoint};
use futures::FutureExt;
use keys::{AssetsKey, AthKey, HistoryKey, IndicatorsKey, PriceKey};
use query::QueryCache;
use std::sync::Arc;
use std::time::Duration;

/// One cache per read endpoint, all backed by the same API client.
///
/// The asset list and single-asset price revalidate every `refresh_interval`;
/// everything else is fetched once per key until invalidated.
#[derive(Clone)]
pub struct AnalyticsQueries {
    pub assets: QueryCache<AssetsKey, Vec<AssetDescriptor>>,
    pub prices: QueryCache<PriceKey, AssetDescriptor>,
    pub history: QueryCache<HistoryKey, Vec<PricePoint>>,
    pub indicators: QueryCache<IndicatorsKey, IndicatorReport>,
    pub ath: QueryCache<AthKey, AthPrediction>,
}

impl AnalyticsQueries {
    pub fn new(api: Arc<dyn AnalyticsApi>, refresh_interval: Duration) -> Self {
        let assets = {
            let api = Arc::clone(&api);
            QueryCache::new(
                "assets",
                Arc::new(move |_: AssetsKey| {
                    let api = Arc::clone(&api);
                    async move { api.list_assets().await }.boxed()
                }),
            )
            .refresh_every(refresh_interval)
        };

        let prices = {
            let api = Arc::clone(&api);
            QueryCache::new(
                "prices",
                Arc::new(move |key: PriceKey| {
                    let api = Arc::clone(&api);
                    async move { api.asset_price(&key.asset_id).await }.boxed()
                }),
            )
            .refresh_every(refresh_interval)
        };

        let history = {
            let api = Arc::clone(&api);
            QueryCache::new(
                "history",
                Arc::new(move |key: HistoryKey| {
                    let api = Arc::clone(&api);
                    async move { api.asset_history(&key.asset_id, key.days).await }.boxed()
                }),
            )
        };

        let indicators = {
            let api = Arc::clone(&api);
            QueryCache::new(
                "indicators",
                Arc::new(move |key: IndicatorsKey| {
                    let api = Arc::clone(&api);
                    async move { api.indicators(&key.asset_id, key.days).await }.boxed()
                }),
            )
        };

        let ath = QueryCache::new(
            "ath",
            Arc::new(move |key: AthKey| {
                let api = Arc::clone(&api);
                async move { api.ath_prediction(&key.asset_id).await }.boxed()
            }),
        );

        Self {
            assets,
            prices,
            history,
            indicators,
            ath,
        }
    }

    pub async fn dispose(&self) {
        self.assets.dispose().await;
        self.prices.dispose().await;
        self.history.dispose().await;
        self.indicators.dispose().await;
        self.ath.dispose().await;
    }
}
