pub mod cli;
pub mod core;
pub mod projection_runner;
pub mod providers;
pub mod store;
pub mod view;

use crate::core::api::AnalyticsApi;
use crate::core::config::AppConfig;
use crate::core::model::{DcaRequest, Frequency};
use crate::projection_runner::ProjectionRunner;
use crate::providers::HttpAnalyticsClient;
use crate::store::AnalyticsQueries;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

/// Rows shown by the table views when `--rows` is not given.
pub const DEFAULT_ROWS: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    Assets {
        watch: bool,
    },
    Analyze {
        asset: String,
        days: Option<u32>,
        rows: usize,
    },
    History {
        asset: String,
        days: Option<u32>,
        rows: usize,
    },
    Project {
        asset: String,
        amount: f64,
        frequency: Frequency,
        years: u32,
    },
    Ath {
        asset: String,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");
    info!(base_url = %config.api.base_url, "Using analytics API");

    let api: Arc<dyn AnalyticsApi> = Arc::new(HttpAnalyticsClient::new(&config.api.base_url)?);
    let queries = AnalyticsQueries::new(Arc::clone(&api), config.refresh.interval());

    let result = match command {
        AppCommand::Assets { watch } => cli::assets::run(&queries, watch).await,
        AppCommand::Analyze { asset, days, rows } => {
            let days = days.unwrap_or(config.default_days);
            cli::analysis::run(&queries, &asset, days, rows).await
        }
        AppCommand::History { asset, days, rows } => {
            let days = days.unwrap_or(config.default_days);
            cli::history::run(&queries, &asset, days, rows).await
        }
        AppCommand::Project {
            asset,
            amount,
            frequency,
            years,
        } => {
            let runner = ProjectionRunner::new(Arc::clone(&api));
            let request = DcaRequest {
                asset_id: asset,
                amount,
                frequency,
                duration_years: years,
            };
            cli::projections::run(&runner, request).await
        }
        AppCommand::Ath { asset } => cli::ath::run(&queries, &asset).await,
    };

    queries.dispose().await;
    result
}
