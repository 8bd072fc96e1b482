use assetscope::core::error::{SchemaViolation, ValidationError};
use assetscope::core::model::Frequency;
use assetscope::{AppCommand, run_command};
use std::fs;
use tracing::info;

mod test_utils {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub const BITCOIN: &str = r##"{
        "id": "bitcoin",
        "name": "Bitcoin",
        "symbol": "BTC",
        "type": "crypto",
        "color": "#F7931A",
        "current_price": 64000.0,
        "price_change_24h": 800.0,
        "price_change_percentage_24h": 1.25,
        "sparkline_7d": [62000.0, 63000.0, 64000.0]
    }"##;

    pub const NASDAQ: &str = r##"{
        "id": "nasdaq",
        "name": "NASDAQ Composite",
        "symbol": "^IXIC",
        "type": "traditional",
        "color": "#0082CA",
        "current_price": null,
        "price_change_24h": null,
        "price_change_percentage_24h": null,
        "sparkline_7d": null
    }"##;

    pub fn indicators(rsi_len: usize) -> String {
        let rsi: Vec<&str> = ["null", "55.5", "61.2"].into_iter().take(rsi_len).collect();
        format!(
            r#"{{
                "asset_id": "bitcoin",
                "asset_name": "Bitcoin",
                "data": {{
                    "timestamps": [1700000000000, 1700086400000, 1700172800000],
                    "prices": [36000.0, 37000.0, 37500.0],
                    "sma_20": [null, null, 36500.0],
                    "sma_50": [null, null, null],
                    "ema_12": [null, 36400.0, 36800.0],
                    "ema_26": [null, null, 36300.0],
                    "rsi_14": [{}],
                    "macd_line": [null, null, 120.0],
                    "macd_signal": [null, null, 95.0],
                    "macd_histogram": [null, null, 25.0]
                }},
                "signals": {{"sma_crossover": "bullish", "rsi": "neutral", "trend": "sideways"}}
            }}"#,
            rsi.join(", ")
        )
    }

    pub async fn mount_get(server: &MockServer, url_path: &str, status: u16, body: &str) {
        Mock::given(method("GET"))
            .and(path(url_path))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(server)
            .await;
    }

    pub async fn mount_get_with_days(server: &MockServer, url_path: &str, days: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path(url_path))
            .and(query_param("days", days))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(1)
            .mount(server)
            .await;
    }

    pub async fn mount_projection(server: &MockServer, status: u16, body: &str) {
        Mock::given(method("POST"))
            .and(path("/projections/dca"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(server)
            .await;
    }
}

fn write_config(base_url: &str) -> tempfile::NamedTempFile {
    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    let config_content = format!(
        r#"
api:
  base_url: "{base_url}"
refresh:
  interval_secs: 60
default_days: 90
"#
    );
    fs::write(config_file.path(), config_content).expect("Failed to write config file");
    config_file
}

async fn run(command: AppCommand, config: &tempfile::NamedTempFile) -> anyhow::Result<()> {
    run_command(command, Some(config.path().to_str().unwrap())).await
}

#[test_log::test(tokio::test)]
async fn test_assets_command() {
    let server = wiremock::MockServer::start().await;
    test_utils::mount_get(
        &server,
        "/assets",
        200,
        &format!("[{}, {}]", test_utils::BITCOIN, test_utils::NASDAQ),
    )
    .await;
    let config = write_config(&server.uri());

    let result = run(AppCommand::Assets { watch: false }, &config).await;
    assert!(result.is_ok(), "Assets command failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_analyze_command_uses_default_days() {
    let server = wiremock::MockServer::start().await;
    test_utils::mount_get(&server, "/assets/bitcoin/price", 200, test_utils::BITCOIN).await;
    test_utils::mount_get_with_days(
        &server,
        "/analysis/bitcoin/indicators",
        "90",
        &test_utils::indicators(3),
    )
    .await;
    let config = write_config(&server.uri());

    let result = run(
        AppCommand::Analyze {
            asset: "bitcoin".to_string(),
            days: None,
            rows: 2,
        },
        &config,
    )
    .await;
    assert!(result.is_ok(), "Analyze command failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_analyze_survives_missing_price() {
    let server = wiremock::MockServer::start().await;
    test_utils::mount_get(
        &server,
        "/assets/bitcoin/price",
        503,
        r#"{"detail": "Price feed unavailable"}"#,
    )
    .await;
    test_utils::mount_get_with_days(
        &server,
        "/analysis/bitcoin/indicators",
        "365",
        &test_utils::indicators(3),
    )
    .await;
    let config = write_config(&server.uri());

    let result = run(
        AppCommand::Analyze {
            asset: "bitcoin".to_string(),
            days: Some(365),
            rows: 10,
        },
        &config,
    )
    .await;
    assert!(result.is_ok(), "Analyze command failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_analyze_reports_schema_violation() {
    let server = wiremock::MockServer::start().await;
    test_utils::mount_get(&server, "/assets/bitcoin/price", 200, test_utils::BITCOIN).await;
    test_utils::mount_get(
        &server,
        "/analysis/bitcoin/indicators",
        200,
        &test_utils::indicators(2),
    )
    .await;
    let config = write_config(&server.uri());

    let err = run(
        AppCommand::Analyze {
            asset: "bitcoin".to_string(),
            days: None,
            rows: 10,
        },
        &config,
    )
    .await
    .unwrap_err();
    info!(error = %err, "Analyze failed as expected");

    assert_eq!(
        err.downcast_ref::<SchemaViolation>(),
        Some(&SchemaViolation::LengthMismatch {
            series: "rsi_14",
            expected: 3,
            actual: 2,
        })
    );
}

#[test_log::test(tokio::test)]
async fn test_analyze_rejects_days_out_of_range() {
    let server = wiremock::MockServer::start().await;
    let config = write_config(&server.uri());

    let err = run(
        AppCommand::Analyze {
            asset: "bitcoin".to_string(),
            days: Some(7),
            rows: 10,
        },
        &config,
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ValidationError>(),
        Some(ValidationError::DaysOutOfRange { value: 7, .. })
    ));
    let requests = server.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty());
}

#[test_log::test(tokio::test)]
async fn test_history_command() {
    let server = wiremock::MockServer::start().await;
    test_utils::mount_get_with_days(
        &server,
        "/assets/ethereum/history",
        "30",
        r#"[
            {"timestamp": 1700000000000, "open": null, "high": null, "low": null, "close": 2000.0, "volume": 1200000.0},
            {"timestamp": 1700086400000, "open": null, "high": null, "low": null, "close": 2100.0, "volume": null}
        ]"#,
    )
    .await;
    let config = write_config(&server.uri());

    let result = run(
        AppCommand::History {
            asset: "ethereum".to_string(),
            days: Some(30),
            rows: 10,
        },
        &config,
    )
    .await;
    assert!(result.is_ok(), "History command failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_project_command() {
    let server = wiremock::MockServer::start().await;
    test_utils::mount_projection(
        &server,
        200,
        r#"{
            "asset_id": "bitcoin",
            "asset_name": "Bitcoin",
            "amount_per_period": 500.0,
            "frequency": "monthly",
            "duration_years": 2,
            "projections": [
                {"year": 1, "total_invested": 6000.0, "portfolio_value_low": 4000.0, "portfolio_value_mid": 7000.0,
                 "portfolio_value_high": 9000.0, "units_held": 0.1, "price_low": 40000.0, "price_mid": 70000.0, "price_high": 90000.0},
                {"year": 2, "total_invested": 12000.0, "portfolio_value_low": 9000.0, "portfolio_value_mid": 15000.0,
                 "portfolio_value_high": 21000.0, "units_held": 0.19, "price_low": 45000.0, "price_mid": 80000.0, "price_high": 110000.0}
            ],
            "model_type": "log_regression",
            "disclaimer": "Not financial advice."
        }"#,
    )
    .await;
    let config = write_config(&server.uri());

    let result = run(
        AppCommand::Project {
            asset: "bitcoin".to_string(),
            amount: 500.0,
            frequency: Frequency::Monthly,
            years: 2,
        },
        &config,
    )
    .await;
    assert!(result.is_ok(), "Project command failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_project_rejects_invalid_amount_before_request() {
    let server = wiremock::MockServer::start().await;
    test_utils::mount_projection(&server, 500, "").await;
    let config = write_config(&server.uri());

    let result = run(
        AppCommand::Project {
            asset: "bitcoin".to_string(),
            amount: -5.0,
            frequency: Frequency::Monthly,
            years: 5,
        },
        &config,
    )
    .await;

    assert!(result.is_err());
    let requests = server.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty());
}

#[test_log::test(tokio::test)]
async fn test_ath_command_reports_api_error() {
    let server = wiremock::MockServer::start().await;
    test_utils::mount_get(
        &server,
        "/ath/doge/prediction",
        404,
        r#"{"detail": "Asset 'doge' not found"}"#,
    )
    .await;
    let config = write_config(&server.uri());

    let err = run(
        AppCommand::Ath {
            asset: "doge".to_string(),
        },
        &config,
    )
    .await
    .unwrap_err();

    let message = format!("{err:#}");
    assert!(message.contains("Failed to load ATH prediction for doge"));
    assert!(message.contains("API error 404: Asset 'doge' not found"));
}

#[test_log::test(tokio::test)]
async fn test_ath_command() {
    let server = wiremock::MockServer::start().await;
    test_utils::mount_get(
        &server,
        "/ath/bitcoin/prediction",
        200,
        r#"{
            "asset_id": "bitcoin",
            "asset_name": "Bitcoin",
            "current_price": 60000,
            "current_ath": 69000,
            "predicted_next_ath": 150000,
            "predicted_date_range": {"earliest": "2025-04-20", "latest": "2025-10-20"},
            "confidence": 0.7,
            "factors": ["Post-halving window", "ETF inflows"],
            "disclaimer": "Not financial advice."
        }"#,
    )
    .await;
    let config = write_config(&server.uri());

    let result = run(
        AppCommand::Ath {
            asset: "bitcoin".to_string(),
        },
        &config,
    )
    .await;
    assert!(result.is_ok(), "ATH command failed with: {:?}", result.err());
}
