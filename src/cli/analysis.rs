use super::ui;
use crate::core::model::{AssetDescriptor, DayRange, IndicatorReport};
use crate::store::AnalyticsQueries;
use crate::store::keys::{IndicatorsKey, PriceKey};
use crate::view::format;
use crate::view::indicators::IndicatorRows;
use crate::view::signal::indicator_label;
use anyhow::{Context, Result, anyhow};
use comfy_table::{Cell, Table};
use tracing::warn;

pub async fn run(queries: &AnalyticsQueries, asset: &str, days: u32, rows: usize) -> Result<()> {
    let days = DayRange::INDICATORS.check(days)?;
    let price_key = PriceKey::for_asset(Some(asset)).context("An asset id is required")?;
    let indicators_key =
        IndicatorsKey::for_asset(Some(asset), days).context("An asset id is required")?;

    let pb = ui::new_spinner(&format!("Analyzing {asset} over {days} days..."));
    let (price, report) = tokio::join!(
        queries.prices.read(&price_key),
        queries.indicators.read(&indicators_key)
    );
    pb.finish_and_clear();

    let report = match (report.value, report.error) {
        (Some(report), _) => report,
        (None, Some(e)) => {
            return Err(anyhow!(e).context(format!("Failed to load indicators for {asset}")));
        }
        (None, None) => return Ok(()),
    };
    let indicator_rows = IndicatorRows::try_from_series(&report.data)?;

    match (&price.value, &price.error) {
        (Some(descriptor), _) => display_price_header(descriptor),
        (None, Some(e)) => {
            warn!(error = %e, "Price unavailable");
            println!("\n{}", ui::style_text(&report.asset_name, ui::StyleType::Title));
            println!("{}", ui::style_text(&format!("Price unavailable: {e}"), ui::StyleType::Error));
        }
        (None, None) => {}
    }

    println!("\n{}", ui::style_text("Signals", ui::StyleType::Label));
    println!("{}", signal_table(&report));

    if indicator_rows.is_empty() {
        println!("No indicator data for this range.");
        return Ok(());
    }
    let shown = indicator_rows.tail(rows);

    println!(
        "\n{}",
        ui::style_text("Price & Moving Averages", ui::StyleType::Label)
    );
    println!("{}", overlay_table(&shown));
    println!("\n{}", ui::style_text("RSI (14)", ui::StyleType::Label));
    println!("{}", rsi_table(&shown));
    println!("\n{}", ui::style_text("MACD", ui::StyleType::Label));
    println!("{}", macd_table(&shown));
    println!(
        "{}",
        ui::style_text(
            &format!(
                "Showing last {} of {} data points",
                shown.len(),
                indicator_rows.len()
            ),
            ui::StyleType::Subtle
        )
    );
    Ok(())
}

fn display_price_header(asset: &AssetDescriptor) {
    let price = asset
        .current_price
        .map_or_else(|| "N/A".to_string(), format::money);
    let change = asset
        .change_pct_24h
        .map_or_else(|| "N/A".to_string(), |c| format::signed_pct(c, 2));
    let change = if asset.change_pct_24h.unwrap_or(0.0) >= 0.0 {
        ui::style_text(&change, ui::StyleType::Positive)
    } else {
        ui::style_text(&change, ui::StyleType::Negative)
    };
    println!(
        "\n{} ({})  {}  {}",
        ui::style_text(&asset.name, ui::StyleType::Title),
        asset.symbol,
        ui::style_text(&price, ui::StyleType::Value),
        change
    );
}

fn signal_table(report: &IndicatorReport) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(ui::header_row(&["Indicator", "Signal"]));
    for (name, signal) in &report.signals {
        table.add_row(vec![Cell::new(indicator_label(name)), ui::signal_cell(signal)]);
    }
    table
}

fn number(value: f64) -> String {
    format!("{value:.2}")
}

fn overlay_table(rows: &IndicatorRows) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(ui::header_row(&[
        "Date", "Price", "SMA 20", "SMA 50", "EMA 12", "EMA 26",
    ]));
    for row in &rows.overlay {
        table.add_row(vec![
            Cell::new(format::date_from_millis(row.timestamp)),
            ui::format_optional_cell(Some(row.price), format::money),
            ui::format_optional_cell(row.sma_20, format::money),
            ui::format_optional_cell(row.sma_50, format::money),
            ui::format_optional_cell(row.ema_12, format::money),
            ui::format_optional_cell(row.ema_26, format::money),
        ]);
    }
    table
}

fn rsi_table(rows: &IndicatorRows) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(ui::header_row(&["Date", "RSI"]));
    for row in &rows.rsi {
        table.add_row(vec![
            Cell::new(format::date_from_millis(row.timestamp)),
            ui::format_optional_cell(row.rsi, number),
        ]);
    }
    table
}

fn macd_table(rows: &IndicatorRows) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(ui::header_row(&["Date", "MACD", "Signal", "Histogram"]));
    for row in &rows.macd {
        table.add_row(vec![
            Cell::new(format::date_from_millis(row.timestamp)),
            ui::format_optional_cell(row.macd, number),
            ui::format_optional_cell(row.signal, number),
            ui::format_optional_cell(row.histogram, number),
        ]);
    }
    table
}
