use super::ui;
use crate::core::model::DayRange;
use crate::store::AnalyticsQueries;
use crate::store::keys::HistoryKey;
use crate::view::format;
use crate::view::history::{CloseRow, close_rows, period_change_pct};
use anyhow::{Context, Result, anyhow};
use comfy_table::{Cell, Table};

pub async fn run(queries: &AnalyticsQueries, asset: &str, days: u32, rows: usize) -> Result<()> {
    let days = DayRange::HISTORY.check(days)?;
    let key = HistoryKey::for_asset(Some(asset), days).context("An asset id is required")?;

    let pb = ui::new_spinner(&format!("Fetching {days} days of {asset} prices..."));
    let state = queries.history.read(&key).await;
    pb.finish_and_clear();

    let points = match (state.value, state.error) {
        (Some(points), _) => points,
        (None, Some(e)) => {
            return Err(anyhow!(e).context(format!("Failed to load price history for {asset}")));
        }
        (None, None) => return Ok(()),
    };
    let all_rows = close_rows(&points)?;
    if all_rows.is_empty() {
        println!("No price history for {asset} in the last {days} days.");
        return Ok(());
    }

    println!(
        "\n{}",
        ui::style_text(&format!("{asset}: last {days} days"), ui::StyleType::Title)
    );
    let start = all_rows.len().saturating_sub(rows);
    println!("{}", history_table(&all_rows[start..]));

    let period = period_change_pct(&points)
        .map_or_else(|| "N/A".to_string(), |c| format::signed_pct(c, 2));
    println!(
        "{} {}",
        ui::style_text("Change over period:", ui::StyleType::Label),
        ui::style_text(&period, ui::StyleType::Value)
    );
    Ok(())
}

fn history_table(rows: &[CloseRow]) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(ui::header_row(&["Date", "Close", "Change", "Volume"]));
    for row in rows {
        table.add_row(vec![
            Cell::new(format::date_from_millis(row.timestamp)),
            ui::format_optional_cell(Some(row.close), format::money),
            ui::change_cell(row.change_pct),
            ui::format_optional_cell(row.volume, format::compact_money),
        ]);
    }
    table
}
