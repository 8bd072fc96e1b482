use super::ui;
use crate::store::AnalyticsQueries;
use crate::store::keys::AthKey;
use crate::view::ath::AthView;
use crate::view::format;
use anyhow::{Context, Result, anyhow};
use comfy_table::{Cell, Table};

pub async fn run(queries: &AnalyticsQueries, asset: &str) -> Result<()> {
    let key = AthKey::for_asset(Some(asset)).context("An asset id is required")?;

    let pb = ui::new_spinner(&format!("Predicting next ATH for {asset}..."));
    let state = queries.ath.read(&key).await;
    pb.finish_and_clear();

    match (state.value, state.error) {
        (Some(prediction), _) => {
            let view = AthView::from(prediction.as_ref());
            println!(
                "\n{}",
                ui::style_text(
                    &format!("ATH Prediction: {}", view.asset_name),
                    ui::StyleType::Title
                )
            );
            println!("{}", ath_table(&view));
            if !view.factors.is_empty() {
                println!("\n{}", ui::style_text("Key factors", ui::StyleType::Label));
                for factor in &view.factors {
                    println!("  • {factor}");
                }
            }
            if !view.disclaimer.is_empty() {
                println!("\n{}", ui::style_text(&view.disclaimer, ui::StyleType::Subtle));
            }
            Ok(())
        }
        (None, Some(e)) => Err(anyhow!(e).context(format!("Failed to load ATH prediction for {asset}"))),
        (None, None) => Ok(()),
    }
}

fn ath_table(view: &AthView) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(ui::header_row(&["Metric", "Value", "Change"]));
    table.add_row(vec![
        Cell::new("Current price"),
        ui::format_optional_cell(Some(view.current_price), format::money),
        Cell::new(""),
    ]);
    table.add_row(vec![
        Cell::new("Current ATH"),
        ui::format_optional_cell(Some(view.current_ath), format::money),
        ui::format_optional_cell(view.pct_from_ath, |p| format!("-{p:.1}% from ATH")),
    ]);
    table.add_row(vec![
        Cell::new("Predicted next ATH"),
        ui::format_optional_cell(Some(view.predicted_next_ath), format::money),
        ui::format_optional_cell(view.ath_growth_pct, |p| format!("{} potential", format::signed_pct(p, 1))),
    ]);
    table.add_row(vec![
        Cell::new("Confidence"),
        Cell::new(format!("{}%", view.confidence_pct)),
        Cell::new(""),
    ]);
    table.add_row(vec![
        Cell::new("Predicted window"),
        Cell::new(format!(
            "{} to {}",
            view.window.0.format("%b %Y"),
            view.window.1.format("%b %Y")
        )),
        Cell::new(""),
    ]);
    table
}
