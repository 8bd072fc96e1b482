use super::ui;
use crate::core::model::DcaRequest;
use crate::projection_runner::{ProjectionRunner, Submission};
use crate::view::format;
use crate::view::projection::ProjectionView;
use anyhow::Result;
use comfy_table::{Cell, CellAlignment, Color, Table};

pub async fn run(runner: &ProjectionRunner, request: DcaRequest) -> Result<()> {
    let pb = ui::new_spinner(&format!(
        "Projecting {} {} into {} for {} years...",
        format::money(request.amount),
        request.frequency.label().to_lowercase(),
        request.asset_id,
        request.duration_years
    ));
    let outcome = runner.submit(request).await;
    pb.finish_and_clear();

    match outcome? {
        Submission::Succeeded(view) => {
            display_projection(&view);
            Ok(())
        }
        Submission::Failed(failure) => {
            Err(anyhow::Error::new(failure).context("DCA projection failed"))
        }
        Submission::Ignored => {
            println!("A projection is already running.");
            Ok(())
        }
    }
}

fn display_projection(view: &ProjectionView) {
    println!(
        "\n{}",
        ui::style_text(
            &format!("DCA Projection: {}", view.asset_name),
            ui::StyleType::Title
        )
    );
    println!(
        "{} {} {} for {} years",
        ui::style_text("Plan:", ui::StyleType::Label),
        format::money(view.amount_per_period),
        view.frequency.label(),
        view.duration_years
    );

    let invested = view
        .final_invested()
        .map_or_else(|| "N/A".to_string(), format::money);
    let mid = view
        .final_mid_value()
        .map_or_else(|| "N/A".to_string(), format::money);
    let ret = view
        .final_return_pct()
        .map_or_else(|| "N/A".to_string(), |r| format::signed_pct(r, 1));
    println!(
        "{} {}",
        ui::style_text("Total invested:", ui::StyleType::Label),
        ui::style_text(&invested, ui::StyleType::Value)
    );
    println!(
        "{} {} ({})",
        ui::style_text("Projected value (mid):", ui::StyleType::Label),
        ui::style_text(&mid, ui::StyleType::Value),
        ret
    );
    println!(
        "{} {}",
        ui::style_text("Model:", ui::StyleType::Label),
        view.model_label
    );

    println!("{}", projection_table(view));
    if !view.disclaimer.is_empty() {
        println!("{}", ui::style_text(&view.disclaimer, ui::StyleType::Subtle));
    }
}

fn projection_table(view: &ProjectionView) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(ui::header_row(&[
        "Year", "Invested", "Low", "Mid", "Return", "High", "Units",
    ]));
    for row in &view.rows {
        table.add_row(vec![
            Cell::new(format!("Year {}", row.year)),
            ui::format_optional_cell(Some(row.total_invested), format::money),
            Cell::new(format::money(row.value_low))
                .fg(Color::Red)
                .set_alignment(CellAlignment::Right),
            ui::format_optional_cell(Some(row.value_mid), format::money),
            ui::change_cell(row.mid_return_pct),
            Cell::new(format::money(row.value_high))
                .fg(Color::Green)
                .set_alignment(CellAlignment::Right),
            ui::format_optional_cell(Some(row.units_held), |u| format!("{u:.6}")),
        ]);
    }
    table
}
