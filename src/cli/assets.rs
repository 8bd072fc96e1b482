use super::ui;
use crate::core::model::AssetDescriptor;
use crate::store::AnalyticsQueries;
use crate::store::keys::AssetsKey;
use crate::store::query::{Query, QueryState};
use crate::view::format;
use crate::view::sparkline::AssetCard;
use anyhow::{Result, anyhow};
use comfy_table::{Cell, Color, Table};
use std::fmt::Display;
use std::future::Future;
use std::hash::Hash;
use std::time::Duration;
use tracing::{debug, info, warn};

const SPARKLINE_WIDTH: usize = 28;

pub async fn run(queries: &AnalyticsQueries, watch: bool) -> Result<()> {
    if watch {
        return watch_assets(queries).await;
    }

    let pb = ui::new_spinner("Fetching assets...");
    let state = queries.assets.read(&AssetsKey).await;
    pb.finish_and_clear();

    match (&state.value, &state.error) {
        (Some(assets), _) => {
            display_assets(assets);
            Ok(())
        }
        (None, Some(e)) => Err(anyhow!(e.clone()).context("Failed to load assets")),
        (None, None) => Ok(()),
    }
}

/// Keeps the table on screen, revalidating on the refresh interval until
/// Ctrl-C. The previous table stays up while a refresh is in flight.
async fn watch_assets(queries: &AnalyticsQueries) -> Result<()> {
    let interval = queries
        .assets
        .refresh_interval()
        .unwrap_or_default()
        .max(Duration::from_secs(1));
    let query = Query::new(queries.assets.clone());
    let term = console::Term::stdout();

    let pb = ui::new_spinner("Fetching assets...");
    query.set_key(Some(AssetsKey)).await;
    pb.finish_and_clear();
    redraw(&term, &query.state(), interval)?;

    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };
    refresh_until(&query, interval, ctrl_c, |state| redraw(&term, state, interval)).await?;
    info!("Stopping asset watch");
    Ok(())
}

/// Revalidates `query` once per `interval` and hands each settled state
/// to `on_refresh`, until `stop` completes. `stop` is polled during the
/// refresh too, so a hung request never blocks shutdown.
async fn refresh_until<K, V, S>(
    query: &Query<K, V>,
    interval: Duration,
    stop: S,
    mut on_refresh: impl FnMut(&QueryState<V>) -> Result<()>,
) -> Result<()>
where
    K: Clone + Eq + Hash + Display + Send + Sync + 'static,
    V: Send + Sync + 'static,
    S: Future<Output = ()>,
{
    tokio::pin!(stop);
    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await;
    loop {
        let refresh = async {
            ticker.tick().await;
            debug!(key = ?query.key().map(|k| k.to_string()), "Revalidating");
            query.revalidate().await;
        };
        tokio::select! {
            _ = &mut stop => break,
            _ = refresh => on_refresh(&query.state())?,
        }
    }
    Ok(())
}

fn redraw(
    term: &console::Term,
    state: &QueryState<Vec<AssetDescriptor>>,
    interval: Duration,
) -> Result<()> {
    term.clear_screen()?;
    if let Some(assets) = &state.value {
        display_assets(assets);
    }
    if let Some(e) = &state.error {
        let message = if state.value.is_some() {
            format!("Refresh failed, showing last known prices: {e}")
        } else {
            e.to_string()
        };
        println!("{}", ui::style_text(&message, ui::StyleType::Error));
    }
    println!(
        "{}",
        ui::style_text(
            &format!(
                "Refreshing every {}s, press Ctrl-C to stop",
                interval.as_secs()
            ),
            ui::StyleType::Subtle
        )
    );
    Ok(())
}

fn display_assets(assets: &[AssetDescriptor]) {
    if assets.is_empty() {
        println!("No assets available.");
        return;
    }
    let cards: Vec<AssetCard> = assets.iter().map(AssetCard::from).collect();
    println!("\n{}", ui::style_text("Markets", ui::StyleType::Title));
    println!("{}", asset_table(&cards));
}

fn asset_table(cards: &[AssetCard]) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(ui::header_row(&[
        "Asset", "Symbol", "Type", "Price", "24h", "24h %", "7d",
    ]));

    for card in cards {
        let spark_color = if card.sparkline.positive {
            Color::Green
        } else {
            Color::Red
        };
        let spark = if card.sparkline.is_empty() {
            Cell::new("N/A").fg(Color::DarkGrey)
        } else {
            Cell::new(card.sparkline.bars(SPARKLINE_WIDTH)).fg(spark_color)
        };
        table.add_row(vec![
            Cell::new(&card.name),
            Cell::new(&card.symbol),
            Cell::new(card.kind.to_string()),
            ui::format_optional_cell(card.price, format::money),
            ui::format_optional_cell(card.change_24h, format::money),
            ui::change_cell(card.change_pct_24h),
            spark,
        ]);
    }
    table
}
