//! Columnar indicator data zipped into per-chart rows.

use crate::core::error::SchemaViolation;
use crate::core::model::IndicatorSeries;

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayRow {
    pub timestamp: i64,
    pub price: f64,
    pub sma_20: Option<f64>,
    pub sma_50: Option<f64>,
    pub ema_12: Option<f64>,
    pub ema_26: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RsiRow {
    pub timestamp: i64,
    pub rsi: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MacdRow {
    pub timestamp: i64,
    pub macd: Option<f64>,
    pub signal: Option<f64>,
    pub histogram: Option<f64>,
}

/// The three row sets of the indicator panel. Each has exactly one row per
/// timestamp of the source series.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IndicatorRows {
    pub overlay: Vec<OverlayRow>,
    pub rsi: Vec<RsiRow>,
    pub macd: Vec<MacdRow>,
}

impl IndicatorRows {
    /// Fails if any column's length differs from `timestamps`; nothing is
    /// truncated or padded.
    pub fn try_from_series(series: &IndicatorSeries) -> Result<Self, SchemaViolation> {
        series.validate()?;

        let mut rows = IndicatorRows {
            overlay: Vec::with_capacity(series.len()),
            rsi: Vec::with_capacity(series.len()),
            macd: Vec::with_capacity(series.len()),
        };
        for (i, &timestamp) in series.timestamps.iter().enumerate() {
            rows.overlay.push(OverlayRow {
                timestamp,
                price: series.prices[i],
                sma_20: series.sma_20[i],
                sma_50: series.sma_50[i],
                ema_12: series.ema_12[i],
                ema_26: series.ema_26[i],
            });
            rows.rsi.push(RsiRow {
                timestamp,
                rsi: series.rsi_14[i],
            });
            rows.macd.push(MacdRow {
                timestamp,
                macd: series.macd_line[i],
                signal: series.macd_signal[i],
                histogram: series.macd_histogram[i],
            });
        }
        Ok(rows)
    }

    pub fn len(&self) -> usize {
        self.overlay.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlay.is_empty()
    }

    /// The last `n` rows of each set, oldest first.
    pub fn tail(&self, n: usize) -> IndicatorRows {
        let start = self.len().saturating_sub(n);
        IndicatorRows {
            overlay: self.overlay[start..].to_vec(),
            rsi: self.rsi[start..].to_vec(),
            macd: self.macd[start..].to_vec(),
        }
    }
}

impl TryFrom<&IndicatorSeries> for IndicatorRows {
    type Error = SchemaViolation;

    fn try_from(series: &IndicatorSeries) -> Result<Self, Self::Error> {
        IndicatorRows::try_from_series(series)
    }
}
