//! Asset cards and their 7-day sparklines.

use crate::core::model::{AssetDescriptor, AssetKind};

const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SparkPoint {
    pub index: usize,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sparkline {
    pub points: Vec<SparkPoint>,
    /// Colours the line. A missing 24h change counts as zero, and zero is
    /// positive.
    pub positive: bool,
}

impl Sparkline {
    /// Only a null `sparkline_7d` leaves the line empty. A missing current
    /// price doesn't hide the history the service did send.
    pub fn from_asset(asset: &AssetDescriptor) -> Self {
        let points = asset
            .sparkline_7d
            .as_deref()
            .map(index_points)
            .unwrap_or_default();
        Sparkline {
            points,
            positive: is_positive(asset.change_pct_24h),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Block-character rendering, at most `width` glyphs. Long series are
    /// sampled evenly, keeping the last point.
    pub fn bars(&self, width: usize) -> String {
        if self.points.is_empty() || width == 0 {
            return String::new();
        }
        let (min, max) = self
            .points
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.value), hi.max(p.value))
            });
        let span = max - min;

        let n = self.points.len();
        let shown = n.min(width);
        (0..shown)
            .map(|i| {
                let idx = if shown == 1 { n - 1 } else { i * (n - 1) / (shown - 1) };
                let value = self.points[idx].value;
                let level = if span > 0.0 {
                    ((value - min) / span * (BARS.len() - 1) as f64).round() as usize
                } else {
                    BARS.len() / 2
                };
                BARS[level.min(BARS.len() - 1)]
            })
            .collect()
    }
}

pub fn index_points(values: &[f64]) -> Vec<SparkPoint> {
    values
        .iter()
        .enumerate()
        .map(|(index, &value)| SparkPoint { index, value })
        .collect()
}

pub fn is_positive(change_pct_24h: Option<f64>) -> bool {
    change_pct_24h.unwrap_or(0.0) >= 0.0
}

/// Everything an asset card shows.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetCard {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub kind: AssetKind,
    pub price: Option<f64>,
    pub change_24h: Option<f64>,
    pub change_pct_24h: Option<f64>,
    pub sparkline: Sparkline,
}

impl From<&AssetDescriptor> for AssetCard {
    fn from(asset: &AssetDescriptor) -> Self {
        AssetCard {
            id: asset.id.clone(),
            name: asset.name.clone(),
            symbol: asset.symbol.clone(),
            kind: asset.kind,
            price: asset.current_price,
            change_24h: asset.change_24h,
            change_pct_24h: asset.change_pct_24h,
            sparkline: Sparkline::from_asset(asset),
        }
    }
}
