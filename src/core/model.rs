//! Wire types exchanged with the analytics API.
//!
//! Every type here is an immutable snapshot: a refresh produces a new value
//! which replaces the old one, nothing is patched in place.

use crate::core::error::{SchemaViolation, ValidationError};
use crate::view::signal::Signal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Crypto,
    Traditional,
}

impl Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetKind::Crypto => write!(f, "crypto"),
            AssetKind::Traditional => write!(f, "traditional"),
        }
    }
}

/// An asset with its latest market snapshot.
///
/// `None` in any of the numeric fields means the price is unavailable, which
/// is not the same thing as a zero price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetDescriptor {
    pub id: String,
    pub name: String,
    pub symbol: String,
    #[serde(rename = "type")]
    pub kind: AssetKind,
    pub color: String,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default, rename = "price_change_24h")]
    pub change_24h: Option<f64>,
    #[serde(default, rename = "price_change_percentage_24h")]
    pub change_pct_24h: Option<f64>,
    #[serde(default)]
    pub sparkline_7d: Option<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Epoch milliseconds.
    pub timestamp: i64,
    #[serde(default)]
    pub open: Option<f64>,
    #[serde(default)]
    pub high: Option<f64>,
    #[serde(default)]
    pub low: Option<f64>,
    pub close: f64,
    #[serde(default)]
    pub volume: Option<f64>,
}

/// Columnar indicator data. Entries inside an indicator's warm-up window are
/// `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSeries {
    pub timestamps: Vec<i64>,
    pub prices: Vec<f64>,
    pub sma_20: Vec<Option<f64>>,
    pub sma_50: Vec<Option<f64>>,
    pub ema_12: Vec<Option<f64>>,
    pub ema_26: Vec<Option<f64>>,
    pub rsi_14: Vec<Option<f64>>,
    pub macd_line: Vec<Option<f64>>,
    pub macd_signal: Vec<Option<f64>>,
    pub macd_histogram: Vec<Option<f64>>,
}

impl IndicatorSeries {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Checks that every column has exactly one entry per timestamp.
    pub fn validate(&self) -> Result<(), SchemaViolation> {
        let expected = self.timestamps.len();
        let columns = [
            ("prices", self.prices.len()),
            ("sma_20", self.sma_20.len()),
            ("sma_50", self.sma_50.len()),
            ("ema_12", self.ema_12.len()),
            ("ema_26", self.ema_26.len()),
            ("rsi_14", self.rsi_14.len()),
            ("macd_line", self.macd_line.len()),
            ("macd_signal", self.macd_signal.len()),
            ("macd_histogram", self.macd_histogram.len()),
        ];
        for (series, actual) in columns {
            if actual != expected {
                return Err(SchemaViolation::LengthMismatch {
                    series,
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }
}

/// Indicator name (`rsi`, `macd`, ...) to categorical signal.
pub type SignalSet = BTreeMap<String, Signal>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorReport {
    pub asset_id: String,
    pub asset_name: String,
    pub data: IndicatorSeries,
    #[serde(default)]
    pub signals: SignalSet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
}

impl Frequency {
    pub fn label(&self) -> &'static str {
        match self {
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::Biweekly => "Bi-weekly",
            Frequency::Monthly => "Monthly",
        }
    }
}

impl Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Frequency::Daily => "daily",
                Frequency::Weekly => "weekly",
                Frequency::Biweekly => "biweekly",
                Frequency::Monthly => "monthly",
            }
        )
    }
}

impl FromStr for Frequency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "biweekly" | "bi-weekly" => Ok(Frequency::Biweekly),
            "monthly" => Ok(Frequency::Monthly),
            _ => Err(ValidationError::InvalidFrequency(s.to_string())),
        }
    }
}

/// Inclusive bounds on a `days` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayRange {
    pub min: u32,
    pub max: u32,
}

impl DayRange {
    pub const HISTORY: DayRange = DayRange { min: 1, max: 3650 };
    pub const INDICATORS: DayRange = DayRange { min: 30, max: 3650 };

    pub fn check(&self, days: u32) -> Result<u32, ValidationError> {
        if (self.min..=self.max).contains(&days) {
            Ok(days)
        } else {
            Err(ValidationError::DaysOutOfRange {
                value: days,
                min: self.min,
                max: self.max,
            })
        }
    }
}

/// Projection horizons the analytics service accepts, in years.
pub const DURATION_OPTIONS: [u32; 7] = [1, 2, 3, 5, 10, 15, 20];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcaRequest {
    pub asset_id: String,
    pub amount: f64,
    pub frequency: Frequency,
    pub duration_years: u32,
}

impl DcaRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.asset_id.trim().is_empty() {
            return Err(ValidationError::EmptyAssetId);
        }
        // NaN fails this comparison too
        if !(self.amount > 0.0 && self.amount.is_finite()) {
            return Err(ValidationError::NonPositiveAmount(self.amount));
        }
        if !DURATION_OPTIONS.contains(&self.duration_years) {
            return Err(ValidationError::UnsupportedDuration(self.duration_years));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionPoint {
    pub year: u32,
    pub total_invested: f64,
    pub portfolio_value_low: f64,
    pub portfolio_value_mid: f64,
    pub portfolio_value_high: f64,
    pub units_held: f64,
    pub price_low: f64,
    pub price_mid: f64,
    pub price_high: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub asset_id: String,
    pub asset_name: String,
    pub amount_per_period: f64,
    pub frequency: Frequency,
    pub duration_years: u32,
    pub projections: Vec<ProjectionPoint>,
    pub model_type: String,
    #[serde(default)]
    pub disclaimer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub earliest: NaiveDate,
    pub latest: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AthPrediction {
    pub asset_id: String,
    pub asset_name: String,
    pub current_price: f64,
    pub current_ath: f64,
    pub predicted_next_ath: f64,
    pub predicted_date_range: DateRange,
    pub confidence: f64,
    #[serde(default)]
    pub factors: Vec<String>,
    #[serde(default)]
    pub disclaimer: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(amount: f64, duration_years: u32) -> DcaRequest {
        DcaRequest {
            asset_id: "bitcoin".to_string(),
            amount,
            frequency: Frequency::Monthly,
            duration_years,
        }
    }

    #[test]
    fn test_asset_descriptor_deserialization_with_nulls() {
        let json = r##"{
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

        let asset: AssetDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(asset.kind, AssetKind::Traditional);
        assert!(asset.current_price.is_none());
        assert!(asset.sparkline_7d.is_none());
    }

    #[test]
    fn test_asset_descriptor_deserialization_with_prices() {
        let json = r##"{
            "id": "bitcoin",
            "name": "Bitcoin",
            "symbol": "BTC",
            "type": "crypto",
            "color": "#F7931A",
            "current_price": 64000.5,
            "price_change_24h": -120.0,
            "price_change_percentage_24h": -0.19,
            "sparkline_7d": [63000.0, 63500.0, 64000.5]
        }"##;

        let asset: AssetDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(asset.kind, AssetKind::Crypto);
        assert_eq!(asset.current_price, Some(64000.5));
        assert_eq!(asset.change_pct_24h, Some(-0.19));
        assert_eq!(asset.sparkline_7d.as_ref().map(Vec::len), Some(3));
    }

    #[test]
    fn test_dca_request_validation() {
        assert!(request(500.0, 5).validate().is_ok());
        assert_eq!(
            request(-5.0, 5).validate(),
            Err(ValidationError::NonPositiveAmount(-5.0))
        );
        assert_eq!(
            request(0.0, 5).validate(),
            Err(ValidationError::NonPositiveAmount(0.0))
        );
        assert!(matches!(
            request(f64::NAN, 5).validate(),
            Err(ValidationError::NonPositiveAmount(_))
        ));
        assert_eq!(
            request(500.0, 4).validate(),
            Err(ValidationError::UnsupportedDuration(4))
        );

        let mut blank = request(500.0, 5);
        blank.asset_id = "  ".to_string();
        assert_eq!(blank.validate(), Err(ValidationError::EmptyAssetId));
    }

    #[test]
    fn test_day_ranges() {
        assert_eq!(DayRange::HISTORY.check(1), Ok(1));
        assert_eq!(DayRange::INDICATORS.check(3650), Ok(3650));
        assert_eq!(
            DayRange::INDICATORS.check(7),
            Err(ValidationError::DaysOutOfRange {
                value: 7,
                min: 30,
                max: 3650
            })
        );
        assert!(DayRange::HISTORY.check(0).is_err());
    }

    #[test]
    fn test_frequency_parsing_and_serialization() {
        assert_eq!("Monthly".parse::<Frequency>().unwrap(), Frequency::Monthly);
        assert_eq!("bi-weekly".parse::<Frequency>().unwrap(), Frequency::Biweekly);
        assert!("yearly".parse::<Frequency>().is_err());

        let body = serde_json::to_string(&request(500.0, 5)).unwrap();
        assert!(body.contains(r#""frequency":"monthly""#));
    }

    #[test]
    fn test_indicator_series_length_mismatch() {
        let series = IndicatorSeries {
            timestamps: vec![1, 2, 3],
            prices: vec![1.0, 2.0, 3.0],
            sma_20: vec![None; 3],
            sma_50: vec![None; 3],
            ema_12: vec![None; 3],
            ema_26: vec![None; 3],
            rsi_14: vec![None; 2],
            macd_line: vec![None; 3],
            macd_signal: vec![None; 3],
            macd_histogram: vec![None; 3],
        };

        assert_eq!(
            series.validate(),
            Err(SchemaViolation::LengthMismatch {
                series: "rsi_14",
                expected: 3,
                actual: 2,
            })
        );
    }

    #[test]
    fn test_ath_prediction_date_range() {
        let json = r#"{
            "asset_id": "bitcoin",
            "asset_name": "Bitcoin",
            "current_price": 60000,
            "current_ath": 69000,
            "predicted_next_ath": 150000,
            "predicted_date_range": {"earliest": "2025-04-20", "latest": "2025-10-20"},
            "confidence": 0.7,
            "factors": ["Post-halving window"],
            "disclaimer": "Not financial advice."
        }"#;

        let prediction: AthPrediction = serde_json::from_str(json).unwrap();
        assert_eq!(
            prediction.predicted_date_range.earliest,
            NaiveDate::from_ymd_opt(2025, 4, 20).unwrap()
        );
        assert_eq!(prediction.factors.len(), 1);
    }
}
