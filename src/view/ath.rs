use crate::core::model::AthPrediction;
use crate::view::{percent_change, percent_of};
use chrono::NaiveDate;

/// ATH panel metrics derived from a prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct AthView {
    pub asset_name: String,
    pub current_price: f64,
    pub current_ath: f64,
    pub predicted_next_ath: f64,
    /// How far the current price sits below the ATH.
    pub pct_from_ath: Option<f64>,
    /// Upside from the current price to the predicted ATH.
    pub ath_growth_pct: Option<f64>,
    /// Whole percent, 0..=100.
    pub confidence_pct: u32,
    pub window: (NaiveDate, NaiveDate),
    pub factors: Vec<String>,
    pub disclaimer: String,
}

pub fn pct_from_ath(current_price: f64, current_ath: f64) -> Option<f64> {
    percent_of(current_ath - current_price, current_ath)
}

pub fn ath_growth_pct(current_price: f64, predicted_next_ath: f64) -> Option<f64> {
    percent_change(current_price, predicted_next_ath)
}

impl From<&AthPrediction> for AthView {
    fn from(prediction: &AthPrediction) -> Self {
        let confidence = if prediction.confidence.is_finite() {
            prediction.confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        AthView {
            asset_name: prediction.asset_name.clone(),
            current_price: prediction.current_price,
            current_ath: prediction.current_ath,
            predicted_next_ath: prediction.predicted_next_ath,
            pct_from_ath: pct_from_ath(prediction.current_price, prediction.current_ath),
            ath_growth_pct: ath_growth_pct(prediction.current_price, prediction.predicted_next_ath),
            confidence_pct: (confidence * 100.0).round() as u32,
            window: (
                prediction.predicted_date_range.earliest,
                prediction.predicted_date_range.latest,
            ),
            factors: prediction.factors.clone(),
            disclaimer: prediction.disclaimer.clone(),
        }
    }
}
