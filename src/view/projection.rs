//! DCA projection table and summary.

use crate::core::error::SchemaViolation;
use crate::core::model::{Frequency, ProjectionPoint, ProjectionResult};
use crate::view::format::humanize;
use crate::view::percent_change;

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionRow {
    pub year: u32,
    pub total_invested: f64,
    pub value_low: f64,
    pub value_mid: f64,
    pub value_high: f64,
    pub units_held: f64,
    /// `None` when nothing has been invested yet.
    pub mid_return_pct: Option<f64>,
}

impl From<&ProjectionPoint> for ProjectionRow {
    fn from(point: &ProjectionPoint) -> Self {
        ProjectionRow {
            year: point.year,
            total_invested: point.total_invested,
            value_low: point.portfolio_value_low,
            value_mid: point.portfolio_value_mid,
            value_high: point.portfolio_value_high,
            units_held: point.units_held,
            mid_return_pct: mid_return_pct(point),
        }
    }
}

/// `(mid - invested) / invested * 100`, `None` for a zero investment.
pub fn mid_return_pct(point: &ProjectionPoint) -> Option<f64> {
    percent_change(point.total_invested, point.portfolio_value_mid)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionView {
    pub asset_name: String,
    pub amount_per_period: f64,
    pub frequency: Frequency,
    pub duration_years: u32,
    pub rows: Vec<ProjectionRow>,
    pub model_label: String,
    pub disclaimer: String,
}

impl ProjectionView {
    pub fn try_from_result(result: &ProjectionResult) -> Result<Self, SchemaViolation> {
        check_projection_points(&result.projections)?;
        Ok(ProjectionView {
            asset_name: result.asset_name.clone(),
            amount_per_period: result.amount_per_period,
            frequency: result.frequency,
            duration_years: result.duration_years,
            rows: result.projections.iter().map(ProjectionRow::from).collect(),
            model_label: humanize(&result.model_type),
            disclaimer: result.disclaimer.clone(),
        })
    }

    pub fn final_row(&self) -> Option<&ProjectionRow> {
        self.rows.last()
    }

    pub fn final_invested(&self) -> Option<f64> {
        self.final_row().map(|row| row.total_invested)
    }

    pub fn final_mid_value(&self) -> Option<f64> {
        self.final_row().map(|row| row.value_mid)
    }

    pub fn final_return_pct(&self) -> Option<f64> {
        self.final_row().and_then(|row| row.mid_return_pct)
    }
}

fn check_projection_points(points: &[ProjectionPoint]) -> Result<(), SchemaViolation> {
    let mut previous: Option<&ProjectionPoint> = None;
    for (index, point) in points.iter().enumerate() {
        let floor = previous.map_or(0, |prev| prev.year);
        if point.year <= floor {
            return Err(SchemaViolation::NonIncreasingYears {
                index,
                year: point.year,
            });
        }
        if !(point.portfolio_value_low <= point.portfolio_value_mid
            && point.portfolio_value_mid <= point.portfolio_value_high)
        {
            return Err(SchemaViolation::InvertedBand {
                year: point.year,
                band: "portfolio value",
            });
        }
        if !(point.price_low <= point.price_mid && point.price_mid <= point.price_high) {
            return Err(SchemaViolation::InvertedBand {
                year: point.year,
                band: "price",
            });
        }
        if let Some(prev) = previous {
            if point.total_invested < prev.total_invested {
                return Err(SchemaViolation::DecreasingInvestment { year: point.year });
            }
        }
        previous = Some(point);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(year: u32, invested: f64, mid: f64) -> ProjectionPoint {
        ProjectionPoint {
            year,
            total_invested: invested,
            portfolio_value_low: mid * 0.5,
            portfolio_value_mid: mid,
            portfolio_value_high: mid * 1.5,
            units_held: 0.1 * year as f64,
            price_low: 30000.0,
            price_mid: 60000.0,
            price_high: 90000.0,
        }
    }

    fn result(projections: Vec<ProjectionPoint>) -> ProjectionResult {
        ProjectionResult {
            asset_id: "bitcoin".to_string(),
            asset_name: "Bitcoin".to_string(),
            amount_per_period: 500.0,
            frequency: Frequency::Monthly,
            duration_years: projections.len() as u32,
            projections,
            model_type: "log_regression".to_string(),
            disclaimer: "Not financial advice.".to_string(),
        }
    }

    #[test]
    fn test_mid_return_pct() {
        let row = ProjectionRow::from(&point(1, 6000.0, 7500.0));
        assert_eq!(row.mid_return_pct, Some(25.0));

        let row = ProjectionRow::from(&point(1, 6000.0, 4500.0));
        assert_eq!(row.mid_return_pct, Some(-25.0));
    }

    #[test]
    fn test_zero_investment_has_no_return() {
        let row = ProjectionRow::from(&point(1, 0.0, 0.0));
        assert_eq!(row.mid_return_pct, None);

        let row = ProjectionRow::from(&point(1, 0.0, 100.0));
        assert_eq!(row.mid_return_pct, None);
    }

    #[test]
    fn test_projection_view_summary() {
        let view = ProjectionView::try_from_result(&result(vec![
            point(1, 6000.0, 7000.0),
            point(2, 12000.0, 15000.0),
        ]))
        .unwrap();

        assert_eq!(view.rows.len(), 2);
        assert_eq!(view.final_invested(), Some(12000.0));
        assert_eq!(view.final_mid_value(), Some(15000.0));
        assert_eq!(view.final_return_pct(), Some(25.0));
        assert_eq!(view.model_label, "log regression");
    }

    #[test]
    fn test_empty_projection_has_no_summary() {
        let view = ProjectionView::try_from_result(&result(Vec::new())).unwrap();
        assert!(view.final_invested().is_none());
        assert!(view.final_return_pct().is_none());
    }

    #[test]
    fn test_inverted_band_is_rejected() {
        let mut bad = point(2, 12000.0, 15000.0);
        bad.portfolio_value_low = 20000.0;
        let err = ProjectionView::try_from_result(&result(vec![point(1, 6000.0, 7000.0), bad]))
            .unwrap_err();
        assert_eq!(
            err,
            SchemaViolation::InvertedBand {
                year: 2,
                band: "portfolio value"
            }
        );
    }

    #[test]
    fn test_decreasing_investment_is_rejected() {
        let err = ProjectionView::try_from_result(&result(vec![
            point(1, 6000.0, 7000.0),
            point(2, 5000.0, 7000.0),
        ]))
        .unwrap_err();
        assert_eq!(err, SchemaViolation::DecreasingInvestment { year: 2 });
    }

    #[test]
    fn test_years_must_start_at_one_and_increase() {
        let err = ProjectionView::try_from_result(&result(vec![point(0, 6000.0, 7000.0)]))
            .unwrap_err();
        assert_eq!(err, SchemaViolation::NonIncreasingYears { index: 0, year: 0 });

        let err = ProjectionView::try_from_result(&result(vec![
            point(1, 6000.0, 7000.0),
            point(2, 12000.0, 15000.0),
            point(2, 18000.0, 22000.0),
        ]))
        .unwrap_err();
        assert_eq!(err, SchemaViolation::NonIncreasingYears { index: 2, year: 2 });
    }
}
