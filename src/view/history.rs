use crate::core::error::SchemaViolation;
use crate::core::model::PricePoint;
use crate::view::percent_change;

#[derive(Debug, Clone, PartialEq)]
pub struct CloseRow {
    pub timestamp: i64,
    pub close: f64,
    pub volume: Option<f64>,
    /// Change against the previous close; `None` on the first row.
    pub change_pct: Option<f64>,
}

/// Close-price rows, oldest first. Timestamps must be strictly increasing.
pub fn close_rows(points: &[PricePoint]) -> Result<Vec<CloseRow>, SchemaViolation> {
    let mut rows = Vec::with_capacity(points.len());
    let mut previous: Option<&PricePoint> = None;
    for (index, point) in points.iter().enumerate() {
        let change_pct = match previous {
            Some(prev) if point.timestamp <= prev.timestamp => {
                return Err(SchemaViolation::NonIncreasingTimestamps { index });
            }
            Some(prev) => percent_change(prev.close, point.close),
            None => None,
        };
        rows.push(CloseRow {
            timestamp: point.timestamp,
            close: point.close,
            volume: point.volume,
            change_pct,
        });
        previous = Some(point);
    }
    Ok(rows)
}

/// Change from the first close to the last one.
pub fn period_change_pct(points: &[PricePoint]) -> Option<f64> {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) if points.len() > 1 => percent_change(first.close, last.close),
        _ => None,
    }
}
