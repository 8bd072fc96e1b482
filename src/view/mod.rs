//! Pure transforms from API payloads to the rows and series the terminal
//! views render. Nothing in here does I/O or holds state.

pub mod ath;
pub mod format;
pub mod history;
pub mod indicators;
pub mod projection;
pub mod signal;
pub mod sparkline;

/// `part / whole * 100`.
///
/// Every client-computed percentage goes through here. A zero or non-finite
/// denominator yields `None`, which the views render as "N/A".
pub fn percent_of(part: f64, whole: f64) -> Option<f64> {
    if whole == 0.0 || !whole.is_finite() {
        return None;
    }
    Some(part / whole * 100.0).filter(|pct| pct.is_finite())
}

/// Relative change from `from` to `to`, in percent.
pub fn percent_change(from: f64, to: f64) -> Option<f64> {
    percent_of(to - from, from)
}
