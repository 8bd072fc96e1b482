use chrono::DateTime;

/// `$64,000.50`. Negative values keep the sign in front of the symbol.
pub fn money(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    format!("{sign}${}.{cents}", group_thousands(whole))
}

/// `$1.23M`, for axis-like labels where precision doesn't matter.
pub fn compact_money(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let abs = value.abs();
    let body = if abs >= 1e9 {
        format!("{:.2}B", abs / 1e9)
    } else if abs >= 1e6 {
        format!("{:.2}M", abs / 1e6)
    } else if abs >= 1e3 {
        format!("{:.1}K", abs / 1e3)
    } else {
        format!("{abs:.2}")
    };
    format!("{sign}${body}")
}

/// Signed percentage: `+1.25%`, `-0.40%`.
pub fn signed_pct(value: f64, decimals: usize) -> String {
    let sign = if value >= 0.0 { "+" } else { "" };
    format!("{sign}{value:.decimals$}%")
}

/// Epoch milliseconds to `YYYY-MM-DD` (UTC). Out-of-range input is shown raw.
pub fn date_from_millis(timestamp: i64) -> String {
    DateTime::from_timestamp_millis(timestamp)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

/// `log_regression` -> `log regression`.
pub fn humanize(label: &str) -> String {
    label.replace('_', " ")
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}
