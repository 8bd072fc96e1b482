use crate::view::signal::{Signal, Tone};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    Label,
    Value,
    Positive,
    Negative,
    Error,
    Warning,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::Label => style(text).bold(),
        StyleType::Value => style(text).cyan().bold(),
        StyleType::Positive => style(text).green(),
        StyleType::Negative => style(text).red(),
        StyleType::Error => style(text).red(),
        StyleType::Warning => style(text).yellow().bold(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

pub fn header_row(titles: &[&str]) -> Vec<Cell> {
    titles.iter().map(|t| header_cell(t)).collect()
}

/// Formats an `Option<T>` into a right-aligned `Cell`. `None` is displayed
/// as "N/A".
pub fn format_optional_cell<T>(value: Option<T>, format_fn: impl Fn(T) -> String) -> Cell {
    value.map_or(
        Cell::new("N/A")
            .fg(Color::DarkGrey)
            .set_alignment(CellAlignment::Right),
        |v| Cell::new(format_fn(v)).set_alignment(CellAlignment::Right),
    )
}

/// Signed percentage, green for >= 0 and red below.
pub fn change_cell(change: Option<f64>) -> Cell {
    match change {
        Some(change) => {
            let color = if change >= 0.0 { Color::Green } else { Color::Red };
            Cell::new(crate::view::format::signed_pct(change, 2))
                .fg(color)
                .set_alignment(CellAlignment::Right)
        }
        None => format_optional_cell(None::<f64>, |v| v.to_string()),
    }
}

pub fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::Positive => Color::Green,
        Tone::Negative => Color::Red,
        Tone::Hot => Color::DarkYellow,
        Tone::Cold => Color::Blue,
        Tone::Neutral => Color::Grey,
    }
}

pub fn signal_cell(signal: &Signal) -> Cell {
    Cell::new(signal.label())
        .fg(tone_color(signal.tone()))
        .add_attribute(Attribute::Bold)
}

/// A steady-tick spinner shown while a request is outstanding.
pub fn new_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Prints a separator line matching the terminal width.
pub fn print_separator() {
    let term_width = console::Term::stdout()
        .size_checked()
        .map(|(_, w)| w as usize)
        .unwrap_or(80);
    println!("\n{}", "─".repeat(term_width));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_cell_shows_na() {
        let cell = format_optional_cell(None::<f64>, |v| format!("{v:.2}"));
        assert_eq!(cell.content(), "N/A");

        let cell = format_optional_cell(Some(1.5), |v| format!("{v:.2}"));
        assert_eq!(cell.content(), "1.50");
    }

    #[test]
    fn test_change_cell() {
        assert_eq!(change_cell(Some(0.0)).content(), "+0.00%");
        assert_eq!(change_cell(Some(-1.234)).content(), "-1.23%");
        assert_eq!(change_cell(None).content(), "N/A");
    }

    #[test]
    fn test_signal_cell_uses_label() {
        let cell = signal_cell(&Signal::from("below_sma50".to_string()));
        assert_eq!(cell.content(), "below sma50");
        assert_eq!(tone_color(Signal::Unknown("x".into()).tone()), Color::Grey);
    }
}
