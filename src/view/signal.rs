//! Categorical indicator signals.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// One indicator's verdict. Labels outside the known vocabulary are kept
/// verbatim in `Unknown` and styled as neutral.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Signal {
    Bullish,
    Bearish,
    Overbought,
    Oversold,
    Neutral,
    AboveSma50,
    BelowSma50,
    Unknown(String),
}

/// How a signal is coloured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Positive,
    Negative,
    Hot,
    Cold,
    Neutral,
}

impl Signal {
    pub fn as_str(&self) -> &str {
        match self {
            Signal::Bullish => "bullish",
            Signal::Bearish => "bearish",
            Signal::Overbought => "overbought",
            Signal::Oversold => "oversold",
            Signal::Neutral => "neutral",
            Signal::AboveSma50 => "above_sma50",
            Signal::BelowSma50 => "below_sma50",
            Signal::Unknown(raw) => raw,
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            Signal::Bullish | Signal::AboveSma50 => Tone::Positive,
            Signal::Bearish | Signal::BelowSma50 => Tone::Negative,
            Signal::Overbought => Tone::Hot,
            Signal::Oversold => Tone::Cold,
            Signal::Neutral | Signal::Unknown(_) => Tone::Neutral,
        }
    }

    /// Display text: underscores become spaces.
    pub fn label(&self) -> String {
        self.as_str().replace('_', " ")
    }
}

impl From<String> for Signal {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "bullish" => Signal::Bullish,
            "bearish" => Signal::Bearish,
            "overbought" => Signal::Overbought,
            "oversold" => Signal::Oversold,
            "neutral" => Signal::Neutral,
            "above_sma50" => Signal::AboveSma50,
            "below_sma50" => Signal::BelowSma50,
            _ => Signal::Unknown(raw),
        }
    }
}

impl From<Signal> for String {
    fn from(signal: Signal) -> Self {
        signal.as_str().to_string()
    }
}

impl Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Human name for an indicator key in a signal set.
pub fn indicator_label(key: &str) -> &str {
    match key {
        "sma_crossover" => "SMA Crossover",
        "rsi" => "RSI",
        "macd" => "MACD",
        "trend" => "Trend",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::SignalSet;

    #[test]
    fn test_signal_set_deserialization() {
        let json = r#"{"rsi": "overbought", "trend": "above_sma50", "macd": "sideways"}"#;
        let signals: SignalSet = serde_json::from_str(json).unwrap();

        assert_eq!(signals["rsi"], Signal::Overbought);
        assert_eq!(signals["trend"], Signal::AboveSma50);
        assert_eq!(signals["macd"], Signal::Unknown("sideways".to_string()));
    }

    #[test]
    fn test_unknown_signal_falls_back_to_neutral() {
        let signal = Signal::from("sideways_chop".to_string());
        assert_eq!(signal.tone(), Tone::Neutral);
        assert_eq!(signal.label(), "sideways chop");
    }

    #[test]
    fn test_tones_and_labels() {
        assert_eq!(Signal::Bullish.tone(), Tone::Positive);
        assert_eq!(Signal::BelowSma50.tone(), Tone::Negative);
        assert_eq!(Signal::Overbought.tone(), Tone::Hot);
        assert_eq!(Signal::Oversold.tone(), Tone::Cold);
        assert_eq!(Signal::AboveSma50.to_string(), "above sma50");
        assert_eq!(String::from(Signal::BelowSma50), "below_sma50");
    }

    #[test]
    fn test_indicator_label() {
        assert_eq!(indicator_label("sma_crossover"), "SMA Crossover");
        assert_eq!(indicator_label("macd"), "MACD");
        assert_eq!(indicator_label("volume_spike"), "volume_spike");
    }
}
