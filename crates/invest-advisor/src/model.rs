//! Domain Models
//!
//! Price series, price summaries, search hits and the risk tolerance scale
//! the advisor asks the user to pick from. Prices use `rust_decimal`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One daily price bar
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
}

impl PriceBar {
    /// Bar with all four prices equal to `close`
    pub fn flat(timestamp: DateTime<Utc>, close: Decimal) -> Self {
        Self {
            timestamp,
            open: close,
            high: close,
            low: close,
            close,
        }
    }

    /// Convert float quotes once, at the market-data boundary.
    /// Returns `None` if any value is not finite.
    pub fn from_f64(timestamp: DateTime<Utc>, open: f64, high: f64, low: f64, close: f64) -> Option<Self> {
        Some(Self {
            timestamp,
            open: Decimal::from_f64_retain(open)?,
            high: Decimal::from_f64_retain(high)?,
            low: Decimal::from_f64_retain(low)?,
            close: Decimal::from_f64_retain(close)?,
        })
    }
}

/// Latest close plus the trading range of a series
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceSummary {
    pub symbol: String,
    pub latest_close: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high_52w: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low_52w: Option<Decimal>,
}

impl PriceSummary {
    /// Summarize the last close of a series; `None` for an empty series
    pub fn latest(symbol: &str, bars: &[PriceBar]) -> Option<Self> {
        let last = bars.last()?;
        Some(Self {
            symbol: symbol.to_string(),
            latest_close: last.close.round_dp(2),
            high_52w: None,
            low_52w: None,
        })
    }

    /// Latest close with the max high and min low over the whole series
    pub fn with_range(symbol: &str, bars: &[PriceBar]) -> Option<Self> {
        let mut summary = Self::latest(symbol, bars)?;
        summary.high_52w = bars.iter().map(|b| b.high).max().map(|d| d.round_dp(2));
        summary.low_52w = bars.iter().map(|b| b.low).min().map(|d| d.round_dp(2));
        Some(summary)
    }
}

/// A single web search result
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
}

/// Risk tolerance the user picks during profiling
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTolerance {
    Conservative,
    Moderate,
    Aggressive,
}

impl RiskTolerance {
    pub const ALL: [RiskTolerance; 3] = [
        RiskTolerance::Conservative,
        RiskTolerance::Moderate,
        RiskTolerance::Aggressive,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RiskTolerance::Conservative => "Conservative",
            RiskTolerance::Moderate => "Moderate",
            RiskTolerance::Aggressive => "Aggressive",
        }
    }

    /// How the option is explained to the user
    pub fn description(&self) -> &'static str {
        match self {
            RiskTolerance::Conservative => {
                "I do not want my investment to lose value at all; stable returns matter most"
            }
            RiskTolerance::Moderate => {
                "I can accept some fluctuation for the chance of higher returns"
            }
            RiskTolerance::Aggressive => {
                "I am ready to take high risk for the chance of maximum returns"
            }
        }
    }
}

impl std::fmt::Display for RiskTolerance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn bar(day: i64, high: Decimal, low: Decimal, close: Decimal) -> PriceBar {
        PriceBar {
            timestamp: DateTime::from_timestamp(day * 86_400, 0).unwrap(),
            open: close,
            high,
            low,
            close,
        }
    }

    #[test]
    fn test_range_summary() {
        let bars = vec![
            bar(1, dec!(110), dec!(95), dec!(100)),
            bar(2, dec!(130.456), dec!(99), dec!(120)),
            bar(3, dec!(125), dec!(90.004), dec!(121.5)),
        ];

        let summary = PriceSummary::with_range("AAPL", &bars).unwrap();
        assert_eq!(summary.latest_close, dec!(121.50));
        assert_eq!(summary.high_52w, Some(dec!(130.46)));
        assert_eq!(summary.low_52w, Some(dec!(90.00)));
    }

    #[test]
    fn test_empty_series() {
        assert!(PriceSummary::latest("X", &[]).is_none());
        assert!(PriceSummary::with_range("X", &[]).is_none());
    }

    #[test]
    fn test_float_conversion() {
        let ts = DateTime::from_timestamp(0, 0).unwrap();
        let bar = PriceBar::from_f64(ts, 1.0, 2.0, 0.5, 65000.5).unwrap();
        assert_eq!(bar.close, dec!(65000.5));
        assert!(PriceBar::from_f64(ts, f64::NAN, 1.0, 1.0, 1.0).is_none());
    }

    #[test]
    fn test_risk_tolerance_serde() {
        let json = serde_json::to_string(&RiskTolerance::Moderate).unwrap();
        assert_eq!(json, "\"moderate\"");
        assert_eq!(RiskTolerance::ALL.len(), 3);
    }
}
