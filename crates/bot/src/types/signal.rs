use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Trading signal emitted once per evaluation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl Signal {
    /// Whether this signal should result in a trade attempt.
    #[must_use]
    pub fn is_actionable(self) -> bool {
        matches!(self, Signal::Buy | Signal::Sell)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Signal::Buy => "BUY",
            Signal::Sell => "SELL",
            Signal::Hold => "HOLD",
        };
        f.write_str(s)
    }
}

/// Indicator values computed for the latest sample of a series.
///
/// Ephemeral — rebuilt every cycle from the current price window and never
/// persisted. Fields that lack enough history carry `Decimal::ZERO`; the
/// decision logic never reads them in that case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    #[serde(with = "rust_decimal::serde::str")]
    pub short_sma: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub long_sma: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub rsi: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub macd_line: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub macd_signal: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub macd_histogram: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub volume_sma: Decimal,
}

/// Vote tally behind a decision, kept for structured logging.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct VoteBreakdown {
    pub buy: u32,
    pub sell: u32,
    pub golden_cross: bool,
    pub death_cross: bool,
    pub macd_cross_up: bool,
    pub macd_cross_down: bool,
    pub volume_confirmed: bool,
}

/// Outcome of one signal evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub signal: Signal,
    /// Latest close of the evaluated series.
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    pub votes: VoteBreakdown,
    pub indicators: Option<IndicatorSnapshot>,
}

impl Decision {
    /// A HOLD decision carrying only the latest price (insufficient data path).
    #[must_use]
    pub fn hold(price: Decimal) -> Self {
        Self {
            signal: Signal::Hold,
            price,
            votes: VoteBreakdown::default(),
            indicators: None,
        }
    }
}
