//! Signal decision engine — weighted indicator voting.
//!
//! Produces one BUY/SELL/HOLD decision per evaluation cycle from the cached
//! price window. Five conditions vote for each side:
//!   1. SMA crossover completing this cycle (golden/death cross)
//!   2. RSI beyond the oversold/overbought threshold
//!   3. MACD line crossing its signal line this cycle
//!   4. price above/below the short SMA
//!   5. volume above 1.2× its 5-period average (confirmation, both sides)
//!
//! Thresholds are asymmetric: BUY needs two votes, SELL needs one. When both
//! thresholds are met in the same cycle BUY wins — the priority is fixed and
//! deterministic.

use rust_decimal::Decimal;
use tracing::debug;

use crate::constants::{
    BUY_VOTES_REQUIRED, MACD_FAST, MACD_SIGNAL, MACD_SLOW, SELL_VOTES_REQUIRED,
    VOLUME_CONFIRMATION_RATIO, VOLUME_SMA_WINDOW,
};
use crate::core::indicators;
use crate::types::{Decision, IndicatorSnapshot, PriceSample, Signal, VoteBreakdown};

/// Indicator windows and thresholds, extracted from config.
#[derive(Debug, Clone)]
pub struct SignalParams {
    pub short_window: usize,
    pub long_window: usize,
    pub rsi_window: usize,
    pub rsi_oversold: Decimal,
    pub rsi_overbought: Decimal,
}

/// Stateless decision engine over a price series.
pub struct SignalEngine {
    params: SignalParams,
}

impl SignalEngine {
    pub fn new(params: SignalParams) -> Self {
        Self { params }
    }

    /// Minimum samples before any non-HOLD decision is possible.
    pub fn min_samples(&self) -> usize {
        self.params
            .short_window
            .max(self.params.long_window)
            .max(self.params.rsi_window)
            .max(MACD_SLOW)
    }

    /// Evaluate the series and return a decision plus the latest price.
    ///
    /// Series shorter than [`Self::min_samples`] deterministically HOLD.
    pub fn decide(&self, samples: &[PriceSample]) -> Decision {
        let latest_price = samples.last().map_or(Decimal::ZERO, |s| s.close);

        if samples.len() < self.min_samples() {
            debug!(
                have = samples.len(),
                need = self.min_samples(),
                "insufficient history, holding"
            );
            return Decision::hold(latest_price);
        }

        let closes: Vec<Decimal> = samples.iter().map(|s| s.close).collect();
        let volumes: Vec<Decimal> = samples.iter().map(|s| s.volume).collect();
        let last = closes.len() - 1;

        let short_sma = indicators::sma(&closes, self.params.short_window);
        let long_sma = indicators::sma(&closes, self.params.long_window);
        let rsi = indicators::rsi(&closes, self.params.rsi_window);
        let macd = indicators::macd(&closes, MACD_FAST, MACD_SLOW, MACD_SIGNAL);
        let volume_sma = indicators::sma(&volumes, VOLUME_SMA_WINDOW);

        // Current values must all exist; min_samples guarantees it, but a
        // missing value still degrades to HOLD rather than panicking.
        let (Some(short_now), Some(long_now), Some(rsi_now)) =
            (short_sma[last], long_sma[last], rsi[last])
        else {
            return Decision::hold(latest_price);
        };

        // Crossover detection compares against the previous cycle within the
        // same computed series; an undefined previous value equals the
        // current one, so no crossover can fire.
        let (short_prev, long_prev) = if last > 0 {
            (
                short_sma[last - 1].unwrap_or(short_now),
                long_sma[last - 1].unwrap_or(long_now),
            )
        } else {
            (short_now, long_now)
        };

        let macd_now = macd.macd[last];
        let signal_now = macd.signal[last];
        let (macd_prev, signal_prev) = if last > 0 {
            (macd.macd[last - 1], macd.signal[last - 1])
        } else {
            (macd_now, signal_now)
        };

        let golden_cross = short_prev <= long_prev && short_now > long_now;
        let death_cross = short_prev >= long_prev && short_now < long_now;
        let macd_cross_up = macd_prev <= signal_prev && macd_now > signal_now;
        let macd_cross_down = macd_prev >= signal_prev && macd_now < signal_now;

        let volume_confirmed = match volume_sma[last] {
            Some(avg) if avg > Decimal::ZERO => {
                volumes[last] > avg * VOLUME_CONFIRMATION_RATIO
            }
            _ => false,
        };

        let mut buy_votes = 0u32;
        let mut sell_votes = 0u32;

        if golden_cross {
            buy_votes += 1;
        }
        if rsi_now < self.params.rsi_oversold {
            buy_votes += 1;
        }
        if macd_cross_up {
            buy_votes += 1;
        }
        if latest_price > short_now {
            buy_votes += 1;
        }
        if volume_confirmed {
            buy_votes += 1;
        }

        if death_cross {
            sell_votes += 1;
        }
        if rsi_now > self.params.rsi_overbought {
            sell_votes += 1;
        }
        if macd_cross_down {
            sell_votes += 1;
        }
        if latest_price < short_now {
            sell_votes += 1;
        }
        if volume_confirmed {
            sell_votes += 1;
        }

        // BUY is checked first; only one actionable signal per cycle.
        let signal = if buy_votes >= BUY_VOTES_REQUIRED {
            Signal::Buy
        } else if sell_votes >= SELL_VOTES_REQUIRED {
            Signal::Sell
        } else {
            Signal::Hold
        };

        debug!(
            %signal,
            buy_votes,
            sell_votes,
            golden_cross,
            death_cross,
            macd_cross_up,
            macd_cross_down,
            rsi = %rsi_now,
            "signal evaluated"
        );

        Decision {
            signal,
            price: latest_price,
            votes: VoteBreakdown {
                buy: buy_votes,
                sell: sell_votes,
                golden_cross,
                death_cross,
                macd_cross_up,
                macd_cross_down,
                volume_confirmed,
            },
            indicators: Some(IndicatorSnapshot {
                short_sma: short_now,
                long_sma: long_now,
                rsi: rsi_now,
                macd_line: macd_now,
                macd_signal: signal_now,
                macd_histogram: macd.histogram[last],
                volume_sma: volume_sma[last].unwrap_or(Decimal::ZERO),
            }),
        }
    }
}
