//! Pure computation module for technical indicators.
//!
//! No I/O, no side effects. Takes close/volume series and returns indicator
//! series aligned to the input: windowed indicators (SMA, RSI) yield `None`
//! while they lack history, exponential indicators (EMA, MACD) are defined
//! from the first sample via recursive smoothing. Callers must treat `None`
//! as insufficient data and never decide on it.
//!
//! All computations use `Decimal` — a trading decision should not hinge on
//! float rounding.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Simple moving average, aligned to the input series.
///
/// `None` for the first `window - 1` indices, the arithmetic mean of the
/// trailing `window` values afterwards. An empty result only for
/// `window == 0`.
pub fn sma(values: &[Decimal], window: usize) -> Vec<Option<Decimal>> {
    if window == 0 {
        return Vec::new();
    }

    let window_d = Decimal::from(window as u64);
    let mut result = Vec::with_capacity(values.len());
    let mut running = Decimal::ZERO;

    for (i, &value) in values.iter().enumerate() {
        running += value;
        if i + 1 < window {
            result.push(None);
            continue;
        }
        if i + 1 > window {
            running -= values[i - window];
        }
        result.push(Some(running / window_d));
    }

    result
}

/// Exponential moving average with multiplier `2 / (span + 1)`, seeded with
/// the first value. Defined for every index of the input.
pub fn ema(values: &[Decimal], span: usize) -> Vec<Decimal> {
    if values.is_empty() || span == 0 {
        return Vec::new();
    }

    let k = dec!(2) / Decimal::from(span as u64 + 1);
    let one_minus_k = dec!(1) - k;

    let mut result = Vec::with_capacity(values.len());
    result.push(values[0]);

    for &value in &values[1..] {
        let prev = *result.last().expect("result is seeded with first value");
        result.push(value * k + prev * one_minus_k);
    }

    result
}

/// Relative Strength Index over exponentially smoothed gains and losses.
///
/// Smoothing uses center-of-mass `window - 1`, i.e. factor `1/window`.
/// `None` at index 0 (no price change yet). Degenerate cases: zero average
/// loss with positive average gain yields 100; a completely flat series
/// yields the neutral 50.
pub fn rsi(values: &[Decimal], window: usize) -> Vec<Option<Decimal>> {
    if window == 0 {
        return Vec::new();
    }

    let alpha = dec!(1) / Decimal::from(window as u64);
    let one_minus_alpha = dec!(1) - alpha;

    let mut result = Vec::with_capacity(values.len());
    let mut avg_gain = Decimal::ZERO;
    let mut avg_loss = Decimal::ZERO;

    for (i, pair) in values.windows(2).enumerate() {
        let delta = pair[1] - pair[0];
        let gain = if delta > Decimal::ZERO { delta } else { Decimal::ZERO };
        let loss = if delta < Decimal::ZERO { -delta } else { Decimal::ZERO };

        if i == 0 {
            avg_gain = gain;
            avg_loss = loss;
        } else {
            avg_gain = gain * alpha + avg_gain * one_minus_alpha;
            avg_loss = loss * alpha + avg_loss * one_minus_alpha;
        }

        let value = if avg_loss == Decimal::ZERO {
            if avg_gain > Decimal::ZERO {
                dec!(100)
            } else {
                dec!(50)
            }
        } else {
            let rs = avg_gain / avg_loss;
            dec!(100) - dec!(100) / (dec!(1) + rs)
        };
        result.push(Some(value));
    }

    if !values.is_empty() {
        result.insert(0, None);
    }

    result
}

/// Full-length MACD series.
#[derive(Debug, Clone)]
pub struct MacdSeries {
    pub macd: Vec<Decimal>,
    pub signal: Vec<Decimal>,
    pub histogram: Vec<Decimal>,
}

/// Moving Average Convergence Divergence.
///
/// `macd = EMA_fast − EMA_slow`, `signal = EMA(macd, signal_span)`,
/// `histogram = macd − signal`, each aligned to the input series.
pub fn macd(values: &[Decimal], fast: usize, slow: usize, signal_span: usize) -> MacdSeries {
    let fast_ema = ema(values, fast);
    let slow_ema = ema(values, slow);

    let macd_line: Vec<Decimal> = fast_ema
        .iter()
        .zip(slow_ema.iter())
        .map(|(f, s)| f - s)
        .collect();

    let signal_line = ema(&macd_line, signal_span);

    let histogram: Vec<Decimal> = macd_line
        .iter()
        .zip(signal_line.iter())
        .map(|(m, s)| m - s)
        .collect();

    MacdSeries {
        macd: macd_line,
        signal: signal_line,
        histogram,
    }
}
