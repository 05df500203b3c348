//! Cross-field config validation, run once at load time.
//!
//! A config that fails here never reaches the trading loop.

use alloy::primitives::Address;
use anyhow::{bail, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::constants::MACD_SLOW;

use super::BotConfig;

/// Validate the merged configuration.
pub fn validate_config(config: &BotConfig) -> Result<()> {
    // -- Chain ---------------------------------------------------------------
    if config.chain.rpc.endpoints.is_empty() {
        bail!("chain.rpc.endpoints must list at least one RPC endpoint");
    }
    if config.chain.blocks_per_hour == 0 {
        bail!("chain.blocks_per_hour must be positive");
    }
    for (name, value) in [
        ("contracts.pool", &config.chain.contracts.pool),
        ("contracts.base_token", &config.chain.contracts.base_token),
        ("contracts.quote_token", &config.chain.contracts.quote_token),
    ] {
        if value.parse::<Address>().is_err() {
            bail!("chain.{name} is not a valid address: {value}");
        }
    }

    // -- Trading -------------------------------------------------------------
    let t = &config.trading;
    if t.short_sma_window == 0 || t.rsi_window == 0 {
        bail!("trading windows must be positive");
    }
    if t.short_sma_window >= t.long_sma_window {
        bail!(
            "trading.short_sma_window ({}) must be below long_sma_window ({})",
            t.short_sma_window,
            t.long_sma_window
        );
    }
    if t.rsi_oversold >= t.rsi_overbought {
        bail!("trading.rsi_oversold must be below rsi_overbought");
    }
    if t.rsi_oversold <= Decimal::ZERO || t.rsi_overbought >= dec!(100) {
        bail!("RSI thresholds must lie strictly inside (0, 100)");
    }
    let min_samples = t
        .long_sma_window
        .max(t.rsi_window)
        .max(MACD_SLOW);
    if (t.history_hours as usize) < min_samples {
        bail!(
            "trading.history_hours ({}) cannot satisfy the indicator warm-up of {min_samples} samples",
            t.history_hours
        );
    }
    if t.trade_percentage <= Decimal::ZERO || t.trade_percentage > dec!(1) {
        bail!("trading.trade_percentage must lie in (0, 1]");
    }
    if t.baseline_volume <= Decimal::ZERO {
        bail!("trading.baseline_volume must be positive");
    }
    if t.cycle_interval_seconds == 0 {
        bail!("trading.cycle_interval_seconds must be positive");
    }

    // -- Risk ----------------------------------------------------------------
    let r = &config.risk;
    if r.max_trade_size <= Decimal::ZERO {
        bail!("risk.max_trade_size must be positive");
    }
    if r.max_daily_volume < r.max_trade_size {
        bail!("risk.max_daily_volume must be at least one max-size trade");
    }
    if r.emergency_stop_loss <= Decimal::ZERO || r.emergency_stop_loss >= dec!(1) {
        bail!("risk.emergency_stop_loss must lie strictly inside (0, 1)");
    }
    if r.recovery_threshold <= Decimal::ZERO {
        bail!("risk.recovery_threshold must be positive");
    }
    if r.recovery_wait_hours < 0 {
        bail!("risk.recovery_wait_hours cannot be negative");
    }
    if r.slippage_tolerance < Decimal::ZERO || r.slippage_tolerance >= dec!(1) {
        bail!("risk.slippage_tolerance must lie in [0, 1)");
    }

    // -- Timing --------------------------------------------------------------
    if config.timing.rpc.max_retries == 0 {
        bail!("timing.rpc.max_retries must be at least 1");
    }
    if config.timing.cycle_timeout_seconds == 0 {
        bail!("timing.cycle_timeout_seconds must be positive");
    }

    Ok(())
}
