//! Risk validation gate — every live trade passes through here first.
//!
//! Stateful: tracks daily trade count and volume, resetting both when the
//! calendar date advances. Checks short-circuit on the first failure and
//! reject with `BotError::RiskRejected { reason }`; a balance or gas query
//! failure is itself a rejection, never an unhandled fault.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::info;

use crate::core::data_source::MarketDataSource;
use crate::errors::BotError;
use crate::types::{Asset, Signal};

/// Static limits, extracted from config.
#[derive(Debug, Clone)]
pub struct RiskLimits {
    pub trading_enabled: bool,
    /// Largest single trade, in the base asset.
    pub max_trade_size: Decimal,
    pub max_daily_trades: u32,
    /// Daily executed-volume ceiling, in the base asset.
    pub max_daily_volume: Decimal,
    pub max_gas_price_gwei: u64,
}

impl Default for RiskLimits {
    /// Conservative fallback limits with trading disabled.
    fn default() -> Self {
        Self {
            trading_enabled: false,
            max_trade_size: crate::constants::DEFAULT_MAX_TRADE_SIZE,
            max_daily_trades: crate::constants::DEFAULT_MAX_DAILY_TRADES,
            max_daily_volume: crate::constants::DEFAULT_MAX_DAILY_VOLUME,
            max_gas_price_gwei: crate::constants::DEFAULT_MAX_GAS_PRICE_GWEI,
        }
    }
}

/// Stateful trade validator with daily counters.
pub struct RiskValidator {
    limits: RiskLimits,
    daily_trade_count: u32,
    daily_volume: Decimal,
    last_trade_time: Option<DateTime<Utc>>,
    last_reset_date: NaiveDate,
}

impl RiskValidator {
    pub fn new(limits: RiskLimits, today: NaiveDate) -> Self {
        Self {
            limits,
            daily_trade_count: 0,
            daily_volume: Decimal::ZERO,
            last_trade_time: None,
            last_reset_date: today,
        }
    }

    pub fn daily_trade_count(&self) -> u32 {
        self.daily_trade_count
    }

    pub fn daily_volume(&self) -> Decimal {
        self.daily_volume
    }

    pub fn last_trade_time(&self) -> Option<DateTime<Utc>> {
        self.last_trade_time
    }

    /// Reset daily counters when the wall-clock date has advanced.
    pub fn roll_daily_counters(&mut self, today: NaiveDate) {
        if today > self.last_reset_date {
            self.daily_trade_count = 0;
            self.daily_volume = Decimal::ZERO;
            self.last_reset_date = today;
            info!(%today, "daily trading counters reset");
        }
    }

    /// Validate a trade before execution.
    ///
    /// `amount` is denominated in the base asset for both directions; for a
    /// SELL the quote-token requirement is derived as `amount / price`.
    pub async fn validate(
        &mut self,
        source: &dyn MarketDataSource,
        signal: Signal,
        amount: Decimal,
        price: Decimal,
        now: DateTime<Utc>,
    ) -> Result<(), BotError> {
        // 1. Only actionable signals reach execution.
        if !signal.is_actionable() {
            return Err(reject(format!("invalid signal: {signal}")));
        }

        // 2. Live trading must be switched on.
        if !self.limits.trading_enabled {
            return Err(reject("live trading is disabled"));
        }

        // 3. Positive amount within the per-trade cap.
        if amount <= Decimal::ZERO {
            return Err(reject("trade amount must be positive"));
        }
        if amount > self.limits.max_trade_size {
            return Err(reject(format!(
                "trade amount {amount} exceeds maximum {max}",
                max = self.limits.max_trade_size
            )));
        }

        // 4. Balance sufficiency.
        match signal {
            Signal::Buy => {
                let base_balance = source.balance_of(Asset::Base).await.map_err(|e| {
                    reject(format!("failed to check base balance: {e}"))
                })?;
                if amount > base_balance {
                    return Err(reject(format!(
                        "insufficient base balance: required {amount}, available {base_balance}"
                    )));
                }
            }
            Signal::Sell => {
                if price <= Decimal::ZERO {
                    return Err(reject("cannot derive sell amount from a zero price"));
                }
                let quote_needed = amount / price;
                let quote_balance = source.balance_of(Asset::Quote).await.map_err(|e| {
                    reject(format!("failed to check quote balance: {e}"))
                })?;
                if quote_needed > quote_balance {
                    return Err(reject(format!(
                        "insufficient quote balance: required {quote_needed}, available {quote_balance}"
                    )));
                }
            }
            Signal::Hold => unreachable!("filtered by is_actionable"),
        }

        // 5 + 6. Daily rate limits, reset first on a date boundary.
        self.roll_daily_counters(now.date_naive());
        if self.daily_trade_count >= self.limits.max_daily_trades {
            return Err(reject("daily trade limit reached"));
        }
        if self.daily_volume + amount > self.limits.max_daily_volume {
            return Err(reject("daily volume limit would be exceeded"));
        }

        // 7. Gas price ceiling.
        let gas_price = source
            .gas_price_gwei()
            .await
            .map_err(|e| reject(format!("failed to check gas price: {e}")))?;
        if gas_price > Decimal::from(self.limits.max_gas_price_gwei) {
            return Err(reject(format!(
                "gas price too high: {gas_price} gwei (max {max})",
                max = self.limits.max_gas_price_gwei
            )));
        }

        Ok(())
    }

    /// Record a successfully executed trade against the daily counters.
    pub fn update_metrics(&mut self, amount: Decimal, now: DateTime<Utc>) {
        self.last_trade_time = Some(now);
        self.daily_trade_count += 1;
        self.daily_volume += amount;
        info!(
            daily_trades = self.daily_trade_count,
            daily_volume = %self.daily_volume,
            "trade metrics updated"
        );
    }
}

fn reject(reason: impl Into<String>) -> BotError {
    BotError::RiskRejected {
        reason: reason.into(),
    }
}
