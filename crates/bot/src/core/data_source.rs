//! Read-side boundary of the decision core.
//!
//! Everything the pipeline needs from the outside world arrives through
//! [`MarketDataSource`]; the production implementation is
//! [`crate::execution::chain_client::ChainClient`], tests inject stubs.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::errors::BotError;
use crate::types::{Asset, PriceSample};

/// Narrow read-only contract over the trading pair's market data.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Current exchange rate of the pair (quote priced in base).
    async fn current_price(&self) -> Result<Decimal, BotError>;

    /// Best-effort hourly history covering `hours` — may return fewer
    /// samples than requested.
    async fn historical_samples(&self, hours: u32) -> Result<Vec<PriceSample>, BotError>;

    /// Wallet balance of one pair leg, in whole-token units.
    async fn balance_of(&self, asset: Asset) -> Result<Decimal, BotError>;

    /// Current network gas price in gwei.
    async fn gas_price_gwei(&self) -> Result<Decimal, BotError>;
}
