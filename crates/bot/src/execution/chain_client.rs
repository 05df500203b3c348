//! On-chain market data reads for the traded pair.
//!
//! Implements [`MarketDataSource`] over the rotating RPC layer: spot price
//! from Uniswap V3 `slot0`, hourly history via archive reads at decreasing
//! block heights, wallet balances, and the network gas price. Contract
//! bindings come from `execution::contracts`; amounts are assumed
//! WAD-scaled (both pair legs use 18 decimals).

use std::sync::Arc;
use std::time::Duration;

use alloy::eips::BlockId;
use alloy::primitives::{Address, U160};
use alloy::providers::Provider;
use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::core::data_source::MarketDataSource;
use crate::errors::BotError;
use crate::rpc::ResilientRpc;
use crate::types::wad::{wad_to_decimal, wei_to_gwei};
use crate::types::{Asset, PriceSample};

use super::contracts::{IUniswapV3Pool, IERC20};

const SECONDS_PER_HOUR: i64 = 3600;

/// Convert a Uniswap V3 `sqrtPriceX96` into a plain price ratio.
///
/// `price = (sqrtPriceX96 / 2^96)^2`, i.e. token1 priced in token0. The
/// U160 exceeds u128 range, so the conversion goes through its decimal
/// string representation.
fn sqrt_price_x96_to_price(sqrt_price_x96: U160) -> Decimal {
    let sqrt: f64 = sqrt_price_x96.to_string().parse().unwrap_or(0.0);
    let ratio = (sqrt / 2f64.powi(96)).powi(2);
    Decimal::from_f64(ratio).unwrap_or(Decimal::ZERO)
}

/// Pair and wallet addressing for one market.
#[derive(Debug, Clone)]
pub struct PairAddresses {
    /// Uniswap V3 pool of the pair.
    pub pool: Address,
    /// Quote-side ERC-20 token (the asset being accumulated).
    pub quote_token: Address,
    /// Wallet whose balances gate trades.
    pub wallet: Address,
}

/// [`MarketDataSource`] backed by rotating JSON-RPC endpoints.
pub struct ChainClient {
    rpc: Arc<ResilientRpc>,
    addresses: PairAddresses,
    blocks_per_hour: u64,
    baseline_volume: Decimal,
    /// Pause between archive snapshot reads to stay under rate limits.
    snapshot_delay: Duration,
}

impl ChainClient {
    pub fn new(
        rpc: Arc<ResilientRpc>,
        addresses: PairAddresses,
        blocks_per_hour: u64,
        baseline_volume: Decimal,
        snapshot_delay: Duration,
    ) -> Self {
        Self {
            rpc,
            addresses,
            blocks_per_hour,
            baseline_volume,
            snapshot_delay,
        }
    }

    /// `slot0` price at a specific block, or the head when `block` is `None`.
    async fn pool_price_at(&self, block: Option<u64>) -> Result<Decimal, BotError> {
        let pool_address = self.addresses.pool;
        let sqrt_price = self
            .rpc
            .call("slot0", move |provider| async move {
                let pool = IUniswapV3Pool::new(pool_address, provider);
                let call = pool.slot0();
                let call = match block {
                    Some(number) => call.block(BlockId::number(number)),
                    None => call,
                };
                let slot0 = call.call().await.context("slot0 call")?;
                Ok(slot0.sqrtPriceX96)
            })
            .await?;

        Ok(sqrt_price_x96_to_price(sqrt_price))
    }
}

#[async_trait]
impl MarketDataSource for ChainClient {
    async fn current_price(&self) -> Result<Decimal, BotError> {
        let price = self.pool_price_at(None).await?;
        debug!(%price, "pool spot price");
        Ok(price)
    }

    /// Walk backwards from the head, one snapshot per approximate hour.
    ///
    /// Individual snapshot failures are skipped — archive depth varies per
    /// endpoint and a sparse window is still usable. Volume is synthesized
    /// around the configured baseline; V3 `slot0` carries none.
    async fn historical_samples(&self, hours: u32) -> Result<Vec<PriceSample>, BotError> {
        let head = self
            .rpc
            .call("block_number", |provider| async move {
                provider.get_block_number().await.context("get_block_number")
            })
            .await?;

        let now = Utc::now().timestamp();
        let mut samples = Vec::with_capacity(hours as usize);

        for i in 0..hours {
            let offset = u64::from(i) * self.blocks_per_hour;
            let Some(block) = head.checked_sub(offset) else {
                debug!(hour = i, "reached chain genesis, stopping historical scan");
                break;
            };

            match self.pool_price_at(Some(block)).await {
                Ok(price) if price > Decimal::ZERO => {
                    let volume_factor =
                        Decimal::from_f64(rand::thread_rng().gen_range(0.5..=2.0))
                            .unwrap_or(Decimal::ONE);
                    samples.push(PriceSample {
                        timestamp: now - i64::from(i) * SECONDS_PER_HOUR,
                        close: price,
                        volume: self.baseline_volume * volume_factor,
                    });
                }
                Ok(_) => {
                    warn!(block, "zero price in snapshot, skipping");
                }
                Err(e) => {
                    warn!(block, error = %e, "historical snapshot failed, skipping");
                }
            }

            tokio::time::sleep(self.snapshot_delay).await;
        }

        // Scanned newest-first; the series contract is oldest-first.
        samples.reverse();
        debug!(requested = hours, fetched = samples.len(), "historical scan finished");
        Ok(samples)
    }

    async fn balance_of(&self, asset: Asset) -> Result<Decimal, BotError> {
        let wallet = self.addresses.wallet;
        let raw = match asset {
            Asset::Base => {
                self.rpc
                    .call("get_balance", move |provider| async move {
                        provider.get_balance(wallet).await.context("get_balance")
                    })
                    .await?
            }
            Asset::Quote => {
                let token = self.addresses.quote_token;
                self.rpc
                    .call("balance_of", move |provider| async move {
                        let erc20 = IERC20::new(token, provider);
                        erc20.balanceOf(wallet).call().await.context("balanceOf call")
                    })
                    .await?
            }
        };

        Ok(wad_to_decimal(raw))
    }

    async fn gas_price_gwei(&self) -> Result<Decimal, BotError> {
        let wei = self
            .rpc
            .call("gas_price", |provider| async move {
                provider.get_gas_price().await.context("get_gas_price")
            })
            .await?;

        Ok(wei_to_gwei(wei))
    }
}
