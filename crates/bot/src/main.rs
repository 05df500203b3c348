use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;
use anyhow::{Context, Result};
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use dex_bot::config;
use dex_bot::core::data_source::MarketDataSource;
use dex_bot::core::emergency_stop::EmergencyStop;
use dex_bot::core::price_history::PriceHistory;
use dex_bot::core::risk::{RiskLimits, RiskValidator};
use dex_bot::core::signal_engine::{SignalEngine, SignalParams};
use dex_bot::core::strategy::{Strategy, StrategyParams};
use dex_bot::events::RiskEventLog;
use dex_bot::execution::chain_client::{ChainClient, PairAddresses};
use dex_bot::execution::trader::PaperTrader;
use dex_bot::logging;
use dex_bot::rpc::ResilientRpc;
use dex_bot::types::Asset;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignore if missing).
    let _ = dotenvy::dotenv();

    // Determine config directory — default to `./config`.
    let config_dir = std::env::var("BOT_CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config"));

    // Load and validate configuration.
    let config = config::load_config(&config_dir)?;

    // Initialize tracing — hold the guard for the process lifetime.
    let _guard = logging::init_tracing(&config.app.logging)?;

    info!(
        chain_id = config.chain.chain_id,
        chain_name = %config.chain.chain_name,
        live_trading = config.risk.live_trading_enabled,
        endpoints = config.chain.rpc.endpoints.len(),
        "DEX trading bot starting"
    );

    let wallet = init_wallet_address(config.risk.live_trading_enabled)?;

    // -----------------------------------------------------------------------
    // Data access layer
    // -----------------------------------------------------------------------

    let rpc = Arc::new(ResilientRpc::new(
        &config.chain.rpc.endpoints,
        config.timing.rpc.max_retries,
        Duration::from_secs_f64(config.timing.rpc.retry_delay_seconds),
    )?);

    let addresses = PairAddresses {
        pool: config
            .chain
            .contracts
            .pool
            .parse()
            .context("failed to parse pool address")?,
        quote_token: config
            .chain
            .contracts
            .quote_token
            .parse()
            .context("failed to parse quote_token address")?,
        wallet,
    };

    let source: Arc<dyn MarketDataSource> = Arc::new(ChainClient::new(
        rpc.clone(),
        addresses,
        config.chain.blocks_per_hour,
        config.trading.baseline_volume,
        Duration::from_millis(config.timing.historical_snapshot_delay_ms),
    ));

    // -----------------------------------------------------------------------
    // Execution seam — paper trader seeded from the wallet's real balances
    // -----------------------------------------------------------------------

    let (initial_base, initial_quote) = fetch_initial_balances(source.as_ref()).await;
    info!(
        base = %initial_base,
        quote = %initial_quote,
        "initial balances"
    );

    let executor = Arc::new(PaperTrader::new(
        initial_base,
        initial_quote,
        config.risk.slippage_tolerance,
    ));

    // -----------------------------------------------------------------------
    // Decision pipeline
    // -----------------------------------------------------------------------

    let events = Arc::new(RiskEventLog::default());

    let history = PriceHistory::new(config.trading.history_hours, config.trading.baseline_volume);

    let signal_engine = SignalEngine::new(SignalParams {
        short_window: config.trading.short_sma_window,
        long_window: config.trading.long_sma_window,
        rsi_window: config.trading.rsi_window,
        rsi_oversold: config.trading.rsi_oversold,
        rsi_overbought: config.trading.rsi_overbought,
    });

    let risk = RiskValidator::new(
        RiskLimits {
            trading_enabled: config.risk.live_trading_enabled,
            max_trade_size: config.risk.max_trade_size,
            max_daily_trades: config.risk.max_daily_trades,
            max_daily_volume: config.risk.max_daily_volume,
            max_gas_price_gwei: config.risk.max_gas_price_gwei,
        },
        Utc::now().date_naive(),
    );

    let emergency_stop = EmergencyStop::new(
        config.risk.emergency_stop_loss,
        config.risk.recovery_enabled,
        config.risk.recovery_threshold,
        config.risk.recovery_wait_hours,
    );

    let shutdown = CancellationToken::new();

    let mut strategy = Strategy::new(
        source,
        executor,
        rpc,
        events,
        history,
        signal_engine,
        risk,
        emergency_stop,
        StrategyParams {
            trade_percentage: config.trading.trade_percentage,
            live_trading: config.risk.live_trading_enabled,
            cycle_interval: Duration::from_secs(config.trading.cycle_interval_seconds),
            cycle_timeout: Duration::from_secs(config.timing.cycle_timeout_seconds),
            quarantine_reset_interval: Duration::from_secs(
                config.timing.rpc.quarantine_reset_interval_seconds,
            ),
        },
        shutdown.clone(),
    );

    info!("all components initialized");

    let strategy_handle = tokio::spawn(async move {
        if let Err(e) = strategy.run().await {
            error!(error = %e, "trading loop exited with error");
        }
    });

    // -----------------------------------------------------------------------
    // Wait for shutdown signal; the in-flight cycle is allowed to finish.
    // -----------------------------------------------------------------------

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl+C")?;

    info!("shutdown signal received, stopping gracefully...");
    shutdown.cancel();

    if let Err(e) = strategy_handle.await {
        error!(error = %e, "trading loop task panicked");
    }

    info!("shutdown complete");
    Ok(())
}

// ---------------------------------------------------------------------------
// Initialization helpers
// ---------------------------------------------------------------------------

/// Resolve the wallet address from `WALLET_ADDRESS`.
///
/// Live trading requires it; paper mode falls back to the zero address so
/// the pipeline can run unattended without a configured wallet.
fn init_wallet_address(live_trading: bool) -> Result<Address> {
    match std::env::var("WALLET_ADDRESS").ok().filter(|v| !v.is_empty()) {
        Some(addr) => addr.parse().context("failed to parse WALLET_ADDRESS"),
        None => {
            if live_trading {
                anyhow::bail!("WALLET_ADDRESS is required when live trading is enabled");
            }
            warn!("no WALLET_ADDRESS set, using zero address (paper mode)");
            Ok(Address::ZERO)
        }
    }
}

/// Seed balances for the paper book from the wallet's on-chain holdings.
///
/// A failed lookup degrades to a nominal 1.0 base balance — data loss must
/// not keep the bot from starting.
async fn fetch_initial_balances(source: &dyn MarketDataSource) -> (Decimal, Decimal) {
    let base = match source.balance_of(Asset::Base).await {
        Ok(balance) => balance,
        Err(e) => {
            warn!(error = %e, "failed to fetch base balance, seeding paper book with 1.0");
            dec!(1.0)
        }
    };
    let quote = match source.balance_of(Asset::Quote).await {
        Ok(balance) => balance,
        Err(e) => {
            warn!(error = %e, "failed to fetch quote balance, seeding paper book with 0");
            Decimal::ZERO
        }
    };
    (base, quote)
}
