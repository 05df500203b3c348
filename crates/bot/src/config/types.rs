use rust_decimal::Decimal;
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Top-level aggregate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    pub app: AppConfig,
    pub chain: ChainConfig,
    pub trading: TradingConfig,
    pub risk: RiskConfig,
    pub timing: TimingConfig,
}

// ---------------------------------------------------------------------------
// app.json
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub log_dir: String,
}

// ---------------------------------------------------------------------------
// chains/1.json
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    pub chain_id: u64,
    pub chain_name: String,
    /// Approximate blocks per hour, used for the historical backward scan.
    pub blocks_per_hour: u64,
    pub rpc: RpcConfig,
    pub contracts: ContractsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcConfig {
    /// Ordered endpoint list; rotation starts at the first entry.
    pub endpoints: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContractsConfig {
    /// Uniswap V3 pool of the traded pair.
    pub pool: String,
    pub base_token: String,
    pub quote_token: String,
}

// ---------------------------------------------------------------------------
// trading.json
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct TradingConfig {
    pub short_sma_window: usize,
    pub long_sma_window: usize,
    pub rsi_window: usize,
    #[serde(with = "rust_decimal::serde::str")]
    pub rsi_oversold: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub rsi_overbought: Decimal,
    /// Retention horizon of the price window, in hours.
    pub history_hours: u32,
    /// Fraction of the available balance committed per trade.
    #[serde(with = "rust_decimal::serde::str")]
    pub trade_percentage: Decimal,
    /// Reference volume for synthetic sample generation.
    #[serde(with = "rust_decimal::serde::str")]
    pub baseline_volume: Decimal,
    pub cycle_interval_seconds: u64,
}

// ---------------------------------------------------------------------------
// risk.json
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct RiskConfig {
    pub live_trading_enabled: bool,
    /// Largest single trade, in the base asset.
    #[serde(with = "rust_decimal::serde::str")]
    pub max_trade_size: Decimal,
    pub max_daily_trades: u32,
    #[serde(with = "rust_decimal::serde::str")]
    pub max_daily_volume: Decimal,
    pub max_gas_price_gwei: u64,
    /// Fractional portfolio drawdown that halts trading.
    #[serde(with = "rust_decimal::serde::str")]
    pub emergency_stop_loss: Decimal,
    pub recovery_enabled: bool,
    /// Fractional recovery over the trigger value required to resume.
    #[serde(with = "rust_decimal::serde::str")]
    pub recovery_threshold: Decimal,
    pub recovery_wait_hours: i64,
    /// Worst-case adverse fill applied by the executor.
    #[serde(with = "rust_decimal::serde::str")]
    pub slippage_tolerance: Decimal,
}

// ---------------------------------------------------------------------------
// timing.json
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct TimingConfig {
    pub cycle_timeout_seconds: u64,
    pub rpc: RpcTimingConfig,
    /// Pause between archive snapshot reads during the bulk scan.
    pub historical_snapshot_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcTimingConfig {
    /// Retry budget per endpoint before declaring exhaustion.
    pub max_retries: u32,
    pub retry_delay_seconds: f64,
    pub quarantine_reset_interval_seconds: u64,
}
