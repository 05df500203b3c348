use alloy::primitives::{address, Address};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ---------------------------------------------------------------------------
// Numeric Constants
// ---------------------------------------------------------------------------

/// WAD: 1e18 — standard EVM fixed-point scale for token amounts and prices.
pub const WAD: Decimal = dec!(1_000_000_000_000_000_000);

/// GWEI: 1e9 — gas price unit.
pub const GWEI: Decimal = dec!(1_000_000_000);

// ---------------------------------------------------------------------------
// Indicator Parameters
// ---------------------------------------------------------------------------

/// MACD EMA spans (standard 12/26/9).
pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;

/// Window for the volume moving average used as trade confirmation.
pub const VOLUME_SMA_WINDOW: usize = 5;

/// Current volume must exceed this multiple of its moving average to count
/// as a confirmation vote.
pub const VOLUME_CONFIRMATION_RATIO: Decimal = dec!(1.2);

// ---------------------------------------------------------------------------
// Signal Voting
// ---------------------------------------------------------------------------

/// BUY requires at least this many concurring votes.
pub const BUY_VOTES_REQUIRED: u32 = 2;

/// SELL requires only one vote — the sell side is deliberately easier to
/// trigger so capital is preserved on the way down.
pub const SELL_VOTES_REQUIRED: u32 = 1;

// ---------------------------------------------------------------------------
// Price History
// ---------------------------------------------------------------------------

/// Below this many real historical samples the cache falls back to
/// synthetic history generation.
pub const MIN_VIABLE_HISTORY_SAMPLES: usize = 5;

/// Approximate Ethereum mainnet blocks per hour (12 s block time).
pub const DEFAULT_BLOCKS_PER_HOUR: u64 = 300;

// ---------------------------------------------------------------------------
// Mainnet Addresses
// ---------------------------------------------------------------------------

/// Uniswap V3 PEPE/WETH 0.3% fee tier pool.
pub const UNISWAP_V3_PEPE_WETH_POOL: Address =
    address!("11950d141ecb863f01007add7d1a342041227b58");

pub const TOKEN_WETH: Address = address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");
pub const TOKEN_PEPE: Address = address!("6982508145454Ce325dDbE47a25d4ec3d2311933");

// ---------------------------------------------------------------------------
// Default Risk Values
// ---------------------------------------------------------------------------

pub const DEFAULT_MAX_TRADE_SIZE: Decimal = dec!(0.01);
pub const DEFAULT_MAX_DAILY_TRADES: u32 = 50;
pub const DEFAULT_MAX_DAILY_VOLUME: Decimal = dec!(10.0);
pub const DEFAULT_MAX_GAS_PRICE_GWEI: u64 = 200;
pub const DEFAULT_EMERGENCY_STOP_LOSS: Decimal = dec!(0.20);
pub const DEFAULT_RECOVERY_THRESHOLD: Decimal = dec!(0.05);
pub const DEFAULT_RECOVERY_WAIT_HOURS: i64 = 2;
