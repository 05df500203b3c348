pub mod types;
pub mod validate;

pub use types::*;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// Load all config JSON files into a single [`BotConfig`], then apply
/// environment variable overrides and validate.
///
/// Expected directory layout:
/// ```text
/// config/
///   app.json
///   chains/1.json
///   trading.json
///   risk.json
///   timing.json
/// ```
///
/// # Environment variable overrides
///
/// | Env Var                             | Config Field                    |
/// |-------------------------------------|---------------------------------|
/// | `LIVE_TRADING_ENABLED`              | `risk.live_trading_enabled`     |
/// | `MAX_TRADE_SIZE_ETH`                | `risk.max_trade_size`           |
/// | `MAX_DAILY_TRADES`                  | `risk.max_daily_trades`         |
/// | `MAX_DAILY_VOLUME_ETH`              | `risk.max_daily_volume`         |
/// | `MAX_GAS_PRICE_GWEI`                | `risk.max_gas_price_gwei`       |
/// | `EMERGENCY_STOP_LOSS`               | `risk.emergency_stop_loss`      |
/// | `EMERGENCY_STOP_RECOVERY_ENABLED`   | `risk.recovery_enabled`         |
/// | `EMERGENCY_STOP_RECOVERY_THRESHOLD` | `risk.recovery_threshold`       |
/// | `EMERGENCY_STOP_RECOVERY_WAIT_HOURS`| `risk.recovery_wait_hours`      |
/// | `WEB3_PROVIDER_URL`                 | prepended to `chain.rpc.endpoints` |
pub fn load_config(config_dir: &Path) -> Result<BotConfig> {
    let read = |name: &str| -> Result<String> {
        let path = config_dir.join(name);
        std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file: {}", path.display()))
    };

    let app: AppConfig = serde_json::from_str(&read("app.json")?).context("parsing app.json")?;

    let chain: ChainConfig =
        serde_json::from_str(&read("chains/1.json")?).context("parsing chains/1.json")?;

    let trading: TradingConfig =
        serde_json::from_str(&read("trading.json")?).context("parsing trading.json")?;

    let risk: RiskConfig =
        serde_json::from_str(&read("risk.json")?).context("parsing risk.json")?;

    let timing: TimingConfig =
        serde_json::from_str(&read("timing.json")?).context("parsing timing.json")?;

    let mut config = BotConfig {
        app,
        chain,
        trading,
        risk,
        timing,
    };

    apply_env_overrides(&mut config);
    validate::validate_config(&config)?;

    Ok(config)
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides to the loaded config.
///
/// Only non-empty env vars take effect. Parse failures are skipped and the
/// JSON value remains.
fn apply_env_overrides(config: &mut BotConfig) {
    if let Some(val) = env_bool("LIVE_TRADING_ENABLED") {
        info!(live_trading = val, "env override: LIVE_TRADING_ENABLED");
        config.risk.live_trading_enabled = val;
    }

    if let Some(val) = env_decimal("MAX_TRADE_SIZE_ETH") {
        info!(%val, "env override: MAX_TRADE_SIZE_ETH");
        config.risk.max_trade_size = val;
    }

    if let Some(val) = env_parse::<u32>("MAX_DAILY_TRADES") {
        info!(val, "env override: MAX_DAILY_TRADES");
        config.risk.max_daily_trades = val;
    }

    if let Some(val) = env_decimal("MAX_DAILY_VOLUME_ETH") {
        info!(%val, "env override: MAX_DAILY_VOLUME_ETH");
        config.risk.max_daily_volume = val;
    }

    if let Some(val) = env_parse::<u64>("MAX_GAS_PRICE_GWEI") {
        info!(val, "env override: MAX_GAS_PRICE_GWEI");
        config.risk.max_gas_price_gwei = val;
    }

    if let Some(val) = env_decimal("EMERGENCY_STOP_LOSS") {
        info!(%val, "env override: EMERGENCY_STOP_LOSS");
        config.risk.emergency_stop_loss = val;
    }

    if let Some(val) = env_bool("EMERGENCY_STOP_RECOVERY_ENABLED") {
        info!(val, "env override: EMERGENCY_STOP_RECOVERY_ENABLED");
        config.risk.recovery_enabled = val;
    }

    if let Some(val) = env_decimal("EMERGENCY_STOP_RECOVERY_THRESHOLD") {
        info!(%val, "env override: EMERGENCY_STOP_RECOVERY_THRESHOLD");
        config.risk.recovery_threshold = val;
    }

    if let Some(val) = env_parse::<i64>("EMERGENCY_STOP_RECOVERY_WAIT_HOURS") {
        info!(val, "env override: EMERGENCY_STOP_RECOVERY_WAIT_HOURS");
        config.risk.recovery_wait_hours = val;
    }

    // A private endpoint takes rotation priority over the public ones.
    if let Some(val) = env_string("WEB3_PROVIDER_URL") {
        info!("env override: WEB3_PROVIDER_URL prepended to endpoint list");
        config.chain.rpc.endpoints.insert(0, val);
    }
}

/// Read a non-empty env var as a `String`.
fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Read a non-empty env var as a bool (`true`, `1`, `yes` → true).
fn env_bool(key: &str) -> Option<bool> {
    env_string(key).map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
}

/// Read a non-empty env var and parse it as `T`.
fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    env_string(key).and_then(|v| v.parse().ok())
}

/// Read a non-empty env var and parse it as `Decimal`.
fn env_decimal(key: &str) -> Option<Decimal> {
    env_string(key).and_then(|v| Decimal::from_str(&v).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serial_test::serial;

    // -----------------------------------------------------------------------
    // Helper: write a minimal set of config JSON files to a temp dir.
    // -----------------------------------------------------------------------

    fn write_test_configs(dir: &Path) {
        std::fs::create_dir_all(dir.join("chains")).unwrap();

        std::fs::write(
            dir.join("app.json"),
            r#"{ "logging": { "log_dir": "logs" } }"#,
        )
        .unwrap();

        std::fs::write(
            dir.join("chains/1.json"),
            r#"{
                "chain_id": 1,
                "chain_name": "Ethereum Mainnet",
                "blocks_per_hour": 300,
                "rpc": {
                    "endpoints": [
                        "https://cloudflare-eth.com",
                        "https://rpc.ankr.com/eth"
                    ]
                },
                "contracts": {
                    "pool": "0x11950d141ecb863f01007add7d1a342041227b58",
                    "base_token": "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2",
                    "quote_token": "0x6982508145454Ce325dDbE47a25d4ec3d2311933"
                }
            }"#,
        )
        .unwrap();

        std::fs::write(
            dir.join("trading.json"),
            r#"{
                "short_sma_window": 3,
                "long_sma_window": 8,
                "rsi_window": 5,
                "rsi_oversold": "35",
                "rsi_overbought": "65",
                "history_hours": 26,
                "trade_percentage": "0.15",
                "baseline_volume": "1000",
                "cycle_interval_seconds": 3
            }"#,
        )
        .unwrap();

        std::fs::write(
            dir.join("risk.json"),
            r#"{
                "live_trading_enabled": false,
                "max_trade_size": "0.01",
                "max_daily_trades": 50,
                "max_daily_volume": "10.0",
                "max_gas_price_gwei": 200,
                "emergency_stop_loss": "0.20",
                "recovery_enabled": true,
                "recovery_threshold": "0.05",
                "recovery_wait_hours": 2,
                "slippage_tolerance": "0.02"
            }"#,
        )
        .unwrap();

        std::fs::write(
            dir.join("timing.json"),
            r#"{
                "cycle_timeout_seconds": 30,
                "rpc": {
                    "max_retries": 3,
                    "retry_delay_seconds": 1.0,
                    "quarantine_reset_interval_seconds": 300
                },
                "historical_snapshot_delay_ms": 50
            }"#,
        )
        .unwrap();
    }

    /// Remove all bot-related env vars so tests don't interfere.
    fn clean_bot_env() {
        for key in [
            "LIVE_TRADING_ENABLED",
            "MAX_TRADE_SIZE_ETH",
            "MAX_DAILY_TRADES",
            "MAX_DAILY_VOLUME_ETH",
            "MAX_GAS_PRICE_GWEI",
            "EMERGENCY_STOP_LOSS",
            "EMERGENCY_STOP_RECOVERY_ENABLED",
            "EMERGENCY_STOP_RECOVERY_THRESHOLD",
            "EMERGENCY_STOP_RECOVERY_WAIT_HOURS",
            "WEB3_PROVIDER_URL",
        ] {
            std::env::remove_var(key);
        }
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    #[test]
    #[serial]
    fn test_load_test_configs() {
        clean_bot_env();
        let tmp = tempfile::tempdir().unwrap();
        write_test_configs(tmp.path());

        let config = load_config(tmp.path()).expect("test config should load");
        assert_eq!(config.chain.chain_id, 1);
        assert!(!config.risk.live_trading_enabled);
        assert_eq!(config.trading.short_sma_window, 3);
        assert_eq!(config.risk.max_trade_size, dec!(0.01));
        assert_eq!(config.chain.rpc.endpoints.len(), 2);
        clean_bot_env();
    }

    #[test]
    #[serial]
    fn test_missing_config_file_errors() {
        clean_bot_env();
        let tmp = tempfile::tempdir().unwrap();
        let err = load_config(tmp.path()).unwrap_err();
        assert!(
            err.to_string().contains("failed to read config file"),
            "expected file-not-found error, got: {err}"
        );
        clean_bot_env();
    }

    #[test]
    #[serial]
    fn test_env_override_live_trading() {
        clean_bot_env();
        let tmp = tempfile::tempdir().unwrap();
        write_test_configs(tmp.path());

        std::env::set_var("LIVE_TRADING_ENABLED", "true");
        let config = load_config(tmp.path()).unwrap();
        assert!(config.risk.live_trading_enabled);
        clean_bot_env();
    }

    #[test]
    #[serial]
    fn test_env_override_max_trade_size() {
        clean_bot_env();
        let tmp = tempfile::tempdir().unwrap();
        write_test_configs(tmp.path());

        std::env::set_var("MAX_TRADE_SIZE_ETH", "0.25");
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.risk.max_trade_size, dec!(0.25));
        clean_bot_env();
    }

    #[test]
    #[serial]
    fn test_env_override_prepends_provider() {
        clean_bot_env();
        let tmp = tempfile::tempdir().unwrap();
        write_test_configs(tmp.path());

        std::env::set_var("WEB3_PROVIDER_URL", "https://example-rpc.invalid");
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.chain.rpc.endpoints[0], "https://example-rpc.invalid");
        assert_eq!(config.chain.rpc.endpoints.len(), 3);
        clean_bot_env();
    }

    #[test]
    #[serial]
    fn test_env_override_empty_string_ignored() {
        clean_bot_env();
        let tmp = tempfile::tempdir().unwrap();
        write_test_configs(tmp.path());

        std::env::set_var("MAX_DAILY_TRADES", "");
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.risk.max_daily_trades, 50);
        clean_bot_env();
    }

    #[test]
    #[serial]
    fn test_env_override_invalid_parse_ignored() {
        clean_bot_env();
        let tmp = tempfile::tempdir().unwrap();
        write_test_configs(tmp.path());

        std::env::set_var("MAX_DAILY_TRADES", "not_a_number");
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.risk.max_daily_trades, 50);
        clean_bot_env();
    }
}
