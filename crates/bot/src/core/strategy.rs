//! Cycle orchestration: data refresh → decision → risk gates → execution.
//!
//! One evaluation cycle runs to completion before the next starts; all
//! mutable pipeline state (price window, risk counters, emergency stop) is
//! owned here and touched only by the active cycle, so no locking is
//! needed. Shutdown is cooperative — a cancellation request is honored
//! between cycles and an in-flight cycle finishes first. A cycle that blows
//! its own deadline is logged and treated as a HOLD; the loop itself never
//! dies to a data or execution error.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::core::data_source::MarketDataSource;
use crate::core::emergency_stop::{EmergencyStop, StopTransition};
use crate::core::price_history::PriceHistory;
use crate::core::risk::RiskValidator;
use crate::core::signal_engine::SignalEngine;
use crate::errors::BotError;
use crate::events::RiskEventLog;
use crate::execution::trader::TradeExecutor;
use crate::rpc::ResilientRpc;
use crate::types::{Asset, Decision, RiskEventKind, SessionStats, Severity, Signal};

/// Loop pacing and trade sizing, extracted from config.
#[derive(Debug, Clone)]
pub struct StrategyParams {
    /// Fraction of the available balance committed per trade.
    pub trade_percentage: Decimal,
    /// When set, trades pass risk validation and count against daily limits.
    pub live_trading: bool,
    pub cycle_interval: Duration,
    pub cycle_timeout: Duration,
    /// How often the RPC quarantine set is cleared.
    pub quarantine_reset_interval: Duration,
}

/// The single-threaded trading loop.
pub struct Strategy {
    source: Arc<dyn MarketDataSource>,
    executor: Arc<dyn TradeExecutor>,
    rpc: Arc<ResilientRpc>,
    events: Arc<RiskEventLog>,
    history: PriceHistory,
    signal_engine: SignalEngine,
    risk: RiskValidator,
    emergency_stop: EmergencyStop,
    params: StrategyParams,
    stats: SessionStats,
    /// Portfolio value captured on the first successful cycle; drawdown is
    /// measured against it.
    initial_portfolio_value: Option<Decimal>,
    shutdown: CancellationToken,
}

impl Strategy {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source: Arc<dyn MarketDataSource>,
        executor: Arc<dyn TradeExecutor>,
        rpc: Arc<ResilientRpc>,
        events: Arc<RiskEventLog>,
        history: PriceHistory,
        signal_engine: SignalEngine,
        risk: RiskValidator,
        emergency_stop: EmergencyStop,
        params: StrategyParams,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            source,
            executor,
            rpc,
            events,
            history,
            signal_engine,
            risk,
            emergency_stop,
            params,
            stats: SessionStats::default(),
            initial_portfolio_value: None,
            shutdown,
        }
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    // -----------------------------------------------------------------------
    // Main loop
    // -----------------------------------------------------------------------

    /// Run evaluation cycles until shutdown is requested.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        info!(
            live = self.params.live_trading,
            interval_s = self.params.cycle_interval.as_secs(),
            "trading loop started"
        );

        let mut last_quarantine_reset = Instant::now();

        loop {
            if self.shutdown.is_cancelled() {
                break;
            }

            match tokio::time::timeout(self.params.cycle_timeout, self.run_cycle()).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => self.handle_cycle_error(&e),
                Err(_) => {
                    error!(
                        timeout_s = self.params.cycle_timeout.as_secs(),
                        "cycle exceeded its deadline, holding"
                    );
                }
            }

            if last_quarantine_reset.elapsed() >= self.params.quarantine_reset_interval {
                self.rpc.reset_failed();
                last_quarantine_reset = Instant::now();
            }

            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.params.cycle_interval) => {}
            }
        }

        info!(
            trades = self.stats.total_trades,
            successful = self.stats.successful_trades,
            failed = self.stats.failed_trades,
            volume = %self.stats.total_volume_base,
            "trading loop stopped"
        );
        Ok(())
    }

    /// Absorb a cycle failure: log it, escalate provider exhaustion to the
    /// risk-event sink, and let the next cycle try again.
    fn handle_cycle_error(&self, error: &BotError) {
        if matches!(error, BotError::AllProvidersExhausted { .. }) {
            self.events.record(
                RiskEventKind::ProviderExhausted,
                Severity::Critical,
                error.to_string(),
            );
        }
        error!(error = %error, "cycle failed, holding");
    }

    // -----------------------------------------------------------------------
    // One evaluation cycle
    // -----------------------------------------------------------------------

    async fn run_cycle(&mut self) -> Result<(), BotError> {
        let now = Utc::now();

        // Data refresh and decision.
        self.history.refresh(self.source.as_ref(), now).await?;
        let decision = self.signal_engine.decide(self.history.samples());

        info!(
            signal = %decision.signal,
            price = %decision.price,
            buy_votes = decision.votes.buy,
            sell_votes = decision.votes.sell,
            samples = self.history.len(),
            "cycle evaluated"
        );

        // Trade gate: emergency stop first, then risk validation.
        if decision.signal.is_actionable() {
            if self.emergency_stop.is_stopped() {
                warn!(signal = %decision.signal, "emergency stop active, skipping signal");
            } else {
                let (base, quote) = self.balances().await?;
                if self.initial_portfolio_value.is_none() {
                    self.initial_portfolio_value = Some(base + quote * decision.price);
                }
                self.execute_signal(&decision, base, quote).await;
            }
        }

        // Portfolio accounting on post-trade balances.
        let (base, quote) = self.balances().await?;
        let portfolio_value = base + quote * decision.price;
        let initial = *self
            .initial_portfolio_value
            .get_or_insert(portfolio_value);

        info!(
            base_balance = %base,
            quote_balance = %quote,
            portfolio_value = %portfolio_value,
            pnl = %(portfolio_value - initial),
            total_trades = self.stats.total_trades,
            "cycle metrics"
        );

        match self.emergency_stop.evaluate(now, initial, portfolio_value) {
            Some(StopTransition::Triggered { drawdown }) => {
                self.events.record(
                    RiskEventKind::EmergencyStop,
                    Severity::Critical,
                    format!("emergency stop triggered: {drawdown} portfolio drawdown"),
                );
            }
            Some(StopTransition::Recovered {
                gain,
                stopped_for_hours,
            }) => {
                self.events.record(
                    RiskEventKind::EmergencyStopRecovery,
                    Severity::Medium,
                    format!("trading resumed: portfolio recovered {gain} after {stopped_for_hours}h"),
                );
            }
            None => {}
        }

        Ok(())
    }

    /// Size and execute one actionable signal.
    async fn execute_signal(&mut self, decision: &Decision, base: Decimal, quote: Decimal) {
        let amount_base = match decision.signal {
            Signal::Buy => base * self.params.trade_percentage,
            Signal::Sell => quote * self.params.trade_percentage * decision.price,
            Signal::Hold => return,
        };

        if amount_base <= Decimal::ZERO {
            debug!(signal = %decision.signal, "no balance to trade");
            return;
        }

        if self.params.live_trading {
            let validation = self
                .risk
                .validate(
                    self.source.as_ref(),
                    decision.signal,
                    amount_base,
                    decision.price,
                    Utc::now(),
                )
                .await;
            if let Err(e) = validation {
                warn!(signal = %decision.signal, error = %e, "trade rejected");
                self.stats.record_failure();
                self.events.record(
                    RiskEventKind::TradeFailure,
                    Severity::High,
                    format!("{} rejected: {e}", decision.signal),
                );
                return;
            }
        }

        let report = self
            .executor
            .execute(decision.signal, amount_base, decision.price)
            .await;

        if report.success {
            self.stats.record_success(amount_base);
            if self.params.live_trading {
                self.risk.update_metrics(amount_base, Utc::now());
            }
            info!(
                signal = %decision.signal,
                amount = %amount_base,
                message = %report.message,
                "trade executed"
            );
        } else {
            self.stats.record_failure();
            self.events.record(
                RiskEventKind::TradeFailure,
                Severity::High,
                format!("{} order failed: {}", decision.signal, report.message),
            );
            error!(
                signal = %decision.signal,
                message = %report.message,
                "trade execution failed"
            );
        }
    }

    /// Current `(base, quote)` balances: the executor's own book when it
    /// keeps one (paper trading), on-chain balances otherwise.
    async fn balances(&self) -> Result<(Decimal, Decimal), BotError> {
        if let Some(tracked) = self.executor.tracked_balances() {
            return Ok(tracked);
        }
        let base = self.source.balance_of(Asset::Base).await?;
        let quote = self.source.balance_of(Asset::Quote).await?;
        Ok((base, quote))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;

    use crate::core::risk::RiskLimits;
    use crate::core::signal_engine::SignalParams;
    use crate::execution::trader::PaperTrader;
    use crate::types::{ExecutionReport, PriceSample, VoteBreakdown};

    /// Data source replaying a fixed declining price so decisions are
    /// reproducible without a network.
    struct ScriptedSource {
        price: Decimal,
    }

    #[async_trait]
    impl MarketDataSource for ScriptedSource {
        async fn current_price(&self) -> Result<Decimal, BotError> {
            Ok(self.price)
        }

        async fn historical_samples(&self, hours: u32) -> Result<Vec<PriceSample>, BotError> {
            let now = Utc::now().timestamp();
            Ok((0..hours)
                .map(|i| PriceSample {
                    timestamp: now - i64::from(hours - i) * 3600,
                    close: self.price,
                    volume: dec!(1000),
                })
                .collect())
        }

        async fn balance_of(&self, _asset: Asset) -> Result<Decimal, BotError> {
            Ok(dec!(10))
        }

        async fn gas_price_gwei(&self) -> Result<Decimal, BotError> {
            Ok(dec!(20))
        }
    }

    /// Executor that always reports failure.
    struct RejectingExecutor;

    #[async_trait]
    impl TradeExecutor for RejectingExecutor {
        async fn execute(
            &self,
            _signal: Signal,
            _amount_base: Decimal,
            _price: Decimal,
        ) -> ExecutionReport {
            ExecutionReport::failed("simulated revert")
        }
    }

    fn params(live: bool) -> StrategyParams {
        StrategyParams {
            trade_percentage: dec!(0.15),
            live_trading: live,
            cycle_interval: Duration::from_secs(3),
            cycle_timeout: Duration::from_secs(30),
            quarantine_reset_interval: Duration::from_secs(300),
        }
    }

    fn strategy(
        executor: Arc<dyn TradeExecutor>,
        live: bool,
        trading_enabled: bool,
    ) -> Strategy {
        let rpc = Arc::new(
            ResilientRpc::new(
                &["http://localhost:8545".to_string()],
                1,
                Duration::ZERO,
            )
            .expect("rpc"),
        );
        Strategy::new(
            Arc::new(ScriptedSource { price: dec!(0.001) }),
            executor,
            rpc,
            Arc::new(RiskEventLog::default()),
            PriceHistory::new(48, dec!(1000)),
            SignalEngine::new(SignalParams {
                short_window: 3,
                long_window: 8,
                rsi_window: 5,
                rsi_oversold: dec!(35),
                rsi_overbought: dec!(65),
            }),
            RiskValidator::new(
                RiskLimits {
                    trading_enabled,
                    max_trade_size: dec!(5.0),
                    max_daily_trades: 50,
                    max_daily_volume: dec!(100.0),
                    max_gas_price_gwei: 200,
                },
                Utc::now().date_naive(),
            ),
            EmergencyStop::new(dec!(0.20), true, dec!(0.05), 2),
            params(live),
            CancellationToken::new(),
        )
    }

    fn buy_decision() -> Decision {
        Decision {
            signal: Signal::Buy,
            price: dec!(0.001),
            votes: VoteBreakdown::default(),
            indicators: None,
        }
    }

    #[tokio::test]
    async fn test_paper_buy_updates_stats_and_book() {
        let paper = Arc::new(PaperTrader::new(dec!(1.0), Decimal::ZERO, dec!(0.02)));
        let mut s = strategy(paper.clone(), false, false);

        s.execute_signal(&buy_decision(), dec!(1.0), Decimal::ZERO).await;

        assert_eq!(s.stats().successful_trades, 1);
        assert_eq!(s.stats().total_volume_base, dec!(0.15));
        let (base, _) = paper.tracked_balances().expect("book");
        assert_eq!(base, dec!(0.85));
    }

    #[tokio::test]
    async fn test_live_validation_rejection_is_recorded() {
        let paper = Arc::new(PaperTrader::new(dec!(1.0), Decimal::ZERO, dec!(0.02)));
        // Live path with the trading-enabled flag off: every trade rejected.
        let mut s = strategy(paper.clone(), true, false);

        s.execute_signal(&buy_decision(), dec!(1.0), Decimal::ZERO).await;

        assert_eq!(s.stats().failed_trades, 1);
        assert_eq!(s.stats().successful_trades, 0);
        let events = s.events.recent();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, RiskEventKind::TradeFailure);
        // The paper book must be untouched after a rejection.
        assert_eq!(paper.tracked_balances(), Some((dec!(1.0), Decimal::ZERO)));
    }

    #[tokio::test]
    async fn test_execution_failure_counts_and_records() {
        let mut s = strategy(Arc::new(RejectingExecutor), false, false);

        s.execute_signal(&buy_decision(), dec!(1.0), Decimal::ZERO).await;

        assert_eq!(s.stats().failed_trades, 1);
        let events = s.events.recent();
        assert_eq!(events.len(), 1);
        assert!(events[0].description.contains("simulated revert"));
    }

    #[tokio::test]
    async fn test_zero_balance_skips_execution() {
        let paper = Arc::new(PaperTrader::new(Decimal::ZERO, Decimal::ZERO, dec!(0.02)));
        let mut s = strategy(paper, false, false);

        s.execute_signal(&buy_decision(), Decimal::ZERO, Decimal::ZERO).await;

        assert_eq!(s.stats().total_trades, 0);
    }

    #[tokio::test]
    async fn test_run_cycle_bootstraps_and_accounts() {
        let paper = Arc::new(PaperTrader::new(dec!(2.0), Decimal::ZERO, dec!(0.02)));
        let mut s = strategy(paper, false, false);

        s.run_cycle().await.expect("cycle");

        assert!(s.history.is_bootstrapped());
        assert!(s.history.len() >= 26);
        // Initial portfolio captured from the paper book.
        assert_eq!(s.initial_portfolio_value, Some(dec!(2.0)));
    }

    #[tokio::test]
    async fn test_provider_exhaustion_escalates() {
        let s = strategy(Arc::new(RejectingExecutor), false, false);
        s.handle_cycle_error(&BotError::AllProvidersExhausted {
            attempts: 6,
            last_error: "429".into(),
        });
        let events = s.events.recent();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, RiskEventKind::ProviderExhausted);
        assert_eq!(events[0].severity, Severity::Critical);
    }

    #[tokio::test]
    async fn test_stopped_state_blocks_trading_in_cycle() {
        let paper = Arc::new(PaperTrader::new(dec!(2.0), Decimal::ZERO, dec!(0.02)));
        let mut s = strategy(paper.clone(), false, false);

        // Force the stop open, then run a full cycle.
        s.emergency_stop.evaluate(Utc::now(), dec!(1.0), dec!(0.5));
        assert!(s.emergency_stop.is_stopped());

        s.run_cycle().await.expect("cycle");

        // Whatever the signal was, no trade can have happened.
        assert_eq!(s.stats().total_trades, 0);
        assert_eq!(paper.tracked_balances(), Some((dec!(2.0), Decimal::ZERO)));
    }
}
