//! Trade execution seam.
//!
//! The decision core hands a validated trade to a [`TradeExecutor`] and only
//! inspects the returned success flag and message — signing, routing, and
//! broadcast are the executor's business. [`PaperTrader`] is the built-in
//! implementation: it fills orders against an internal simulated book, which
//! keeps the full pipeline runnable without a funded wallet.

use std::sync::Mutex;

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::info;

use crate::types::{ExecutionReport, Signal};

/// Executes trades on behalf of the decision core.
#[async_trait]
pub trait TradeExecutor: Send + Sync {
    /// Execute a trade sized in the base asset at the given price.
    ///
    /// Failures are reported, not raised — the cycle loop decides what to do
    /// with an unsuccessful report.
    async fn execute(&self, signal: Signal, amount_base: Decimal, price: Decimal)
        -> ExecutionReport;

    /// Balances `(base, quote)` maintained by this executor, if it keeps its
    /// own book. `None` means balances live on-chain.
    fn tracked_balances(&self) -> Option<(Decimal, Decimal)> {
        None
    }
}

#[derive(Debug, Clone, Copy)]
struct PaperBook {
    base: Decimal,
    quote: Decimal,
}

/// Simulated executor filling orders against an in-memory book.
///
/// Fills apply the configured slippage tolerance as a worst-case haircut so
/// simulated performance does not flatter the strategy.
pub struct PaperTrader {
    book: Mutex<PaperBook>,
    slippage_tolerance: Decimal,
}

impl PaperTrader {
    pub fn new(initial_base: Decimal, initial_quote: Decimal, slippage_tolerance: Decimal) -> Self {
        Self {
            book: Mutex::new(PaperBook {
                base: initial_base,
                quote: initial_quote,
            }),
            slippage_tolerance,
        }
    }

    fn fill_factor(&self) -> Decimal {
        dec!(1) - self.slippage_tolerance
    }
}

#[async_trait]
impl TradeExecutor for PaperTrader {
    async fn execute(
        &self,
        signal: Signal,
        amount_base: Decimal,
        price: Decimal,
    ) -> ExecutionReport {
        if price <= Decimal::ZERO {
            return ExecutionReport::failed("cannot fill at a zero price");
        }
        if amount_base <= Decimal::ZERO {
            return ExecutionReport::failed("trade amount must be positive");
        }

        let mut book = self.book.lock().expect("paper book lock poisoned");

        match signal {
            Signal::Buy => {
                if book.base < amount_base {
                    return ExecutionReport::failed(format!(
                        "insufficient base balance: required {amount_base}, available {base}",
                        base = book.base
                    ));
                }
                let received = amount_base / price * self.fill_factor();
                book.base -= amount_base;
                book.quote += received;
                info!(
                    spent = %amount_base,
                    received = %received,
                    %price,
                    "paper BUY filled"
                );
                ExecutionReport::ok(format!("paper buy: spent {amount_base}, received {received}"))
            }
            Signal::Sell => {
                let tokens = amount_base / price;
                if book.quote < tokens {
                    return ExecutionReport::failed(format!(
                        "insufficient quote balance: required {tokens}, available {quote}",
                        quote = book.quote
                    ));
                }
                let proceeds = amount_base * self.fill_factor();
                book.quote -= tokens;
                book.base += proceeds;
                info!(
                    sold = %tokens,
                    proceeds = %proceeds,
                    %price,
                    "paper SELL filled"
                );
                ExecutionReport::ok(format!("paper sell: sold {tokens}, received {proceeds}"))
            }
            Signal::Hold => ExecutionReport::failed("HOLD is not executable"),
        }
    }

    fn tracked_balances(&self) -> Option<(Decimal, Decimal)> {
        let book = self.book.lock().expect("paper book lock poisoned");
        Some((book.base, book.quote))
    }
}
