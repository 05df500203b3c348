use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One price/volume observation of the traded pair.
///
/// Timestamps are unix seconds (UTC). The price history cache guarantees
/// strictly increasing timestamps within a series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSample {
    pub timestamp: i64,
    /// Quote-token price of the pair, denominated in the base asset.
    #[serde(with = "rust_decimal::serde::str")]
    pub close: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub volume: Decimal,
}

/// The two legs of the traded pair.
///
/// `Base` is the asset trades are sized in (WETH for PEPE/WETH); `Quote` is
/// the token being accumulated or sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Asset {
    Base,
    Quote,
}
