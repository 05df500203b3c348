use thiserror::Error;

/// Typed error hierarchy for the trading bot.
///
/// Library-internal errors use specific variants; application code wraps with
/// `anyhow::Context` for propagation.
#[derive(Error, Debug)]
pub enum BotError {
    // -- Data access --------------------------------------------------------
    #[error("all RPC providers exhausted after {attempts} attempts: {last_error}")]
    AllProvidersExhausted { attempts: u32, last_error: String },

    #[error("data source unavailable: {name}")]
    DataUnavailable { name: String },

    #[error("insufficient history: have {have} samples, need {need}")]
    InsufficientData { have: usize, need: usize },

    // -- Risk ---------------------------------------------------------------
    #[error("risk validation rejected: {reason}")]
    RiskRejected { reason: String },

    // -- Execution ----------------------------------------------------------
    #[error("trade execution failed: {reason}")]
    ExecutionFailed { reason: String },

    // -- Configuration ------------------------------------------------------
    #[error("configuration error: {0}")]
    Config(String),

    // -- Forwarded errors ---------------------------------------------------
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
