use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Category of a recorded risk event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskEventKind {
    TradeFailure,
    EmergencyStop,
    EmergencyStopRecovery,
    ProviderExhausted,
    SystemError,
}

/// Severity of a recorded risk event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// A single risk event destined for the operator's event sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskEvent {
    pub kind: RiskEventKind,
    pub severity: Severity,
    pub description: String,
    /// Unix seconds (UTC).
    pub timestamp: i64,
}

/// Result reported back by a trade executor.
///
/// Opaque to the decision core: only `success` and the human-readable
/// `message` are inspected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub success: bool,
    pub message: String,
}

impl ExecutionReport {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Per-session trade counters, logged each cycle. In-memory only.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SessionStats {
    pub total_trades: u32,
    pub successful_trades: u32,
    pub failed_trades: u32,
    /// Cumulative executed volume in the base asset.
    #[serde(with = "rust_decimal::serde::str")]
    pub total_volume_base: Decimal,
}

impl SessionStats {
    pub fn record_success(&mut self, volume_base: Decimal) {
        self.total_trades += 1;
        self.successful_trades += 1;
        self.total_volume_base += volume_base;
    }

    pub fn record_failure(&mut self) {
        self.total_trades += 1;
        self.failed_trades += 1;
    }
}
