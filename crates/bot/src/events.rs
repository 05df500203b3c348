//! Fire-and-forget risk event sink.
//!
//! Events are emitted as structured log records and retained in a bounded
//! in-memory ring buffer for operator inspection. Durable storage of risk
//! events belongs to an external collaborator.

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::Utc;
use tracing::{error, info, warn};

use crate::types::{RiskEvent, RiskEventKind, Severity};

const DEFAULT_CAPACITY: usize = 256;

/// Bounded in-memory sink for risk events.
pub struct RiskEventLog {
    buffer: Mutex<VecDeque<RiskEvent>>,
    capacity: usize,
}

impl Default for RiskEventLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl RiskEventLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Record one event. Never fails; overflow evicts the oldest entry.
    pub fn record(&self, kind: RiskEventKind, severity: Severity, description: impl Into<String>) {
        let event = RiskEvent {
            kind,
            severity,
            description: description.into(),
            timestamp: Utc::now().timestamp(),
        };

        match severity {
            Severity::Critical => error!(?kind, description = %event.description, "risk event"),
            Severity::High => warn!(?kind, description = %event.description, "risk event"),
            Severity::Medium | Severity::Low => {
                info!(?kind, description = %event.description, "risk event");
            }
        }

        let mut buffer = self.buffer.lock().expect("event buffer lock poisoned");
        if buffer.len() == self.capacity {
            buffer.pop_front();
        }
        buffer.push_back(event);
    }

    /// Snapshot of retained events, oldest first.
    pub fn recent(&self) -> Vec<RiskEvent> {
        self.buffer
            .lock()
            .expect("event buffer lock poisoned")
            .iter()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.buffer.lock().expect("event buffer lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_read_back() {
        let log = RiskEventLog::default();
        log.record(RiskEventKind::TradeFailure, Severity::High, "buy reverted");
        assert_eq!(log.len(), 1);

        let events = log.recent();
        assert_eq!(events[0].kind, RiskEventKind::TradeFailure);
        assert_eq!(events[0].severity, Severity::High);
        assert_eq!(events[0].description, "buy reverted");
    }

    #[test]
    fn test_overflow_evicts_oldest() {
        let log = RiskEventLog::with_capacity(2);
        log.record(RiskEventKind::SystemError, Severity::Low, "first");
        log.record(RiskEventKind::SystemError, Severity::Low, "second");
        log.record(RiskEventKind::SystemError, Severity::Low, "third");

        let events = log.recent();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].description, "second");
        assert_eq!(events[1].description, "third");
    }
}
