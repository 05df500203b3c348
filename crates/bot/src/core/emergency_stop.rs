//! Portfolio-level emergency stop state machine.
//!
//! `Active → Stopped` when drawdown from the initial portfolio value reaches
//! the stop-loss fraction; `Stopped → Active` only once BOTH the cooldown
//! has elapsed AND the portfolio has recovered past the trigger value by the
//! recovery threshold. A stop skips the cycle's trade but never terminates
//! the process — both conditions are re-evaluated every cycle.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{error, info, warn};

/// Current controller state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StopState {
    Active,
    Stopped {
        triggered_at: DateTime<Utc>,
        value_at_trigger: Decimal,
    },
}

/// State transition reported back to the cycle loop for risk-event logging.
#[derive(Debug, Clone, PartialEq)]
pub enum StopTransition {
    Triggered {
        /// Fractional loss from the initial value at trigger time.
        drawdown: Decimal,
    },
    Recovered {
        /// Fractional gain over the trigger value at recovery time.
        gain: Decimal,
        stopped_for_hours: i64,
    },
}

/// Whether the drawdown from `initial` to `current` reaches the stop fraction.
///
/// A non-positive initial value never triggers.
pub fn drawdown_triggered(initial: Decimal, current: Decimal, stop_fraction: Decimal) -> bool {
    if initial <= Decimal::ZERO {
        return false;
    }
    (initial - current) / initial >= stop_fraction
}

/// Drawdown halt with cooldown-and-recovery resume.
pub struct EmergencyStop {
    stop_loss_fraction: Decimal,
    recovery_enabled: bool,
    recovery_threshold: Decimal,
    cooldown: Duration,
    state: StopState,
}

impl EmergencyStop {
    pub fn new(
        stop_loss_fraction: Decimal,
        recovery_enabled: bool,
        recovery_threshold: Decimal,
        cooldown_hours: i64,
    ) -> Self {
        Self {
            stop_loss_fraction,
            recovery_enabled,
            recovery_threshold,
            cooldown: Duration::hours(cooldown_hours),
            state: StopState::Active,
        }
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self.state, StopState::Stopped { .. })
    }

    pub fn state(&self) -> StopState {
        self.state
    }

    /// Evaluate the state machine for one cycle.
    ///
    /// While stopped, logs the remaining cooldown or the recovery amount
    /// still needed; this output is purely observational.
    pub fn evaluate(
        &mut self,
        now: DateTime<Utc>,
        initial_value: Decimal,
        current_value: Decimal,
    ) -> Option<StopTransition> {
        match self.state {
            StopState::Active => {
                if !drawdown_triggered(initial_value, current_value, self.stop_loss_fraction) {
                    return None;
                }
                let drawdown = (initial_value - current_value) / initial_value;
                error!(
                    drawdown = %drawdown,
                    portfolio = %current_value,
                    "EMERGENCY STOP triggered, trading paused"
                );
                self.state = StopState::Stopped {
                    triggered_at: now,
                    value_at_trigger: current_value,
                };
                Some(StopTransition::Triggered { drawdown })
            }
            StopState::Stopped {
                triggered_at,
                value_at_trigger,
            } => {
                if !self.recovery_enabled {
                    warn!("emergency stop active, automatic recovery disabled");
                    return None;
                }

                let elapsed = now - triggered_at;
                let target = value_at_trigger * (dec!(1) + self.recovery_threshold);
                let cooldown_met = elapsed >= self.cooldown;
                let value_met = current_value >= target;

                if cooldown_met && value_met {
                    let gain = if value_at_trigger > Decimal::ZERO {
                        (current_value - value_at_trigger) / value_at_trigger
                    } else {
                        Decimal::ZERO
                    };
                    info!(
                        gain = %gain,
                        stopped_hours = elapsed.num_hours(),
                        "emergency stop recovery conditions met, trading resumed"
                    );
                    self.state = StopState::Active;
                    return Some(StopTransition::Recovered {
                        gain,
                        stopped_for_hours: elapsed.num_hours(),
                    });
                }

                if !cooldown_met {
                    let remaining = self.cooldown - elapsed;
                    info!(
                        remaining_minutes = remaining.num_minutes(),
                        "emergency stop active, cooldown running"
                    );
                } else {
                    info!(
                        needed = %(target - current_value),
                        target = %target,
                        "emergency stop active, awaiting portfolio recovery"
                    );
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(ts: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(ts, 0).single().expect("valid timestamp")
    }

    fn stop() -> EmergencyStop {
        EmergencyStop::new(dec!(0.20), true, dec!(0.05), 2)
    }

    // -- Trigger threshold ---------------------------------------------------

    #[test]
    fn test_drawdown_21_percent_triggers_at_20() {
        assert!(drawdown_triggered(dec!(1.0), dec!(0.79), dec!(0.20)));
    }

    #[test]
    fn test_drawdown_19_percent_does_not_trigger() {
        assert!(!drawdown_triggered(dec!(1.0), dec!(0.81), dec!(0.20)));
    }

    #[test]
    fn test_drawdown_exactly_at_threshold_triggers() {
        assert!(drawdown_triggered(dec!(1.0), dec!(0.80), dec!(0.20)));
    }

    #[test]
    fn test_non_positive_initial_never_triggers() {
        assert!(!drawdown_triggered(Decimal::ZERO, dec!(1), dec!(0.20)));
        assert!(!drawdown_triggered(dec!(-1), dec!(1), dec!(0.20)));
    }

    // -- State machine -------------------------------------------------------

    #[test]
    fn test_trigger_records_state() {
        let mut es = stop();
        let t0 = at(1_700_000_000);
        let transition = es.evaluate(t0, dec!(1.0), dec!(0.79));
        assert_eq!(
            transition,
            Some(StopTransition::Triggered {
                drawdown: dec!(0.21)
            })
        );
        assert!(es.is_stopped());
        assert_eq!(
            es.state(),
            StopState::Stopped {
                triggered_at: t0,
                value_at_trigger: dec!(0.79)
            }
        );
    }

    #[test]
    fn test_no_trigger_below_threshold() {
        let mut es = stop();
        assert_eq!(es.evaluate(at(1_700_000_000), dec!(1.0), dec!(0.85)), None);
        assert!(!es.is_stopped());
    }

    #[test]
    fn test_recovery_needs_both_conditions() {
        let mut es = stop();
        let t0 = at(1_700_000_000);
        es.evaluate(t0, dec!(1.0), dec!(0.79));

        // Value target met early: 0.79 × 1.05 = 0.8295, but cooldown not over.
        let one_hour = at(1_700_000_000 + 3600);
        assert_eq!(es.evaluate(one_hour, dec!(1.0), dec!(0.84)), None);
        assert!(es.is_stopped());

        // Cooldown over but value short of the target.
        let three_hours = at(1_700_000_000 + 3 * 3600);
        assert_eq!(es.evaluate(three_hours, dec!(1.0), dec!(0.82)), None);
        assert!(es.is_stopped());

        // Both conditions met.
        let transition = es.evaluate(three_hours, dec!(1.0), dec!(0.8295));
        assert!(matches!(
            transition,
            Some(StopTransition::Recovered { .. })
        ));
        assert!(!es.is_stopped());
    }

    #[test]
    fn test_recovery_exactly_at_value_target() {
        let mut es = stop();
        let t0 = at(1_700_000_000);
        es.evaluate(t0, dec!(1.0), dec!(0.79));

        let after_cooldown = at(1_700_000_000 + 2 * 3600);
        // 0.79 × 1.05 = 0.8295 — meeting the target exactly is enough.
        let transition = es.evaluate(after_cooldown, dec!(1.0), dec!(0.8295));
        assert!(matches!(transition, Some(StopTransition::Recovered { .. })));
    }

    #[test]
    fn test_recovery_disabled_stays_stopped() {
        let mut es = EmergencyStop::new(dec!(0.20), false, dec!(0.05), 2);
        let t0 = at(1_700_000_000);
        es.evaluate(t0, dec!(1.0), dec!(0.5));
        assert!(es.is_stopped());

        let much_later = at(1_700_000_000 + 100 * 3600);
        assert_eq!(es.evaluate(much_later, dec!(1.0), dec!(2.0)), None);
        assert!(es.is_stopped());
    }

    #[test]
    fn test_retrigger_after_recovery() {
        let mut es = stop();
        let t0 = at(1_700_000_000);
        es.evaluate(t0, dec!(1.0), dec!(0.79));
        let later = at(1_700_000_000 + 3 * 3600);
        es.evaluate(later, dec!(1.0), dec!(0.9));
        assert!(!es.is_stopped());

        // A second crash stops trading again, anchored at the new value.
        let crash = at(1_700_000_000 + 4 * 3600);
        let transition = es.evaluate(crash, dec!(1.0), dec!(0.7));
        assert!(matches!(transition, Some(StopTransition::Triggered { .. })));
        assert!(es.is_stopped());
    }
}
