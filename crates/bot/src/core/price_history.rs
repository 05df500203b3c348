//! Bounded, time-ordered price/volume window for the traded pair.
//!
//! Cold start bulk-fetches roughly one sample per hour from on-chain
//! snapshots; when that yields too little data the cache degrades to
//! synthetic history around the live price so the decision pipeline never
//! blocks on data availability. Every later cycle appends exactly one
//! freshly fetched sample and prunes anything older than the retention
//! horizon, producing a continuously sliding window at cycle granularity.

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::constants::MIN_VIABLE_HISTORY_SAMPLES;
use crate::core::data_source::MarketDataSource;
use crate::errors::BotError;
use crate::types::PriceSample;

const SECONDS_PER_HOUR: i64 = 3600;

/// Generate `hours` synthetic samples at 1-hour spacing ending at `now`.
///
/// Each price is a ±1% uniform perturbation of `current_price`; volume is
/// uniform in 50%–200% of `baseline_volume`.
pub fn synthetic_history<R: Rng>(
    hours: u32,
    current_price: Decimal,
    baseline_volume: Decimal,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<PriceSample> {
    (0..hours)
        .map(|i| {
            let jitter = (rng.gen::<f64>() - 0.5) * 0.02;
            let factor = Decimal::from_f64(1.0 + jitter).unwrap_or(Decimal::ONE);
            let volume_factor = Decimal::from_f64(rng.gen_range(0.5..=2.0)).unwrap_or(Decimal::ONE);
            PriceSample {
                timestamp: now.timestamp() - i64::from(hours - 1 - i) * SECONDS_PER_HOUR,
                close: current_price * factor,
                volume: baseline_volume * volume_factor,
            }
        })
        .collect()
}

/// Rolling price/volume window with bulk bootstrap and per-cycle refresh.
pub struct PriceHistory {
    samples: Vec<PriceSample>,
    horizon_hours: u32,
    baseline_volume: Decimal,
    bootstrapped: bool,
}

impl PriceHistory {
    pub fn new(horizon_hours: u32, baseline_volume: Decimal) -> Self {
        Self {
            samples: Vec::new(),
            horizon_hours,
            baseline_volume,
            bootstrapped: false,
        }
    }

    pub fn samples(&self) -> &[PriceSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn is_bootstrapped(&self) -> bool {
        self.bootstrapped
    }

    /// Refresh the window for a new cycle and return the fresh price.
    ///
    /// The current price is fetched anew on every call — a stale price is
    /// never reused for a trading decision.
    pub async fn refresh(
        &mut self,
        source: &dyn MarketDataSource,
        now: DateTime<Utc>,
    ) -> Result<Decimal, BotError> {
        let price = source.current_price().await?;
        if price <= Decimal::ZERO {
            return Err(BotError::DataUnavailable {
                name: "pair price is zero".into(),
            });
        }

        if self.bootstrapped {
            self.append_fresh(price, now, &mut rand::thread_rng());
        } else {
            self.bootstrap(source, price, now).await;
            self.bootstrapped = true;
        }

        self.prune(now);
        Ok(price)
    }

    /// Bulk-load history, falling back to synthetic generation when the
    /// chain yields fewer than the minimum viable sample count.
    async fn bootstrap(
        &mut self,
        source: &dyn MarketDataSource,
        current_price: Decimal,
        now: DateTime<Utc>,
    ) {
        let mut fetched = match source.historical_samples(self.horizon_hours).await {
            Ok(samples) => samples,
            Err(e) => {
                warn!(error = %e, "historical fetch failed");
                Vec::new()
            }
        };

        if fetched.len() < MIN_VIABLE_HISTORY_SAMPLES {
            warn!(
                fetched = fetched.len(),
                min = MIN_VIABLE_HISTORY_SAMPLES,
                hours = self.horizon_hours,
                "too little real history, generating synthetic data"
            );
            fetched = synthetic_history(
                self.horizon_hours,
                current_price,
                self.baseline_volume,
                now,
                &mut rand::thread_rng(),
            );
        } else {
            info!(samples = fetched.len(), "historical window loaded from chain");
        }

        fetched.sort_by_key(|s| s.timestamp);
        for sample in fetched {
            self.push(sample);
        }
    }

    /// Append the fresh price with a synthetically varied volume
    /// (50%–200% of the configured baseline).
    fn append_fresh<R: Rng>(&mut self, price: Decimal, now: DateTime<Utc>, rng: &mut R) {
        let volume_factor = Decimal::from_f64(rng.gen_range(0.5..=2.0)).unwrap_or(Decimal::ONE);
        self.push(PriceSample {
            timestamp: now.timestamp(),
            close: price,
            volume: self.baseline_volume * volume_factor,
        });
    }

    /// Append while preserving the ordering invariant: strictly increasing
    /// timestamps, duplicates dropped.
    fn push(&mut self, sample: PriceSample) {
        if let Some(last) = self.samples.last() {
            if sample.timestamp <= last.timestamp {
                debug!(
                    timestamp = sample.timestamp,
                    last = last.timestamp,
                    "dropping out-of-order sample"
                );
                return;
            }
        }
        self.samples.push(sample);
    }

    /// Drop samples older than the retention horizon.
    fn prune(&mut self, now: DateTime<Utc>) {
        let cutoff = now.timestamp() - i64::from(self.horizon_hours) * SECONDS_PER_HOUR;
        self.samples.retain(|s| s.timestamp >= cutoff);
    }
}
