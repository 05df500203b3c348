//! Resilient RPC access with endpoint rotation and quarantine.
//!
//! Public Ethereum endpoints rate-limit aggressively, so every read goes
//! through [`ResilientRpc`]: it keeps one long-lived provider per endpoint,
//! rotates to the next endpoint on failure, quarantines failing endpoints in
//! a failed-set, and retries with a fixed backoff until
//! `max_retries × endpoint_count` attempts are spent. Quarantine is cleared
//! only by an explicit [`ResilientRpc::reset_failed`] call — the cycle loop
//! invokes it on a schedule.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use alloy::providers::RootProvider;
use alloy::transports::http::reqwest::Url;
use tracing::{debug, error, info, warn};

use crate::errors::BotError;

/// Concrete provider type: Alloy HTTP provider over Ethereum network.
pub type HttpProvider = RootProvider;

/// Error-message fragments that identify a rate-limit response.
const RATE_LIMIT_PHRASES: &[&str] = &["429", "too many requests", "rate limit", "quota exceeded"];

/// Whether an error message looks like a rate-limit rejection.
fn is_rate_limited(message: &str) -> bool {
    let lower = message.to_lowercase();
    RATE_LIMIT_PHRASES.iter().any(|p| lower.contains(p))
}

// ---------------------------------------------------------------------------
// EndpointPool
// ---------------------------------------------------------------------------

/// Ordered endpoint set with a rotation cursor and a quarantine failed-set.
///
/// Pure bookkeeping — owns no connections. Mutated only by [`ResilientRpc`].
#[derive(Debug)]
pub struct EndpointPool {
    count: usize,
    cursor: usize,
    failed: HashSet<usize>,
}

impl EndpointPool {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            cursor: 0,
            failed: HashSet::new(),
        }
    }

    /// Index of the endpoint the next call should use.
    pub fn current(&self) -> usize {
        self.cursor
    }

    /// Advance the cursor to the next endpoint, skipping quarantined ones.
    ///
    /// When every endpoint is quarantined, falls back to plain round-robin so
    /// calls keep probing rather than spinning on one dead endpoint.
    pub fn rotate(&mut self) {
        for step in 1..=self.count {
            let candidate = (self.cursor + step) % self.count;
            if !self.failed.contains(&candidate) {
                self.cursor = candidate;
                return;
            }
        }
        self.cursor = (self.cursor + 1) % self.count;
    }

    /// Quarantine an endpoint. If it is the active one, rotate past it.
    pub fn mark_failed(&mut self, index: usize) {
        if index >= self.count {
            return;
        }
        self.failed.insert(index);
        if index == self.cursor {
            self.rotate();
        }
    }

    /// Clear the quarantine set. Returns how many endpoints were released.
    pub fn reset(&mut self) -> usize {
        let released = self.failed.len();
        self.failed.clear();
        released
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }
}

// ---------------------------------------------------------------------------
// ResilientRpc
// ---------------------------------------------------------------------------

/// Rotating multi-endpoint RPC front.
///
/// One `RootProvider` is built per endpoint at construction and reused for
/// the process lifetime; rotation swaps which provider serves the next call
/// instead of rebuilding connections.
#[derive(Debug)]
pub struct ResilientRpc {
    providers: Vec<HttpProvider>,
    pool: Mutex<EndpointPool>,
    max_retries: u32,
    retry_delay: Duration,
}

impl ResilientRpc {
    /// Build one provider per endpoint URL.
    pub fn new(endpoints: &[String], max_retries: u32, retry_delay: Duration) -> Result<Self, BotError> {
        if endpoints.is_empty() {
            return Err(BotError::Config("no RPC endpoints configured".into()));
        }

        let mut providers = Vec::with_capacity(endpoints.len());
        for endpoint in endpoints {
            let url: Url = endpoint
                .parse()
                .map_err(|e| BotError::Config(format!("invalid RPC URL {endpoint}: {e}")))?;
            providers.push(RootProvider::new_http(url));
        }

        info!(endpoints = providers.len(), "RPC provider pool initialized");

        Ok(Self {
            pool: Mutex::new(EndpointPool::new(providers.len())),
            providers,
            max_retries,
            retry_delay,
        })
    }

    pub fn endpoint_count(&self) -> usize {
        self.providers.len()
    }

    /// Index of the endpoint currently serving calls.
    pub fn current_endpoint(&self) -> usize {
        self.pool.lock().expect("endpoint pool lock poisoned").current()
    }

    /// Clear the quarantine set. Invoked periodically by the cycle loop so
    /// rate-limited endpoints get another chance.
    pub fn reset_failed(&self) {
        let released = self
            .pool
            .lock()
            .expect("endpoint pool lock poisoned")
            .reset();
        if released > 0 {
            info!(released, "quarantined RPC endpoints reset");
        }
    }

    /// Execute `op` against the current endpoint, rotating on failure.
    ///
    /// `op` receives a cloned provider handle and may be invoked up to
    /// `max_retries × endpoint_count` times. Rate-limit errors and other
    /// failures are treated identically (quarantine + rotate); they differ
    /// only in log classification.
    pub async fn call<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T, BotError>
    where
        F: FnMut(HttpProvider) -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        let total_attempts = self.max_retries * self.providers.len() as u32;
        let mut last_error = String::from("no attempts made");

        for attempt in 1..=total_attempts {
            let index = self
                .pool
                .lock()
                .expect("endpoint pool lock poisoned")
                .current();

            match op(self.providers[index].clone()).await {
                Ok(value) => {
                    debug!(label, endpoint = index, attempt, "RPC call succeeded");
                    return Ok(value);
                }
                Err(e) => {
                    let message = format!("{e:#}");
                    if is_rate_limited(&message) {
                        warn!(label, endpoint = index, "rate limit hit, quarantining endpoint");
                    } else {
                        warn!(label, endpoint = index, error = %message, "RPC call failed");
                    }
                    self.pool
                        .lock()
                        .expect("endpoint pool lock poisoned")
                        .mark_failed(index);
                    last_error = message;
                    tokio::time::sleep(self.retry_delay).await;
                }
            }
        }

        error!(label, attempts = total_attempts, "all RPC providers exhausted");
        Err(BotError::AllProvidersExhausted {
            attempts: total_attempts,
            last_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn test_rpc(endpoints: usize) -> ResilientRpc {
        let urls: Vec<String> = (0..endpoints)
            .map(|i| format!("http://localhost:{}", 8545 + i))
            .collect();
        ResilientRpc::new(&urls, 3, Duration::ZERO).expect("pool should build")
    }

    // -- EndpointPool --------------------------------------------------------

    #[test]
    fn test_rotation_wraps_modulo_count() {
        let mut pool = EndpointPool::new(3);
        assert_eq!(pool.current(), 0);
        pool.rotate();
        assert_eq!(pool.current(), 1);
        pool.rotate();
        assert_eq!(pool.current(), 2);
        pool.rotate();
        assert_eq!(pool.current(), 0);
    }

    #[test]
    fn test_mark_failed_advances_past_active() {
        let mut pool = EndpointPool::new(3);
        pool.mark_failed(0);
        assert_eq!(pool.current(), 1);
        pool.mark_failed(1);
        assert_eq!(pool.current(), 2);
    }

    #[test]
    fn test_mark_failed_inactive_keeps_cursor() {
        let mut pool = EndpointPool::new(3);
        pool.mark_failed(2);
        assert_eq!(pool.current(), 0);
        // Rotation then skips the quarantined endpoint.
        pool.rotate();
        assert_eq!(pool.current(), 1);
        pool.rotate();
        assert_eq!(pool.current(), 0);
    }

    #[test]
    fn test_all_failed_falls_back_to_round_robin() {
        let mut pool = EndpointPool::new(2);
        pool.mark_failed(0);
        pool.mark_failed(1);
        let before = pool.current();
        pool.rotate();
        assert_ne!(pool.current(), before);
    }

    #[test]
    fn test_reset_clears_quarantine() {
        let mut pool = EndpointPool::new(3);
        pool.mark_failed(0);
        pool.mark_failed(1);
        assert_eq!(pool.failed_count(), 2);
        assert_eq!(pool.reset(), 2);
        assert_eq!(pool.failed_count(), 0);
    }

    // -- is_rate_limited -----------------------------------------------------

    #[test]
    fn test_rate_limit_classification() {
        assert!(is_rate_limited("HTTP 429 returned"));
        assert!(is_rate_limited("Too Many Requests"));
        assert!(is_rate_limited("daily quota exceeded"));
        assert!(is_rate_limited("rate limit reached"));
        assert!(!is_rate_limited("connection refused"));
    }

    // -- ResilientRpc::call --------------------------------------------------

    #[tokio::test]
    async fn test_call_succeeds_first_attempt() {
        let rpc = test_rpc(3);
        let result = rpc
            .call("test", |_provider| async { Ok::<_, anyhow::Error>(42u64) })
            .await
            .expect("call should succeed");
        assert_eq!(result, 42);
        assert_eq!(rpc.current_endpoint(), 0);
    }

    #[tokio::test]
    async fn test_call_rotates_after_failure() {
        let rpc = test_rpc(3);
        let attempts = AtomicU32::new(0);

        let result = rpc
            .call("test", |_provider| {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        anyhow::bail!("429 too many requests");
                    }
                    Ok(n)
                }
            })
            .await
            .expect("second attempt should succeed");

        assert_eq!(result, 1);
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        // First endpoint was quarantined; cursor moved to the next one.
        assert_eq!(rpc.current_endpoint(), 1);
    }

    #[tokio::test]
    async fn test_call_exhausts_all_providers() {
        let rpc = test_rpc(2);
        let attempts = AtomicU32::new(0);

        let err = rpc
            .call("test", |_provider| {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Err::<u64, _>(anyhow::anyhow!("connection refused")) }
            })
            .await
            .expect_err("exhaustion expected");

        // max_retries(3) × endpoints(2) attempts, then a typed error.
        assert_eq!(attempts.load(Ordering::SeqCst), 6);
        match err {
            BotError::AllProvidersExhausted { attempts, last_error } => {
                assert_eq!(attempts, 6);
                assert!(last_error.contains("connection refused"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_reset_failed_restores_endpoints() {
        let rpc = test_rpc(2);
        let _ = rpc
            .call("test", |_provider| async {
                Err::<u64, _>(anyhow::anyhow!("rate limit"))
            })
            .await;
        rpc.reset_failed();
        assert_eq!(
            rpc.pool.lock().expect("endpoint pool lock poisoned").failed_count(),
            0
        );
    }

    #[test]
    fn test_empty_endpoint_list_rejected() {
        let err = ResilientRpc::new(&[], 3, Duration::ZERO).expect_err("should reject");
        assert!(err.to_string().contains("no RPC endpoints"));
    }
}
