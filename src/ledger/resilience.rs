use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::time::{sleep, timeout};
use tracing::{error, info, warn};

use crate::config::IssuanceSettings;
use crate::models::{ArcadeError, Result};

/// Circuit breaker states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,   // Normal operation
    Open,     // Failing, don't try
    HalfOpen, // Testing if service recovered
}

/// Circuit breaker configuration
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub success_threshold: u32,
    pub timeout_duration: Duration,
    pub half_open_max_calls: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 2,
            timeout_duration: Duration::from_secs(60),
            half_open_max_calls: 3,
        }
    }
}

impl From<&IssuanceSettings> for CircuitBreakerConfig {
    fn from(settings: &IssuanceSettings) -> Self {
        Self {
            failure_threshold: settings.failure_threshold,
            success_threshold: settings.success_threshold,
            timeout_duration: Duration::from_secs(settings.open_timeout_seconds),
            ..Default::default()
        }
    }
}

#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    failure_count: u32,
    success_count: u32,
    half_open_calls: u32,
    opened_at: Option<Instant>,
}

/// Circuit breaker guarding calls to the ledger
pub struct CircuitBreaker {
    inner: Mutex<BreakerState>,
    config: CircuitBreakerConfig,
    name: String,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            inner: Mutex::new(BreakerState {
                state: CircuitState::Closed,
                failure_count: 0,
                success_count: 0,
                half_open_calls: 0,
                opened_at: None,
            }),
            config,
            name: name.into(),
        }
    }

    // A panic while holding the lock leaves plain counters behind; keep using them.
    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Execute a function with circuit breaker protection
    pub async fn call<F, T, Fut>(&self, f: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.admit()?;

        match f().await {
            Ok(result) => {
                self.on_success();
                Ok(result)
            }
            Err(e) => {
                self.on_failure();
                Err(e)
            }
        }
    }

    fn admit(&self) -> Result<()> {
        let mut inner = self.lock();

        if inner.state == CircuitState::Open {
            let cooled_down = inner
                .opened_at
                .map_or(false, |at| at.elapsed() >= self.config.timeout_duration);
            if !cooled_down {
                return Err(ArcadeError::CircuitBreakerOpen(format!(
                    "Circuit breaker {} is open",
                    self.name
                )));
            }
            inner.state = CircuitState::HalfOpen;
            inner.success_count = 0;
            inner.half_open_calls = 0;
            info!("Circuit breaker {} transitioned to HALF_OPEN", self.name);
        }

        if inner.state == CircuitState::HalfOpen {
            if inner.half_open_calls >= self.config.half_open_max_calls {
                return Err(ArcadeError::CircuitBreakerOpen(format!(
                    "Circuit breaker {} half-open limit reached",
                    self.name
                )));
            }
            inner.half_open_calls += 1;
        }
        Ok(())
    }

    fn on_success(&self) {
        let mut inner = self.lock();

        match inner.state {
            CircuitState::Closed => inner.failure_count = 0,
            CircuitState::HalfOpen => {
                inner.success_count += 1;
                if inner.success_count >= self.config.success_threshold {
                    inner.state = CircuitState::Closed;
                    inner.failure_count = 0;
                    inner.success_count = 0;
                    inner.half_open_calls = 0;
                    info!("Circuit breaker {} transitioned to CLOSED", self.name);
                }
            }
            CircuitState::Open => {
                warn!("Success recorded while circuit breaker {} is OPEN", self.name);
            }
        }
    }

    fn on_failure(&self) {
        let mut inner = self.lock();

        match inner.state {
            CircuitState::Closed => {
                inner.failure_count += 1;
                if inner.failure_count >= self.config.failure_threshold {
                    Self::trip(&mut inner);
                    error!(
                        "Circuit breaker {} transitioned to OPEN after {} failures",
                        self.name, self.config.failure_threshold
                    );
                }
            }
            CircuitState::HalfOpen => {
                Self::trip(&mut inner);
                warn!("Circuit breaker {} transitioned back to OPEN from HALF_OPEN", self.name);
            }
            CircuitState::Open => inner.opened_at = Some(Instant::now()),
        }
    }

    fn trip(inner: &mut BreakerState) {
        inner.state = CircuitState::Open;
        inner.opened_at = Some(Instant::now());
        inner.success_count = 0;
        inner.half_open_calls = 0;
    }

    /// Get current circuit breaker state for monitoring
    pub fn get_state(&self) -> CircuitState {
        self.lock().state
    }

    /// Get current failure count
    pub fn get_failure_count(&self) -> u32 {
        self.lock().failure_count
    }
}

/// Retry configuration
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
            backoff_multiplier: 2.0,
        }
    }
}

impl From<&IssuanceSettings> for RetryConfig {
    fn from(settings: &IssuanceSettings) -> Self {
        Self {
            max_attempts: settings.max_attempts.max(1),
            base_delay: Duration::from_millis(settings.base_delay_ms),
            max_delay: Duration::from_millis(settings.max_delay_ms),
            backoff_multiplier: settings.backoff_multiplier,
        }
    }
}

/// Retry with exponential backoff
pub async fn retry_with_backoff<F, T, Fut>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = config.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    info!("Operation {} succeeded on attempt {}", operation_name, attempt);
                }
                return Ok(result);
            }
            Err(e) if attempt < attempts => {
                warn!("Operation {} failed on attempt {}: {}", operation_name, attempt, e);
                sleep(calculate_delay(config, attempt)).await;
                attempt += 1;
            }
            Err(e) => {
                error!("Operation {} failed after {} attempts: {}", operation_name, attempts, e);
                return Err(e);
            }
        }
    }
}

pub fn calculate_delay(config: &RetryConfig, attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
    let delay_ms = config.base_delay.as_millis() as f64 * config.backoff_multiplier.powi(exponent);

    let delay = Duration::from_millis(delay_ms.min(u64::MAX as f64) as u64);
    delay.min(config.max_delay)
}

/// Bound a single call; expiry becomes [`ArcadeError::Timeout`].
pub async fn with_timeout<T, Fut>(limit: Duration, operation: &str, fut: Fut) -> Result<T>
where
    Fut: Future<Output = Result<T>>,
{
    match timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(ArcadeError::Timeout {
            operation: operation.to_string(),
        }),
    }
}

/// Ledger call wrapper: per-call timeout, retry with backoff, circuit breaker.
pub struct ResilientCaller {
    circuit_breaker: CircuitBreaker,
    retry_config: RetryConfig,
    call_timeout: Duration,
    name: String,
}

impl ResilientCaller {
    pub fn new(
        name: impl Into<String>,
        circuit_config: CircuitBreakerConfig,
        retry_config: RetryConfig,
        call_timeout: Duration,
    ) -> Self {
        let name = name.into();
        Self {
            circuit_breaker: CircuitBreaker::new(format!("{}_circuit", name), circuit_config),
            retry_config,
            call_timeout,
            name,
        }
    }

    pub fn from_settings(name: impl Into<String>, settings: &IssuanceSettings) -> Self {
        Self::new(
            name,
            CircuitBreakerConfig::from(settings),
            RetryConfig::from(settings),
            Duration::from_millis(settings.call_timeout_ms),
        )
    }

    pub async fn call<F, T, Fut>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let name = self.name.as_str();
        let limit = self.call_timeout;
        let retry_config = &self.retry_config;
        let attempt = async move {
            retry_with_backoff(retry_config, name, || with_timeout(limit, name, operation())).await
        };

        self.circuit_breaker.call(move || attempt).await
    }

    /// Get circuit breaker status for monitoring
    pub fn get_circuit_state(&self) -> CircuitState {
        self.circuit_breaker.get_state()
    }

    /// Get failure count for monitoring
    pub fn get_failure_count(&self) -> u32 {
        self.circuit_breaker.get_failure_count()
    }
}
