use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

// ============================================================================
// Circuit Breaker
// ============================================================================
//
// Guards an unreliable remote call by tracking consecutive failures and
// short-circuiting once a service looks unhealthy.
//
// States:
// - Closed: normal operation, calls pass through
// - Open: too many failures, calls rejected immediately until the cooldown
// - HalfOpen: cooldown elapsed, trial calls allowed to probe recovery
//
// Time is read through the `Clock` trait so tests can drive the cooldown
// without sleeping.
//
// ============================================================================

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Monotonic time, the production clock.
#[derive(Debug, Default)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before the circuit opens.
    pub failure_threshold: u32,
    /// How long the circuit stays open before probing recovery.
    pub cooldown: Duration,
    /// Successes needed in half-open before the circuit closes again.
    pub success_threshold: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            cooldown: Duration::from_secs(30),
            success_threshold: 2,
        }
    }
}

struct BreakerState {
    state: CircuitState,
    failure_count: u32,
    success_count: u32,
    last_failure_at: Option<Instant>,
}

#[derive(Clone)]
pub struct CircuitBreaker {
    state: Arc<Mutex<BreakerState>>,
    config: CircuitBreakerConfig,
    clock: Arc<dyn Clock>,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self::with_clock(config, Arc::new(MonotonicClock))
    }

    pub fn with_clock(config: CircuitBreakerConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(Mutex::new(BreakerState {
                state: CircuitState::Closed,
                failure_count: 0,
                success_count: 0,
                last_failure_at: None,
            })),
            config,
            clock,
        }
    }

    /// Execute an operation under circuit breaker protection.
    pub async fn call<F, T, E>(&self, operation: F) -> Result<T, CircuitBreakerError<E>>
    where
        F: std::future::Future<Output = Result<T, E>>,
    {
        {
            let mut state = self.state.lock().await;

            match state.state {
                CircuitState::Open => {
                    let elapsed = state
                        .last_failure_at
                        .map(|at| self.clock.now().saturating_duration_since(at));

                    if elapsed.is_some_and(|e| e >= self.config.cooldown) {
                        tracing::info!("circuit breaker transitioning to half-open");
                        state.state = CircuitState::HalfOpen;
                        state.success_count = 0;
                    } else {
                        return Err(CircuitBreakerError::CircuitOpen);
                    }
                }
                CircuitState::HalfOpen | CircuitState::Closed => {}
            }
        }

        match operation.await {
            Ok(result) => {
                self.record_success().await;
                Ok(result)
            }
            Err(err) => {
                self.record_failure().await;
                Err(CircuitBreakerError::OperationFailed(err))
            }
        }
    }

    async fn record_success(&self) {
        let mut state = self.state.lock().await;

        match state.state {
            CircuitState::HalfOpen => {
                state.success_count += 1;
                if state.success_count >= self.config.success_threshold {
                    tracing::info!(
                        successes = state.success_count,
                        "circuit breaker closing after recovery"
                    );
                    state.state = CircuitState::Closed;
                    state.failure_count = 0;
                    state.success_count = 0;
                    state.last_failure_at = None;
                }
            }
            CircuitState::Closed => {
                state.failure_count = 0;
            }
            CircuitState::Open => {
                tracing::warn!("success recorded while circuit is open");
            }
        }
    }

    async fn record_failure(&self) {
        let mut state = self.state.lock().await;

        state.failure_count += 1;
        state.last_failure_at = Some(self.clock.now());

        match state.state {
            CircuitState::Closed => {
                if state.failure_count >= self.config.failure_threshold {
                    tracing::warn!(failures = state.failure_count, "circuit breaker opening");
                    state.state = CircuitState::Open;
                }
            }
            CircuitState::HalfOpen => {
                tracing::warn!("failure during half-open, reopening circuit");
                state.state = CircuitState::Open;
                state.success_count = 0;
            }
            CircuitState::Open => {}
        }
    }

    pub async fn state(&self) -> CircuitState {
        self.state.lock().await.state
    }

    pub async fn failure_count(&self) -> u32 {
        self.state.lock().await.failure_count
    }

    /// Manually reset the breaker to closed.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        tracing::info!("circuit breaker manually reset");
        state.state = CircuitState::Closed;
        state.failure_count = 0;
        state.success_count = 0;
        state.last_failure_at = None;
    }
}

#[derive(Debug)]
pub enum CircuitBreakerError<E> {
    CircuitOpen,
    OperationFailed(E),
}

impl<E: std::fmt::Display> std::fmt::Display for CircuitBreakerError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CircuitBreakerError::CircuitOpen => write!(f, "Circuit breaker is open"),
            CircuitBreakerError::OperationFailed(e) => write!(f, "Operation failed: {}", e),
        }
    }
}

impl<E: std::error::Error> std::error::Error for CircuitBreakerError<E> {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    /// Test clock advanced by hand, no sleeping.
    struct ManualClock {
        now: StdMutex<Instant>,
    }

    impl ManualClock {
        fn new() -> Self {
            Self {
                now: StdMutex::new(Instant::now()),
            }
        }

        fn advance(&self, by: Duration) {
            let mut now = self.now.lock().unwrap();
            *now += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            *self.now.lock().unwrap()
        }
    }

    #[tokio::test]
    async fn test_breaker_opens_after_failures() {
        let config = CircuitBreakerConfig {
            failure_threshold: 3,
            cooldown: Duration::from_secs(30),
            success_threshold: 2,
        };
        let breaker = CircuitBreaker::new(config);

        for _ in 0..3 {
            let result = breaker.call(async { Err::<(), _>("error") }).await;
            assert!(result.is_err());
        }

        assert_eq!(breaker.state().await, CircuitState::Open);

        // Next call is rejected without running the operation
        let result = breaker.call(async { Ok::<_, &str>(()) }).await;
        assert!(matches!(result, Err(CircuitBreakerError::CircuitOpen)));
    }

    #[tokio::test]
    async fn test_breaker_half_opens_after_cooldown() {
        let clock = Arc::new(ManualClock::new());
        let config = CircuitBreakerConfig {
            failure_threshold: 2,
            cooldown: Duration::from_secs(30),
            success_threshold: 1,
        };
        let breaker = CircuitBreaker::with_clock(config, clock.clone());

        for _ in 0..2 {
            let _ = breaker.call(async { Err::<(), _>("error") }).await;
        }
        assert_eq!(breaker.state().await, CircuitState::Open);

        clock.advance(Duration::from_secs(31));

        // Cooldown elapsed: trial call allowed, success closes the circuit
        let result = breaker.call(async { Ok::<_, &str>(()) }).await;
        assert!(result.is_ok());
        assert_eq!(breaker.state().await, CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_failure_during_half_open_reopens() {
        let clock = Arc::new(ManualClock::new());
        let config = CircuitBreakerConfig {
            failure_threshold: 1,
            cooldown: Duration::from_secs(10),
            success_threshold: 2,
        };
        let breaker = CircuitBreaker::with_clock(config, clock.clone());

        let _ = breaker.call(async { Err::<(), _>("error") }).await;
        assert_eq!(breaker.state().await, CircuitState::Open);

        clock.advance(Duration::from_secs(11));

        let _ = breaker.call(async { Err::<(), _>("error") }).await;
        assert_eq!(breaker.state().await, CircuitState::Open);

        // Cooldown must elapse again after the failed probe
        let result = breaker.call(async { Ok::<_, &str>(()) }).await;
        assert!(matches!(result, Err(CircuitBreakerError::CircuitOpen)));
    }

    #[tokio::test]
    async fn test_success_resets_failure_streak_while_closed() {
        let config = CircuitBreakerConfig {
            failure_threshold: 3,
            cooldown: Duration::from_secs(30),
            success_threshold: 2,
        };
        let breaker = CircuitBreaker::new(config);

        let _ = breaker.call(async { Err::<(), _>("error") }).await;
        let _ = breaker.call(async { Err::<(), _>("error") }).await;
        let _ = breaker.call(async { Ok::<_, &str>(()) }).await;
        let _ = breaker.call(async { Err::<(), _>("error") }).await;

        // Streak broken by the success: still closed
        assert_eq!(breaker.state().await, CircuitState::Closed);
    }
}
