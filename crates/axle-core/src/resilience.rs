//! Resilience combinators for outbound calls.
//!
//! Three wrappers over a fallible async operation, composed innermost to
//! outermost as **Timeout -> Retry -> CircuitBreaker** for LLM and embedding
//! calls, and Timeout alone for tool calls:
//!
//! ```rust,no_run
//! # use std::time::Duration;
//! # use axle_core::resilience::{CircuitBreaker, Retry, Timeout};
//! # use tokio_util::sync::CancellationToken;
//! # async fn call() -> Result<String, std::io::Error> { Ok("ok".into()) }
//! # async fn example() {
//! let timeout = Timeout::new(Duration::from_secs(120));
//! let retry = Retry::new(3, Duration::from_secs(1));
//! let breaker = CircuitBreaker::new(5);
//! let token = CancellationToken::new();
//!
//! let result = breaker
//!     .run(|| retry.run(&token, || timeout.run(call())))
//!     .await;
//! # let _ = result;
//! # }
//! ```

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Failure produced by a resilience wrapper, or the wrapped call itself.
#[derive(Debug)]
pub enum ResilienceError<E> {
    /// The call did not finish within the timeout.
    Timeout(Duration),

    /// The circuit breaker is open; the call was not attempted.
    CircuitOpen,

    /// The cancellation token fired before or between attempts.
    Canceled,

    /// The wrapped call failed.
    Inner(E),
}

impl<E> ResilienceError<E> {
    /// Unwrap the inner error, if this is an [`Inner`](Self::Inner) failure.
    pub fn into_inner(self) -> Option<E> {
        match self {
            Self::Inner(e) => Some(e),
            _ => None,
        }
    }
}

impl<E: std::fmt::Display> std::fmt::Display for ResilienceError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout(limit) => write!(f, "operation timed out after {limit:?}"),
            Self::CircuitOpen => write!(f, "circuit breaker open"),
            Self::Canceled => write!(f, "context canceled"),
            Self::Inner(e) => e.fmt(f),
        }
    }
}

impl<E> std::error::Error for ResilienceError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Inner(e) => Some(e),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Timeout
// ---------------------------------------------------------------------------

/// Bounds a call to a fixed wall-clock duration.
///
/// The wrapped future is dropped when the limit elapses, which cancels any
/// in-flight I/O it owns.
#[derive(Debug, Clone, Copy)]
pub struct Timeout {
    limit: Duration,
}

impl Timeout {
    /// Create a timeout wrapper with the given limit.
    pub fn new(limit: Duration) -> Self {
        Self { limit }
    }

    /// The configured limit.
    pub fn limit(&self) -> Duration {
        self.limit
    }

    /// Run `fut`, failing with [`ResilienceError::Timeout`] if it does not
    /// complete in time.
    pub async fn run<T, E>(
        &self,
        fut: impl Future<Output = Result<T, E>>,
    ) -> Result<T, ResilienceError<E>> {
        match tokio::time::timeout(self.limit, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(ResilienceError::Inner(e)),
            Err(_elapsed) => Err(ResilienceError::Timeout(self.limit)),
        }
    }
}

// ---------------------------------------------------------------------------
// Retry
// ---------------------------------------------------------------------------

/// Retries a failing call with a fixed delay between attempts.
///
/// `attempts` is the total number of tries (so `attempts = 3` means up to
/// two retries).  Cancellation cuts the loop immediately, both before an
/// attempt and during the inter-attempt sleep.
#[derive(Debug, Clone, Copy)]
pub struct Retry {
    attempts: u32,
    delay: Duration,
}

impl Retry {
    /// Create a retry wrapper.  `attempts` is clamped to at least 1.
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            delay,
        }
    }

    /// Run `f` until it succeeds or the attempt budget is spent.
    pub async fn run<T, E, F, Fut>(
        &self,
        token: &CancellationToken,
        mut f: F,
    ) -> Result<T, ResilienceError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ResilienceError<E>>>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;

            if token.is_cancelled() {
                return Err(ResilienceError::Canceled);
            }

            match f().await {
                Ok(value) => return Ok(value),
                Err(_) if attempt < self.attempts => {
                    tracing::debug!(attempt, max_attempts = self.attempts, "attempt failed, retrying");
                    tokio::select! {
                        _ = token.cancelled() => return Err(ResilienceError::Canceled),
                        _ = tokio::time::sleep(self.delay) => {}
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Circuit breaker
// ---------------------------------------------------------------------------

/// Suppresses calls after `threshold` consecutive failures.
///
/// While open, all calls short-circuit with [`ResilienceError::CircuitOpen`]
/// except a single half-open probe; a successful call resets the failure
/// count and closes the circuit.  A threshold of 0 disables the breaker.
#[derive(Debug, Default)]
pub struct CircuitBreaker {
    threshold: u32,
    failures: AtomicU32,
    probing: AtomicBool,
}

impl CircuitBreaker {
    /// Create a breaker that opens at `threshold` consecutive failures.
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold,
            failures: AtomicU32::new(0),
            probing: AtomicBool::new(false),
        }
    }

    /// Whether the circuit is currently open.
    pub fn is_open(&self) -> bool {
        self.threshold > 0 && self.failures.load(Ordering::SeqCst) >= self.threshold
    }

    /// Run `f`, short-circuiting when the circuit is open.
    ///
    /// Timeouts and inner failures count toward the consecutive-failure
    /// tally; cancellation does not.
    pub async fn run<T, E, F, Fut>(&self, f: F) -> Result<T, ResilienceError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ResilienceError<E>>>,
    {
        let probe = if self.is_open() {
            // Admit exactly one half-open probe at a time.
            if self.probing.swap(true, Ordering::SeqCst) {
                return Err(ResilienceError::CircuitOpen);
            }
            tracing::debug!("circuit open, admitting half-open probe");
            true
        } else {
            false
        };

        let result = f().await;

        match &result {
            Ok(_) => {
                self.failures.store(0, Ordering::SeqCst);
            }
            Err(ResilienceError::Canceled) => {}
            Err(_) => {
                let count = self.failures.fetch_add(1, Ordering::SeqCst) + 1;
                if self.threshold > 0 && count == self.threshold {
                    tracing::warn!(failures = count, "circuit breaker opened");
                }
            }
        }

        if probe {
            self.probing.store(false, Ordering::SeqCst);
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicU32;

    #[derive(Debug, PartialEq)]
    struct Boom;

    impl std::fmt::Display for Boom {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "boom")
        }
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_fires_on_stalled_future() {
        let timeout = Timeout::new(Duration::from_millis(50));
        let result: Result<(), ResilienceError<Boom>> = timeout
            .run(async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok(())
            })
            .await;
        assert!(matches!(result, Err(ResilienceError::Timeout(_))));
    }

    #[tokio::test]
    async fn timeout_passes_results_through() {
        let timeout = Timeout::new(Duration::from_secs(1));
        let ok: Result<u32, ResilienceError<Boom>> = timeout.run(async { Ok(7) }).await;
        assert_eq!(ok.unwrap(), 7);

        let err: Result<u32, ResilienceError<Boom>> = timeout.run(async { Err(Boom) }).await;
        assert!(matches!(err, Err(ResilienceError::Inner(Boom))));
    }

    #[tokio::test(start_paused = true)]
    async fn retry_honors_attempt_budget() {
        let calls = Arc::new(AtomicU32::new(0));
        let retry = Retry::new(3, Duration::from_millis(10));
        let token = CancellationToken::new();

        let counter = Arc::clone(&calls);
        let result: Result<(), ResilienceError<Boom>> = retry
            .run(&token, move || {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(ResilienceError::Inner(Boom))
                }
            })
            .await;

        assert!(matches!(result, Err(ResilienceError::Inner(Boom))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_stops_on_first_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let retry = Retry::new(5, Duration::from_millis(10));
        let token = CancellationToken::new();

        let counter = Arc::clone(&calls);
        let result: Result<u32, ResilienceError<Boom>> = retry
            .run(&token, move || {
                let counter = Arc::clone(&counter);
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(ResilienceError::Inner(Boom))
                    } else {
                        Ok(42)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn retry_aborts_when_canceled() {
        let retry = Retry::new(10, Duration::from_secs(60));
        let token = CancellationToken::new();
        token.cancel();

        let result: Result<(), ResilienceError<Boom>> = retry
            .run(&token, || async { Err(ResilienceError::Inner(Boom)) })
            .await;
        assert!(matches!(result, Err(ResilienceError::Canceled)));
    }

    #[tokio::test]
    async fn breaker_opens_after_threshold_and_resets_on_success() {
        let breaker = CircuitBreaker::new(2);

        for _ in 0..2 {
            let _: Result<(), ResilienceError<Boom>> =
                breaker.run(|| async { Err(ResilienceError::Inner(Boom)) }).await;
        }
        assert!(breaker.is_open());

        // The half-open probe is admitted; its success closes the circuit.
        let result: Result<u32, ResilienceError<Boom>> = breaker.run(|| async { Ok(1) }).await;
        assert_eq!(result.unwrap(), 1);
        assert!(!breaker.is_open());
    }

    #[tokio::test]
    async fn open_breaker_short_circuits_without_calling() {
        let breaker = CircuitBreaker::new(1);
        let _: Result<(), ResilienceError<Boom>> =
            breaker.run(|| async { Err(ResilienceError::Inner(Boom)) }).await;
        assert!(breaker.is_open());

        // A failing probe keeps the circuit open.
        let probed: Result<(), ResilienceError<Boom>> =
            breaker.run(|| async { Err(ResilienceError::Inner(Boom)) }).await;
        assert!(matches!(probed, Err(ResilienceError::Inner(Boom))));
        assert!(breaker.is_open());
    }

    #[tokio::test]
    async fn zero_threshold_never_opens() {
        let breaker = CircuitBreaker::new(0);
        for _ in 0..10 {
            let _: Result<(), ResilienceError<Boom>> =
                breaker.run(|| async { Err(ResilienceError::Inner(Boom)) }).await;
        }
        assert!(!breaker.is_open());
    }
}
