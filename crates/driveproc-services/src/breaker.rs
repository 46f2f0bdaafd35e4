//! Circuit breaker for the AI enrichment dependency.
//!
//! Count-based sliding window over the most recent call outcomes. CLOSED trips
//! to OPEN once the window is full and its failure rate reaches the configured
//! threshold; OPEN admits nothing until the cool-down elapses, then HALF_OPEN
//! lets a fixed number of trial calls probe recovery.
//!
//! One instance is constructed at startup and shared across all orchestrations.
//! State lives behind a `std::sync::Mutex` that is taken only for bookkeeping,
//! never across the guarded operation's await.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Mutex;
use std::time::Instant;

use driveproc_core::BreakerConfig;

/// Observable breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

/// Why a guarded call did not produce a result: the breaker refused it, or the
/// operation itself failed. Both route to the caller's fallback.
#[derive(Debug, thiserror::Error)]
pub enum CallFailure<E> {
    #[error("circuit breaker is open")]
    Open,
    #[error("upstream call failed: {0}")]
    Upstream(E),
}

enum State {
    Closed {
        // Most recent outcomes, true = failure.
        window: VecDeque<bool>,
    },
    Open {
        opened_at: Instant,
    },
    HalfOpen {
        admitted: u32,
        successes: u32,
    },
}

enum Permit {
    Standard,
    Trial,
}

pub struct CircuitBreaker {
    config: BreakerConfig,
    state: Mutex<State>,
}

impl CircuitBreaker {
    pub fn new(config: BreakerConfig) -> Self {
        Self {
            config,
            state: Mutex::new(State::Closed {
                window: VecDeque::new(),
            }),
        }
    }

    /// Execute `op` unless the breaker refuses it; on refusal or failure the
    /// result comes from `fallback`. Never propagates an error past this
    /// boundary.
    pub async fn guard<T, E, Fut>(
        &self,
        op: impl FnOnce() -> Fut,
        fallback: impl FnOnce(CallFailure<E>) -> T,
    ) -> T
    where
        Fut: Future<Output = Result<T, E>>,
    {
        let permit = match self.acquire() {
            Some(permit) => permit,
            None => return fallback(CallFailure::Open),
        };

        match op().await {
            Ok(value) => {
                self.record(permit, false);
                value
            }
            Err(err) => {
                self.record(permit, true);
                fallback(CallFailure::Upstream(err))
            }
        }
    }

    pub fn state(&self) -> BreakerState {
        match *self.state.lock().expect("breaker lock poisoned") {
            State::Closed { .. } => BreakerState::Closed,
            State::Open { .. } => BreakerState::Open,
            State::HalfOpen { .. } => BreakerState::HalfOpen,
        }
    }

    fn acquire(&self) -> Option<Permit> {
        let mut state = self.state.lock().expect("breaker lock poisoned");
        match &mut *state {
            State::Closed { .. } => Some(Permit::Standard),
            State::Open { opened_at } => {
                if opened_at.elapsed() >= self.config.open_cooldown {
                    tracing::info!("Circuit breaker half-open, probing recovery");
                    *state = State::HalfOpen {
                        admitted: 1,
                        successes: 0,
                    };
                    Some(Permit::Trial)
                } else {
                    None
                }
            }
            State::HalfOpen { admitted, .. } => {
                if *admitted < self.config.half_open_max_calls {
                    *admitted += 1;
                    Some(Permit::Trial)
                } else {
                    // Trial quota exhausted; treat as open until a verdict.
                    None
                }
            }
        }
    }

    fn record(&self, permit: Permit, failed: bool) {
        let mut state = self.state.lock().expect("breaker lock poisoned");
        match permit {
            Permit::Standard => {
                // Only meaningful while still CLOSED; a concurrent call may
                // have tripped the breaker in the meantime.
                if let State::Closed { window } = &mut *state {
                    window.push_back(failed);
                    while window.len() > self.config.window_size {
                        window.pop_front();
                    }

                    if window.len() == self.config.window_size {
                        let failures = window.iter().filter(|f| **f).count();
                        let rate = failures as f64 / window.len() as f64;
                        if rate >= self.config.failure_rate_threshold {
                            tracing::warn!(
                                failure_rate = rate,
                                window_size = self.config.window_size,
                                "Circuit breaker opened"
                            );
                            *state = State::Open {
                                opened_at: Instant::now(),
                            };
                        }
                    }
                }
            }
            Permit::Trial => {
                if let State::HalfOpen { successes, .. } = &mut *state {
                    if failed {
                        tracing::warn!("Trial call failed, circuit breaker re-opened");
                        *state = State::Open {
                            opened_at: Instant::now(),
                        };
                    } else {
                        *successes += 1;
                        if *successes >= self.config.half_open_max_calls {
                            tracing::info!("Circuit breaker closed");
                            *state = State::Closed {
                                window: VecDeque::new(),
                            };
                        }
                    }
                }
            }
        }
    }
}
