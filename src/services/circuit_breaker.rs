use std::{collections::HashMap, sync::Mutex, time::Duration};

use tokio::time::Instant;

use crate::domain::site::Site;

use super::job_scraper::ScrapeError;

#[derive(Debug, Clone, Copy, PartialEq)]
enum BreakerState {
    Closed { failures: u32 },
    Open { until: Instant },
    /// One trial request is in flight.
    HalfOpen,
}

/// Takes a board out of rotation after `failure_threshold` consecutive
/// failures and lets a single trial through once `cooldown` has passed.
pub struct CircuitBreaker {
    failure_threshold: u32,
    cooldown: Duration,
    states: HashMap<Site, Mutex<BreakerState>>,
}

impl CircuitBreaker {
    pub fn new(failure_threshold: u32, cooldown: Duration) -> Self {
        let states = Site::ALL
            .into_iter()
            .map(|site| (site, Mutex::new(BreakerState::Closed { failures: 0 })))
            .collect();
        CircuitBreaker {
            failure_threshold: failure_threshold.max(1),
            cooldown,
            states,
        }
    }

    fn with_state<T>(&self, site: Site, f: impl FnOnce(&mut BreakerState) -> T) -> Option<T> {
        let slot = self.states.get(&site)?;
        // A panic while holding the lock leaves plain data behind; keep using it.
        let mut state = slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Some(f(&mut state))
    }

    /// Errors with `CircuitOpen` while the board is paused.
    pub fn allow(&self, site: Site) -> Result<(), ScrapeError> {
        self.with_state(site, |state| match *state {
            BreakerState::Closed { .. } => Ok(()),
            BreakerState::Open { until } => {
                let now = Instant::now();
                if now >= until {
                    log::info!("Circuit for {} half-open, sending a trial request", site);
                    *state = BreakerState::HalfOpen;
                    Ok(())
                } else {
                    Err(ScrapeError::CircuitOpen {
                        site,
                        retry_in_secs: (until - now).as_secs_f64().ceil() as u64,
                    })
                }
            }
            BreakerState::HalfOpen => Err(ScrapeError::CircuitOpen {
                site,
                retry_in_secs: 1,
            }),
        })
        .unwrap_or(Ok(()))
    }

    pub fn record_success(&self, site: Site) {
        self.with_state(site, |state| {
            if *state != (BreakerState::Closed { failures: 0 }) {
                log::info!("Circuit for {} closed", site);
            }
            *state = BreakerState::Closed { failures: 0 };
        });
    }

    pub fn record_failure(&self, site: Site) {
        let threshold = self.failure_threshold;
        let until = Instant::now() + self.cooldown;
        self.with_state(site, |state| match *state {
            BreakerState::Closed { failures } if failures + 1 >= threshold => {
                log::warn!("Circuit for {} opened after {} failures", site, failures + 1);
                *state = BreakerState::Open { until };
            }
            BreakerState::Closed { failures } => {
                *state = BreakerState::Closed {
                    failures: failures + 1,
                };
            }
            BreakerState::HalfOpen => {
                log::warn!("Trial request to {} failed, circuit reopened", site);
                *state = BreakerState::Open { until };
            }
            // Stragglers from before the circuit opened.
            BreakerState::Open { .. } => {}
        });
    }
}
