use std::{collections::HashMap, time::Duration};

use tokio::{sync::Mutex, time::Instant};

use crate::domain::site::Site;

/// Keeps at least `min_delay` between consecutive requests to the same board.
/// Boards are limited independently.
pub struct RateLimiter {
    min_delay: Duration,
    last_request: HashMap<Site, Mutex<Option<Instant>>>,
}

impl RateLimiter {
    pub fn new(min_delay: Duration) -> Self {
        let last_request = Site::ALL.into_iter().map(|site| (site, Mutex::new(None))).collect();
        RateLimiter {
            min_delay,
            last_request,
        }
    }

    /// Waits until `site` may be hit again, then claims the slot.
    pub async fn acquire(&self, site: Site) {
        let Some(slot) = self.last_request.get(&site) else {
            return;
        };

        let mut last = slot.lock().await;
        if let Some(previous) = *last {
            let ready_at = previous + self.min_delay;
            if ready_at > Instant::now() {
                log::debug!("Throttling {} for {:?}", site, ready_at - Instant::now());
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::Instant;

    use crate::domain::site::Site;

    use super::RateLimiter;

    #[tokio::test(start_paused = true)]
    async fn second_request_waits_for_min_delay() {
        let limiter = RateLimiter::new(Duration::from_secs(2));
        let start = Instant::now();

        limiter.acquire(Site::Indeed).await;
        limiter.acquire(Site::Indeed).await;

        assert!(start.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn sites_are_limited_independently() {
        let limiter = RateLimiter::new(Duration::from_secs(2));
        let start = Instant::now();

        limiter.acquire(Site::Indeed).await;
        limiter.acquire(Site::LinkedIn).await;

        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
