/*!
 * Token-bucket throttle for outbound provider calls.
 *
 * The bucket holds at most `capacity` tokens and regains one every
 * `refill_interval`. Each provider call takes one token, waiting when
 * the bucket is empty. A disabled throttle never waits.
 */

use log::trace;
use parking_lot::Mutex;
use std::time::Duration;
use tokio::time::Instant;

use crate::app_config::ThrottleConfig;

#[derive(Debug)]
struct Bucket {
    tokens: u32,
    last_refill: Instant,
}

#[derive(Debug)]
struct TokenBucket {
    capacity: u32,
    refill_interval: Duration,
    state: Mutex<Bucket>,
}

impl TokenBucket {
    /// Take a token, or return how long to wait before trying again
    fn try_take(&self) -> Option<Duration> {
        let mut state = self.state.lock();
        self.refill(&mut state);

        if state.tokens > 0 {
            state.tokens -= 1;
            return None;
        }

        Some(
            self.refill_interval
                .saturating_sub(state.last_refill.elapsed()),
        )
    }

    fn refill(&self, state: &mut Bucket) {
        let now = Instant::now();
        let elapsed = now.duration_since(state.last_refill);
        let interval_ms = self.refill_interval.as_millis().max(1);
        let earned = u32::try_from(elapsed.as_millis() / interval_ms).unwrap_or(u32::MAX);

        if earned == 0 {
            return;
        }

        state.tokens = state.tokens.saturating_add(earned).min(self.capacity);
        if state.tokens == self.capacity {
            state.last_refill = now;
        } else {
            state.last_refill += self.refill_interval * earned;
        }
    }
}

/// Rate limiter shared by everything that calls the provider
#[derive(Debug)]
pub struct Throttle {
    bucket: Option<TokenBucket>,
}

impl Throttle {
    /// Bucket starting full with `capacity` tokens
    pub fn new(capacity: u32, refill_interval: Duration) -> Self {
        let capacity = capacity.max(1);
        Self {
            bucket: Some(TokenBucket {
                capacity,
                refill_interval,
                state: Mutex::new(Bucket {
                    tokens: capacity,
                    last_refill: Instant::now(),
                }),
            }),
        }
    }

    /// Throttle that never waits
    pub fn disabled() -> Self {
        Self { bucket: None }
    }

    /// Build from configuration
    pub fn from_config(config: &ThrottleConfig) -> Self {
        if !config.enabled || config.refill_interval_ms == 0 {
            return Self::disabled();
        }
        Self::new(config.capacity, Duration::from_millis(config.refill_interval_ms))
    }

    /// Whether `acquire` can ever wait
    pub fn is_enabled(&self) -> bool {
        self.bucket.is_some()
    }

    /// Take one token, waiting for a refill when none is left
    pub async fn acquire(&self) {
        let Some(bucket) = &self.bucket else {
            return;
        };

        while let Some(wait) = bucket.try_take() {
            trace!("Throttle empty, waiting {:?}", wait);
            tokio::time::sleep(wait).await;
        }
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::from_config(&ThrottleConfig::default())
    }
}
