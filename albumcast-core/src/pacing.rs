use std::future::Future;
use std::sync::Mutex;

use tokio::time::{sleep, Duration, Instant};

use crate::error::Result;

/// Rate-limiting policy wrapped around outbound calls.
#[derive(Debug)]
pub enum Throttle {
    /// No pacing at all.
    Unlimited,
    /// Sleep for a fixed duration after every successful call.
    Fixed(Duration),
    /// Keep at least `interval` between the starts of consecutive calls.
    MinInterval {
        interval: Duration,
        last_call: Mutex<Option<Instant>>,
    },
}

impl Throttle {
    pub fn fixed(pause: Duration) -> Self {
        if pause.is_zero() {
            Self::Unlimited
        } else {
            Self::Fixed(pause)
        }
    }

    pub fn min_interval(interval: Duration) -> Self {
        if interval.is_zero() {
            return Self::Unlimited;
        }
        Self::MinInterval {
            interval,
            last_call: Mutex::new(None),
        }
    }

    /// Run `call` under this policy. Failed calls are returned immediately,
    /// without the trailing pause.
    pub async fn run<F, T>(&self, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if let Self::MinInterval { .. } = self {
            self.wait_for_slot().await;
        }

        let output = call.await?;

        if let Self::Fixed(pause) = self {
            tracing::debug!("Pausing {:?} after outbound call", pause);
            sleep(*pause).await;
        }

        Ok(output)
    }

    async fn wait_for_slot(&self) {
        let Self::MinInterval {
            interval,
            last_call,
        } = self
        else {
            return;
        };

        let wait_time = match last_call.lock() {
            Ok(last) => (*last).and_then(|at| interval.checked_sub(at.elapsed())),
            Err(e) => {
                tracing::warn!("Throttle state poisoned, not waiting: {}", e);
                None
            }
        };

        if let Some(wait_time) = wait_time {
            sleep(wait_time).await;
        }

        if let Ok(mut last) = last_call.lock() {
            *last = Some(Instant::now());
        }
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::Unlimited
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RelayError;

    #[tokio::test(start_paused = true)]
    async fn test_fixed_pauses_after_success() {
        let throttle = Throttle::fixed(Duration::from_secs(25));
        let start = Instant::now();
        let value = throttle.run(async { Ok(7) }).await.unwrap();
        assert_eq!(value, 7);
        assert!(start.elapsed() >= Duration::from_secs(25));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_skips_pause_on_failure() {
        let throttle = Throttle::fixed(Duration::from_secs(25));
        let start = Instant::now();
        let result: Result<()> = throttle
            .run(async { Err(RelayError::rejected("sendPhoto", "bad caption")) })
            .await;
        assert!(result.is_err());
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_min_interval_spaces_calls() {
        let throttle = Throttle::min_interval(Duration::from_secs(10));
        let start = Instant::now();
        throttle.run(async { Ok(()) }).await.unwrap();
        assert!(start.elapsed() < Duration::from_secs(1));
        throttle.run(async { Ok(()) }).await.unwrap();
        throttle.run(async { Ok(()) }).await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(20));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_pause_is_unlimited() {
        assert!(matches!(Throttle::min_interval(Duration::ZERO), Throttle::Unlimited));
        let throttle = Throttle::fixed(Duration::ZERO);
        assert!(matches!(throttle, Throttle::Unlimited));
        let start = Instant::now();
        throttle.run(async { Ok(()) }).await.unwrap();
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
