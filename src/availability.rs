//! Deferred discovery of resources that may not exist yet.
//!
//! Hosts poll an [`Availability`] from their own clock (timer tick, frame
//! callback). Each failed probe schedules the next attempt with capped
//! exponential backoff, so nothing ever spins waiting for an element.

use std::fmt;
use std::time::{Duration, Instant};

use backon::{BackoffBuilder, ExponentialBackoff, ExponentialBuilder};
use serde::Deserialize;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub initial_delay_ms: u64,
    pub factor: f64,
    pub max_delay_ms: u64,
    /// `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay_ms: 100,
            factor: 2.0,
            max_delay_ms: 2_000,
            max_attempts: Some(50),
        }
    }
}

impl RetryPolicy {
    /// Delay schedule for one awaited resource. The first probe is not
    /// counted as a retry, so `max_attempts` probes yield one fewer delay.
    pub fn backoff(&self) -> ExponentialBackoff {
        let builder = ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(self.initial_delay_ms))
            .with_factor(self.factor.max(1.0) as f32)
            .with_max_delay(Duration::from_millis(self.max_delay_ms));
        match self.max_attempts {
            Some(limit) => builder
                .with_max_times(limit.saturating_sub(1) as usize)
                .build(),
            None => builder.without_max_times().build(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Probe<T> {
    Ready(T),
    Pending { next_attempt: Instant },
    Exhausted,
}

/// Tracks retry state for one awaited resource.
pub struct Availability {
    label: &'static str,
    policy: RetryPolicy,
    backoff: ExponentialBackoff,
    attempts: u32,
    next_attempt: Option<Instant>,
    exhausted: bool,
}

impl Availability {
    pub fn new(label: &'static str, policy: RetryPolicy) -> Self {
        Self {
            label,
            backoff: policy.backoff(),
            policy,
            attempts: 0,
            next_attempt: None,
            exhausted: false,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Runs `probe` if an attempt is due at `now`.
    pub fn poll<T>(&mut self, now: Instant, probe: impl FnOnce() -> Option<T>) -> Probe<T> {
        if self.exhausted {
            return Probe::Exhausted;
        }
        if let Some(next_attempt) = self.next_attempt {
            if now < next_attempt {
                return Probe::Pending { next_attempt };
            }
        }

        self.attempts += 1;
        if let Some(resource) = probe() {
            info!(resource = self.label, attempts = self.attempts, "resource available");
            self.next_attempt = None;
            return Probe::Ready(resource);
        }

        let Some(delay) = self.backoff.next() else {
            warn!(resource = self.label, attempts = self.attempts, "giving up on resource");
            self.exhausted = true;
            return Probe::Exhausted;
        };

        let next_attempt = now + delay;
        debug!(
            resource = self.label,
            attempts = self.attempts,
            retry_delay_ms = delay.as_millis() as u64,
            "resource not ready; will retry"
        );
        self.next_attempt = Some(next_attempt);
        Probe::Pending { next_attempt }
    }

    /// Starts over, e.g. after the host replaced its content.
    pub fn reset(&mut self) {
        self.backoff = self.policy.backoff();
        self.attempts = 0;
        self.next_attempt = None;
        self.exhausted = false;
    }
}

impl fmt::Debug for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Availability")
            .field("label", &self.label)
            .field("attempts", &self.attempts)
            .field("next_attempt", &self.next_attempt)
            .field("exhausted", &self.exhausted)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_until_capped() {
        let delays: Vec<u128> = RetryPolicy::default()
            .backoff()
            .map(|delay| delay.as_millis())
            .collect();
        assert_eq!(delays.len(), 49);
        assert_eq!(&delays[..7], &[100, 200, 400, 800, 1_600, 2_000, 2_000]);
        assert!(delays.iter().all(|delay| *delay <= 2_000));
    }

    #[test]
    fn unlimited_policy_never_runs_out() {
        let policy = RetryPolicy {
            max_attempts: None,
            ..RetryPolicy::default()
        };
        assert_eq!(policy.backoff().take(500).count(), 500);
    }

    #[test]
    fn pending_follows_backoff_schedule() {
        let mut now = Instant::now();
        let mut availability = Availability::new("media", RetryPolicy::default());
        for expected_ms in [100, 200, 400] {
            let Probe::Pending { next_attempt } = availability.poll(now, || None::<()>) else {
                panic!("expected pending probe");
            };
            assert_eq!(next_attempt.duration_since(now).as_millis(), expected_ms);
            now = next_attempt;
        }
        assert_eq!(availability.attempts(), 3);
    }

    #[test]
    fn waits_between_attempts() {
        let start = Instant::now();
        let mut availability = Availability::new("transcript", RetryPolicy::default());
        let first = availability.poll(start, || None::<()>);
        assert_eq!(
            first,
            Probe::Pending {
                next_attempt: start + Duration::from_millis(100)
            }
        );

        let mut probed = false;
        let early = availability.poll(start + Duration::from_millis(50), || {
            probed = true;
            Some(())
        });
        assert!(!probed, "probe must not run before the next attempt is due");
        assert!(matches!(early, Probe::Pending { .. }));

        let ready = availability.poll(start + Duration::from_millis(100), || Some(7));
        assert_eq!(ready, Probe::Ready(7));
        assert_eq!(availability.attempts(), 2);
    }

    #[test]
    fn exhausts_after_max_attempts() {
        let policy = RetryPolicy {
            max_attempts: Some(2),
            ..RetryPolicy::default()
        };
        let mut now = Instant::now();
        let mut availability = Availability::new("media", policy);
        assert!(matches!(
            availability.poll(now, || None::<()>),
            Probe::Pending { .. }
        ));
        now += Duration::from_secs(1);
        assert_eq!(availability.poll(now, || None::<()>), Probe::Exhausted);
        assert_eq!(availability.poll(now, || Some(())), Probe::Exhausted);

        availability.reset();
        assert_eq!(availability.poll(now, || Some(())), Probe::Ready(()));
    }
}
