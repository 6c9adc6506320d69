//! Throttled scroll sampling of the transcript container.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::trace;

/// Scroll geometry of the transcript container.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub client_height: f64,
}

impl ScrollMetrics {
    pub fn new(scroll_top: f64, scroll_height: f64, client_height: f64) -> Self {
        Self {
            scroll_top,
            scroll_height,
            client_height,
        }
    }

    /// `scroll_top / (scroll_height - client_height)` clamped to [0,1];
    /// 0 when there is nothing to scroll.
    pub fn fraction(&self) -> f64 {
        let range = (self.scroll_height - self.client_height).max(0.0);
        if range <= 0.0 || !self.scroll_top.is_finite() {
            return 0.0;
        }
        (self.scroll_top / range).clamp(0.0, 1.0)
    }
}

/// Latest published scroll state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollSample {
    pub scroll_top: f64,
    pub fraction: f64,
}

/// Shared cell the sampler writes and the follow loop reads. Readers only
/// ever see the most recent value.
#[derive(Debug, Clone, Default)]
pub struct ScrollCell {
    inner: Rc<Cell<ScrollSample>>,
}

impl ScrollCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, sample: ScrollSample) {
        self.inner.set(sample);
    }

    pub fn latest(&self) -> ScrollSample {
        self.inner.get()
    }
}

/// Turns raw scroll events into at most one published fraction per
/// throttle interval. A new event while one is pending replaces it and
/// restarts the interval.
#[derive(Debug)]
pub struct ScrollSampler {
    throttle: Duration,
    cell: ScrollCell,
    pending: Option<(ScrollMetrics, Instant)>,
}

impl ScrollSampler {
    pub fn new(throttle: Duration, cell: ScrollCell) -> Self {
        Self {
            throttle,
            cell,
            pending: None,
        }
    }

    /// Records a scroll event observed at `now`.
    pub fn on_scroll(&mut self, metrics: ScrollMetrics, now: Instant) {
        self.pending = Some((metrics, now + self.throttle));
    }

    /// Publishes the pending sample if its interval has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<ScrollSample> {
        let (metrics, due) = self.pending?;
        if now < due {
            return None;
        }
        self.pending = None;
        let sample = ScrollSample {
            scroll_top: metrics.scroll_top,
            fraction: metrics.fraction(),
        };
        trace!(fraction = sample.fraction, "scroll sample published");
        self.cell.publish(sample);
        Some(sample)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fraction_is_clamped() {
        assert_eq!(ScrollMetrics::new(50.0, 300.0, 100.0).fraction(), 0.25);
        assert_eq!(ScrollMetrics::new(500.0, 300.0, 100.0).fraction(), 1.0);
        assert_eq!(ScrollMetrics::new(-5.0, 300.0, 100.0).fraction(), 0.0);
    }

    #[test]
    fn unscrollable_container_is_zero() {
        assert_eq!(ScrollMetrics::new(0.0, 100.0, 100.0).fraction(), 0.0);
        assert_eq!(ScrollMetrics::new(10.0, 80.0, 100.0).fraction(), 0.0);
        assert_eq!(ScrollMetrics::default().fraction(), 0.0);
    }

    #[test]
    fn fraction_stays_in_unit_range() {
        for top in [0.0, 1.0, 37.5, 199.9, 200.0, 1e9] {
            for height in [0.0, 100.0, 300.0, 1e6] {
                for client in [0.0, 100.0, 300.0] {
                    let fraction = ScrollMetrics::new(top, height, client).fraction();
                    assert!((0.0..=1.0).contains(&fraction));
                }
            }
        }
    }

    #[test]
    fn throttle_is_last_write_wins() {
        let start = Instant::now();
        let cell = ScrollCell::new();
        let mut sampler = ScrollSampler::new(Duration::from_millis(16), cell.clone());

        sampler.on_scroll(ScrollMetrics::new(10.0, 300.0, 100.0), start);
        sampler.on_scroll(
            ScrollMetrics::new(100.0, 300.0, 100.0),
            start + Duration::from_millis(10),
        );
        assert_eq!(sampler.poll(start + Duration::from_millis(20)), None);

        let sample = sampler.poll(start + Duration::from_millis(26)).unwrap();
        assert_eq!(sample.fraction, 0.5);
        assert_eq!(cell.latest().scroll_top, 100.0);
        assert_eq!(sampler.poll(start + Duration::from_millis(60)), None);
    }
}
