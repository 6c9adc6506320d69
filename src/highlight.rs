//! Active-segment highlighting driven by media time updates.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use crate::events::{EventChannel, Subscription};
use crate::types::Segment;

/// Media `timeupdate` event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeUpdate {
    pub current_time: f64,
}

/// Per-segment "active" flags, indexed like the segment list.
#[derive(Debug, Clone, Default)]
pub struct ActiveFlags {
    flags: Rc<RefCell<Vec<bool>>>,
}

impl ActiveFlags {
    pub fn is_active(&self, index: usize) -> bool {
        self.flags.borrow().get(index).copied().unwrap_or(false)
    }

    pub fn active_indices(&self) -> Vec<usize> {
        self.flags
            .borrow()
            .iter()
            .enumerate()
            .filter_map(|(index, active)| active.then_some(index))
            .collect()
    }
}

/// Marks segment `i` active iff `start <= t < end`; returns how many flags flipped.
pub fn apply_time(segments: &[Segment], flags: &mut Vec<bool>, current_time: f64) -> usize {
    flags.resize(segments.len(), false);
    let mut changed = 0;
    for (segment, flag) in segments.iter().zip(flags.iter_mut()) {
        let active = segment.contains(current_time);
        if *flag != active {
            *flag = active;
            changed += 1;
        }
    }
    changed
}

pub struct SegmentHighlighter {
    segments: Rc<[Segment]>,
    flags: ActiveFlags,
    subscription: Option<Subscription>,
}

impl SegmentHighlighter {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self {
            segments: segments.into(),
            flags: ActiveFlags::default(),
            subscription: None,
        }
    }

    pub fn flags(&self) -> ActiveFlags {
        self.flags.clone()
    }

    /// Listens to `time_updates`, replacing any listener attached earlier.
    pub fn attach(&mut self, time_updates: &EventChannel<TimeUpdate>) {
        if let Some(mut previous) = self.subscription.take() {
            debug!("detaching previous time-update listener");
            previous.dispose();
        }
        let segments = Rc::clone(&self.segments);
        let flags = Rc::clone(&self.flags.flags);
        self.subscription = Some(time_updates.subscribe(move |update: &TimeUpdate| {
            apply_time(&segments, &mut flags.borrow_mut(), update.current_time);
        }));
    }

    pub fn detach(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.dispose();
        }
    }

    pub fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments() -> Vec<Segment> {
        vec![
            Segment::new(0.0, 10.0, "a"),
            Segment::new(10.0, 20.0, "b"),
            Segment::new(20.0, 30.0, "c"),
        ]
    }

    #[test]
    fn interval_is_half_open() {
        let segments = vec![Segment::new(10.0, 20.0, "x")];
        let mut flags = Vec::new();
        apply_time(&segments, &mut flags, 10.0);
        assert_eq!(flags, vec![true]);
        apply_time(&segments, &mut flags, 19.999);
        assert_eq!(flags, vec![true]);
        apply_time(&segments, &mut flags, 20.0);
        assert_eq!(flags, vec![false]);
    }

    #[test]
    fn boundary_instant_belongs_to_later_segment() {
        let segments = segments();
        let mut flags = Vec::new();
        apply_time(&segments, &mut flags, 20.0);
        assert_eq!(flags, vec![false, false, true]);
    }

    #[test]
    fn reattaching_keeps_single_listener() {
        let channel = EventChannel::new();
        let mut highlighter = SegmentHighlighter::new(segments());
        highlighter.attach(&channel);
        highlighter.attach(&channel);
        assert_eq!(channel.listener_count(), 1);

        channel.emit(&TimeUpdate { current_time: 12.0 });
        assert_eq!(highlighter.flags().active_indices(), vec![1]);

        highlighter.detach();
        assert_eq!(channel.listener_count(), 0);
        channel.emit(&TimeUpdate { current_time: 25.0 });
        assert_eq!(highlighter.flags().active_indices(), vec![1]);
    }
}
