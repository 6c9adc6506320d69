//! Tracking which transcript segments intersect the viewport.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::rc::Rc;

use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::types::{Segment, SegmentId};

pub const NOTHING_VISIBLE: &str = "No segments visible";

/// Vertical extent in container coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub top: f64,
    pub bottom: f64,
}

impl Span {
    pub fn new(top: f64, bottom: f64) -> Self {
        Self { top, bottom }
    }

    pub fn height(&self) -> f64 {
        (self.bottom - self.top).max(0.0)
    }

    /// Grows the span by `margin` on both sides (negative shrinks it).
    pub fn expanded(&self, margin: f64) -> Self {
        Self::new(self.top - margin, self.bottom + margin)
    }

    /// Fraction of `self` lying inside `root`.
    pub fn ratio_within(&self, root: Span) -> f64 {
        let overlap = (self.bottom.min(root.bottom) - self.top.max(root.top)).max(0.0);
        let height = self.height();
        if height <= 0.0 {
            let inside = self.top >= root.top && self.top <= root.bottom;
            return if inside { 1.0 } else { 0.0 };
        }
        (overlap / height).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverOptions {
    pub root_margin: f64,
    pub threshold: f64,
}

impl ObserverOptions {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            root_margin: config.root_margin,
            threshold: config.visibility_threshold,
        }
    }
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

/// Where a segment node currently sits.
#[derive(Debug, Clone, Copy)]
pub struct TargetGeometry<'a> {
    pub segment: &'a Segment,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionEntry {
    pub target: SegmentId,
    pub start: f64,
    pub end: f64,
    pub ratio: f64,
    pub is_intersecting: bool,
}

/// Emits an entry whenever an observed target crosses the visibility threshold.
#[derive(Debug)]
pub struct IntersectionObserver {
    options: ObserverOptions,
    observed: HashSet<SegmentId>,
    intersecting: HashMap<SegmentId, bool>,
}

impl IntersectionObserver {
    pub fn new(options: ObserverOptions) -> Self {
        Self {
            options,
            observed: HashSet::new(),
            intersecting: HashMap::new(),
        }
    }

    pub fn observe(&mut self, id: SegmentId) {
        self.observed.insert(id);
    }

    pub fn observed_count(&self) -> usize {
        self.observed.len()
    }

    pub fn disconnect(&mut self) {
        self.observed.clear();
        self.intersecting.clear();
    }

    pub fn is_connected(&self) -> bool {
        !self.observed.is_empty()
    }

    /// Re-evaluates `targets` against the `root` viewport.
    pub fn update(&mut self, root: Span, targets: &[TargetGeometry<'_>]) -> Vec<IntersectionEntry> {
        let root = root.expanded(self.options.root_margin);
        let mut entries = Vec::new();
        for target in targets {
            let id = &target.segment.id;
            if !self.observed.contains(id) {
                continue;
            }
            let ratio = target.span.ratio_within(root);
            let is_intersecting = ratio > 0.0 && ratio >= self.options.threshold;
            let previous = self.intersecting.insert(id.clone(), is_intersecting);
            if previous.unwrap_or(false) != is_intersecting {
                entries.push(IntersectionEntry {
                    target: id.clone(),
                    start: target.segment.start,
                    end: target.segment.end,
                    ratio,
                    is_intersecting,
                });
            }
        }
        entries
    }
}

/// Latest published summary text.
#[derive(Debug, Clone)]
pub struct SummaryCell {
    inner: Rc<RefCell<String>>,
}

impl Default for SummaryCell {
    fn default() -> Self {
        Self {
            inner: Rc::new(RefCell::new(NOTHING_VISIBLE.to_string())),
        }
    }
}

impl SummaryCell {
    pub fn get(&self) -> String {
        self.inner.borrow().clone()
    }

    fn set(&self, text: String) {
        *self.inner.borrow_mut() = text;
    }
}

/// Human-readable span of the visible segments.
pub fn summarize<'a>(visible: impl IntoIterator<Item = &'a (f64, f64)>) -> String {
    let mut count = 0usize;
    let mut first = f64::INFINITY;
    let mut last = f64::NEG_INFINITY;
    for (start, end) in visible {
        count += 1;
        first = first.min(*start);
        last = last.max(*end);
    }
    if count == 0 {
        return NOTHING_VISIBLE.to_string();
    }
    format!(
        "Visible: {:.1}s → {:.1}s [{} segments]",
        round_tenths(first),
        round_tenths(last),
        count
    )
}

/// Ties round up (12.25 → 12.3), unlike `{:.1}` which rounds them to even.
fn round_tenths(seconds: f64) -> f64 {
    (seconds * 10.0).round() / 10.0
}

/// Maintains the visible segment set and republishes its summary.
#[derive(Debug)]
pub struct VisibleRangeTracker {
    observer: IntersectionObserver,
    visible: BTreeMap<SegmentId, (f64, f64)>,
    summary: SummaryCell,
}

impl VisibleRangeTracker {
    pub fn new(segments: &[Segment], options: ObserverOptions, summary: SummaryCell) -> Self {
        let mut observer = IntersectionObserver::new(options);
        for segment in segments {
            observer.observe(segment.id.clone());
        }
        summary.set(NOTHING_VISIBLE.to_string());
        debug!(segments = observer.observed_count(), "visible-range observer created");
        Self {
            observer,
            visible: BTreeMap::new(),
            summary,
        }
    }

    pub fn summary(&self) -> String {
        self.summary.get()
    }

    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    pub fn is_connected(&self) -> bool {
        self.observer.is_connected()
    }

    /// Feeds new geometry; publishes a summary when anything changed.
    pub fn observe_layout(&mut self, root: Span, targets: &[TargetGeometry<'_>]) -> bool {
        if !self.observer.is_connected() {
            return false;
        }
        let entries = self.observer.update(root, targets);
        self.handle_entries(&entries)
    }

    pub fn handle_entries(&mut self, entries: &[IntersectionEntry]) -> bool {
        if entries.is_empty() {
            return false;
        }
        for entry in entries {
            if entry.is_intersecting {
                self.visible
                    .insert(entry.target.clone(), (entry.start, entry.end));
            } else {
                self.visible.remove(&entry.target);
            }
        }
        self.summary.set(summarize(self.visible.values()));
        true
    }

    pub fn disconnect(&mut self) {
        self.observer.disconnect();
    }
}

/// Holds the single active tracker.
#[derive(Debug, Default)]
pub struct TrackerSlot {
    current: Option<VisibleRangeTracker>,
    summary: SummaryCell,
}

impl TrackerSlot {
    pub fn new(summary: SummaryCell) -> Self {
        Self {
            current: None,
            summary,
        }
    }

    /// Tears down the previous tracker, then starts one for `segments`.
    pub fn replace(
        &mut self,
        segments: &[Segment],
        options: ObserverOptions,
    ) -> &mut VisibleRangeTracker {
        if let Some(mut previous) = self.current.take() {
            info!(
                visible = previous.visible_count(),
                "disconnecting previous visible-range observer"
            );
            previous.disconnect();
        }
        self.current
            .insert(VisibleRangeTracker::new(segments, options, self.summary.clone()))
    }

    pub fn current(&mut self) -> Option<&mut VisibleRangeTracker> {
        self.current.as_mut()
    }

    pub fn teardown(&mut self) {
        if let Some(mut tracker) = self.current.take() {
            tracker.disconnect();
        }
    }

    pub fn summary(&self) -> String {
        self.summary.get()
    }
}
