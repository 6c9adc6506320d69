//! Scroll- and click-driven positioning of the media play head.
//!
//! Two writers share the media element: [`PlaybackSync::seek_to_segment`]
//! jumps directly, and [`FollowLoop`] eases the play head toward the
//! scroll-derived time code once per animation frame. Writes are not
//! arbitrated; whichever ran last is the baseline for the next frame.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use tracing::{debug, info, trace};

use crate::config::EngineConfig;
use crate::events::FrameTask;
use crate::sampler::ScrollCell;
use crate::types::Segment;

/// The subset of an audio/video element the engine drives.
pub trait MediaElement {
    /// Total length in seconds, `None` while metadata is still loading.
    fn duration(&self) -> Option<f64>;
    fn current_time(&self) -> f64;
    fn set_current_time(&mut self, seconds: f64);
    fn play(&mut self);
}

pub type SharedMedia = Rc<RefCell<dyn MediaElement>>;

/// Slot holding the media element, which may come and go with re-renders.
#[derive(Clone, Default)]
pub struct MediaSlot {
    inner: Rc<RefCell<Option<SharedMedia>>>,
}

impl MediaSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&self, media: SharedMedia) {
        *self.inner.borrow_mut() = Some(media);
    }

    pub fn detach(&self) {
        self.inner.borrow_mut().take();
    }

    pub fn is_attached(&self) -> bool {
        self.inner.borrow().is_some()
    }

    /// Runs `f` against the media element if one is attached.
    pub fn with_media<R>(&self, f: impl FnOnce(&mut dyn MediaElement) -> R) -> Option<R> {
        let media = self.inner.borrow().clone()?;
        let mut media = media.borrow_mut();
        Some(f(&mut *media))
    }
}

impl fmt::Debug for MediaSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaSlot")
            .field("attached", &self.is_attached())
            .finish()
    }
}

/// Absolute seek applied to the media element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeekCommand {
    pub time: f64,
    pub play: bool,
}

/// Direct seeks (click-to-play).
#[derive(Debug, Clone)]
pub struct PlaybackSync {
    media: MediaSlot,
}

impl PlaybackSync {
    pub fn new(media: MediaSlot) -> Self {
        Self { media }
    }

    pub fn apply(&self, command: SeekCommand) -> bool {
        self.media
            .with_media(|media| {
                media.set_current_time(command.time);
                if command.play {
                    media.play();
                }
            })
            .is_some()
    }

    /// Handles a pointer activation; `target` is the segment under the
    /// pointer, if any. Returns the seek that was applied.
    pub fn seek_to_segment(&self, target: Option<&Segment>) -> Option<SeekCommand> {
        let segment = target?;
        let command = SeekCommand {
            time: segment.start,
            play: true,
        };
        if self.apply(command) {
            info!(segment = %segment.id, time = command.time, "seeking to segment");
            Some(command)
        } else {
            debug!(segment = %segment.id, "click ignored; media not attached");
            None
        }
    }
}

/// Maps a scroll fraction onto a timeline of `duration` seconds.
pub fn time_code(fraction: f64, duration: f64) -> f64 {
    fraction.clamp(0.0, 1.0) * duration
}

/// One smoothing step: the new play head, or `None` when already within
/// `epsilon` of `target`.
pub fn converge_step(current: f64, target: f64, gain: f64, epsilon: f64) -> Option<f64> {
    let diff = target - current;
    if diff.abs() > epsilon {
        Some(current + diff * gain)
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    /// The owning task was cancelled; nothing was touched.
    Stopped,
    /// Media absent or its duration unknown; try again next frame.
    Retry,
    Adjusted { from: f64, to: f64 },
    Settled,
}

/// Per-frame exponential convergence of the play head toward the
/// scroll-derived time code.
#[derive(Debug)]
pub struct FollowLoop {
    media: MediaSlot,
    scroll: ScrollCell,
    task: FrameTask,
    gain: f64,
    epsilon: f64,
    last_scroll_top: Option<f64>,
    target: Rc<Cell<f64>>,
}

impl FollowLoop {
    pub fn new(media: MediaSlot, scroll: ScrollCell, config: &EngineConfig) -> Self {
        Self {
            media,
            scroll,
            task: FrameTask::new(),
            gain: config.smoothing_gain,
            epsilon: config.settle_epsilon,
            last_scroll_top: None,
            target: Rc::new(Cell::new(0.0)),
        }
    }

    /// Handle for cancelling the loop from its owner.
    pub fn task(&self) -> FrameTask {
        self.task.clone()
    }

    /// Last computed time code.
    pub fn time_code(&self) -> f64 {
        self.target.get()
    }

    pub fn on_frame(&mut self) -> FrameOutcome {
        if !self.task.begin_frame() {
            return FrameOutcome::Stopped;
        }
        let sample = self.scroll.latest();
        let (gain, epsilon) = (self.gain, self.epsilon);
        let last_scroll_top = &mut self.last_scroll_top;
        let target = &self.target;

        let outcome = self.media.with_media(|media| {
            let Some(duration) = media.duration().filter(|d| d.is_finite() && *d > 0.0) else {
                return FrameOutcome::Retry;
            };
            if *last_scroll_top != Some(sample.scroll_top) {
                *last_scroll_top = Some(sample.scroll_top);
                target.set(time_code(sample.fraction, duration));
            }
            let current = media.current_time();
            match converge_step(current, target.get(), gain, epsilon) {
                Some(next) => {
                    media.set_current_time(next);
                    FrameOutcome::Adjusted {
                        from: current,
                        to: next,
                    }
                }
                None => FrameOutcome::Settled,
            }
        });

        let outcome = outcome.unwrap_or(FrameOutcome::Retry);
        trace!(?outcome, "follow frame");
        outcome
    }
}

impl Drop for FollowLoop {
    fn drop(&mut self) {
        self.task.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::ScrollSample;

    #[derive(Debug, Default)]
    struct FakeMedia {
        duration: Option<f64>,
        position: f64,
        playing: bool,
        writes: usize,
    }

    impl MediaElement for FakeMedia {
        fn duration(&self) -> Option<f64> {
            self.duration
        }

        fn current_time(&self) -> f64 {
            self.position
        }

        fn set_current_time(&mut self, seconds: f64) {
            self.position = seconds;
            self.writes += 1;
        }

        fn play(&mut self) {
            self.playing = true;
        }
    }

    fn attached(duration: Option<f64>) -> (MediaSlot, Rc<RefCell<FakeMedia>>) {
        let media = Rc::new(RefCell::new(FakeMedia {
            duration,
            ..FakeMedia::default()
        }));
        let slot = MediaSlot::new();
        slot.attach(media.clone());
        (slot, media)
    }

    #[test]
    fn click_seeks_to_segment_start_and_plays() {
        let (slot, media) = attached(Some(100.0));
        let sync = PlaybackSync::new(slot);
        let segment = Segment::new(42.5, 50.0, "x");
        let command = sync.seek_to_segment(Some(&segment)).unwrap();
        assert_eq!(command, SeekCommand { time: 42.5, play: true });
        assert_eq!(media.borrow().position, 42.5);
        assert!(media.borrow().playing);
        assert_eq!(sync.seek_to_segment(None), None);
    }

    #[test]
    fn click_without_media_is_ignored() {
        let sync = PlaybackSync::new(MediaSlot::new());
        assert_eq!(sync.seek_to_segment(Some(&Segment::new(1.0, 2.0, "x"))), None);
    }

    #[test]
    fn unknown_duration_retries() {
        let (slot, media) = attached(None);
        let cell = ScrollCell::new();
        cell.publish(ScrollSample {
            scroll_top: 50.0,
            fraction: 0.5,
        });
        let mut follow = FollowLoop::new(slot, cell, &EngineConfig::default());
        assert_eq!(follow.on_frame(), FrameOutcome::Retry);
        assert_eq!(media.borrow().writes, 0);

        media.borrow_mut().duration = Some(100.0);
        assert!(matches!(follow.on_frame(), FrameOutcome::Adjusted { .. }));
        assert_eq!(follow.time_code(), 50.0);
    }

    #[test]
    fn missing_media_retries() {
        let mut follow = FollowLoop::new(MediaSlot::new(), ScrollCell::new(), &EngineConfig::default());
        assert_eq!(follow.on_frame(), FrameOutcome::Retry);
    }

    #[test]
    fn cancelled_loop_leaves_media_alone() {
        let (slot, media) = attached(Some(100.0));
        let cell = ScrollCell::new();
        cell.publish(ScrollSample {
            scroll_top: 10.0,
            fraction: 1.0,
        });
        let mut follow = FollowLoop::new(slot, cell, &EngineConfig::default());
        follow.task().cancel();
        assert_eq!(follow.on_frame(), FrameOutcome::Stopped);
        assert_eq!(media.borrow().writes, 0);
    }

    #[test]
    fn converge_step_holds_inside_epsilon() {
        assert_eq!(converge_step(10.0, 10.04, 0.15, 0.05), None);
        assert_eq!(converge_step(10.0, 20.0, 0.15, 0.05), Some(11.5));
    }
}
