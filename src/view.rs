//! Wires the engine components to one transcript view.
//!
//! The host forwards its events (scroll, frame, time update, click, layout)
//! and reads back a [`ViewSnapshot`]. Everything the view starts is owned by
//! it and torn down by [`TranscriptView::dispose`] or on drop.

use std::time::Instant;

use tracing::{debug, info};

use crate::availability::{Availability, Probe};
use crate::config::EngineConfig;
use crate::events::EventChannel;
use crate::highlight::{ActiveFlags, SegmentHighlighter, TimeUpdate};
use crate::playback::{
    time_code, FollowLoop, FrameOutcome, MediaSlot, PlaybackSync, SeekCommand, SharedMedia,
};
use crate::sampler::{ScrollCell, ScrollMetrics, ScrollSample, ScrollSampler};
use crate::ticker::{TickerFrame, TickerWindow};
use crate::types::Episode;
use crate::visible::{ObserverOptions, Span, SummaryCell, TargetGeometry, TrackerSlot};

const BOOTSTRAP_LABEL: &str = "media+transcript";

/// What the host renders after a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSnapshot {
    pub fraction: f64,
    /// Narrative position on the episode timeline.
    pub time_code: f64,
    pub follow: Option<FrameOutcome>,
    pub ticker: TickerFrame,
    pub visible_summary: String,
}

pub struct TranscriptView {
    config: EngineConfig,
    episode: Episode,
    scroll: ScrollCell,
    sampler: ScrollSampler,
    media: MediaSlot,
    playback: PlaybackSync,
    follow: Option<FollowLoop>,
    following: bool,
    highlighter: SegmentHighlighter,
    time_updates: EventChannel<TimeUpdate>,
    ticker: TickerWindow,
    trackers: TrackerSlot,
    bootstrap: Availability,
    viewport_height: Option<f64>,
    ready: bool,
}

impl TranscriptView {
    pub fn new(episode: Episode, config: EngineConfig) -> Self {
        let scroll = ScrollCell::new();
        let media = MediaSlot::new();
        Self {
            sampler: ScrollSampler::new(config.throttle(), scroll.clone()),
            playback: PlaybackSync::new(media.clone()),
            highlighter: SegmentHighlighter::new(episode.segments.clone()),
            ticker: TickerWindow::new(&config),
            bootstrap: Availability::new(BOOTSTRAP_LABEL, config.retry.clone()),
            trackers: TrackerSlot::new(SummaryCell::default()),
            time_updates: EventChannel::new(),
            follow: None,
            following: true,
            viewport_height: None,
            ready: false,
            scroll,
            media,
            episode,
            config,
        }
    }

    pub fn episode(&self) -> &Episode {
        &self.episode
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn active_flags(&self) -> ActiveFlags {
        self.highlighter.flags()
    }

    /// Attaches to the host's elements. Returns `false` (and changes
    /// nothing) unless both are present.
    pub fn setup(&mut self, media: Option<SharedMedia>, transcript: Option<ScrollMetrics>) -> bool {
        let (Some(media), Some(transcript)) = (media, transcript) else {
            return false;
        };
        self.media.attach(media);
        self.viewport_height = Some(transcript.client_height);
        self.scroll.publish(ScrollSample {
            scroll_top: transcript.scroll_top,
            fraction: transcript.fraction(),
        });
        self.highlighter.attach(&self.time_updates);
        self.trackers
            .replace(&self.episode.segments, ObserverOptions::from_config(&self.config));
        if self.following {
            self.start_follow();
        }
        self.ready = true;
        info!(
            segments = self.episode.segments.len(),
            lanes = self.episode.ticker.lanes.len(),
            "transcript view attached"
        );
        true
    }

    /// Retries [`setup`](Self::setup) on the configured backoff until the
    /// host's elements exist.
    pub fn bootstrap(
        &mut self,
        now: Instant,
        probe: impl FnOnce() -> (Option<SharedMedia>, Option<ScrollMetrics>),
    ) -> Probe<()> {
        if self.ready {
            return Probe::Ready(());
        }
        let placeholder = Availability::new(BOOTSTRAP_LABEL, self.config.retry.clone());
        let mut availability = std::mem::replace(&mut self.bootstrap, placeholder);
        let result = availability.poll(now, || {
            let (media, transcript) = probe();
            self.setup(media, transcript).then_some(())
        });
        self.bootstrap = availability;
        result
    }

    pub fn on_scroll(&mut self, metrics: ScrollMetrics, now: Instant) {
        self.viewport_height = Some(metrics.client_height);
        self.sampler.on_scroll(metrics, now);
    }

    pub fn on_time_update(&self, current_time: f64) {
        self.time_updates.emit(&TimeUpdate { current_time });
    }

    /// Pointer activation on segment `index` (or outside any segment).
    pub fn on_click(&self, index: Option<usize>) -> Option<SeekCommand> {
        let segment = index.and_then(|index| self.episode.segments.get(index));
        self.playback.seek_to_segment(segment)
    }

    /// Layout pass: `root` is the viewport and `spans[i]` the extent of segment `i`.
    pub fn on_layout(&mut self, root: Span, spans: &[Span]) -> bool {
        let Some(tracker) = self.trackers.current() else {
            return false;
        };
        let targets: Vec<TargetGeometry<'_>> = self
            .episode
            .segments
            .iter()
            .zip(spans)
            .map(|(segment, span)| TargetGeometry {
                segment,
                span: *span,
            })
            .collect();
        tracker.observe_layout(root, &targets)
    }

    pub fn on_frame(&mut self, now: Instant) -> ViewSnapshot {
        self.sampler.poll(now);
        let follow = self.follow.as_mut().map(FollowLoop::on_frame);
        self.snapshot(follow)
    }

    pub fn time_code(&self) -> f64 {
        time_code(
            self.scroll.latest().fraction,
            f64::from(self.episode.duration_secs),
        )
    }

    pub fn ticker_frame(&self) -> TickerFrame {
        self.ticker.frame(
            self.time_code(),
            Some(&self.episode.ticker),
            self.viewport_height,
        )
    }

    pub fn visible_summary(&self) -> String {
        self.trackers.summary()
    }

    pub fn is_following(&self) -> bool {
        self.following
    }

    /// Turns scroll-to-scrub on or off.
    pub fn set_following(&mut self, following: bool) {
        self.following = following;
        if following && self.ready {
            self.start_follow();
        } else if !following {
            self.stop_follow();
        }
    }

    /// Swaps in new transcript content, tearing down listeners and the
    /// visible-range tracker bound to the old one.
    pub fn replace_episode(&mut self, episode: Episode) {
        self.highlighter.detach();
        self.highlighter = SegmentHighlighter::new(episode.segments.clone());
        self.episode = episode;
        if self.ready {
            self.highlighter.attach(&self.time_updates);
            self.trackers
                .replace(&self.episode.segments, ObserverOptions::from_config(&self.config));
        }
        info!(title = %self.episode.title, "transcript content replaced");
    }

    pub fn dispose(&mut self) {
        self.stop_follow();
        self.sampler.cancel();
        self.highlighter.detach();
        self.trackers.teardown();
        self.media.detach();
        self.ready = false;
        self.bootstrap.reset();
        debug!("transcript view disposed");
    }

    fn start_follow(&mut self) {
        if self.follow.is_none() {
            self.follow = Some(FollowLoop::new(
                self.media.clone(),
                self.scroll.clone(),
                &self.config,
            ));
        }
    }

    fn stop_follow(&mut self) {
        if let Some(follow) = self.follow.take() {
            follow.task().cancel();
        }
    }

    fn snapshot(&self, follow: Option<FrameOutcome>) -> ViewSnapshot {
        ViewSnapshot {
            fraction: self.scroll.latest().fraction,
            time_code: self.time_code(),
            follow,
            ticker: self.ticker_frame(),
            visible_summary: self.visible_summary(),
        }
    }
}

impl Drop for TranscriptView {
    fn drop(&mut self) {
        self.stop_follow();
    }
}
