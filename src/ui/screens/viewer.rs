use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use eframe::egui;
use tracing::debug;

use crate::availability::Probe;
use crate::config::EngineConfig;
use crate::playback::{MediaElement, SharedMedia};
use crate::sampler::ScrollMetrics;
use crate::types::Episode;
use crate::ui::components::control_strip::ControlStrip;
use crate::ui::components::ticker::TickerView;
use crate::ui::components::transcript::{TranscriptOutput, TranscriptPanel};
use crate::ui::media::SimulatedMedia;
use crate::view::{TranscriptView, ViewSnapshot};

const MEDIA_LOAD_DELAY: Duration = Duration::from_millis(400);

pub struct ViewerApp {
    view: TranscriptView,
    media: Rc<RefCell<SimulatedMedia>>,
    last_metrics: Option<ScrollMetrics>,
    last_frame: Instant,
    snapshot: Option<ViewSnapshot>,
}

impl ViewerApp {
    pub fn new(episode: Episode, config: EngineConfig) -> Self {
        let now = Instant::now();
        let duration = f64::from(episode.duration_secs);
        Self {
            media: Rc::new(RefCell::new(SimulatedMedia::new(
                duration,
                MEDIA_LOAD_DELAY,
                now,
            ))),
            view: TranscriptView::new(episode, config),
            last_metrics: None,
            last_frame: now,
            snapshot: None,
        }
    }

    fn bootstrap(&mut self, now: Instant) {
        if self.view.is_ready() {
            return;
        }
        let media: SharedMedia = self.media.clone();
        let transcript = self.last_metrics;
        if let Probe::Exhausted = self.view.bootstrap(now, || (Some(media), transcript)) {
            debug!("viewer bootstrap exhausted its retries");
        }
    }

    fn show_controls(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            let (is_playing, position, duration) = {
                let media = self.media.borrow();
                (media.is_playing(), media.current_time(), media.duration())
            };
            let output = ControlStrip {
                is_playing,
                is_following: self.view.is_following(),
                position,
                duration,
            }
            .show(ui);
            if output.toggle_playback {
                let mut media = self.media.borrow_mut();
                if media.is_playing() {
                    media.pause();
                } else {
                    media.play();
                }
            }
            if output.toggle_follow {
                let following = !self.view.is_following();
                self.view.set_following(following);
            }
        });
    }

    fn show_status(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(self.view.visible_summary());
                if let Some(snapshot) = &self.snapshot {
                    ui.separator();
                    ui.label(format!(
                        "Scroll {:.0}% · time code {:.1}s",
                        snapshot.fraction * 100.0,
                        snapshot.time_code
                    ));
                }
            });
        });
    }

    fn show_ticker(&self, ctx: &egui::Context) {
        egui::SidePanel::right("ticker")
            .default_width(420.0)
            .show(ctx, |ui| {
                ui.heading("Ticker");
                let frame = match &self.snapshot {
                    Some(snapshot) => snapshot.ticker.clone(),
                    None => self.view.ticker_frame(),
                };
                TickerView { frame: &frame }.show(ui);
            });
    }

    fn show_transcript(&mut self, ctx: &egui::Context) -> TranscriptOutput {
        egui::CentralPanel::default()
            .show(ctx, |ui| {
                ui.heading(self.view.episode().title.as_str());
                let flags = self.view.active_flags();
                TranscriptPanel {
                    segments: &self.view.episode().segments,
                    flags: &flags,
                }
                .show(ui)
            })
            .inner
    }

    fn handle_transcript(&mut self, output: TranscriptOutput, now: Instant) {
        // Before setup the latest metrics reach the view through bootstrap.
        if self.last_metrics != Some(output.metrics) {
            self.last_metrics = Some(output.metrics);
            if self.view.is_ready() {
                self.view.on_scroll(output.metrics, now);
            }
        }
        self.view.on_layout(output.viewport, &output.spans);
        if output.clicked.is_some() {
            self.view.on_click(output.clicked);
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f64();
        self.last_frame = now;
        self.media.borrow_mut().advance(dt);

        self.bootstrap(now);
        self.show_controls(ctx);
        self.show_status(ctx);
        self.show_ticker(ctx);
        let output = self.show_transcript(ctx);
        self.handle_transcript(output, now);

        let current_time = self.media.borrow().current_time();
        self.view.on_time_update(current_time);
        self.snapshot = Some(self.view.on_frame(now));
        ctx.request_repaint();
    }
}
