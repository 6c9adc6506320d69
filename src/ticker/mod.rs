//! Sliding time window over the ticker lanes and the label layout inside it.
//!
//! Labels are centred on the visible part of their appearance. Their weight
//! falls off quadratically with distance from the window centre: opacity
//! reaches 0 at the edges, and colour fades from cornflower blue to black by
//! half way out.

pub mod lanes;

use serde::Serialize;
use tracing::{debug, trace};

use crate::config::EngineConfig;
use crate::types::{Annotation, Rgb, Ticker};

/// Time slice `[center - width/2, center + width/2]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    pub center: f64,
    pub width: f64,
}

impl Window {
    pub fn start(&self) -> f64 {
        self.center - self.width / 2.0
    }

    pub fn end(&self) -> f64 {
        self.center + self.width / 2.0
    }

    /// Overlap test; touching an edge counts.
    pub fn overlaps(&self, start: f64, end: f64) -> bool {
        end >= self.start() && start <= self.end()
    }
}

/// Vertical slot of a lane: 0, 1, -1, 2, -2, ...
pub fn lane_offset(lane: usize) -> i32 {
    let step = i32::try_from(lane.div_ceil(2)).unwrap_or(i32::MAX);
    if lane % 2 == 1 {
        step
    } else {
        -step
    }
}

/// Opacity and colour for a label at `text_x` within a window of `width`.
pub fn label_weight(text_x: f64, width: f64) -> (f64, Rgb) {
    let half = width / 2.0;
    let norm_dist = ((text_x - half).abs() / half).clamp(0.0, 1.0);
    let opacity = 1.0 - norm_dist.powi(2);
    let color = if norm_dist >= 0.5 {
        Rgb::BLACK
    } else {
        let color_factor = (norm_dist / 0.5).powi(2);
        Rgb::CORNFLOWER_BLUE.scaled(1.0 - color_factor)
    };
    (opacity, color)
}

/// Labels for every appearance overlapping `window`, in lane order.
pub fn layout(window: Window, ticker: &Ticker) -> Vec<Annotation> {
    let window_start = window.start();
    let mut annotations = Vec::new();
    for (lane_idx, lane) in ticker.lanes.iter().enumerate() {
        let y = lane_offset(lane_idx);
        for appearance in lane
            .iter()
            .filter(|appearance| window.overlaps(appearance.start, appearance.end))
        {
            let rel_start = (appearance.start - window_start).max(0.0);
            let rel_end = (appearance.end - window_start).min(window.width);
            let x = (rel_start + rel_end) / 2.0;
            let (opacity, color) = label_weight(x, window.width);
            annotations.push(Annotation {
                x,
                y,
                text: appearance.term.clone(),
                opacity,
                color,
            });
        }
    }
    annotations
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartStyle {
    pub font_size: f64,
    pub background: String,
    pub show_grid: bool,
    pub show_tick_labels: bool,
    pub interactive: bool,
}

/// Declarative chart handed to the rendering surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub x_range: [f64; 2],
    pub y_range: [f64; 2],
    pub height: f64,
    pub annotations: Vec<Annotation>,
    pub style: ChartStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickerFrame {
    Render(ChartSpec),
    /// No lane data; the surface must keep whatever it shows.
    NoUpdate,
}

/// Window layout with fixed width and styling.
#[derive(Debug, Clone)]
pub struct TickerWindow {
    width: f64,
    font_size: f64,
    fallback_height: f64,
}

impl TickerWindow {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            width: config.window_width,
            font_size: config.annotation_font_size,
            fallback_height: config.fallback_viewport_height,
        }
    }

    pub fn window_at(&self, time_code: f64) -> Window {
        Window {
            center: time_code,
            width: self.width,
        }
    }

    /// Chart for `time_code`. `viewport_height` is the transcript container's
    /// client height when available.
    pub fn frame(
        &self,
        time_code: f64,
        ticker: Option<&Ticker>,
        viewport_height: Option<f64>,
    ) -> TickerFrame {
        let Some(ticker) = ticker.filter(|ticker| !ticker.is_empty()) else {
            debug!("no ticker lanes; skipping render");
            return TickerFrame::NoUpdate;
        };
        let height = viewport_height
            .filter(|height| height.is_finite() && *height > 0.0)
            .unwrap_or(self.fallback_height);
        let annotations = layout(self.window_at(time_code), ticker);
        trace!(time_code, annotations = annotations.len(), "ticker frame");
        let half_span = ticker.lanes.len() as f64 * 0.5;
        TickerFrame::Render(ChartSpec {
            x_range: [0.0, self.width],
            y_range: [-half_span, half_span],
            height,
            annotations,
            style: ChartStyle {
                font_size: self.font_size,
                background: "rgba(0,0,0,0)".to_string(),
                show_grid: false,
                show_tick_labels: false,
                interactive: false,
            },
        })
    }
}
