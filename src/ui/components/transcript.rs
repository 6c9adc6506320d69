use eframe::egui;

use crate::highlight::ActiveFlags;
use crate::sampler::ScrollMetrics;
use crate::timecode::format_clock;
use crate::types::Segment;
use crate::visible::Span;

/// Geometry and interaction gathered while drawing the transcript.
#[derive(Debug, Clone)]
pub struct TranscriptOutput {
    pub metrics: ScrollMetrics,
    /// Viewport in content coordinates.
    pub viewport: Span,
    /// Extent of each segment in content coordinates.
    pub spans: Vec<Span>,
    pub clicked: Option<usize>,
}

pub struct TranscriptPanel<'a> {
    pub segments: &'a [Segment],
    pub flags: &'a ActiveFlags,
}

impl<'a> TranscriptPanel<'a> {
    pub fn show(self, ui: &mut egui::Ui) -> TranscriptOutput {
        let scroll = egui::ScrollArea::vertical()
            .id_source("transcript")
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                let origin = ui.min_rect().top();
                let mut spans = Vec::with_capacity(self.segments.len());
                let mut clicked = None;
                for (index, segment) in self.segments.iter().enumerate() {
                    let label = format!("[{}] {}", format_clock(segment.start), segment.text);
                    let response = ui.selectable_label(self.flags.is_active(index), label);
                    if response.clicked() {
                        clicked = Some(index);
                    }
                    spans.push(Span::new(
                        f64::from(response.rect.top() - origin),
                        f64::from(response.rect.bottom() - origin),
                    ));
                }
                (spans, clicked)
            });

        let (spans, clicked) = scroll.inner;
        let scroll_top = f64::from(scroll.state.offset.y);
        let client_height = f64::from(scroll.inner_rect.height());
        TranscriptOutput {
            metrics: ScrollMetrics::new(scroll_top, f64::from(scroll.content_size.y), client_height),
            viewport: Span::new(scroll_top, scroll_top + client_height),
            spans,
            clicked,
        }
    }
}
