use eframe::egui::{self, Align2, Color32, FontId, Stroke};

use crate::ticker::{ChartSpec, TickerFrame};
use crate::types::Annotation;

pub struct TickerView<'a> {
    pub frame: &'a TickerFrame,
}

impl<'a> TickerView<'a> {
    pub fn show(self, ui: &mut egui::Ui) {
        match self.frame {
            TickerFrame::Render(chart) => paint_chart(ui, chart),
            TickerFrame::NoUpdate => {
                ui.label("Ticker unavailable");
            }
        }
    }
}

fn paint_chart(ui: &mut egui::Ui, chart: &ChartSpec) {
    let height = (chart.height as f32).min(ui.available_height()).max(1.0);
    let size = egui::vec2(ui.available_width(), height);
    let (response, painter) = ui.allocate_painter(size, egui::Sense::hover());
    let rect = response.rect;
    painter.line_segment(
        [rect.center_top(), rect.center_bottom()],
        Stroke::new(1.0, Color32::from_gray(210)),
    );

    let lanes = (chart.y_range[1] - chart.y_range[0]).max(1.0) as f32;
    let font_size = (chart.style.font_size as f32).min(rect.height() / lanes);
    for annotation in &chart.annotations {
        painter.text(
            to_screen(rect, chart, annotation),
            Align2::CENTER_CENTER,
            &annotation.text,
            FontId::proportional(font_size),
            label_color(annotation),
        );
    }
}

fn to_screen(rect: egui::Rect, chart: &ChartSpec, annotation: &Annotation) -> egui::Pos2 {
    let [x0, x1] = chart.x_range;
    let [y0, y1] = chart.y_range;
    let x_ratio = ((annotation.x - x0) / (x1 - x0).max(f64::EPSILON)) as f32;
    let y_ratio = ((f64::from(annotation.y) - y0) / (y1 - y0).max(f64::EPSILON)) as f32;
    egui::pos2(
        rect.left() + x_ratio * rect.width(),
        rect.bottom() - y_ratio * rect.height(),
    )
}

fn label_color(annotation: &Annotation) -> Color32 {
    let alpha = (annotation.opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    let color = annotation.color;
    Color32::from_rgba_unmultiplied(color.r, color.g, color.b, alpha)
}
