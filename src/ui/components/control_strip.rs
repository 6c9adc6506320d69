use eframe::egui;

use crate::timecode::format_clock;

#[derive(Default, Debug)]
pub struct ControlStripOutput {
    pub toggle_playback: bool,
    pub toggle_follow: bool,
}

pub struct ControlStrip {
    pub is_playing: bool,
    pub is_following: bool,
    pub position: f64,
    pub duration: Option<f64>,
}

impl ControlStrip {
    pub fn show(&self, ui: &mut egui::Ui) -> ControlStripOutput {
        let mut output = ControlStripOutput::default();
        ui.horizontal(|ui| {
            if play_button(ui, self.is_playing) {
                output.toggle_playback = true;
            }
            ui.separator();
            if follow_toggle(ui, self.is_following) {
                output.toggle_follow = true;
            }
            ui.separator();
            clock_label(ui, self.position, self.duration);
        });
        output
    }
}

fn play_button(ui: &mut egui::Ui, is_playing: bool) -> bool {
    let label = if is_playing { "Pause" } else { "Play" };
    ui.button(label)
        .on_hover_text("Click a transcript line to jump there and start playing.")
        .clicked()
}

fn follow_toggle(ui: &mut egui::Ui, is_following: bool) -> bool {
    let mut following = is_following;
    ui.checkbox(&mut following, "Follow scroll")
        .on_hover_text("Scrolling the transcript scrubs the play head toward the same point.")
        .changed()
}

fn clock_label(ui: &mut egui::Ui, position: f64, duration: Option<f64>) {
    match duration {
        Some(duration) => ui.label(format!(
            "{} / {}",
            format_clock(position),
            format_clock(duration)
        )),
        None => ui
            .colored_label(egui::Color32::from_rgb(210, 160, 20), "Loading media…")
            .on_hover_text("Duration unknown; scroll-follow resumes once metadata arrives."),
    };
}
