pub mod components;
pub mod media;
pub mod screens;

use eframe::NativeOptions;
use tracing::info;

use crate::config::EngineConfig;
use crate::types::Episode;
use crate::{Result, SyncError};

pub fn launch_ui(episode: Episode, config: EngineConfig) -> Result<()> {
    let title = window_title(&episode);
    info!(title = %title, "launching transcript viewer");
    let options = NativeOptions::default();
    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| {
            cc.egui_ctx.set_visuals(eframe::egui::Visuals::light());
            Box::new(screens::viewer::ViewerApp::new(episode, config))
        }),
    )
    .map_err(|err| SyncError::new(err.to_string()))
}

fn window_title(episode: &Episode) -> String {
    if episode.title.is_empty() {
        "Transcript Sync".to_string()
    } else {
        format!("Transcript Sync – {}", episode.title)
    }
}
