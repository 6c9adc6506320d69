//! Scroll/playback synchronization and windowed ticker layout for a
//! transcript viewer.

pub mod availability;
pub mod cli;
pub mod config;
pub mod events;
pub mod highlight;
pub mod playback;
pub mod sampler;
pub mod ticker;
pub mod timecode;
pub mod types;
pub mod ui;
pub mod view;
pub mod visible;

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Convenient alias for results returned by the viewer launch path.
pub type Result<T> = std::result::Result<T, SyncError>;

/// Lightweight error type for the viewer surface.
///
/// The synchronization core itself never fails; it degrades to defaults.
#[derive(Debug, Clone)]
pub struct SyncError {
    message: Arc<str>,
}

impl SyncError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Arc::from(message.into()),
        }
    }
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for SyncError {}
