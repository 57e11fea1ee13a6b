//! Notifications emitted by the scheduler and the player, and a listener that logs them.

use std::fmt;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::model::Selection;

/// Playback state of the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Idle,
    Buffering,
    Ready,
    End,
}

impl fmt::Display for PlayerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlayerState::Idle => "IDLE",
            PlayerState::Buffering => "BUFFERING",
            PlayerState::Ready => "READY",
            PlayerState::End => "END",
        };
        f.write_str(name)
    }
}

#[async_trait]
pub trait SchedulerEventListener: Send + Sync {
    /// A download of segment `index` started with the given selection.
    async fn on_segment_download_start(&self, index: u64, selections: &Selection);

    async fn on_segment_download_complete(&self, index: u64);
}

#[async_trait]
pub trait PlayerEventListener: Send + Sync {
    /// `buffer_level` is in seconds.
    async fn on_buffer_level_change(&self, buffer_level: f64);

    /// `position` is the playback position (seconds) at which the state changed.
    async fn on_state_change(&self, position: f64, old_state: PlayerState, new_state: PlayerState);
}

/// Logs scheduler and player events, and remembers where playback started buffering.
#[derive(Debug, Default)]
pub struct EventLogger {
    buffering_positions: Mutex<Vec<f64>>,
}

impl EventLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Playback positions of every transition into [`PlayerState::Buffering`], in order.
    pub fn buffering_positions(&self) -> Vec<f64> {
        self.buffering_positions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl SchedulerEventListener for EventLogger {
    async fn on_segment_download_start(&self, index: u64, selections: &Selection) {
        info!("Download start. Index: {}, Selections: {:?}", index, selections);
    }

    async fn on_segment_download_complete(&self, index: u64) {
        info!("Download complete. Index: {}", index);
    }
}

#[async_trait]
impl PlayerEventListener for EventLogger {
    async fn on_buffer_level_change(&self, buffer_level: f64) {
        debug!("Buffer level: {:.3}", buffer_level);
    }

    async fn on_state_change(&self, position: f64, old_state: PlayerState, new_state: PlayerState) {
        if new_state == PlayerState::Buffering {
            self.buffering_positions
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(position);
        }
        info!("Switch state. pos: {:.3}, from {} to {}", position, old_state, new_state);
    }
}
